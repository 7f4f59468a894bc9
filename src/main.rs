use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use farmhand::config::{self, AppConfig};
use farmhand::gemini::{GeminiBackend, GeminiClient, GeminiSettings, GeminiSpeech};
use farmhand::models::ChatRequest;
use farmhand::router::{run_router, RouterState};
use farmhand::{logger, FarmhandAgent, SpeechSynthesizer, ToolRegistry};

#[derive(Parser)]
#[command(name = "farmhand", version, about = "Farmhand assistant core")]
struct Cli {
  /// Config file (defaults to <config dir>/farmhand/config.json)
  #[arg(long, global = true)]
  config: Option<PathBuf>,
  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (default)
  Serve,
  /// Store the Gemini API key in the OS keyring
  SetKey { key: String },
  /// Run one chat turn and print the response as JSON
  Ask {
    message: String,
    #[arg(long)]
    language: Option<String>,
  },
}

fn data_dir() -> anyhow::Result<PathBuf> {
  let dir = dirs::config_dir()
    .context("missing config dir")?
    .join("farmhand");
  std::fs::create_dir_all(&dir)?;
  Ok(dir)
}

fn build_agent(config: &AppConfig) -> anyhow::Result<FarmhandAgent> {
  let key = config::gemini_api_key()?;
  let client = GeminiClient::new(&key, &config.api_base)?;
  let tools = Arc::new(ToolRegistry::farm_defaults());

  let backend = Arc::new(GeminiBackend::new(
    client.clone(),
    GeminiSettings {
      model: config.chat_model.clone(),
      max_tool_rounds: config.max_tool_rounds,
    },
    tools.clone(),
  ));
  let speech = config.speech_enabled.then(|| {
    Arc::new(GeminiSpeech::new(client, &config.speech_model, &config.voice)) as Arc<dyn SpeechSynthesizer>
  });

  Ok(FarmhandAgent::new(backend, speech, tools))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  let data_dir = data_dir()?;
  let config_path = cli.config.unwrap_or_else(|| data_dir.join("config.json"));
  let config = config::load_or_init(&config_path)?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::SetKey { key } => {
      config::store_gemini_api_key(&key)?;
      println!("Gemini API key stored.");
    }
    Command::Ask { message, language } => {
      logger::init(Some(&data_dir.join("farmhand.log")), &config.log_level)?;
      let agent = build_agent(&config)?;
      let res = agent
        .chat(ChatRequest {
          message,
          history: None,
          language,
        })
        .await?;
      println!("{}", serde_json::to_string_pretty(&res)?);
    }
    Command::Serve => {
      logger::init(Some(&data_dir.join("farmhand.log")), &config.log_level)?;
      info!(config = %config_path.display(), "Farmhand starting up");
      let agent = build_agent(&config)?;

      let listener = std::net::TcpListener::bind(&config.listen_addr)
        .with_context(|| format!("binding {}", config.listen_addr))?;
      let addr = listener.local_addr()?;
      info!(%addr, "router listening");
      println!("Farmhand listening on http://{addr}");

      run_router(
        listener,
        RouterState {
          started_at: Instant::now(),
          agent,
        },
      )
      .await?;
    }
  }
  Ok(())
}

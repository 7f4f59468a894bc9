use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::gemini::DEFAULT_API_BASE;

const KEYRING_SERVICE: &str = "Farmhand";
const KEYRING_USER: &str = "gemini";
const KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
  pub chat_model: String,
  pub speech_model: String,
  pub voice: String,
  pub api_base: String,
  pub max_tool_rounds: usize,
  pub listen_addr: String,
  pub log_level: String,
  pub speech_enabled: bool,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      chat_model: "gemini-2.5-flash".to_string(),
      speech_model: "gemini-2.5-flash-preview-tts".to_string(),
      voice: "Algenib".to_string(),
      api_base: DEFAULT_API_BASE.to_string(),
      max_tool_rounds: 5,
      listen_addr: "127.0.0.1:8787".to_string(),
      log_level: "info".to_string(),
      speech_enabled: true,
    }
  }
}

pub fn load_or_init(path: &Path) -> anyhow::Result<AppConfig> {
  if path.exists() {
    let data = std::fs::read_to_string(path)
      .with_context(|| format!("reading config {}", path.display()))?;
    let config: AppConfig = serde_json::from_str(&data)
      .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
  } else {
    let config = AppConfig::default();
    save_config(path, &config)?;
    Ok(config)
  }
}

pub fn save_config(path: &Path, config: &AppConfig) -> anyhow::Result<()> {
  if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
    std::fs::create_dir_all(dir)?;
  }
  let json = serde_json::to_string_pretty(config)?;
  std::fs::write(path, json)?;
  Ok(())
}

/// Gemini API key from the environment, falling back to the OS keyring.
pub fn gemini_api_key() -> anyhow::Result<String> {
  let from_env = KEY_ENV_VARS
    .iter()
    .filter_map(|var| std::env::var(var).ok())
    .find(|key| !key.trim().is_empty());
  if let Some(key) = from_env {
    return Ok(key.trim().to_string());
  }

  let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
  let key = entry
    .get_password()
    .map_err(|_| anyhow::anyhow!("Gemini API key missing. Set GEMINI_API_KEY or run `farmhand set-key`."))?;
  if key.trim().is_empty() {
    anyhow::bail!("Gemini API key missing. Set GEMINI_API_KEY or run `farmhand set-key`.");
  }
  Ok(key.trim().to_string())
}

pub fn store_gemini_api_key(key: &str) -> anyhow::Result<()> {
  if key.trim().is_empty() {
    anyhow::bail!("refusing to store an empty API key");
  }
  let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
  entry.set_password(key.trim())?;
  Ok(())
}

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. `RUST_LOG` overrides `level`.
/// With a path, lines are appended to that file; otherwise they go to stderr.
pub fn init(log_path: Option<&Path>, level: &str) -> anyhow::Result<()> {
  let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
  let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

  let installed = match log_path {
    Some(path) => {
      let file = OpenOptions::new().create(true).append(true).open(path)?;
      builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
    }
    None => builder.with_writer(std::io::stderr).try_init(),
  };

  if installed.is_err() {
    tracing::debug!("tracing subscriber already installed");
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn init_twice_is_harmless() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("farmhand.log");
    init(Some(&path), "debug").unwrap();
    init(None, "info").unwrap();
    assert!(path.exists());
  }
}

//! `data:<mime>;base64,<payload>` URIs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri<'a> {
  pub mime: &'a str,
  pub data: &'a str,
}

/// Splits a base64 data URI; `None` when the string is not one.
pub fn parse(uri: &str) -> Option<DataUri<'_>> {
  let rest = uri.strip_prefix("data:")?;
  let (meta, data) = rest.split_once(',')?;
  let mime = meta.strip_suffix(";base64")?;
  if mime.is_empty() || !mime.contains('/') || data.is_empty() {
    return None;
  }
  Some(DataUri { mime, data })
}

pub fn encode(mime: &str, bytes: &[u8]) -> String {
  format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_image_uri() {
    let uri = parse("data:image/jpeg;base64,/9j/4AAQ").unwrap();
    assert_eq!(uri.mime, "image/jpeg");
    assert_eq!(uri.data, "/9j/4AAQ");
  }

  #[test]
  fn rejects_non_base64_or_malformed_uris() {
    assert_eq!(parse("https://example.com/leaf.png"), None);
    assert_eq!(parse("data:image/png,rawbytes"), None);
    assert_eq!(parse("data:;base64,AAAA"), None);
    assert_eq!(parse("data:image/png;base64,"), None);
  }

  #[test]
  fn encodes_with_mime_prefix() {
    assert_eq!(encode("audio/wav", b"RIFF"), "data:audio/wav;base64,UklGRg==");
  }
}

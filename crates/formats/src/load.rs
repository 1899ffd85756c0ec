use std::path::PathBuf;

use crate::feature_collection::{FeatureCollection, FeatureCollectionError};

/// Failure to obtain a usable FeatureCollection from a data source.
#[derive(Debug)]
pub enum LoadError {
    Transport(String),
    Status {
        status: u16,
        reason: Option<String>,
    },
    /// The body looks like an HTML page (typically a 404 from a dev server).
    HtmlBody,
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(FeatureCollectionError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Transport(msg) => write!(f, "request failed: {msg}"),
            LoadError::Status {
                status,
                reason: Some(reason),
            } => write!(f, "HTTP {status} {reason}"),
            LoadError::Status {
                status,
                reason: None,
            } => write!(f, "HTTP {status}"),
            LoadError::HtmlBody => write!(f, "fetched response is HTML, not JSON"),
            LoadError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            LoadError::Parse(e) => write!(f, "failed to parse GeoJSON: {e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FeatureCollectionError> for LoadError {
    fn from(e: FeatureCollectionError) -> Self {
        LoadError::Parse(e)
    }
}

/// True when the first non-whitespace character is `<`.
pub fn looks_like_html(body: &str) -> bool {
    body.trim_start().starts_with('<')
}

/// Turns a fetched response into a FeatureCollection.
///
/// Non-2xx statuses and HTML bodies are rejected before any JSON parsing.
pub fn decode_geojson_response(
    status: u16,
    reason: Option<&str>,
    body: &str,
) -> Result<FeatureCollection, LoadError> {
    if !(200..300).contains(&status) {
        return Err(LoadError::Status {
            status,
            reason: reason.map(str::to_string),
        });
    }
    decode_geojson_body(body)
}

pub fn decode_geojson_body(body: &str) -> Result<FeatureCollection, LoadError> {
    if looks_like_html(body) {
        return Err(LoadError::HtmlBody);
    }
    Ok(FeatureCollection::from_geojson_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::{LoadError, decode_geojson_response, looks_like_html};

    const EMPTY: &str = r#"{"type": "FeatureCollection", "features": []}"#;

    #[test]
    fn accepts_2xx_json() {
        let fc = decode_geojson_response(200, Some("OK"), EMPTY).expect("decode");
        assert!(fc.is_empty());
        assert!(decode_geojson_response(204, None, EMPTY).is_ok());
    }

    #[test]
    fn rejects_error_statuses() {
        let err = decode_geojson_response(404, Some("Not Found"), EMPTY).unwrap_err();
        assert!(matches!(err, LoadError::Status { status: 404, .. }));
        assert_eq!(err.to_string(), "HTTP 404 Not Found");
        let err = decode_geojson_response(500, None, EMPTY).unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500");
        assert!(decode_geojson_response(301, None, EMPTY).is_err());
    }

    #[test]
    fn rejects_html_pages_served_with_200() {
        let body = "\n  <!DOCTYPE html><html><body>Not Found</body></html>";
        assert!(looks_like_html(body));
        let err = decode_geojson_response(200, None, body).unwrap_err();
        assert!(matches!(err, LoadError::HtmlBody));
    }

    #[test]
    fn surfaces_parse_errors() {
        let err = decode_geojson_response(200, None, r#"{"type": "Topology"}"#).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}

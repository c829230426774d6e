//! Crate error type.
//!
//! The counter engine itself never fails; errors only come from the edges
//! (file I/O, JSON, font parsing) and from the walk's nesting guard.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The font file could not be parsed as a TrueType/OpenType face.
    #[error("Font error: {0}")]
    Font(String),

    /// The document nests deeper than the configured limit.
    #[error("document nesting exceeds the depth limit of {limit}")]
    DepthLimit { limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            Error::DepthLimit { limit: 3 }.to_string(),
            "document nesting exceeds the depth limit of 3"
        );
        let json: Error = serde_json::from_str::<u32>("x").unwrap_err().into();
        assert!(json.to_string().starts_with("JSON error:"));
    }
}

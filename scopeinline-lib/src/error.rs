use std::io;
use std::path::PathBuf;

/// Errors surfaced by configuration and file handling. Rewriting itself
/// never fails.
#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    #[error("invalid scope prefix {0:?}: expected a CSS identifier that does not start with a digit")]
    InvalidPrefix(String),

    #[error("invalid marker attribute {0:?}: expected a lowercase attribute name")]
    InvalidMarker(String),

    #[error("failed to compile rewrite pattern")]
    Pattern(#[from] regex::Error),

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

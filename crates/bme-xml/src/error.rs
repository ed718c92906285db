use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum XmlError {
    #[error("malformed XML at byte {position}: {source}")]
    Syntax {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("document has no root element")]
    NoRootElement,

    #[error("unbalanced closing tag </{name}> at byte {position}")]
    UnbalancedEnd { name: String, position: u64 },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write XML: {0}")]
    Write(#[from] std::io::Error),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
}

impl XmlError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn syntax(position: u64, source: impl Into<quick_xml::Error>) -> Self {
        Self::Syntax {
            position,
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, XmlError>;

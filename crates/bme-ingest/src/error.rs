use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IngestError {
    #[error("chunk {chunk} was already ingested")]
    DuplicateChunk { chunk: u64 },

    #[error("chunk {chunk} arrived after chunk {last}")]
    OutOfOrderChunk { chunk: u64, last: u64 },

    #[error("collection has been torn down")]
    TornDown,

    #[error("expected root element <{expected}>, found <{found}>")]
    RootMismatch { expected: String, found: String },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Xml(#[from] bme_xml::XmlError),
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;

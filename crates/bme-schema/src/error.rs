use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("no schema for root element <{tag}>")]
    UnknownRoot { tag: String },

    #[error("<{tag}> is not stored as an indexed collection")]
    NotIndexed { tag: String },

    #[error(transparent)]
    Model(#[from] bme_model::ModelError),

    #[error(transparent)]
    Xml(#[from] bme_xml::XmlError),

    #[error(transparent)]
    Ingest(#[from] bme_ingest::IngestError),
}

pub type Result<T> = std::result::Result<T, SchemaError>;

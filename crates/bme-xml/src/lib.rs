//! XML text to [`bme_model::XmlDocument`] and back, on quick-xml.

pub mod error;
pub mod hash;
pub mod reader;
pub mod writer;

pub use error::{Result, XmlError};
pub use hash::sha256_hex;
pub use reader::{
    ReadOptions, TreeBuilder, parse_reader, parse_str, parse_str_with, read_file, root_name,
};
pub use writer::{
    Indent, WriteOptions, detect_indent, element_to_string, to_bytes, to_string, write_document,
    write_file,
};

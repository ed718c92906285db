//! Large entity collections: chunked ingestion, secondary indexes and
//! streaming reads of files too big to parse in one pass.

pub mod collection;
pub mod document;
pub mod error;
pub mod index;
pub mod streaming;

pub use collection::{ChunkReport, IndexDiagnostics, IndexedCollection, IndexedEntity, IngestProgress};
pub use document::LargeDocument;
pub use error::{IngestError, Result};
pub use index::{ElementRef, KeyResult, SecondaryIndex, UNINDEXED_BUCKET, UnindexableElement};
pub use streaming::{
    ChunkedElementReader, DEFAULT_CHUNK_SIZE, DEFAULT_STREAMING_THRESHOLD_BYTES, FileSizeCategory,
    PositionedElement, StreamOutcome, StreamingOptions, VERY_LARGE_CHUNK_SIZE, should_use_streaming,
    should_use_streaming_with_threshold,
};

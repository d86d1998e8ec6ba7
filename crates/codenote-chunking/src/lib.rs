//! Source discovery, chunking and reassembly for codenote.
//!
//! The pieces here are pure with respect to the annotation service: the
//! [`Chunker`] partitions a file's content along line boundaries, and the
//! [`Reassembler`] stitches per-chunk results back together in order. The
//! load-bearing guarantee is that concatenating the chunks of a file
//! reproduces the file byte for byte.

pub use self::{
    chunker::{Chunk, Chunker},
    discovery::{DiscoveryConfig, FileDiscoverer, FileEntry, ARTIFACT_MARKER},
    errors::{ChunkingError, ChunkingResult},
    language::{LanguageDetector, LanguageKind},
    reassembler::{normalize_response, AnnotationResult, ChunkOutcome, FallbackPolicy, Reassembled, Reassembler},
    source::SourceUnit,
};

mod chunker;
mod discovery;
mod errors;
mod language;
mod reassembler;
mod source;

use tracing::debug;

use crate::errors::{ChunkingError, ChunkingResult};

/// A contiguous, line-respecting slice of a source file.
///
/// Chunks borrow from the content they were cut from; the sequence number is
/// 1-based and `start_line` is the 1-based line the slice begins on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub sequence: usize,
    pub text: &'a str,
    pub start_line: usize,
    pub line_count: usize,
}

impl<'a> Chunk<'a> {
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Last line covered by this chunk, or `start_line - 1` when it is empty.
    pub fn end_line(&self) -> usize {
        (self.start_line + self.line_count).saturating_sub(1)
    }
}

/// Splits text into bounded chunks without ever splitting a line.
///
/// Sizes are measured in bytes of UTF-8. A single line longer than the
/// maximum is emitted alone in its own chunk.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    max_size: usize,
}

impl Chunker {
    pub fn new(max_size: usize) -> ChunkingResult<Self> {
        if max_size == 0 {
            return Err(ChunkingError::InvalidChunkSize);
        }
        Ok(Self { max_size })
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Partition `content` into chunks.
    ///
    /// Content at or below the maximum comes back as a single chunk equal to
    /// the whole input, which includes the empty string: empty content yields
    /// exactly one empty chunk. Concatenating the returned texts in order
    /// always reproduces `content`.
    pub fn chunk<'a>(&self, content: &'a str) -> Vec<Chunk<'a>> {
        if content.len() <= self.max_size {
            return vec![Chunk {
                sequence: 1,
                text: content,
                start_line: 1,
                line_count: content.split_inclusive('\n').count(),
            }];
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut end = 0;
        let mut start_line = 1;
        let mut lines = 0;

        for line in content.split_inclusive('\n') {
            let buffered = end - start;
            if buffered > 0 && buffered + line.len() > self.max_size {
                chunks.push(Chunk {
                    sequence: chunks.len() + 1,
                    text: &content[start..end],
                    start_line,
                    line_count: lines,
                });
                start = end;
                start_line += lines;
                lines = 0;
            }
            end += line.len();
            lines += 1;
        }

        if end > start {
            chunks.push(Chunk {
                sequence: chunks.len() + 1,
                text: &content[start..end],
                start_line,
                line_count: lines,
            });
        }

        debug!(
            bytes = content.len(),
            max_size = self.max_size,
            chunks = chunks.len(),
            "Split content into chunks"
        );
        chunks
    }
}

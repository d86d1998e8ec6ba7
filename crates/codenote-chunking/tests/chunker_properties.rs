//! Property-based tests for the line-respecting chunker
//! Round-trip, single-chunk shortcut and oversized-line behaviour.

use codenote_chunking::Chunker;
use proptest::prelude::*;

// Lines of varied length, with and without terminators, including CRLF
fn arb_content() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (r"[a-zA-Z0-9 _(){};=#/\t]{0,40}", prop::sample::select(vec!["\n", "\r\n", ""])),
        0..40,
    )
    .prop_map(|lines| {
        lines
            .into_iter()
            .map(|(body, end)| format!("{}{}", body, end))
            .collect::<String>()
    })
}

proptest! {
    #[test]
    fn prop_concatenation_reproduces_content(content in arb_content(), max_size in 1usize..120) {
        let chunker = Chunker::new(max_size).unwrap();
        let chunks = chunker.chunk(&content);

        let rebuilt: String = chunks.iter().map(|c| c.text).collect();
        prop_assert_eq!(rebuilt, content);
    }

    #[test]
    fn prop_sequences_are_one_based_and_contiguous(content in arb_content(), max_size in 1usize..120) {
        let chunker = Chunker::new(max_size).unwrap();
        let chunks = chunker.chunk(&content);

        prop_assert!(!chunks.is_empty());
        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.sequence, i + 1);
        }
    }

    #[test]
    fn prop_short_content_is_a_single_chunk(content in arb_content()) {
        let chunker = Chunker::new(content.len().max(1)).unwrap();
        let chunks = chunker.chunk(&content);

        prop_assert_eq!(chunks.len(), 1);
        prop_assert_eq!(chunks[0].text, content.as_str());
    }

    #[test]
    fn prop_chunks_never_split_lines(content in arb_content(), max_size in 1usize..120) {
        let chunker = Chunker::new(max_size).unwrap();
        let chunks = chunker.chunk(&content);

        // Every chunk but the last ends on a line terminator
        for chunk in &chunks[..chunks.len() - 1] {
            prop_assert!(chunk.text.ends_with('\n'), "chunk {:?} splits a line", chunk.text);
        }
    }

    #[test]
    fn prop_multi_line_chunks_respect_max_size(content in arb_content(), max_size in 1usize..120) {
        let chunker = Chunker::new(max_size).unwrap();
        let chunks = chunker.chunk(&content);

        if content.len() > max_size {
            for chunk in &chunks {
                if chunk.len() > max_size {
                    // Only a single oversized line may exceed the limit
                    prop_assert_eq!(chunk.line_count, 1);
                }
            }
        }
    }

    #[test]
    fn prop_line_numbers_are_contiguous(content in arb_content(), max_size in 1usize..120) {
        let chunker = Chunker::new(max_size).unwrap();
        let chunks = chunker.chunk(&content);

        let mut expected_start = 1;
        for chunk in &chunks {
            prop_assert_eq!(chunk.start_line, expected_start);
            expected_start += chunk.line_count;
        }
    }
}

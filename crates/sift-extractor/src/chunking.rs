//! Chunking of oversized inputs into oracle-safe units

use sift_domain::{DecodeError, PagedCodec};
use std::ops::Range;

/// Chunks raw text into contiguous pieces of at most `max_chars` characters
///
/// Lengths are counted in characters, never bytes, so a piece never splits a
/// UTF-8 code point. Pieces cover the text exactly once, in order; only the
/// last one may be shorter than the bound.
pub struct TextChunker {
    max_chars: usize,
}

impl TextChunker {
    /// Create a new text chunker; a zero bound is treated as one character
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
        }
    }

    /// Chunk the given text
    pub fn chunk<'a>(&self, text: &'a str) -> Vec<&'a str> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::with_capacity(text.len() / self.max_chars + 1);
        let mut start = 0;
        let mut count = 0;

        for (idx, _) in text.char_indices() {
            if count == self.max_chars {
                chunks.push(&text[start..idx]);
                start = idx;
                count = 0;
            }
            count += 1;
        }
        chunks.push(&text[start..]);

        chunks
    }
}

/// Split `page_count` pages into contiguous ranges of at most `max_pages`
pub fn page_ranges(page_count: usize, max_pages: usize) -> Vec<Range<usize>> {
    let max_pages = max_pages.max(1);
    (0..page_count)
        .step_by(max_pages)
        .map(|start| start..(start + max_pages).min(page_count))
        .collect()
}

/// One page-range chunk, re-encoded as a standalone document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageChunk {
    /// Zero-based chunk index
    pub index: usize,

    /// Total number of chunks for the document
    pub total: usize,

    /// Zero-based page range covered by this chunk
    pub pages: Range<usize>,

    /// Encoded sub-document
    pub data: Vec<u8>,
}

/// Chunks a paged document by page ranges
pub struct PageChunker<'c, C: PagedCodec> {
    codec: &'c C,
    max_pages: usize,
}

impl<'c, C: PagedCodec> PageChunker<'c, C> {
    /// Create a new page chunker
    pub fn new(codec: &'c C, max_pages: usize) -> Self {
        Self {
            codec,
            max_pages: max_pages.max(1),
        }
    }

    /// Parse the document once and return a lazy sequence of chunks
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if the container cannot be parsed.
    pub fn chunks(&self, bytes: &[u8]) -> Result<PageChunks<'c, C>, DecodeError> {
        let handle = self.codec.load(bytes)?;
        let page_count = self.codec.page_count(&handle);
        Ok(PageChunks {
            codec: self.codec,
            handle,
            page_count,
            ranges: page_ranges(page_count, self.max_pages),
            next: 0,
        })
    }
}

/// Ordered, finite, restartable sequence of page chunks
///
/// Each chunk is encoded when the iterator reaches it, so at most one
/// sub-document is held in memory at a time by the orchestrator.
pub struct PageChunks<'c, C: PagedCodec> {
    codec: &'c C,
    handle: C::Handle,
    page_count: usize,
    ranges: Vec<Range<usize>>,
    next: usize,
}

impl<'c, C: PagedCodec> PageChunks<'c, C> {
    /// Number of pages in the source document
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Total number of chunks
    pub fn total(&self) -> usize {
        self.ranges.len()
    }

    /// Page ranges of all chunks, in order
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Rewind to the first chunk
    pub fn restart(&mut self) {
        self.next = 0;
    }
}

impl<'c, C: PagedCodec> Iterator for PageChunks<'c, C> {
    type Item = Result<PageChunk, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let pages = self.ranges.get(self.next)?.clone();
        let index = self.next;
        self.next += 1;

        Some(
            self.codec
                .extract_page_range(&self.handle, pages.clone())
                .map(|data| PageChunk {
                    index,
                    total: self.ranges.len(),
                    pages,
                    data,
                }),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.ranges.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl<'c, C: PagedCodec> ExactSizeIterator for PageChunks<'c, C> {}

impl<'c, C> Clone for PageChunks<'c, C>
where
    C: PagedCodec,
    C::Handle: Clone,
{
    fn clone(&self) -> Self {
        Self {
            codec: self.codec,
            handle: self.handle.clone(),
            page_count: self.page_count,
            ranges: self.ranges.clone(),
            next: self.next,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::BytePageCodec;
    use super::*;

    #[test]
    fn test_no_chunking_needed_for_small_text() {
        let chunker = TextChunker::new(100);
        let text = "Short text here.";
        assert_eq!(chunker.chunk(text), vec![text]);
    }

    #[test]
    fn test_text_at_bound_is_single_chunk() {
        let chunker = TextChunker::new(5);
        assert_eq!(chunker.chunk("abcde"), vec!["abcde"]);
    }

    #[test]
    fn test_text_split_exact_pieces() {
        let chunker = TextChunker::new(2);
        assert_eq!(chunker.chunk("abcde"), vec!["ab", "cd", "e"]);
    }

    #[test]
    fn test_empty_text() {
        let chunker = TextChunker::new(100);
        assert!(chunker.chunk("").is_empty());
    }

    #[test]
    fn test_multibyte_text_counts_characters() {
        let chunker = TextChunker::new(2);
        let chunks = chunker.chunk("ééé€");
        assert_eq!(chunks, vec!["éé", "é€"]);
    }

    #[test]
    fn test_page_ranges() {
        assert_eq!(page_ranges(5, 2), vec![0..2, 2..4, 4..5]);
        assert_eq!(page_ranges(4, 2), vec![0..2, 2..4]);
        assert_eq!(page_ranges(3, 10), vec![0..3]);
        assert!(page_ranges(0, 3).is_empty());
    }

    #[test]
    fn test_page_chunker_splits_document() {
        let codec = BytePageCodec::default();
        let chunker = PageChunker::new(&codec, 2);
        let chunks: Vec<PageChunk> = chunker
            .chunks(b"abcde")
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].data, b"ab");
        assert_eq!(chunks[1].pages, 2..4);
        assert_eq!(chunks[2].data, b"e");
        assert!(chunks.iter().all(|c| c.total == 3));
        assert_eq!(codec.loads(), 1);
    }

    #[test]
    fn test_page_chunker_restart() {
        let codec = BytePageCodec::default();
        let chunker = PageChunker::new(&codec, 1);
        let mut chunks = chunker.chunks(b"xyz").unwrap();
        assert_eq!(chunks.len(), 3);

        let first: Vec<_> = chunks.by_ref().map(|c| c.unwrap().data).collect();
        assert!(chunks.next().is_none());

        chunks.restart();
        let second: Vec<_> = chunks.map(|c| c.unwrap().data).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_page_chunks_clone_is_independent() {
        let codec = BytePageCodec::default();
        let chunker = PageChunker::new(&codec, 2);
        let mut chunks = chunker.chunks(b"abcd").unwrap();
        chunks.next();

        let copy = chunks.clone();
        assert_eq!(chunks.count(), 1);
        assert_eq!(copy.len(), 1);
        assert_eq!(codec.loads(), 1);
    }

    #[test]
    fn test_page_chunker_corrupt_document() {
        let codec = BytePageCodec::default();
        let chunker = PageChunker::new(&codec, 2);
        assert!(chunker.chunks(b"corrupt data").is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// ceil(P/B) ranges, each at most B pages, ascending, covering 0..P once
        #[test]
        fn test_page_ranges_cover_all_pages(pages in 0usize..500, bound in 1usize..50) {
            let ranges = page_ranges(pages, bound);
            prop_assert_eq!(ranges.len(), pages.div_ceil(bound));

            let mut expected = 0;
            for range in &ranges {
                prop_assert_eq!(range.start, expected);
                prop_assert!(range.end > range.start);
                prop_assert!(range.len() <= bound);
                expected = range.end;
            }
            prop_assert_eq!(expected, pages);
        }

        /// ceil(L/B) pieces that concatenate back to the input
        #[test]
        fn test_text_chunks_round_trip(text in "\\PC{0,400}", bound in 1usize..60) {
            let chunks = TextChunker::new(bound).chunk(&text);
            let length = text.chars().count();

            prop_assert_eq!(chunks.len(), length.div_ceil(bound));
            prop_assert_eq!(chunks.concat(), text.clone());

            if let Some((last, rest)) = chunks.split_last() {
                for piece in rest {
                    prop_assert_eq!(piece.chars().count(), bound);
                }
                prop_assert!(last.chars().count() <= bound);
                prop_assert!(!last.is_empty());
            }
        }
    }
}

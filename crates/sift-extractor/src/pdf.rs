//! PDF page codec backed by `lopdf`

use lopdf::Document;
use sift_domain::{DecodeError, PagedCodec};
use std::ops::Range;
use tracing::debug;

/// Splits PDF documents into standalone page-range sub-documents
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfCodec;

impl PagedCodec for LopdfCodec {
    type Handle = Document;

    fn load(&self, bytes: &[u8]) -> Result<Self::Handle, DecodeError> {
        Document::load_mem(bytes).map_err(|e| DecodeError(format!("invalid PDF: {}", e)))
    }

    fn page_count(&self, handle: &Self::Handle) -> usize {
        handle.get_pages().len()
    }

    fn extract_page_range(
        &self,
        handle: &Self::Handle,
        pages: Range<usize>,
    ) -> Result<Vec<u8>, DecodeError> {
        let total = self.page_count(handle);
        if pages.start >= pages.end || pages.end > total {
            return Err(DecodeError(format!(
                "page range {}..{} outside document of {} pages",
                pages.start, pages.end, total
            )));
        }

        // lopdf numbers pages from 1
        let keep = (pages.start as u32 + 1)..=(pages.end as u32);
        let drop: Vec<u32> = handle
            .get_pages()
            .keys()
            .copied()
            .filter(|n| !keep.contains(n))
            .collect();

        let mut sub = handle.clone();
        sub.delete_pages(&drop);
        sub.prune_objects();

        let mut buf = Vec::new();
        sub.save_to(&mut buf)
            .map_err(|e| DecodeError(format!("failed to encode pages {:?}: {}", pages, e)))?;

        debug!(
            "Encoded pages {}..{} of {} ({} bytes)",
            pages.start,
            pages.end,
            total,
            buf.len()
        );
        Ok(buf)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{make_test_pdf, page_contents};
    use super::*;
    use crate::chunking::PageChunker;

    #[test]
    fn test_load_and_count_pages() {
        let codec = LopdfCodec;
        let handle = codec.load(&make_test_pdf(4)).unwrap();
        assert_eq!(codec.page_count(&handle), 4);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let codec = LopdfCodec;
        assert!(codec.load(b"not a pdf at all").is_err());
    }

    #[test]
    fn test_extract_page_range_is_standalone() {
        let codec = LopdfCodec;
        let handle = codec.load(&make_test_pdf(5)).unwrap();

        let sub = codec.extract_page_range(&handle, 1..3).unwrap();
        let contents = page_contents(&sub);

        assert_eq!(contents.len(), 2);
        assert!(contents[0].contains("(Page 2)"));
        assert!(contents[1].contains("(Page 3)"));
    }

    #[test]
    fn test_extract_page_range_out_of_bounds() {
        let codec = LopdfCodec;
        let handle = codec.load(&make_test_pdf(2)).unwrap();
        assert!(codec.extract_page_range(&handle, 1..4).is_err());
        assert!(codec.extract_page_range(&handle, 1..1).is_err());
    }

    #[test]
    fn test_chunks_cover_document_in_order() {
        let codec = LopdfCodec;
        let chunker = PageChunker::new(&codec, 2);
        let chunks = chunker.chunks(&make_test_pdf(5)).unwrap();
        assert_eq!(chunks.total(), 3);

        let pages: Vec<String> = chunks
            .flat_map(|c| page_contents(&c.unwrap().data))
            .collect();

        assert_eq!(pages.len(), 5);
        for (i, content) in pages.iter().enumerate() {
            assert!(content.contains(&format!("(Page {})", i + 1)));
        }
    }
}

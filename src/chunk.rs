//! Paragraph-boundary text chunker.
//!
//! Splits document body text into retrievable units sized for embedding.
//! Paragraphs (`\n\n`-separated) are the unit of coherence: short ones
//! are treated as noise (headers, page numbers) and dropped, oversized
//! ones are hard-split into fixed-width slices.
//!
//! # Algorithm
//!
//! 1. Split text on `\n\n` paragraph boundaries.
//! 2. Trim each candidate paragraph.
//! 3. Drop candidates shorter than `min_chunk_size`.
//! 4. Emit candidates up to `max_chunk_size` as a single chunk.
//! 5. Hard-split longer candidates into consecutive slices of exactly
//!    `max_chunk_size` characters; the final slice may be shorter and is
//!    emitted even below `min_chunk_size`.
//!
//! Lengths are counted in Unicode scalar values, and slices always fall
//! on character boundaries. The function is pure and never fails: empty
//! input yields an empty sequence.

/// Default lower bound below which a trimmed paragraph is discarded.
pub const DEFAULT_MIN_CHUNK_SIZE: usize = 50;
/// Default upper bound on emitted chunk length, in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 8000;

/// Split `text` into ordered chunks between `min_chunk_size` and
/// `max_chunk_size` characters.
///
/// Emitted chunks preserve the left-to-right order of the source text.
/// The only chunks allowed below `min_chunk_size` are tail slices of a
/// hard-split oversized paragraph. A `max_chunk_size` of zero admits no
/// chunk at all and yields an empty sequence.
pub fn chunk_text(text: &str, min_chunk_size: usize, max_chunk_size: usize) -> Vec<String> {
    if max_chunk_size == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();

    for paragraph in text.split("\n\n") {
        let trimmed = paragraph.trim();
        let char_len = trimmed.chars().count();

        if char_len < min_chunk_size {
            continue;
        }

        if char_len <= max_chunk_size {
            chunks.push(trimmed.to_string());
        } else {
            let mut rest = trimmed;
            while !rest.is_empty() {
                let split_at = rest
                    .char_indices()
                    .nth(max_chunk_size)
                    .map(|(i, _)| i)
                    .unwrap_or(rest.len());
                chunks.push(rest[..split_at].to_string());
                rest = &rest[split_at..];
            }
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_text("", 50, 8000).is_empty());
    }

    #[test]
    fn zero_max_chunk_size_yields_no_chunks() {
        assert!(chunk_text("a paragraph that would otherwise split", 0, 0).is_empty());
        assert!(chunk_text("a paragraph that would otherwise split", 50, 0).is_empty());
    }

    #[test]
    fn whitespace_only_input_yields_no_chunks() {
        assert!(chunk_text("  \n\n \t \n\n  ", 5, 8000).is_empty());
    }

    #[test]
    fn short_paragraphs_are_dropped() {
        let text = "Intro paragraph that is long enough.\n\nShort.\n\nAnother sufficiently long paragraph here.";
        let chunks = chunk_text(text, 20, 8000);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "Intro paragraph that is long enough.");
        assert_eq!(chunks[1], "Another sufficiently long paragraph here.");
    }

    #[test]
    fn oversized_paragraph_splits_into_fixed_slices() {
        let text = "x".repeat(17_000);
        let chunks = chunk_text(&text, 50, 8000);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 8000);
        assert_eq!(chunks[1].chars().count(), 8000);
        assert_eq!(chunks[2].chars().count(), 1000);
    }

    #[test]
    fn tail_slice_below_min_is_still_emitted() {
        let text = "y".repeat(105);
        let chunks = chunk_text(&text, 50, 100);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].chars().count(), 5);
    }

    #[test]
    fn paragraph_order_is_preserved() {
        let text = "first paragraph with enough text\n\nsecond paragraph with enough text\n\nthird paragraph with enough text";
        let chunks = chunk_text(text, 10, 8000);
        let joined = chunks.join("");
        let first = joined.find("first").unwrap();
        let second = joined.find("second").unwrap();
        let third = joined.find("third").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn size_bounds_hold_for_every_chunk() {
        let mut text = String::new();
        text.push_str(&"a".repeat(60));
        text.push_str("\n\n");
        text.push_str(&"b".repeat(250));
        text.push_str("\n\ntiny\n\n");
        text.push_str(&"c".repeat(100));
        let chunks = chunk_text(&text, 50, 100);
        for (i, c) in chunks.iter().enumerate() {
            let len = c.chars().count();
            assert!(len <= 100, "chunk {} exceeds max: {}", i, len);
        }
        // Only split tails may be shorter than min.
        assert!(chunks.iter().filter(|c| c.chars().count() < 50).count() <= 1);
    }

    #[test]
    fn no_separator_is_a_single_candidate() {
        let text = "one paragraph without any separator but long enough to keep";
        let chunks = chunk_text(text, 20, 8000);
        assert_eq!(chunks, vec![text.to_string()]);
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "é".repeat(12);
        let chunks = chunk_text(&text, 1, 5);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 5);
        assert_eq!(chunks[2].chars().count(), 2);
    }

    #[test]
    fn chunking_is_deterministic() {
        let text = "alpha paragraph long enough to keep\n\nbeta paragraph long enough to keep";
        let a = chunk_text(text, 10, 20);
        let b = chunk_text(text, 10, 20);
        assert_eq!(a, b);
    }
}

//! Overlap-aware text chunking
//!
//! Splits article bodies into bounded-size chunks for embedding, breaking at
//! the largest available semantic boundary (paragraph > line > sentence >
//! word > raw character) and carrying a configurable overlap of trailing
//! characters into the next chunk to preserve context continuity.

mod boundaries;

pub use boundaries::*;

use tracing::warn;

/// Split `text` into chunks of at most `max_size` characters with `overlap`
/// characters carried between consecutive chunks.
///
/// Pure and restartable: no state is kept between calls. An overlap that is
/// not smaller than `max_size` is clamped to `max_size - 1` with a logged
/// warning rather than rejected. Empty or whitespace-only input yields an
/// empty vector.
pub fn split(text: &str, max_size: usize, overlap: usize) -> Vec<String> {
    if max_size == 0 || text.trim().is_empty() {
        return Vec::new();
    }

    let overlap = if overlap >= max_size {
        let clamped = max_size - 1;
        warn!(
            "chunk overlap ({}) >= chunk size ({}); clamping overlap to {}",
            overlap, max_size, clamped
        );
        clamped
    } else {
        overlap
    };

    let mut chunks = Vec::new();
    let mut start = 0usize; // byte offset, always on a char boundary

    loop {
        let window_end = advance_chars(text, start, max_size);
        if window_end >= text.len() {
            chunks.push(text[start..].to_string());
            break;
        }

        let window = &text[start..window_end];
        // A boundary is only usable if the chunk it produces is longer than
        // the overlap, otherwise the next chunk could not make progress past
        // the carried prefix.
        let break_rel = match find_best_break(window) {
            Some((pos, _)) if window[..pos].chars().count() > overlap => pos,
            _ => window.len(),
        };

        let end = start + break_rel;
        chunks.push(text[start..end].to_string());

        start = retreat_chars(text, end, overlap);
    }

    chunks
}

/// Byte offset `n` characters forward of `pos` (capped at the end of text).
fn advance_chars(text: &str, pos: usize, n: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

/// Byte offset `n` characters back from `pos`.
fn retreat_chars(text: &str, pos: usize, n: usize) -> usize {
    let mut it = text[..pos].char_indices().rev();
    match it.nth(n.saturating_sub(1)) {
        Some((i, _)) if n > 0 => i,
        _ => pos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rebuild the original text from chunks by dropping each chunk's
    /// carried-overlap prefix.
    fn reconstruct(chunks: &[String], overlap: usize) -> String {
        let mut out = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                out.push_str(chunk);
            } else {
                let skip = chunk
                    .char_indices()
                    .nth(overlap)
                    .map(|(b, _)| b)
                    .unwrap_or(chunk.len());
                out.push_str(&chunk[skip..]);
            }
        }
        out
    }

    #[test]
    fn test_empty_input() {
        assert!(split("", 100, 20).is_empty());
        assert!(split("   \n\t  ", 100, 20).is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split("A short headline.", 1000, 200);
        assert_eq!(chunks, vec!["A short headline.".to_string()]);
    }

    #[test]
    fn test_overlap_clamped_never_panics() {
        let text = "word ".repeat(100);
        for overlap in [10, 50, 50, 51, 500] {
            let chunks = split(&text, 50, overlap);
            assert!(!chunks.is_empty());
        }
    }

    #[test]
    fn test_max_size_respected() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(40);
        let chunks = split(&text, 120, 20);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 120);
        }
    }

    #[test]
    fn test_round_trip() {
        let text = "First paragraph with a couple of sentences. Here is another one.\n\n\
                    Second paragraph follows after a blank line and keeps going for a while. \
                    It has more than one sentence too.\n\
                    A trailing line without terminal punctuation"
            .repeat(5);
        let overlap = 15;
        let chunks = split(&text, 80, overlap);
        assert!(chunks.len() > 1);
        assert_eq!(reconstruct(&chunks, overlap), text);
    }

    #[test]
    fn test_round_trip_multibyte() {
        let text = "삼성전자 주가가 오늘 크게 올랐다. 반도체 수요 회복 기대감 때문이다.\n\n\
                    외국인 투자자들의 순매수가 이어지고 있다. 증권가는 목표가를 상향했다. "
            .repeat(10);
        let overlap = 10;
        let chunks = split(&text, 60, overlap);
        assert!(chunks.len() > 1);
        assert_eq!(reconstruct(&chunks, overlap), text);
    }

    #[test]
    fn test_prefers_paragraph_boundary() {
        let text = format!("{}\n\n{}", "alpha beta gamma delta.", "x".repeat(200));
        let chunks = split(&text, 100, 10);
        assert!(chunks[0].ends_with("\n\n"));
    }

    #[test]
    fn test_overlap_carried_between_chunks() {
        let text = "one two three four five six seven eight nine ten ".repeat(20);
        let overlap = 12;
        let chunks = split(&text, 60, overlap);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let tail: String = {
                let prev: Vec<char> = pair[0].chars().collect();
                prev[prev.len() - overlap..].iter().collect()
            };
            assert!(pair[1].starts_with(&tail));
        }
    }

    #[test]
    fn test_solid_text_raw_character_split() {
        let text = "x".repeat(250);
        let chunks = split(&text, 100, 0);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 100);
        assert_eq!(chunks[2].len(), 50);
    }
}

//! Break point detection for chunking

/// Priority levels for break points
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BreakPriority {
    /// Word boundary (lowest)
    Word = 1,
    /// Sentence-terminal period
    Sentence = 2,
    /// Single newline
    Line = 3,
    /// Blank line between paragraphs (highest)
    Paragraph = 4,
}

/// Find the best position to end a chunk inside `window`.
///
/// `window` is the candidate chunk text; the returned byte offset is where
/// the chunk should end, chosen at the largest available semantic boundary.
/// Separators stay with the preceding chunk. Returns `None` when the window
/// contains no boundary at all (caller falls back to a raw character split).
pub fn find_best_break(window: &str) -> Option<(usize, BreakPriority)> {
    if let Some(i) = window.rfind("\n\n") {
        return Some((i + 2, BreakPriority::Paragraph));
    }
    if let Some(i) = window.rfind('\n') {
        return Some((i + 1, BreakPriority::Line));
    }
    if let Some(i) = window.rfind(". ") {
        return Some((i + 2, BreakPriority::Sentence));
    }
    if let Some(i) = window.rfind(' ') {
        return Some((i + 1, BreakPriority::Word));
    }
    None
}

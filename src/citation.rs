use serde::Serialize;

use crate::search::SearchResult;

/// Maximum number of passage characters kept in a citation preview.
pub const DEFAULT_PREVIEW_CHARS: usize = 150;

/// Marker appended to every preview.
pub const ELLIPSIS: &str = "...";

/// Attribution for one search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub filename: String,
    pub passage_index: usize,
    pub text: String,
}

impl Citation {
    pub fn from_result(result: &SearchResult) -> Self {
        Self {
            filename: result.document.filename.clone(),
            passage_index: result.passage_index,
            text: preview(&result.passage, DEFAULT_PREVIEW_CHARS),
        }
    }
}

/// Build one citation per result, in result order.
pub fn citations(results: &[SearchResult]) -> Vec<Citation> {
    results.iter().map(Citation::from_result).collect()
}

/// First `max_chars` characters of `text` followed by [`ELLIPSIS`].
///
/// The cut always lands on a character boundary.
pub fn preview(text: &str, max_chars: usize) -> String {
    let end = text
        .char_indices()
        .nth(max_chars)
        .map_or(text.len(), |(idx, _)| idx);
    format!("{}{ELLIPSIS}", &text[..end])
}

//! Passage segmentation.
//!
//! A document is split on blank lines into paragraph-sized blocks. Blocks
//! longer than [`DEFAULT_LONG_PASSAGE_CHARS`] are split again on single
//! newlines so one oversized block cannot skew BM25 length normalization.
//!
//! # Examples
//!
//! ```
//! use helpdesk::segment::{segment_passages, DEFAULT_LONG_PASSAGE_CHARS};
//!
//! let passages = segment_passages(
//!     "# Pricing Plans\n\n## Free Tier\n- Cost: $0/month\n",
//!     DEFAULT_LONG_PASSAGE_CHARS,
//! );
//! assert_eq!(passages, vec!["# Pricing Plans", "## Free Tier\n- Cost: $0/month"]);
//! ```

/// Blocks with more characters than this are split on single newlines.
pub const DEFAULT_LONG_PASSAGE_CHARS: usize = 300;

/// Split `content` into ordered, trimmed, non-empty passages.
///
/// A blank line is a line containing only whitespace. Lengths are counted in
/// characters, not bytes. Every passage is a substring of `content`, so line
/// endings inside a block are left as they are.
pub fn segment_passages(content: &str, long_passage_chars: usize) -> Vec<String> {
    let mut passages = Vec::new();

    for block in split_blocks(content) {
        if block.chars().count() > long_passage_chars {
            passages.extend(
                block
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string),
            );
        } else {
            passages.push(block.to_string());
        }
    }

    passages
}

/// Trimmed slices of `content` between whitespace-only lines.
fn split_blocks(content: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut start = 0;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        if line.trim().is_empty() {
            push_block(&content[start..offset], &mut blocks);
            start = offset + line.len();
        }
        offset += line.len();
    }
    push_block(&content[start..], &mut blocks);

    blocks
}

fn push_block<'a>(block: &'a str, blocks: &mut Vec<&'a str>) {
    let trimmed = block.trim();
    if !trimmed.is_empty() {
        blocks.push(trimmed);
    }
}

use calamine::Data;
use serde::Serialize;

use super::cell_to_value;

/// Field names that mark a row as the real header. Both raw and
/// already-normalized spellings appear because some entities export
/// pre-processed files.
pub const HEADER_KEYWORDS: &[&str] = &[
    "pr number",
    "pr_number",
    "po number",
    "net amount",
    "vendor",
    "pr date",
    "po date",
    "item code",
];

/// How many leading rows to inspect before giving up.
pub const PEEK_ROWS: usize = 10;

/// Row assumed when detection fails: one title row above the header.
pub const FALLBACK_HEADER_ROW: usize = 1;

const MIN_KEYWORD_HITS: usize = 2;

/// Outcome of header detection, carried as a per-file diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderScan {
    pub row: usize,
    pub keyword_hits: usize,
    pub fell_back: bool,
}

/// Locate the header row within the first [`PEEK_ROWS`] rows of a grid.
///
/// Each candidate row's non-empty cells are lower-cased and joined into one
/// string; the first row in which at least two known keywords occur as
/// substrings wins. When no row scores, the fixed fallback row is returned.
/// This is a heuristic with no ground truth; a wrong guess produces a
/// malformed table downstream, never an error. `keyword_hits` and
/// `fell_back` are the only confidence signal callers get.
pub fn locate(rows: &[Vec<Data>]) -> HeaderScan {
    for (idx, row) in rows.iter().take(PEEK_ROWS).enumerate() {
        let joined = row
            .iter()
            .filter(|c| !matches!(c, Data::Empty))
            .map(|c| cell_to_value(c).to_string().to_lowercase())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let hits = HEADER_KEYWORDS
            .iter()
            .filter(|kw| joined.contains(**kw))
            .count();
        if hits >= MIN_KEYWORD_HITS {
            return HeaderScan {
                row: idx,
                keyword_hits: hits,
                fell_back: false,
            };
        }
    }
    HeaderScan {
        row: FALLBACK_HEADER_ROW,
        keyword_hits: 0,
        fell_back: true,
    }
}

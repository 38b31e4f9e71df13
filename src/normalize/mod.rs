// src/normalize/mod.rs

use std::collections::HashSet;

/// Canonicalize a raw column label into a snake_case identifier.
///
/// Entity exports disagree on case, spacing and punctuation for the same
/// logical column ("PR Number", "pr_number", "Pr  Number", NBSP variants),
/// so every header cell is pushed through the same pipeline before tables
/// are concatenated:
///
/// 1. trim surrounding whitespace
/// 2. replace non-breaking spaces (U+00A0) with plain spaces
/// 3. replace `\` and `/` with underscores
/// 4. collapse whitespace runs into single underscores
/// 5. lower-case
/// 6. replace anything outside `[a-z0-9_]` with an underscore
/// 7. drop empty underscore-separated segments and rejoin
///
/// The function is total and idempotent; labels made of nothing but
/// symbols or whitespace normalize to the empty string, which callers must
/// tolerate (blank spreadsheet columns produce exactly that).
pub fn canonical_column(raw: &str) -> String {
    let s = raw.trim().replace('\u{a0}', " ").replace(['\\', '/'], "_");
    let s = s.split_whitespace().collect::<Vec<_>>().join("_");
    let s: String = s
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    s.split('_')
        .filter(|seg| !seg.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Disambiguate repeated column names after normalization.
///
/// Distinct raw labels can collapse onto one canonical name (two blank
/// headers both normalize to ""). The first occurrence keeps its name;
/// later ones get an `_2`, `_3`, … suffix, bumping further if the suffixed
/// name is itself already taken. No column is ever dropped.
pub fn dedupe_columns(names: &[String]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        if taken.insert(name.clone()) {
            out.push(name.clone());
            continue;
        }
        let mut k = 2;
        let mut candidate = format!("{}_{}", name, k);
        while !taken.insert(candidate.clone()) {
            k += 1;
            candidate = format!("{}_{}", name, k);
        }
        out.push(candidate);
    }
    out
}

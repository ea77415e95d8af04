//! Verdict extraction and fighter-name substitution.

use std::sync::LazyLock;

use brawl_core::verdict::Verdict;
use regex::{NoExpand, Regex};

use crate::error::OracleError;

static P1_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bp1\b").expect("p1 pattern is valid"));
static P2_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bp2\b").expect("p2 pattern is valid"));

const TRAILING_TOKENS: [(&str, Verdict); 3] = [
    ("p1", Verdict::P1Wins),
    ("p2", Verdict::P2Wins),
    ("draw", Verdict::Draw),
];

/// Reads the verdict from the trailing token of a judge response.
///
/// The response must end (case-insensitively, ignoring trailing whitespace
/// and `.`/`!`) with the standalone word `p1`, `p2` or `draw`.
///
/// # Errors
///
/// Returns `OracleError::InvalidResponse` carrying the full raw text when no
/// such token ends the response.
pub fn parse_verdict(raw: &str) -> Result<Verdict, OracleError> {
    let tail = raw.trim_end().trim_end_matches(['.', '!']).trim_end();
    let lower = tail.to_ascii_lowercase();

    for (token, verdict) in TRAILING_TOKENS {
        if let Some(head) = lower.strip_suffix(token) {
            if head.chars().next_back().is_none_or(|c| !c.is_alphanumeric()) {
                return Ok(verdict);
            }
        }
    }

    Err(OracleError::InvalidResponse {
        raw: raw.to_owned(),
    })
}

/// Replaces standalone `p1`/`p2` mentions with the fighters' names.
#[must_use]
pub fn substitute_names(raw: &str, p1_name: &str, p2_name: &str) -> String {
    let named = P1_TOKEN.replace_all(raw, NoExpand(p1_name));
    P2_TOKEN.replace_all(&named, NoExpand(p2_name)).into_owned()
}

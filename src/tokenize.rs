// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Candidate sub-topic extraction.
//!
//! A token is a maximal run of Unicode letters, ASCII digits, and apostrophes. Everything
//! else (whitespace, hyphens, punctuation, symbols) separates tokens.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

const TOKEN_PATTERN: &str = r"[\p{L}0-9']+";

fn token_regex() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("hard-coded token pattern is valid"))
}

/// Returns the distinct tokens of `text` in ascending code-point order.
///
/// Case is preserved, so `Rule` and `rule` are different tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    token_set(text).into_iter().collect()
}

/// Same as [`tokenize`] but keeps the set form for membership checks.
pub fn token_set(text: &str) -> BTreeSet<String> {
    token_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_owned())
        .collect()
}

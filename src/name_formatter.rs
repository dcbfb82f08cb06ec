//! Turns a variable name into a loose, case-insensitive path-matching pattern.
//!
//! `mockUser` becomes `mock(es|s)?.?user`, which matches `mock_user`,
//! `mocks/user`, `mockuser`, and `mockUser` alike. The `(es|s)?` is
//! intentionally permissive (it can over-match plural folder names); see
//! the Open Questions in the spec.

use regex::{Regex, RegexBuilder};

/// Regex fragment substituted at every detected word boundary: an optional
/// plural suffix followed by any single character (the path separator, a
/// case change, or nothing at all).
const BOUNDARY: &str = "(es|s)?.?";

/// Build the lowercase path-matching pattern for `name`.
///
/// Boundaries are inserted before an uppercase letter that follows a
/// lowercase letter or digit, and in place of every `-` or `_`.
pub fn formatted_to_regex(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 8);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == '_' {
            out.push_str(BOUNDARY);
            continue;
        }

        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            if prev.is_lowercase() || prev.is_ascii_digit() {
                out.push_str(BOUNDARY);
            }
        }

        out.extend(c.to_lowercase());
    }

    out
}

/// Compile `formatted_to_regex(name)` into a case-insensitive [`Regex`].
///
/// Returns `Err` only if the resulting pattern is somehow invalid regex
/// (shouldn't happen for identifier input, since boundary expansion and
/// lowercasing never introduce unbalanced regex metacharacters).
pub fn formatted_regex(name: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&formatted_to_regex(name))
        .case_insensitive(true)
        .build()
}

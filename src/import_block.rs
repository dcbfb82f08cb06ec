//! Locates and parses the import prologue of a buffer, and rewrites it in
//! canonical, deduplicated, blank-line-terminated form.

use regex::Regex;
use std::sync::OnceLock;

use crate::import_statement::ImportStatement;

/// The parsed prologue of a buffer.
#[derive(Debug, Clone)]
pub struct ImportBlock {
    /// One statement per unique `path`, in discovery order.
    pub imports: Vec<ImportStatement>,
    /// Zero-based line index where the block begins.
    pub imports_start_at: usize,
    /// Total line count consumed by the existing imports (not counting any
    /// blank line after them).
    pub newline_count: usize,
}

fn semicolon_terminated_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `(?s)` so `.` crosses line boundaries; non-greedy so each match is the
    // shortest text ending in `;` starting at the scan cursor.
    RE.get_or_init(|| Regex::new(r"(?s)^.*?;").unwrap())
}

fn use_strict_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^\s*(['"])use strict\1;?\s*$"#).unwrap())
}

fn single_line_comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*//.*$").unwrap())
}

fn multiline_comment_open_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*/\*").unwrap())
}

fn is_whitespace_only(line: &str) -> bool {
    line.trim().is_empty()
}

/// Find the zero-based line index the import prologue starts at.
///
/// Scans from line 0: `"use strict";`, single-line comments, multi-line
/// comments (consuming every line until one containing `*/`), and
/// whitespace-only lines are all skippable. The block starts right after the
/// last *non-whitespace* skippable line matched; a whitespace-only prefix
/// with no other skippable line does not itself offset the start.
pub fn find_imports_start(lines: &[&str]) -> usize {
    let mut i = 0usize;
    let mut saw_real_skip = false;

    while i < lines.len() {
        let line = lines[i];

        if is_whitespace_only(line) {
            i += 1;
            continue;
        }

        if use_strict_regex().is_match(line) || single_line_comment_regex().is_match(line) {
            saw_real_skip = true;
            i += 1;
            continue;
        }

        if multiline_comment_open_regex().is_match(line) {
            saw_real_skip = true;
            let mut j = i;
            while j < lines.len() && !lines[j].contains("*/") {
                j += 1;
            }
            i = j + 1;
            continue;
        }

        break;
    }

    // A whitespace-only prefix with no actual directive/comment skipped is
    // not itself a reason to offset the block start.
    if saw_real_skip { i } else { 0 }
}

/// Parse the import prologue of `lines` starting at `find_imports_start`.
///
/// Gathers consecutive non-blank lines from the start into one buffer,
/// joined with `\n`, then repeatedly matches `^.*?;` to carve out candidate
/// statements. Each candidate is handed to `ImportStatement::parse`; the
/// first candidate that fails to parse stops the scan (so trailing non-import
/// code is never consumed).
pub fn parse(lines: &[&str]) -> ImportBlock {
    let imports_start_at = find_imports_start(lines);

    let mut end = imports_start_at;
    while end < lines.len() && !is_whitespace_only(lines[end]) {
        end += 1;
    }

    let prologue_lines = &lines[imports_start_at..end];
    let joined = prologue_lines.join("\n");

    let mut imports: Vec<ImportStatement> = Vec::new();
    let mut newline_count = 0usize;
    let mut cursor = 0usize;
    let re = semicolon_terminated_regex();

    while cursor < joined.len() {
        let remainder = &joined[cursor..];
        let Some(m) = re.find(remainder) else {
            break;
        };
        let candidate = m.as_str();

        let Some(parsed) = ImportStatement::parse(candidate) else {
            break;
        };

        let consumed_newlines = 1 + candidate.matches('\n').count();
        if let Some(existing) = imports.iter_mut().find(|s: &&mut ImportStatement| s.path == parsed.path) {
            existing.merge(&parsed);
        } else {
            imports.push(parsed);
        }
        newline_count += consumed_newlines;
        cursor += m.end();
    }

    ImportBlock {
        imports,
        imports_start_at,
        newline_count,
    }
}

/// Deduplicate `imports` by normalized form, keeping the first occurrence.
pub fn dedupe_statements(imports: &mut Vec<ImportStatement>) {
    let mut seen = std::collections::HashSet::new();
    imports.retain(|s| seen.insert(s.normalized_key()));
}

/// Render the canonical, sorted prologue text for `imports` (empty
/// statements dropped), as a flat list of physical lines.
pub fn render_block(imports: &[ImportStatement], max_line_length: usize, tab: &str) -> Vec<String> {
    let mut rendered: Vec<String> = imports
        .iter()
        .filter(|s| !s.is_empty())
        .flat_map(|s| s.to_import_strings(max_line_length, tab))
        .collect();
    rendered.sort();

    rendered
        .iter()
        .flat_map(|block| block.split('\n').map(str::to_owned))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines_of(s: &str) -> Vec<&str> {
        s.split('\n').collect()
    }

    #[test]
    fn start_at_zero_with_no_prologue() {
        let buf = "import a from 'a';\n\nrest";
        assert_eq!(find_imports_start(&lines_of(buf)), 0);
    }

    #[test]
    fn start_after_use_strict_and_comments() {
        // S6 from the spec.
        let buf = "'use strict';\n// c\n/* multi\n   line */\n\nimport a from 'a';\n\nrest";
        assert_eq!(find_imports_start(&lines_of(buf)), 5);
    }

    #[test]
    fn whitespace_only_prefix_does_not_offset_start() {
        let buf = "\n\nimport a from 'a';\n\nrest";
        assert_eq!(find_imports_start(&lines_of(buf)), 0);
    }

    #[test]
    fn parse_merges_same_path_statements() {
        let buf = "import { foo } from 'p';\nimport { bar } from 'p';\n\ncode();";
        let block = parse(&lines_of(buf));
        assert_eq!(block.imports.len(), 1);
        assert_eq!(
            block.imports[0].named_imports,
            Some(vec!["bar".to_owned(), "foo".to_owned()])
        );
    }

    #[test]
    fn parse_stops_at_first_unparseable_line() {
        let buf = "import a from 'a';\nconsole.log(a);\nimport b from 'b';";
        let block = parse(&lines_of(buf));
        assert_eq!(block.imports.len(), 1);
        assert_eq!(block.imports[0].path, "a");
    }

    #[test]
    fn imports_start_at_and_newline_count_are_consistent() {
        let buf = "import a from 'a';\nimport b from 'b';\n\nrest";
        let block = parse(&lines_of(buf));
        assert_eq!(block.imports_start_at, 0);
        assert_eq!(block.newline_count, 2);
    }

    #[test]
    fn render_block_sorts_and_drops_empty() {
        let mut a = ImportStatement::new("b");
        a.set_default_import("B");
        let empty = ImportStatement::new("z");
        let mut c = ImportStatement::new("a");
        c.set_default_import("A");
        let rendered = render_block(&[a, empty, c], 80, "  ");
        assert_eq!(
            rendered,
            vec![
                "import A from 'a';".to_owned(),
                "import B from 'b';".to_owned(),
            ]
        );
    }

    #[test]
    fn dedupe_statements_keeps_first_occurrence() {
        let mut a = ImportStatement::new("p");
        a.set_default_import("X");
        let mut b = ImportStatement::new("p");
        b.set_default_import("X");
        let mut imports = vec![a, b];
        dedupe_statements(&mut imports);
        assert_eq!(imports.len(), 1);
    }
}

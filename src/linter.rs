//! Invokes the configured linter on the current buffer and classifies its
//! output into unused/undefined variable sets (§4.5).

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ImportJsError;

/// The two deduplicated, first-seen-order name sets `fix_imports` consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub unused: Vec<String>,
    pub undefined: Vec<String>,
}

fn parse_error_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        vec![
            Regex::new(r"Parsing error:").unwrap(),
            Regex::new(r"Unrecoverable syntax error").unwrap(),
            Regex::new(r".*:0:0: Cannot find module '.*'").unwrap(),
        ]
    })
}

fn invocation_error_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        vec![
            Regex::new(r"SyntaxError:").unwrap(),
            Regex::new(r"eslint: command not found").unwrap(),
            Regex::new(r"Cannot read config package:").unwrap(),
            Regex::new(r"Cannot find module '.*'").unwrap(),
            Regex::new(r"No such file or directory").unwrap(),
        ]
    })
}

fn diagnostic_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"'(?P<name>[^']+)' (?P<msg>is defined but never used|is not defined|must be in scope when using JSX)"#,
        )
        .unwrap()
    })
}

/// Run `eslint_executable` over `buffer_content`, classify its output, and
/// return the deduplicated unused/undefined name sets.
///
/// Error classification (§4.5) happens before any line-level parsing: a
/// fatal pattern in stdout is a `Parse` error, a fatal pattern in stderr is a
/// `Find` error.
pub fn read_diagnostics(
    eslint_executable: &str,
    path: &Path,
    buffer_content: &str,
    verbose: bool,
) -> Result<Diagnostics, ImportJsError> {
    if verbose {
        eprintln!(
            "ImportJS: running `{eslint_executable} --stdin --stdin-filename {} --format unix \
             --rule 'no-undef: 2' --rule 'no-unused-vars: [...]'`",
            path.display()
        );
    }

    let mut child = Command::new(eslint_executable)
        .arg("--stdin")
        .arg("--stdin-filename")
        .arg(path)
        .arg("--format")
        .arg("unix")
        .arg("--rule")
        .arg("no-undef: 2")
        .arg("--rule")
        .arg(r#"no-unused-vars: [2, { "vars": "all", "args": "none" }]"#)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| ImportJsError::Find(format!("failed to spawn `{eslint_executable}`: {err}")))?;

    if let Some(stdin) = child.stdin.as_mut() {
        let _ = stdin.write_all(buffer_content.as_bytes());
    }

    let output = child
        .wait_with_output()
        .map_err(|err| ImportJsError::Find(format!("failed to run `{eslint_executable}`: {err}")))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if parse_error_patterns().iter().any(|re| re.is_match(&stdout)) {
        return Err(ImportJsError::Parse(stdout.into_owned()));
    }
    if invocation_error_patterns().iter().any(|re| re.is_match(&stderr)) {
        return Err(ImportJsError::Find(stderr.into_owned()));
    }

    Ok(classify(&stdout))
}

fn classify(stdout: &str) -> Diagnostics {
    let mut diagnostics = Diagnostics::default();
    let re = diagnostic_line_regex();

    for line in stdout.lines() {
        let Some(caps) = re.captures(line) else {
            continue;
        };
        let name = caps["name"].to_owned();

        if &caps["msg"] == "is defined but never used" {
            if !diagnostics.unused.contains(&name) {
                diagnostics.unused.push(name);
            }
        } else if !diagnostics.undefined.contains(&name) {
            diagnostics.undefined.push(name);
        }
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_splits_unused_and_undefined() {
        let stdout = "\
/app/foo.js:1:10: 'foo' is defined but never used [no-unused-vars]
/app/foo.js:2:5: 'bar' is not defined [no-undef]
/app/foo.js:3:1: 'Baz' must be in scope when using JSX [no-undef]";
        let diagnostics = classify(stdout);
        assert_eq!(diagnostics.unused, vec!["foo".to_owned()]);
        assert_eq!(diagnostics.undefined, vec!["bar".to_owned(), "Baz".to_owned()]);
    }

    #[test]
    fn classify_dedupes_preserving_first_seen_order() {
        let stdout = "\
a.js:1:1: 'x' is not defined [no-undef]
a.js:2:1: 'y' is not defined [no-undef]
a.js:3:1: 'x' is not defined [no-undef]";
        let diagnostics = classify(stdout);
        assert_eq!(diagnostics.undefined, vec!["x".to_owned(), "y".to_owned()]);
    }

    #[test]
    fn classify_ignores_unrelated_lines() {
        let stdout = "1 problem (1 error, 0 warnings)";
        let diagnostics = classify(stdout);
        assert!(diagnostics.unused.is_empty());
        assert!(diagnostics.undefined.is_empty());
    }

    #[test]
    fn parse_error_pattern_matches_parsing_error() {
        assert!(parse_error_patterns().iter().any(|re| re.is_match("Parsing error: Unexpected token")));
    }

    #[test]
    fn invocation_error_pattern_matches_missing_binary() {
        assert!(invocation_error_patterns().iter().any(|re| re.is_match("eslint: command not found")));
    }
}

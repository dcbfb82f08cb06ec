//! A structured representation of one import declaration: parsing, mutation,
//! and canonical re-rendering with line-wrapping discipline.
//!
//! Only the two syntactic families documented in the spec are recognized —
//! this is a deliberately narrow, regex-driven parser, not a JavaScript
//! parser. The safety net against consuming non-import code lives one layer
//! up, in `import_block`: the block scanner stops at the first line this
//! module fails to parse.

use std::sync::OnceLock;

use regex::Regex;

/// The syntactic family a statement renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKeyword {
    Import,
    Const,
    Var,
    Let,
}

impl DeclarationKeyword {
    fn as_str(self) -> &'static str {
        match self {
            DeclarationKeyword::Import => "import",
            DeclarationKeyword::Const => "const",
            DeclarationKeyword::Var => "var",
            DeclarationKeyword::Let => "let",
        }
    }

    fn from_keyword_str(s: &str) -> Option<Self> {
        match s {
            "const" => Some(DeclarationKeyword::Const),
            "var" => Some(DeclarationKeyword::Var),
            "let" => Some(DeclarationKeyword::Let),
            _ => None,
        }
    }

    /// Parse a `declaration_keyword` config value, defaulting to `Import`
    /// for anything other than `const`/`var`/`let` (i.e. for `"import"`).
    pub fn from_config_str(s: &str) -> Self {
        Self::from_keyword_str(s).unwrap_or(DeclarationKeyword::Import)
    }
}

impl Default for DeclarationKeyword {
    fn default() -> Self {
        DeclarationKeyword::Import
    }
}

/// One import declaration, structured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub path: String,
    pub default_import: Option<String>,
    pub named_imports: Option<Vec<String>>,
    pub declaration_keyword: DeclarationKeyword,
    pub import_function: String,
    pub original_source: Option<String>,
}

impl ImportStatement {
    /// Construct a bare statement with no bindings yet, ready for injection.
    pub fn new(path: impl Into<String>) -> Self {
        ImportStatement {
            path: path.into(),
            default_import: None,
            named_imports: None,
            declaration_keyword: DeclarationKeyword::Import,
            import_function: "require".to_owned(),
            original_source: None,
        }
    }

    /// True iff this statement would render no binding at all.
    pub fn is_empty(&self) -> bool {
        self.default_import.is_none() && !self.has_named_imports()
    }

    /// True iff `named_imports` has at least one entry.
    pub fn has_named_imports(&self) -> bool {
        self.named_imports.as_ref().is_some_and(|v| !v.is_empty())
    }

    /// Insert `name` into `named_imports`, keeping the set sorted and deduped.
    /// No-op if already present. Clears `original_source`.
    pub fn inject_named_import(&mut self, name: &str) {
        let list = self.named_imports.get_or_insert_with(Vec::new);
        if list.iter().any(|n| n == name) {
            return;
        }
        list.push(name.to_owned());
        list.sort();
        self.original_source = None;
    }

    /// Replace `default_import`. No-op if already equal. Clears `original_source`.
    pub fn set_default_import(&mut self, name: &str) {
        if self.default_import.as_deref() == Some(name) {
            return;
        }
        self.default_import = Some(name.to_owned());
        self.original_source = None;
    }

    /// Remove `name` from whichever slot holds it. Clears `original_source`
    /// only if a removal actually happened.
    pub fn delete_variable(&mut self, name: &str) {
        if self.default_import.as_deref() == Some(name) {
            self.default_import = None;
            self.original_source = None;
            return;
        }
        if let Some(list) = &mut self.named_imports
            && let Some(pos) = list.iter().position(|n| n == name)
        {
            list.remove(pos);
            self.original_source = None;
        }
    }

    /// Overwrite `default_import` with `other`'s if present; union the named
    /// import sets. Clears `original_source`.
    pub fn merge(&mut self, other: &ImportStatement) {
        if let Some(default) = &other.default_import {
            self.default_import = Some(default.clone());
        }
        if let Some(other_named) = &other.named_imports {
            let list = self.named_imports.get_or_insert_with(Vec::new);
            for name in other_named {
                if !list.iter().any(|n| n == name) {
                    list.push(name.clone());
                }
            }
            list.sort();
        }
        self.original_source = None;
    }

    /// The normalized identity used for post-injection deduplication: same
    /// path, default import, sorted named imports, keyword, and function.
    pub fn normalized_key(&self) -> (String, Option<String>, Vec<String>, &'static str, String) {
        let mut named = self.named_imports.clone().unwrap_or_default();
        named.sort();
        (
            self.path.clone(),
            self.default_import.clone(),
            named,
            self.declaration_keyword.as_str(),
            self.import_function.clone(),
        )
    }

    /// Parse the literal text of one candidate statement (up to and
    /// including its terminating `;`). Returns `None` on no match.
    pub fn parse(text: &str) -> Option<ImportStatement> {
        for pattern in patterns() {
            if let Some(caps) = pattern.regex.captures(text) {
                return Some(pattern.build(&caps, text));
            }
        }
        None
    }

    /// Render this statement as one or two lines, wrapping any line that
    /// would exceed `max_line_length`.
    pub fn to_import_strings(&self, max_line_length: usize, tab: &str) -> Vec<String> {
        match self.declaration_keyword {
            DeclarationKeyword::Import => self.render_import_family(max_line_length, tab),
            _ => self.render_call_family(max_line_length, tab),
        }
    }

    fn render_import_family(&self, max_line_length: usize, tab: &str) -> Vec<String> {
        let single_line = self.render_import_single_line();
        if single_line.len() <= max_line_length {
            return vec![single_line];
        }

        if self.has_named_imports() {
            vec![self.wrap_named(tab, "import", None)]
        } else if let Some(default) = &self.default_import {
            vec![format!(
                "import {} from\n{}'{}';",
                default, tab, self.path
            )]
        } else {
            vec![single_line]
        }
    }

    fn render_import_single_line(&self) -> String {
        match (&self.default_import, self.has_named_imports()) {
            (Some(default), true) => format!(
                "import {}, {{ {} }} from '{}';",
                default,
                self.named_imports.as_ref().unwrap().join(", "),
                self.path
            ),
            (Some(default), false) => format!("import {} from '{}';", default, self.path),
            (None, true) => format!(
                "import {{ {} }} from '{}';",
                self.named_imports.as_ref().unwrap().join(", "),
                self.path
            ),
            (None, false) => format!("import '{}';", self.path),
        }
    }

    fn render_call_family(&self, max_line_length: usize, tab: &str) -> Vec<String> {
        match (&self.default_import, self.has_named_imports()) {
            (Some(default), true) => {
                let default_line = self.render_call_single(Some(default), false);
                let named_line = self.render_call_single(None, true);
                vec![
                    self.wrap_call_line(default_line, max_line_length, tab, Some(default), false),
                    self.wrap_call_line(named_line, max_line_length, tab, None, true),
                ]
            }
            (Some(default), false) => {
                let line = self.render_call_single(Some(default), false);
                vec![self.wrap_call_line(line, max_line_length, tab, Some(default), false)]
            }
            (None, true) => {
                let line = self.render_call_single(None, true);
                vec![self.wrap_call_line(line, max_line_length, tab, None, true)]
            }
            (None, false) => vec![format!("{}('{}');", self.import_function, self.path)],
        }
    }

    fn render_call_single(&self, default: Option<&str>, named: bool) -> String {
        let keyword = self.declaration_keyword.as_str();
        if named {
            format!(
                "{} {{ {} }} = {}('{}');",
                keyword,
                self.named_imports.as_ref().unwrap().join(", "),
                self.import_function,
                self.path
            )
        } else {
            format!(
                "{} {} = {}('{}');",
                keyword,
                default.unwrap(),
                self.import_function,
                self.path
            )
        }
    }

    fn wrap_call_line(
        &self,
        single_line: String,
        max_line_length: usize,
        tab: &str,
        default: Option<&str>,
        named: bool,
    ) -> String {
        if single_line.len() <= max_line_length {
            return single_line;
        }
        let keyword = self.declaration_keyword.as_str();
        if named {
            self.wrap_named(tab, keyword, Some(self.import_function.as_str()))
        } else {
            format!(
                "{} {} =\n{}{}('{}');",
                keyword,
                default.unwrap(),
                tab,
                self.import_function,
                self.path
            )
        }
    }

    /// Expand the brace block, one identifier per line, trailing comma on
    /// every entry. `callee` is `Some(fn_name)` for call-family rendering,
    /// `None` for `import` family.
    fn wrap_named(&self, tab: &str, keyword: &str, callee: Option<&str>) -> String {
        let names = self.named_imports.as_ref().unwrap();
        let body: String = names
            .iter()
            .map(|n| format!("{}{},\n", tab, n))
            .collect();

        match (keyword, &self.default_import, callee) {
            ("import", Some(default), None) => {
                format!("import {}, {{\n{}}} from '{}';", default, body, self.path)
            }
            ("import", None, None) => {
                format!("import {{\n{}}} from '{}';", body, self.path)
            }
            (_, _, Some(fn_name)) => {
                format!("{} {{\n{}}} = {}('{}');", keyword, body, fn_name, self.path)
            }
            _ => unreachable!("call-family wrap_named always carries a callee"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

const IDENT: &str = r"[A-Za-z_$][A-Za-zA-Z0-9_$]*";

enum PatternKind {
    EsNamed,
    EsDefault,
    CallNamed,
    CallDefault,
}

struct CompiledPattern {
    regex: Regex,
    kind: PatternKind,
}

impl CompiledPattern {
    fn build(&self, caps: &regex::Captures, text: &str) -> ImportStatement {
        let path = caps.name("path").unwrap().as_str().to_owned();
        match self.kind {
            PatternKind::EsNamed => ImportStatement {
                path,
                default_import: caps.name("default").map(|m| m.as_str().to_owned()),
                named_imports: Some(split_named(caps.name("named").unwrap().as_str())),
                declaration_keyword: DeclarationKeyword::Import,
                import_function: "import".to_owned(),
                original_source: Some(text.to_owned()),
            },
            PatternKind::EsDefault => ImportStatement {
                path,
                default_import: Some(caps.name("default").unwrap().as_str().to_owned()),
                named_imports: None,
                declaration_keyword: DeclarationKeyword::Import,
                import_function: "import".to_owned(),
                original_source: Some(text.to_owned()),
            },
            PatternKind::CallNamed => ImportStatement {
                path,
                default_import: None,
                named_imports: Some(split_named(caps.name("named").unwrap().as_str())),
                declaration_keyword: DeclarationKeyword::from_keyword_str(
                    caps.name("kw").unwrap().as_str(),
                )
                .unwrap(),
                import_function: caps.name("callee").unwrap().as_str().to_owned(),
                original_source: Some(text.to_owned()),
            },
            PatternKind::CallDefault => ImportStatement {
                path,
                default_import: Some(caps.name("default").unwrap().as_str().to_owned()),
                named_imports: None,
                declaration_keyword: DeclarationKeyword::from_keyword_str(
                    caps.name("kw").unwrap().as_str(),
                )
                .unwrap(),
                import_function: caps.name("callee").unwrap().as_str().to_owned(),
                original_source: Some(text.to_owned()),
            },
        }
    }
}

fn split_named(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect();
    names.sort();
    names.dedup();
    names
}

static PATTERNS: OnceLock<Vec<CompiledPattern>> = OnceLock::new();

fn patterns() -> &'static [CompiledPattern] {
    PATTERNS.get_or_init(|| {
        let mut out = Vec::new();
        for quote in ['\'', '"'] {
            out.push(CompiledPattern {
                regex: Regex::new(&format!(
                    r"^\s*import\s+(?:(?P<default>{ident})\s*,\s*)?\{{\s*(?P<named>[^}}]*)\}}\s*from\s*{q}(?P<path>[^{q}]*){q}\s*;?\s*$",
                    ident = IDENT,
                    q = regex::escape(&quote.to_string()),
                ))
                .expect("valid ES named import regex"),
                kind: PatternKind::EsNamed,
            });
            out.push(CompiledPattern {
                regex: Regex::new(&format!(
                    r"^\s*import\s+(?P<default>{ident})\s*from\s*{q}(?P<path>[^{q}]*){q}\s*;?\s*$",
                    ident = IDENT,
                    q = regex::escape(&quote.to_string()),
                ))
                .expect("valid ES default import regex"),
                kind: PatternKind::EsDefault,
            });
            out.push(CompiledPattern {
                regex: Regex::new(&format!(
                    r"^\s*(?P<kw>const|var|let)\s+\{{\s*(?P<named>[^}}]*)\}}\s*=\s*(?P<callee>{ident})\s*\(\s*{q}(?P<path>[^{q}]*){q}\s*\)\s*;?\s*$",
                    ident = IDENT,
                    q = regex::escape(&quote.to_string()),
                ))
                .expect("valid call-style named import regex"),
                kind: PatternKind::CallNamed,
            });
            out.push(CompiledPattern {
                regex: Regex::new(&format!(
                    r"^\s*(?P<kw>const|var|let)\s+(?P<default>{ident})\s*=\s*(?P<callee>{ident})\s*\(\s*{q}(?P<path>[^{q}]*){q}\s*\)\s*;?\s*$",
                    ident = IDENT,
                    q = regex::escape(&quote.to_string()),
                ))
                .expect("valid call-style default import regex"),
                kind: PatternKind::CallDefault,
            });
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_es_named() {
        let s = ImportStatement::parse("import { foo, bar } from 'path';").unwrap();
        assert_eq!(s.path, "path");
        assert_eq!(s.default_import, None);
        assert_eq!(s.named_imports, Some(vec!["bar".to_owned(), "foo".to_owned()]));
        assert_eq!(s.declaration_keyword, DeclarationKeyword::Import);
    }

    #[test]
    fn parse_es_default() {
        let s = ImportStatement::parse("import Foo from 'path';").unwrap();
        assert_eq!(s.default_import, Some("Foo".to_owned()));
        assert!(s.named_imports.is_none());
    }

    #[test]
    fn parse_es_default_and_named() {
        let s = ImportStatement::parse("import Foo, { bar, baz } from 'path';").unwrap();
        assert_eq!(s.default_import, Some("Foo".to_owned()));
        assert_eq!(s.named_imports, Some(vec!["bar".to_owned(), "baz".to_owned()]));
    }

    #[test]
    fn parse_double_quotes() {
        let s = ImportStatement::parse(r#"import Foo from "path";"#).unwrap();
        assert_eq!(s.path, "path");
    }

    #[test]
    fn mismatched_quotes_do_not_parse() {
        assert!(ImportStatement::parse(r#"import Foo from 'path";"#).is_none());
    }

    #[test]
    fn parse_call_style_default() {
        let s = ImportStatement::parse("const foo = require('path');").unwrap();
        assert_eq!(s.default_import, Some("foo".to_owned()));
        assert_eq!(s.import_function, "require");
        assert_eq!(s.declaration_keyword, DeclarationKeyword::Const);
    }

    #[test]
    fn parse_call_style_named() {
        let s = ImportStatement::parse("const { foo, bar } = require('path');").unwrap();
        assert_eq!(s.named_imports, Some(vec!["bar".to_owned(), "foo".to_owned()]));
    }

    #[test]
    fn parse_call_style_custom_callee() {
        let s = ImportStatement::parse("let x = myRequire('path');").unwrap();
        assert_eq!(s.import_function, "myRequire");
        assert_eq!(s.declaration_keyword, DeclarationKeyword::Let);
    }

    #[test]
    fn trailing_comma_in_named_imports() {
        let s = ImportStatement::parse("import { foo, bar, } from 'path';").unwrap();
        assert_eq!(s.named_imports, Some(vec!["bar".to_owned(), "foo".to_owned()]));
    }

    #[test]
    fn multiline_named_import_parses() {
        let text = "import {\n  foo,\n  bar,\n} from 'path';";
        let s = ImportStatement::parse(text).unwrap();
        assert_eq!(s.named_imports, Some(vec!["bar".to_owned(), "foo".to_owned()]));
    }

    #[test]
    fn unparseable_text_returns_none() {
        assert!(ImportStatement::parse("console.log(bar);").is_none());
    }

    #[test]
    fn empty_statement_detection() {
        let mut s = ImportStatement::new("path");
        assert!(s.is_empty());
        s.set_default_import("foo");
        assert!(!s.is_empty());
        s.delete_variable("foo");
        assert!(s.is_empty());
    }

    #[test]
    fn inject_named_import_sorts_and_dedups() {
        let mut s = ImportStatement::new("path");
        s.inject_named_import("foo");
        s.inject_named_import("bar");
        s.inject_named_import("foo");
        assert_eq!(s.named_imports, Some(vec!["bar".to_owned(), "foo".to_owned()]));
    }

    #[test]
    fn set_default_import_noop_when_equal_preserves_original_source() {
        let mut s = ImportStatement::parse("import Foo from 'path';").unwrap();
        s.set_default_import("Foo");
        assert!(s.original_source.is_some());
    }

    #[test]
    fn delete_variable_from_default() {
        let mut s = ImportStatement::parse("import Foo from 'path';").unwrap();
        s.delete_variable("Foo");
        assert!(s.default_import.is_none());
        assert!(s.original_source.is_none());
    }

    #[test]
    fn delete_variable_from_named() {
        let mut s = ImportStatement::parse("import { foo, bar } from 'path';").unwrap();
        s.delete_variable("foo");
        assert_eq!(s.named_imports, Some(vec!["bar".to_owned()]));
    }

    #[test]
    fn merge_overwrites_default_and_unions_named() {
        let mut s = ImportStatement::new("path");
        s.set_default_import("foo");
        let mut other = ImportStatement::new("path");
        other.set_default_import("bar");
        other.inject_named_import("baz");
        s.merge(&other);
        assert_eq!(s.default_import, Some("bar".to_owned()));
        assert_eq!(s.named_imports, Some(vec!["baz".to_owned()]));
    }

    #[test]
    fn merge_named_imports_does_not_duplicate() {
        let mut s = ImportStatement::new("path");
        s.inject_named_import("foo");
        let mut other = ImportStatement::new("path");
        other.inject_named_import("foo");
        other.inject_named_import("bar");
        s.merge(&other);
        assert_eq!(s.named_imports, Some(vec!["bar".to_owned(), "foo".to_owned()]));
    }

    #[test]
    fn render_default_only() {
        let mut s = ImportStatement::new("path");
        s.set_default_import("Foo");
        assert_eq!(
            s.to_import_strings(80, "  "),
            vec!["import Foo from 'path';".to_owned()]
        );
    }

    #[test]
    fn render_named_only() {
        let mut s = ImportStatement::new("path");
        s.inject_named_import("a");
        s.inject_named_import("b");
        assert_eq!(
            s.to_import_strings(80, "  "),
            vec!["import { a, b } from 'path';".to_owned()]
        );
    }

    #[test]
    fn render_default_and_named() {
        let mut s = ImportStatement::new("path");
        s.set_default_import("X");
        s.inject_named_import("A");
        s.inject_named_import("B");
        assert_eq!(
            s.to_import_strings(80, "  "),
            vec!["import X, { A, B } from 'path';".to_owned()]
        );
    }

    #[test]
    fn render_call_family_default_and_named_splits_into_two_statements() {
        let mut s = ImportStatement::new("path");
        s.declaration_keyword = DeclarationKeyword::Const;
        s.import_function = "require".to_owned();
        s.set_default_import("foo");
        s.inject_named_import("bar");
        s.inject_named_import("baz");
        assert_eq!(
            s.to_import_strings(80, "  "),
            vec![
                "const foo = require('path');".to_owned(),
                "const { bar, baz } = require('path');".to_owned(),
            ]
        );
    }

    #[test]
    fn render_wraps_named_imports_at_line_length() {
        let mut s = ImportStatement::new("also_very_long_for_some_reason");
        for name in ["foo", "bar", "baz", "fizz", "buzz"] {
            s.inject_named_import(name);
        }
        let rendered = s.to_import_strings(50, "  ");
        assert_eq!(
            rendered,
            vec![
                "import {\n  bar,\n  baz,\n  buzz,\n  fizz,\n  foo,\n} from 'also_very_long_for_some_reason';"
                    .to_owned()
            ]
        );
    }

    #[test]
    fn render_wraps_default_only_after_from() {
        let mut s = ImportStatement::new("a-very-long-module-path-that-is-too-long-to-fit");
        s.set_default_import("SomeDefaultExport");
        let rendered = s.to_import_strings(20, "  ");
        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].contains("from\n  '"));
    }

    #[test]
    fn render_wraps_call_default_after_equals() {
        let mut s = ImportStatement::new("a-very-long-module-path-that-is-too-long-to-fit");
        s.declaration_keyword = DeclarationKeyword::Const;
        s.set_default_import("foo");
        let rendered = s.to_import_strings(20, "  ");
        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].contains("=\n  require("));
    }

    #[test]
    fn normalized_key_ignores_named_import_order() {
        let mut a = ImportStatement::new("p");
        a.inject_named_import("x");
        a.inject_named_import("y");
        let mut b = ImportStatement::new("p");
        b.inject_named_import("y");
        b.inject_named_import("x");
        assert_eq!(a.normalized_key(), b.normalized_key());
    }
}

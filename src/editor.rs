//! The editor capability the core depends on (§6.1), plus a concrete
//! file-backed adapter for the CLI.

use std::path::{Path, PathBuf};

/// Pluggable prompting, kept separate from `Editor` so the CLI can wire
/// stdout/stdin while tests use a canned, non-interactive implementation.
pub trait Ui {
    fn message(&mut self, text: &str);
    /// Ask the user to pick one of `choices`; `None` means dismissed.
    fn ask_for_selection(&mut self, name: &str, choices: &[String]) -> Option<usize>;
}

/// The buffer + cursor surface the importer operates on.
pub trait Editor {
    fn current_word(&self) -> String;
    fn path_to_current_file(&self) -> PathBuf;
    fn current_file_content(&self) -> String;
    fn count_lines(&self) -> usize;
    /// 1-based.
    fn read_line(&self, index: usize) -> String;
    /// Inserts `text` after line `after_index` (`append_line(0, t)` prepends).
    fn append_line(&mut self, after_index: usize, text: &str);
    /// 1-based.
    fn delete_line(&mut self, index: usize);
    fn cursor(&self) -> (usize, usize);
    fn set_cursor(&mut self, row: usize, col: usize);
    fn open_file(&mut self, path: &Path);
    fn message(&mut self, text: &str);
    fn ask_for_selection(&mut self, name: &str, choices: &[String]) -> Option<usize>;
    fn max_line_length(&self) -> usize;
    fn tab(&self) -> String;
}

/// A stdout/stdin-backed `Ui` for interactive CLI use.
pub struct TerminalUi;

impl Ui for TerminalUi {
    fn message(&mut self, text: &str) {
        println!("ImportJS: {text}");
    }

    fn ask_for_selection(&mut self, name: &str, choices: &[String]) -> Option<usize> {
        use std::io::Write;
        println!("ImportJS: multiple modules found for `{name}`:");
        for (i, choice) in choices.iter().enumerate() {
            println!("  {}. {}", i + 1, choice);
        }
        print!("Select one (blank to cancel): ");
        std::io::stdout().flush().ok()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok()?;
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        input
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .filter(|&i| i < choices.len())
    }
}

/// A file-backed `Editor`: an in-memory `Vec<String>` of lines loaded from
/// disk, saved back only if the importer actually mutated it.
pub struct BufferEditor<U: Ui> {
    path: PathBuf,
    lines: Vec<String>,
    cursor: (usize, usize),
    max_line_length: usize,
    tab: String,
    dirty: bool,
    ui: U,
}

impl<U: Ui> BufferEditor<U> {
    pub fn open(path: PathBuf, cursor: (usize, usize), ui: U) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(&path)?;
        Ok(Self {
            lines: contents.lines().map(str::to_owned).collect(),
            path,
            cursor,
            max_line_length: 80,
            tab: "  ".to_owned(),
            dirty: false,
            ui,
        })
    }

    /// Write the buffer back to disk, but only if something actually changed
    /// it — mirrors the "avoid dirtying unchanged files" discipline of
    /// `ImportBlock`'s rewrite step.
    pub fn save(&self) -> std::io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let mut contents = self.lines.join("\n");
        contents.push('\n');
        std::fs::write(&self.path, contents)
    }
}

impl<U: Ui> Editor for BufferEditor<U> {
    fn current_word(&self) -> String {
        let (row, col) = self.cursor;
        let Some(line) = self.lines.get(row.saturating_sub(1)) else {
            return String::new();
        };
        let chars: Vec<char> = line.chars().collect();
        if col == 0 || col > chars.len() {
            return String::new();
        }

        let is_word_char = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
        let mut start = col.saturating_sub(1);
        if !is_word_char(chars[start]) {
            return String::new();
        }
        while start > 0 && is_word_char(chars[start - 1]) {
            start -= 1;
        }
        let mut end = col.saturating_sub(1);
        while end + 1 < chars.len() && is_word_char(chars[end + 1]) {
            end += 1;
        }

        chars[start..=end].iter().collect()
    }

    fn path_to_current_file(&self) -> PathBuf {
        self.path.clone()
    }

    fn current_file_content(&self) -> String {
        let mut contents = self.lines.join("\n");
        contents.push('\n');
        contents
    }

    fn count_lines(&self) -> usize {
        self.lines.len()
    }

    fn read_line(&self, index: usize) -> String {
        self.lines.get(index.saturating_sub(1)).cloned().unwrap_or_default()
    }

    fn append_line(&mut self, after_index: usize, text: &str) {
        self.lines.insert(after_index, text.to_owned());
        self.dirty = true;
    }

    fn delete_line(&mut self, index: usize) {
        if index == 0 || index > self.lines.len() {
            return;
        }
        self.lines.remove(index - 1);
        self.dirty = true;
    }

    fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    fn set_cursor(&mut self, row: usize, col: usize) {
        self.cursor = (row, col);
    }

    fn open_file(&mut self, path: &Path) {
        self.ui.message(&format!("opening {}", path.display()));
    }

    fn message(&mut self, text: &str) {
        self.ui.message(text);
    }

    fn ask_for_selection(&mut self, name: &str, choices: &[String]) -> Option<usize> {
        self.ui.ask_for_selection(name, choices)
    }

    fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    fn tab(&self) -> String {
        self.tab.clone()
    }
}

/// A canned, non-interactive `Ui` for tests: always messages silently into a
/// log and always picks a fixed selection index (or dismisses).
#[cfg(test)]
pub struct CannedUi {
    pub selection: Option<usize>,
    pub messages: Vec<String>,
}

#[cfg(test)]
impl Ui for CannedUi {
    fn message(&mut self, text: &str) {
        self.messages.push(text.to_owned());
    }

    fn ask_for_selection(&mut self, _name: &str, _choices: &[String]) -> Option<usize> {
        self.selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ui() -> CannedUi {
        CannedUi { selection: None, messages: Vec::new() }
    }

    #[test]
    fn current_word_under_cursor() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.js");
        std::fs::write(&path, "const foo = bar;\n").unwrap();
        let editor = BufferEditor::open(path, (1, 13), ui()).unwrap();
        assert_eq!(editor.current_word(), "bar");
    }

    #[test]
    fn current_word_empty_on_whitespace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.js");
        std::fs::write(&path, "const foo = bar;\n").unwrap();
        let editor = BufferEditor::open(path, (1, 11), ui()).unwrap();
        assert_eq!(editor.current_word(), "");
    }

    #[test]
    fn save_is_noop_when_not_dirty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.js");
        std::fs::write(&path, "const foo = bar;\n").unwrap();
        let editor = BufferEditor::open(path.clone(), (1, 1), ui()).unwrap();
        let before = std::fs::metadata(&path).unwrap().modified().unwrap();
        editor.save().unwrap();
        let after = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn append_and_delete_mark_dirty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.js");
        std::fs::write(&path, "a\nb\n").unwrap();
        let mut editor = BufferEditor::open(path, (1, 1), ui()).unwrap();
        assert!(!editor.dirty);
        editor.append_line(0, "c");
        assert!(editor.dirty);
        assert_eq!(editor.lines[0], "c");
    }
}

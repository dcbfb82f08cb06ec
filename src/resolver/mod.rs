pub mod filesystem;
pub mod package;

use std::path::Path;

use crate::config::Configuration;
use crate::editor::Editor;
use crate::error::ImportJsError;
use crate::import_block::ImportBlock;
use crate::js_module::{JsModule, ModuleOrigin};

/// `find_js_modules` (§4.4): resolve `variable_name` to every candidate
/// module, short-circuiting on an alias or named-export registry hit.
pub fn find_js_modules(
    variable_name: &str,
    current_file: &Path,
    config: &Configuration,
) -> Result<Vec<JsModule>, ImportJsError> {
    if let Some(hit) = config.resolve_alias(variable_name, current_file) {
        return Ok(vec![JsModule::from_registry_hit(&hit.specifier, ModuleOrigin::Alias, config)]);
    }
    if let Some(hit) = config.resolve_named_exports(variable_name) {
        return Ok(vec![JsModule::from_registry_hit(
            &hit.specifier,
            ModuleOrigin::NamedExport,
            config,
        )]);
    }

    let mut candidates = Vec::new();
    for lookup_path in config.get_lookup_paths(Some(current_file)) {
        candidates.extend(filesystem::search_lookup_path(
            variable_name,
            &lookup_path,
            &config.root,
            current_file,
            config,
        )?);
    }
    candidates.extend(package::search_dependencies(variable_name, current_file, config)?);

    Ok(dedupe_and_sort(candidates))
}

/// §4.4 steps 6-8: sort by `import_path` length, dedupe by `lookup_path +
/// "/" + import_path` keeping the first (shortest), re-sort by `display_name`.
fn dedupe_and_sort(mut candidates: Vec<JsModule>) -> Vec<JsModule> {
    candidates.sort_by_key(|m| m.import_path.len());

    let mut seen = std::collections::HashSet::new();
    candidates.retain(|m| seen.insert(format!("{}/{}", m.lookup_path, m.import_path)));

    candidates.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    candidates
}

/// `resolve_one` (§4.4): exactly one candidate returns it; zero returns
/// `None`; more than one asks the editor to disambiguate.
pub fn resolve_one(candidates: Vec<JsModule>, name: &str, editor: &mut dyn Editor) -> Option<JsModule> {
    match candidates.len() {
        0 => None,
        1 => candidates.into_iter().next(),
        _ => {
            let choices: Vec<String> = candidates.iter().map(|m| m.display_name.clone()).collect();
            let index = editor.ask_for_selection(name, &choices)?;
            candidates.into_iter().nth(index)
        }
    }
}

/// `resolve_goto` (§4.4): falls back to the current import block when there
/// is no unambiguous resolver candidate.
pub fn resolve_goto(
    candidates: Vec<JsModule>,
    name: &str,
    current_block: &ImportBlock,
    editor: &mut dyn Editor,
) -> Option<JsModule> {
    if candidates.len() == 1 {
        return candidates.into_iter().next();
    }

    let existing = current_block.imports.iter().find(|s| {
        s.default_import.as_deref() == Some(name)
            || s.named_imports.as_deref().is_some_and(|names| names.iter().any(|n| n == name))
    });

    if let Some(statement) = existing {
        if candidates.is_empty() {
            return Some(JsModule::bare(&statement.path));
        }
        if let Some(found) = candidates.iter().find(|m| m.import_path == statement.path) {
            return Some(found.clone());
        }
    }

    resolve_one(candidates, name, editor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{BufferEditor, CannedUi};
    use crate::import_statement::ImportStatement;

    fn editor_with(selection: Option<usize>) -> BufferEditor<CannedUi> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.js");
        std::fs::write(&path, "x;\n").unwrap();
        let editor = BufferEditor::open(path, (1, 1), CannedUi { selection, messages: Vec::new() }).unwrap();
        std::mem::forget(dir);
        editor
    }

    fn module(path: &str, lookup: &str) -> JsModule {
        JsModule {
            import_path: path.to_owned(),
            display_name: path.to_owned(),
            file_path: std::path::PathBuf::from(path),
            has_named_exports: false,
            lookup_path: lookup.to_owned(),
        }
    }

    #[test]
    fn dedupe_keeps_shortest_import_path() {
        let a = module("./foo", "app");
        let b = module("./foo", "app");
        let deduped = dedupe_and_sort(vec![a, b]);
        assert_eq!(deduped.len(), 1);
    }

    #[test]
    fn resolve_one_returns_sole_candidate() {
        let mut editor = editor_with(None);
        let result = resolve_one(vec![module("./a", "app")], "a", &mut editor);
        assert_eq!(result.unwrap().import_path, "./a");
    }

    #[test]
    fn resolve_one_none_when_empty() {
        let mut editor = editor_with(None);
        assert!(resolve_one(Vec::new(), "a", &mut editor).is_none());
    }

    #[test]
    fn resolve_one_asks_editor_on_ambiguity() {
        let mut editor = editor_with(Some(1));
        let result = resolve_one(vec![module("./a", "app"), module("./b", "app")], "x", &mut editor);
        assert_eq!(result.unwrap().import_path, "./b");
    }

    #[test]
    fn resolve_one_dismissed_returns_none() {
        let mut editor = editor_with(None);
        let result = resolve_one(vec![module("./a", "app"), module("./b", "app")], "x", &mut editor);
        assert!(result.is_none());
    }

    #[test]
    fn resolve_goto_synthesizes_bare_module_from_existing_import() {
        let mut statement = ImportStatement::new("./existing");
        statement.set_default_import("name");
        let block = ImportBlock {
            imports: vec![statement],
            imports_start_at: 0,
            newline_count: 1,
        };
        let mut editor = editor_with(None);
        let result = resolve_goto(Vec::new(), "name", &block, &mut editor);
        assert_eq!(result.unwrap().import_path, "./existing");
    }

    #[test]
    fn resolve_goto_prefers_candidate_matching_existing_path() {
        let mut statement = ImportStatement::new("./foo");
        statement.set_default_import("foo");
        let block = ImportBlock {
            imports: vec![statement],
            imports_start_at: 0,
            newline_count: 1,
        };
        let mut editor = editor_with(None);
        let candidates = vec![module("./foo", "app"), module("./foobar", "app")];
        let result = resolve_goto(candidates, "foo", &block, &mut editor);
        assert_eq!(result.unwrap().import_path, "./foo");
    }
}

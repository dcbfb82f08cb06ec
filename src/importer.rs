//! Importer (C6): the `import`, `goto`, and `fix_imports` operations that
//! drive the resolver, linter, and import block to a fixed point.

use std::path::Path;
use std::time::Instant;

use crate::config::Configuration;
use crate::editor::Editor;
use crate::error::{ImportJsError, Outcome};
use crate::import_block::{self, dedupe_statements, render_block};
use crate::js_module::JsModule;
use crate::linter;
use crate::resolver::{find_js_modules, resolve_goto, resolve_one};

/// §4.6.2: capture (row, col) and line count before `body`, then restore the
/// cursor row shifted by however many lines the body added or removed.
fn with_cursor_maintained<T>(editor: &mut dyn Editor, body: impl FnOnce(&mut dyn Editor) -> T) -> T {
    let (row, col) = editor.cursor();
    let before = editor.count_lines();

    let result = body(editor);

    let after = editor.count_lines();
    let delta = after as isize - before as isize;
    if delta != 0 {
        let new_row = (row as isize + delta).max(1) as usize;
        editor.set_cursor(new_row, col);
    }

    result
}

/// Read the buffer's current import block off the editor.
fn read_block(editor: &dyn Editor) -> import_block::ImportBlock {
    let lines: Vec<String> = (1..=editor.count_lines()).map(|i| editor.read_line(i)).collect();
    let borrowed: Vec<&str> = lines.iter().map(String::as_str).collect();
    import_block::parse(&borrowed)
}

/// Rewrite the editor's buffer with `statements` per §4.3's rewrite
/// procedure, leaving the buffer untouched if the canonical text is
/// unchanged.
fn rewrite_block(
    editor: &mut dyn Editor,
    imports_start_at: usize,
    old_newline_count: usize,
    statements: &[crate::import_statement::ImportStatement],
) {
    // Step 1: ensure the line following the block is blank.
    let separator_index = imports_start_at + old_newline_count;
    if separator_index < editor.count_lines() && !editor.read_line(separator_index + 1).trim().is_empty() {
        editor.append_line(separator_index, "");
    }

    let max_line_length = editor.max_line_length();
    let tab = editor.tab();
    let new_lines = render_block(statements, max_line_length, &tab);

    let existing: Vec<String> = (0..old_newline_count)
        .map(|i| editor.read_line(imports_start_at + i + 1))
        .collect();

    if existing == new_lines {
        return;
    }

    // Top-down: deleting the same index pops each of the old_newline_count
    // consecutive lines in turn.
    for _ in 0..old_newline_count {
        editor.delete_line(imports_start_at + 1);
    }

    for (i, line) in new_lines.iter().enumerate().rev() {
        editor.append_line(imports_start_at + i, line);
    }
}

/// §4.6.1: inject `js_module` bound to `variable_name` into `statements`.
fn inject(
    variable_name: &str,
    js_module: &JsModule,
    statements: &mut Vec<crate::import_statement::ImportStatement>,
    config: &Configuration,
    from_file: &Path,
) {
    if let Some(existing) = statements.iter_mut().find(|s| s.path == js_module.import_path) {
        // §4.6.1 / spec.md:217: the merge branch reads config keyed on the
        // *resolved module's* file, not the file being edited — an
        // environment override scoped to `from_file` must not leak onto an
        // existing import of an unrelated module.
        let module_file = js_module.file_path.as_path();
        existing.declaration_keyword =
            crate::import_statement::DeclarationKeyword::from_config_str(&config.get_declaration_keyword(Some(module_file)));
        existing.import_function = config.get_import_function(Some(module_file));
        if js_module.has_named_exports {
            existing.inject_named_import(variable_name);
        } else {
            existing.set_default_import(variable_name);
        }
    } else {
        let statement = js_module.to_import_statement(variable_name, config, from_file);
        statements.insert(0, statement);
    }

    dedupe_statements(statements);
}

/// `import` (§4.6): bind the variable under the cursor to a resolved module.
pub fn import_one(editor: &mut dyn Editor, verbose: bool) -> Result<Outcome, ImportJsError> {
    let current_file = editor.path_to_current_file();
    let config = Configuration::load(&current_file);

    let word = editor.current_word();
    if word.is_empty() {
        return Ok(Outcome::Message(
            "No variable to import. Place your cursor on a variable, then try again.".to_owned(),
        ));
    }

    let started = Instant::now();
    let candidates = find_js_modules(&word, &current_file, &config)?;
    let module = resolve_one(candidates, &word, editor);
    let elapsed = started.elapsed().as_secs_f64();

    let Some(module) = module else {
        return Ok(Outcome::Message(format!(
            "No JS module to import for variable `{word}` ({elapsed:.2}s)"
        )));
    };

    if verbose {
        eprintln!("ImportJS: resolved `{word}` -> {}", module.import_path);
    }

    let named = module.has_named_exports;
    let outcome = with_cursor_maintained(editor, |editor| {
        let block = read_block(editor);
        let mut statements = block.imports;
        inject(&word, &module, &mut statements, &config, &current_file);
        rewrite_block(editor, block.imports_start_at, block.newline_count, &statements);
        Outcome::Imported {
            variable: word.clone(),
            module: module.import_path.clone(),
            named,
        }
    });

    // `outcome` is always `Imported` here — the empty-word and no-candidate
    // paths already returned above.
    let Outcome::Imported { ref variable, ref module, named } = outcome else {
        unreachable!("with_cursor_maintained body always produces Outcome::Imported")
    };
    let message = if named {
        format!("Imported `{variable}` from `{module}` ({elapsed:.2}s)")
    } else {
        format!("Imported `{module}` ({elapsed:.2}s)")
    };
    editor.message(&message);

    Ok(outcome)
}

/// `goto` (§4.6): open the file defining the variable under the cursor.
pub fn goto(editor: &mut dyn Editor, verbose: bool) -> Result<Outcome, ImportJsError> {
    let current_file = editor.path_to_current_file();
    let config = Configuration::load(&current_file);

    let word = editor.current_word();
    if word.is_empty() {
        return Ok(Outcome::Message(
            "No variable to import. Place your cursor on a variable, then try again.".to_owned(),
        ));
    }

    let candidates = find_js_modules(&word, &current_file, &config)?;
    if verbose {
        eprintln!(
            "ImportJS: resolved `{word}` -> {} candidate(s)",
            candidates.len()
        );
    }
    let block = read_block(editor);
    let module = resolve_goto(candidates, &word, &block, editor);

    let Some(module) = module else {
        return Ok(Outcome::Message(format!("Could not resolve a module for `{word}`")));
    };

    let path = module.open_file_path(&current_file);
    editor.open_file(&path);
    Ok(Outcome::NoOp)
}

/// `fix_imports` (§4.6): remove unused bindings and resolve undefined ones.
pub fn fix_imports(editor: &mut dyn Editor, verbose: bool) -> Result<Outcome, ImportJsError> {
    let current_file = editor.path_to_current_file();
    let config = Configuration::load(&current_file);

    let content = editor.current_file_content();
    let eslint_executable = config.get_eslint_executable(Some(&current_file));
    let diagnostics = linter::read_diagnostics(&eslint_executable, &current_file, &content, verbose)?;

    if diagnostics.unused.is_empty() && diagnostics.undefined.is_empty() {
        return Ok(Outcome::NoOp);
    }

    with_cursor_maintained(editor, |editor| {
        let block = read_block(editor);
        let mut statements = block.imports;
        apply_diagnostics(&mut statements, &diagnostics, &current_file, &config, editor)?;
        rewrite_block(editor, block.imports_start_at, block.newline_count, &statements);
        Ok(Outcome::NoOp)
    })
}

/// Apply a set of lint diagnostics to `statements`: drop every diagnosed-
/// unused binding, then resolve and inject every diagnosed-undefined one.
/// Split out from `fix_imports` so it can be exercised without spawning a
/// linter subprocess — callers only need a `Diagnostics` value.
fn apply_diagnostics(
    statements: &mut Vec<crate::import_statement::ImportStatement>,
    diagnostics: &linter::Diagnostics,
    current_file: &Path,
    config: &Configuration,
    editor: &mut dyn Editor,
) -> Result<(), ImportJsError> {
    for unused in &diagnostics.unused {
        for statement in statements.iter_mut() {
            statement.delete_variable(unused);
        }
    }
    statements.retain(|s| !s.is_empty());

    for undefined in &diagnostics.undefined {
        let candidates = find_js_modules(undefined, current_file, config)?;
        if let Some(module) = resolve_one(candidates, undefined, editor) {
            inject(undefined, &module, statements, config, current_file);
        }
    }

    Ok(())
}

//! Filesystem search: enumerate `.js`/`.jsx` files under a lookup root and
//! retain those whose path matches the fuzzy name pattern.

use std::path::{Path, PathBuf};

use regex::RegexBuilder;

use crate::config::Configuration;
use crate::error::ImportJsError;
use crate::js_module::JsModule;
use crate::name_formatter::formatted_to_regex;

/// Walk `lookup_root_abs`, returning absolute paths to every `.js`/`.jsx`
/// file not under a `node_modules` directory.
fn collect_js_files(lookup_root_abs: &Path) -> Vec<PathBuf> {
    let walker = ignore::WalkBuilder::new(lookup_root_abs)
        .standard_filters(true)
        .require_git(false)
        .build();

    let mut out = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                eprintln!("warning: {err}");
                continue;
            }
        };

        if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
            continue;
        }

        let path = entry.path();
        if path_contains_node_modules(path) {
            continue;
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext != "js" && ext != "jsx" {
            continue;
        }

        out.push(path.to_path_buf());
    }
    out
}

fn path_contains_node_modules(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str().to_str() == Some("node_modules"))
}

/// §4.4 steps 3-4: search one `lookup_path` for candidates matching `name`.
pub fn search_lookup_path(
    name: &str,
    lookup_path: &str,
    project_root: &Path,
    current_file: &Path,
    config: &Configuration,
) -> Result<Vec<JsModule>, ImportJsError> {
    if lookup_path.trim().is_empty() {
        return Err(ImportJsError::Find("empty lookup_path configured".to_owned()));
    }

    let lookup_root_abs = project_root.join(lookup_path);
    let pattern = formatted_to_regex(name);
    let match_re = RegexBuilder::new(&format!(r"(/|^){pattern}(/index)?(/package)?\.js.*"))
        .case_insensitive(true)
        .build()
        .map_err(|err| ImportJsError::Find(format!("invalid search pattern for `{name}`: {err}")))?;

    let excludes: Vec<glob::Pattern> = config
        .get_excludes(Some(current_file))
        .iter()
        .filter_map(|p| glob::Pattern::new(p).ok())
        .collect();

    let mut modules = Vec::new();
    for path in collect_js_files(&lookup_root_abs) {
        let path_str = path.to_string_lossy();
        if !match_re.is_match(&path_str) {
            continue;
        }
        if excludes.iter().any(|p| p.matches(&path_str)) {
            continue;
        }

        modules.push(JsModule::from_filesystem_path(
            &path,
            lookup_path,
            &lookup_root_abs,
            current_file,
            config,
        ));
    }

    Ok(modules)
}

//! `JSModule`: a resolved import candidate, and the path-rewriting rules that
//! turn a discovered filesystem path into an `import_path`.

use std::path::{Path, PathBuf};

use crate::config::Configuration;
use crate::import_statement::{DeclarationKeyword, ImportStatement};

/// Where a candidate was discovered — drives extension stripping and
/// index/package segment collapsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleOrigin {
    Filesystem,
    Package,
    Alias,
    NamedExport,
}

/// A module a variable can be imported from.
#[derive(Debug, Clone)]
pub struct JsModule {
    /// The specifier to write into the rendered import statement.
    pub import_path: String,
    /// Shown to the user when disambiguating between several candidates.
    pub display_name: String,
    /// Absolute path to the file, used for per-file config lookups.
    pub file_path: PathBuf,
    pub has_named_exports: bool,
    /// The root this candidate was discovered under (a configured
    /// `lookup_path`, `"node_modules"`, or the registry kind for
    /// alias/named-export hits).
    pub lookup_path: String,
}

impl JsModule {
    /// Construct from an absolute file path discovered under `lookup_path`
    /// (whose absolute form is `lookup_root_abs`), relative to the importing
    /// file, following §10.4 step by step.
    pub fn from_filesystem_path(
        absolute_path: &Path,
        lookup_path: &str,
        lookup_root_abs: &Path,
        current_file: &Path,
        config: &Configuration,
    ) -> Self {
        let use_relative = config.get_use_relative_paths(Some(current_file));
        let mut import_path = if use_relative {
            relative_to(absolute_path, current_file.parent().unwrap_or(current_file))
        } else {
            relative_to(absolute_path, lookup_root_abs)
        };

        if let Some(prefix) = config.get_strip_from_path(Some(current_file))
            && let Some(stripped) = import_path.strip_prefix(&prefix)
        {
            import_path = stripped.trim_start_matches('/').to_owned();
        }

        for ext in config.get_strip_file_extensions(Some(current_file)) {
            if let Some(stripped) = import_path.strip_suffix(&ext) {
                import_path = stripped.to_owned();
                break;
            }
        }

        import_path = collapse_trailing_segment(&import_path, "index");

        if use_relative && !import_path.starts_with('.') {
            import_path = format!("./{import_path}");
        }

        let has_named_exports =
            config.has_named_exports_entry(&import_path) || scan_has_named_exports(absolute_path);

        Self {
            display_name: import_path.clone(),
            import_path,
            file_path: absolute_path.to_path_buf(),
            has_named_exports,
            lookup_path: lookup_path.to_owned(),
        }
    }

    /// Construct a package-manifest candidate: `node_modules/<dep>/package.json`.
    ///
    /// §10.4 step 9: a package candidate's `has_named_exports` comes from a
    /// `[named_exports]` entry keyed on the dependency name, or (failing
    /// that) a best-effort scan of the dependency's `package.json` `main`
    /// entry file under `node_modules`.
    pub fn from_package_dependency(dependency: &str, config: &Configuration) -> Self {
        let manifest_dir = PathBuf::from("node_modules").join(dependency);
        let has_named_exports = config.has_named_exports_entry(dependency)
            || main_entry_path(&manifest_dir).is_some_and(|main| scan_has_named_exports(&main));

        Self {
            import_path: dependency.to_owned(),
            display_name: dependency.to_owned(),
            file_path: manifest_dir.join("package.json"),
            has_named_exports,
            lookup_path: "node_modules".to_owned(),
        }
    }

    /// Construct from a `[aliases]` or `[named_exports]` hit.
    pub fn from_registry_hit(specifier: &str, origin: ModuleOrigin, config: &Configuration) -> Self {
        let suffix = match origin {
            ModuleOrigin::Alias => " (alias)",
            ModuleOrigin::NamedExport => " (named export)",
            _ => "",
        };
        Self {
            import_path: specifier.to_owned(),
            display_name: format!("{specifier}{suffix}"),
            file_path: PathBuf::from(specifier),
            has_named_exports: config.has_named_exports_entry(specifier),
            lookup_path: match origin {
                ModuleOrigin::Alias => "alias".to_owned(),
                ModuleOrigin::NamedExport => "named_export".to_owned(),
                _ => String::new(),
            },
        }
    }

    /// Synthesize a bare module for `resolve_goto`'s fallback path, where
    /// there's an existing import statement but no resolver candidate.
    pub fn bare(import_path: &str) -> Self {
        Self {
            import_path: import_path.to_owned(),
            display_name: import_path.to_owned(),
            file_path: PathBuf::from(import_path),
            has_named_exports: false,
            lookup_path: String::new(),
        }
    }

    /// `open_file_path` per §10.4 step 10: `file_path` unchanged, `current_file`
    /// accepted only for interface symmetry with the editor contract.
    pub fn open_file_path(&self, _current_file: &Path) -> PathBuf {
        self.file_path.clone()
    }

    /// Build the statement to prepend when no existing statement shares this
    /// module's `import_path` (§4.6.1).
    pub fn to_import_statement(&self, variable_name: &str, config: &Configuration, from_file: &Path) -> ImportStatement {
        let mut statement = ImportStatement::new(self.import_path.clone());
        statement.declaration_keyword = DeclarationKeyword::from_config_str(&config.get_declaration_keyword(Some(from_file)));
        statement.import_function = config.get_import_function(Some(from_file));
        if self.has_named_exports {
            statement.inject_named_import(variable_name);
        } else {
            statement.set_default_import(variable_name);
        }
        statement
    }
}

/// Collapse a trailing `/<segment>` (or a whole path equal to `segment`) to
/// its parent, e.g. `collapse_trailing_segment("./foo/index", "index")` →
/// `"./foo"`, and `collapse_trailing_segment("node_modules/x/package", "package")`
/// for the `node_modules/<dep>/package` case (handled by the caller, which
/// only ever passes single-dependency paths through here for `"package"`).
fn collapse_trailing_segment(path: &str, segment: &str) -> String {
    if let Some(stripped) = path.strip_suffix(&format!("/{segment}")) {
        stripped.to_owned()
    } else if path == segment {
        String::new()
    } else {
        path.to_owned()
    }
}

/// Compute `path` relative to `base`, both treated as plain string paths (no
/// filesystem access — these are specifiers, not necessarily real on disk
/// relative to each other once `lookup_path`/`strip_from_path` are in play).
fn relative_to(path: &Path, base: &Path) -> String {
    pathdiff(path, base)
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
        .replace('\\', "/")
}

/// A minimal `path.relative`-equivalent: walk both paths' components,
/// dropping the common prefix, then `..` for each remaining `base` component.
fn pathdiff(path: &Path, base: &Path) -> Option<String> {
    let path_components: Vec<_> = path.components().collect();
    let base_components: Vec<_> = base.components().collect();

    let common = path_components
        .iter()
        .zip(base_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base_components.len() {
        out.push("..");
    }
    for component in &path_components[common..] {
        out.push(component.as_os_str());
    }

    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out.to_string_lossy().into_owned())
    }
}

/// Read `<manifest_dir>/package.json`'s `main` entry (defaulting to
/// `index.js`) and return its path, for the package-candidate half of §10.4
/// step 9. Returns `None` if the manifest is missing or unparseable.
fn main_entry_path(manifest_dir: &Path) -> Option<PathBuf> {
    let contents = std::fs::read_to_string(manifest_dir.join("package.json")).ok()?;

    #[derive(serde::Deserialize)]
    struct Manifest {
        main: Option<String>,
    }

    let main = serde_json::from_str::<Manifest>(&contents)
        .ok()
        .and_then(|m| m.main)
        .unwrap_or_else(|| "index.js".to_owned());
    Some(manifest_dir.join(main))
}

/// Best-effort scan for a top-level export in a `.js`/`.jsx` file (§10.4 step
/// 9): regex-driven, stops at the first line that looks export-shaped, never
/// a full parse. Returns `false` (not `Err`) on any read failure — a missing
/// or unreadable file simply falls back to default-import injection.
fn scan_has_named_exports(path: &Path) -> bool {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return false;
    };
    export_regex().is_match(&contents)
}

fn export_regex() -> &'static regex::Regex {
    static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(
            r"(?m)^\s*(export\s*\{|export\s+(const|function|class)\s|module\.exports\.\w+\s*=|exports\.\w+\s*=)",
        )
        .unwrap()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn collapses_trailing_index_segment() {
        assert_eq!(collapse_trailing_segment("./foo/index", "index"), "./foo");
        assert_eq!(collapse_trailing_segment("./foo", "index"), "./foo");
    }

    #[test]
    fn scan_detects_export_const() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mod.js");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "export const foo = 1;").unwrap();
        assert!(scan_has_named_exports(&path));
    }

    #[test]
    fn scan_detects_commonjs_exports_assignment() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mod.js");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "exports.foo = function() {{}};").unwrap();
        assert!(scan_has_named_exports(&path));
    }

    #[test]
    fn scan_false_on_missing_file() {
        assert!(!scan_has_named_exports(Path::new("/nonexistent/mod.js")));
    }

    #[test]
    fn from_package_dependency_has_no_extension_stripping() {
        let module = JsModule::from_package_dependency("lodash", &Configuration::default());
        assert_eq!(module.import_path, "lodash");
        assert_eq!(module.lookup_path, "node_modules");
    }

    #[test]
    fn from_package_dependency_named_exports_from_registry() {
        let dir = tempdir().unwrap();
        let toml_path = dir.path().join("import-js.toml");
        std::fs::write(&toml_path, "[named_exports]\nlodash = [\"map\"]\n").unwrap();
        let config = Configuration::load(&dir.path().join("index.js"));
        let module = JsModule::from_package_dependency("lodash", &config);
        assert!(module.has_named_exports);
    }

    #[test]
    fn main_entry_path_reads_package_json_main_field() {
        let dir = tempdir().unwrap();
        let manifest_dir = dir.path().join("some-pkg");
        std::fs::create_dir_all(&manifest_dir).unwrap();
        std::fs::write(manifest_dir.join("package.json"), r#"{"main": "lib/index.js"}"#).unwrap();
        assert_eq!(main_entry_path(&manifest_dir), Some(manifest_dir.join("lib/index.js")));
    }

    #[test]
    fn main_entry_path_defaults_to_index_js() {
        let dir = tempdir().unwrap();
        let manifest_dir = dir.path().join("some-pkg");
        std::fs::create_dir_all(&manifest_dir).unwrap();
        std::fs::write(manifest_dir.join("package.json"), "{}").unwrap();
        assert_eq!(main_entry_path(&manifest_dir), Some(manifest_dir.join("index.js")));
    }
}

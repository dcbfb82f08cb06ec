//! Configuration loaded from `import-js.toml`, with per-file environment
//! overrides and `package.json` dependency discovery.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

fn default_declaration_keyword() -> String {
    "import".to_owned()
}

fn default_import_function() -> String {
    "require".to_owned()
}

fn default_strip_file_extensions() -> Vec<String> {
    vec![".js".to_owned(), ".jsx".to_owned()]
}

fn default_use_relative_paths() -> bool {
    true
}

fn default_eslint_executable() -> String {
    "eslint".to_owned()
}

/// One `[[environments]]` entry: a glob plus any subset of the base keys.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Environment {
    pub glob: String,
    pub declaration_keyword: Option<String>,
    pub import_function: Option<String>,
    pub lookup_paths: Option<Vec<String>>,
    pub excludes: Option<Vec<String>>,
    pub strip_file_extensions: Option<Vec<String>>,
    pub use_relative_paths: Option<bool>,
    pub strip_from_path: Option<String>,
    pub ignore_package_prefixes: Option<Vec<String>>,
    pub eslint_executable: Option<String>,
    /// Directory-scoped alias overrides, checked before the base `[aliases]`
    /// table for files matching `glob`.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

/// Raw `import-js.toml` shape, as deserialized by `toml`.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default = "default_declaration_keyword")]
    declaration_keyword: String,
    #[serde(default = "default_import_function")]
    import_function: String,
    #[serde(default)]
    lookup_paths: Vec<String>,
    #[serde(default)]
    excludes: Vec<String>,
    #[serde(default = "default_strip_file_extensions")]
    strip_file_extensions: Vec<String>,
    #[serde(default = "default_use_relative_paths")]
    use_relative_paths: bool,
    #[serde(default)]
    strip_from_path: Option<String>,
    #[serde(default)]
    ignore_package_prefixes: Vec<String>,
    #[serde(default = "default_eslint_executable")]
    eslint_executable: String,
    #[serde(default)]
    aliases: HashMap<String, String>,
    #[serde(default)]
    named_exports: HashMap<String, Vec<String>>,
    #[serde(default)]
    environments: Vec<Environment>,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            declaration_keyword: default_declaration_keyword(),
            import_function: default_import_function(),
            lookup_paths: Vec::new(),
            excludes: Vec::new(),
            strip_file_extensions: default_strip_file_extensions(),
            use_relative_paths: default_use_relative_paths(),
            strip_from_path: None,
            ignore_package_prefixes: Vec::new(),
            eslint_executable: default_eslint_executable(),
            aliases: HashMap::new(),
            named_exports: HashMap::new(),
            environments: Vec::new(),
        }
    }
}

/// A resolved alias or named-export lookup, carried through to `JSModule`
/// construction so `display_name` can be annotated with its registry kind.
#[derive(Debug, Clone)]
pub struct RegistryHit {
    pub specifier: String,
    pub kind: RegistryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    Alias,
    NamedExport,
}

/// Loaded, ready-to-query configuration for one project.
///
/// Construct relative to the current file and re-derive per operation rather
/// than caching across files, since `[[environments]]` overrides are legal.
#[derive(Debug)]
pub struct Configuration {
    raw: RawConfig,
    /// Directory `import-js.toml` (or the project root fallback) was found
    /// under; `[[environments]]` globs are matched relative to this.
    pub root: PathBuf,
    pub package_dependencies: Vec<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            raw: RawConfig::default(),
            root: PathBuf::new(),
            package_dependencies: Vec::new(),
        }
    }
}

impl Configuration {
    /// Load configuration relative to `from_file`, walking upward from its
    /// directory until an `import-js.toml` or `package.json` is found (or the
    /// filesystem root is reached). Never hard-errors: a missing or
    /// unparseable file yields defaults plus a stderr warning.
    pub fn load(from_file: &Path) -> Self {
        let start = from_file.parent().unwrap_or(from_file);
        let root = find_project_root(start);

        let config_path = root.join("import-js.toml");
        let raw = if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(contents) => match toml::from_str::<RawConfig>(&contents) {
                    Ok(cfg) => cfg,
                    Err(err) => {
                        eprintln!("warning: failed to parse import-js.toml: {err}. Using defaults.");
                        RawConfig::default()
                    }
                },
                Err(err) => {
                    eprintln!("warning: failed to read import-js.toml: {err}. Using defaults.");
                    RawConfig::default()
                }
            }
        } else {
            RawConfig::default()
        };

        let package_dependencies = load_package_dependencies(&root);

        Self {
            raw,
            root,
            package_dependencies,
        }
    }

    fn matching_environment(&self, from_file: Option<&Path>) -> Option<&Environment> {
        let from_file = from_file?;
        let relative = from_file.strip_prefix(&self.root).unwrap_or(from_file);
        let relative_str = relative.to_string_lossy();

        self.raw
            .environments
            .iter()
            .rev()
            .find(|env| glob::Pattern::new(&env.glob).is_ok_and(|p| p.matches(&relative_str)))
    }

    pub fn get_declaration_keyword(&self, from_file: Option<&Path>) -> String {
        self.matching_environment(from_file)
            .and_then(|e| e.declaration_keyword.clone())
            .unwrap_or_else(|| self.raw.declaration_keyword.clone())
    }

    pub fn get_import_function(&self, from_file: Option<&Path>) -> String {
        self.matching_environment(from_file)
            .and_then(|e| e.import_function.clone())
            .unwrap_or_else(|| self.raw.import_function.clone())
    }

    pub fn get_lookup_paths(&self, from_file: Option<&Path>) -> Vec<String> {
        self.matching_environment(from_file)
            .and_then(|e| e.lookup_paths.clone())
            .unwrap_or_else(|| self.raw.lookup_paths.clone())
    }

    pub fn get_excludes(&self, from_file: Option<&Path>) -> Vec<String> {
        self.matching_environment(from_file)
            .and_then(|e| e.excludes.clone())
            .unwrap_or_else(|| self.raw.excludes.clone())
    }

    pub fn get_strip_file_extensions(&self, from_file: Option<&Path>) -> Vec<String> {
        self.matching_environment(from_file)
            .and_then(|e| e.strip_file_extensions.clone())
            .unwrap_or_else(|| self.raw.strip_file_extensions.clone())
    }

    pub fn get_use_relative_paths(&self, from_file: Option<&Path>) -> bool {
        self.matching_environment(from_file)
            .and_then(|e| e.use_relative_paths)
            .unwrap_or(self.raw.use_relative_paths)
    }

    pub fn get_strip_from_path(&self, from_file: Option<&Path>) -> Option<String> {
        self.matching_environment(from_file)
            .and_then(|e| e.strip_from_path.clone())
            .or_else(|| self.raw.strip_from_path.clone())
    }

    pub fn get_ignore_package_prefixes(&self, from_file: Option<&Path>) -> Vec<String> {
        self.matching_environment(from_file)
            .and_then(|e| e.ignore_package_prefixes.clone())
            .unwrap_or_else(|| self.raw.ignore_package_prefixes.clone())
    }

    pub fn get_eslint_executable(&self, from_file: Option<&Path>) -> String {
        self.matching_environment(from_file)
            .and_then(|e| e.eslint_executable.clone())
            .unwrap_or_else(|| self.raw.eslint_executable.clone())
    }

    /// Direct name → module-specifier lookup from `[aliases]`, consulting a
    /// matching `[[environments]]` entry's own `aliases` table first so an
    /// alias can be overridden per directory/glob.
    pub fn resolve_alias(&self, name: &str, current_file: &Path) -> Option<RegistryHit> {
        let environment_hit = self
            .matching_environment(Some(current_file))
            .and_then(|e| e.aliases.get(name));

        environment_hit
            .or_else(|| self.raw.aliases.get(name))
            .map(|specifier| RegistryHit {
                specifier: specifier.clone(),
                kind: RegistryKind::Alias,
            })
    }

    /// Scan `[named_exports]` for the first specifier whose export list
    /// contains `name`.
    pub fn resolve_named_exports(&self, name: &str) -> Option<RegistryHit> {
        self.raw
            .named_exports
            .iter()
            .find(|(_, exports)| exports.iter().any(|e| e == name))
            .map(|(specifier, _)| RegistryHit {
                specifier: specifier.clone(),
                kind: RegistryKind::NamedExport,
            })
    }

    /// `true` iff `specifier` appears as a key in `[named_exports]`.
    pub fn has_named_exports_entry(&self, specifier: &str) -> bool {
        self.raw.named_exports.contains_key(specifier)
    }
}

/// Walk upward from `start` looking for `import-js.toml` or `package.json`;
/// returns the first directory containing either, or `start` itself if
/// neither is ever found before the filesystem root.
fn find_project_root(start: &Path) -> PathBuf {
    let mut dir = start;
    loop {
        if dir.join("import-js.toml").exists() || dir.join("package.json").exists() {
            return dir.to_path_buf();
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return start.to_path_buf(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct PackageJson {
    #[serde(default)]
    dependencies: HashMap<String, String>,
    #[serde(rename = "devDependencies", default)]
    dev_dependencies: HashMap<String, String>,
}

fn load_package_dependencies(root: &Path) -> Vec<String> {
    let path = root.join("package.json");
    if !path.exists() {
        return Vec::new();
    }

    let contents = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("warning: failed to read package.json: {err}.");
            return Vec::new();
        }
    };

    match serde_json::from_str::<PackageJson>(&contents) {
        Ok(pkg) => {
            let mut deps: Vec<String> = pkg
                .dependencies
                .into_keys()
                .chain(pkg.dev_dependencies.into_keys())
                .collect();
            deps.sort();
            deps.dedup();
            deps
        }
        Err(err) => {
            eprintln!("warning: failed to parse package.json: {err}.");
            Vec::new()
        }
    }
}

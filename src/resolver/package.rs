//! Package-manifest search: match `name` against `package_dependencies`
//! after optionally stripping a configured prefix.

use regex::RegexBuilder;

use crate::config::Configuration;
use crate::error::ImportJsError;
use crate::js_module::JsModule;
use crate::name_formatter::formatted_to_regex;

/// §4.4 step 5: `^(?:<ignore_prefixes>)?<pattern>$` against every dependency.
pub fn search_dependencies(
    name: &str,
    current_file: &std::path::Path,
    config: &Configuration,
) -> Result<Vec<JsModule>, ImportJsError> {
    let pattern = formatted_to_regex(name);
    let prefixes = config.get_ignore_package_prefixes(Some(current_file));

    let full_pattern = if prefixes.is_empty() {
        format!("^{pattern}$")
    } else {
        let alternation = prefixes
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        format!("^(?:{alternation})?{pattern}$")
    };

    let re = RegexBuilder::new(&full_pattern)
        .case_insensitive(true)
        .build()
        .map_err(|err| ImportJsError::Find(format!("invalid package search pattern for `{name}`: {err}")))?;

    Ok(config
        .package_dependencies
        .iter()
        .filter(|dep| re.is_match(dep))
        .map(|dep| JsModule::from_package_dependency(dep, config))
        .collect())
}

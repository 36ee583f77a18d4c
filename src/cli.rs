//! CLI front door.
//!
//! Helpers behind the `irwalk` subcommands:
//! - `walk` - identity walk; reports the rebuilt tree and the visit count
//! - `trace` - records every visited node with the context it was offered in
//!
//! Trees are read as JSON (see [`irwalk_core::node`]). Opaque units in the
//! input are expanded with [`JsonExpander`].
//!
//! ## Error Handling
//!
//! All functions return `Result<T, WalkError>`. The binary turns errors into
//! an `ErrorResponse` on stdout and uses the error code as exit status.

use std::fs;
use std::path::Path;

use tracing::info;

use irwalk_core::output::{TraceResponse, WalkResponse};
use irwalk_core::{Node, Verbosity, WalkConfig, WalkError};
use irwalk_walk::{ContextRecorder, Counting, JsonExpander, Walker};

/// Command-line values that override the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub verbosity: Option<Verbosity>,
    pub copy_routine: Option<String>,
    pub max_nesting: Option<usize>,
}

/// Build the walker configuration: defaults, then the file, then overrides.
pub fn load_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<WalkConfig, WalkError> {
    let mut config = match path {
        Some(path) => WalkConfig::load(path)?,
        None => WalkConfig::default(),
    };
    if let Some(verbosity) = overrides.verbosity {
        config = config.with_verbosity(verbosity);
    }
    if let Some(name) = &overrides.copy_routine {
        config = config.with_copy_routine(name.clone());
    }
    if let Some(limit) = overrides.max_nesting {
        config = config.with_max_nesting(limit);
    }
    config.validate()
}

/// Read a JSON-encoded tree.
pub fn read_tree(path: &Path) -> Result<Node, WalkError> {
    let text = fs::read_to_string(path).map_err(|e| {
        WalkError::invalid_input(format!("cannot read {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Walk the tree in `input` with the identity callback.
pub fn run_walk(input: &Path, config: WalkConfig) -> Result<WalkResponse, WalkError> {
    let tree = read_tree(input)?;
    let walker = Walker::new(config).with_expander(JsonExpander);
    let mut visited = 0usize;
    let tree = walker.walk(tree, &mut Counting, &mut visited)?;
    info!("walked {}: {} nodes offered", input.display(), visited);
    Ok(WalkResponse::new(tree, visited))
}

/// Walk the tree in `input`, recording every offered node.
pub fn run_trace(input: &Path, config: WalkConfig) -> Result<TraceResponse, WalkError> {
    let tree = read_tree(input)?;
    let walker = Walker::new(config).with_expander(JsonExpander);
    let mut entries = Vec::new();
    walker.walk(tree, &mut ContextRecorder, &mut entries)?;
    info!("traced {}: {} entries", input.display(), entries.len());
    Ok(TraceResponse::new(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_json(value: &serde_json::Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", value).unwrap();
        file
    }

    #[test]
    fn overrides_win_over_file_values() {
        let file = write_json(&serde_json::json!({"copy_routine": "deepcopy", "max_nesting": 64}));
        let overrides = ConfigOverrides {
            max_nesting: Some(32),
            ..Default::default()
        };
        let config = load_config(Some(file.path()), &overrides).unwrap();
        assert_eq!(config.copy_routine, "deepcopy");
        assert_eq!(config.max_nesting, 32);
    }

    #[test]
    fn overrides_are_validated() {
        let overrides = ConfigOverrides {
            copy_routine: Some(String::new()),
            ..Default::default()
        };
        let err = load_config(None, &overrides).unwrap_err();
        assert!(matches!(err, WalkError::InvalidInput { .. }));
    }

    #[test]
    fn run_walk_counts_visits() {
        let file = write_json(&serde_json::json!({"composite": {"kind": "call", "children": [
            {"leaf": {"symbol": "f"}},
            {"leaf": {"scalar": {"int": 1}}}
        ]}}));
        let response = run_walk(file.path(), WalkConfig::default()).unwrap();
        assert_eq!(response.visited, 2);
        assert_eq!(response.tree.to_string(), "(call f 1)");
    }

    #[test]
    fn read_tree_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"composite\": ").unwrap();
        let err = read_tree(file.path()).unwrap_err();
        assert!(err.to_string().contains("JSON error"));
    }
}

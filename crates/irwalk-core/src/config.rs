//! Walker configuration.
//!
//! A [`WalkConfig`] is handed to the walker when it is built. Nothing in the
//! engine reads global state: trace output, the copy routine name used when
//! rewriting copy markers, and the nesting limit all come from here.
//!
//! Configuration files are JSON; every field is optional:
//!
//! ```json
//! { "verbosity": "summary", "copy_routine": "copy", "max_nesting": 512 }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{WalkError, WalkResult};

/// Callee symbol that copy markers are rewritten into.
pub const DEFAULT_COPY_ROUTINE: &str = "copy";

/// Default limit on recursive nesting before a walk is refused.
///
/// The walker grows its stack on the heap when a thread's stack runs low, so
/// this limit, not the thread stack, bounds the memory a pathologically deep
/// tree can claim.
pub const DEFAULT_MAX_NESTING: usize = 512;

/// How much diagnostic trace output the walker emits.
///
/// The walker checks this before building trace events, so `Quiet` costs
/// nothing beyond the comparison.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// No trace output.
    #[default]
    Quiet,
    /// Expansions, kind rewrites and rejections.
    Summary,
    /// Every visited node.
    Nodes,
}

/// Configuration for a walker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    pub verbosity: Verbosity,
    /// Callee symbol used when a copy marker becomes a call.
    pub copy_routine: String,
    /// Maximum recursion nesting; deeper trees fail with
    /// [`WalkError::NestingTooDeep`] before they can exhaust memory through
    /// stack growth.
    pub max_nesting: usize,
}

impl Default for WalkConfig {
    fn default() -> Self {
        WalkConfig {
            verbosity: Verbosity::Quiet,
            copy_routine: DEFAULT_COPY_ROUTINE.to_string(),
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

impl WalkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_copy_routine(mut self, name: impl Into<String>) -> Self {
        self.copy_routine = name.into();
        self
    }

    pub fn with_max_nesting(mut self, limit: usize) -> Self {
        self.max_nesting = limit;
        self
    }

    /// Whether trace output at `level` is enabled.
    pub fn traces(&self, level: Verbosity) -> bool {
        level != Verbosity::Quiet && self.verbosity >= level
    }

    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> WalkResult<Self> {
        let config: WalkConfig = serde_json::from_str(text)?;
        config.validate()
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> WalkResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            WalkError::invalid_input(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    /// Reject settings the walker cannot run with.
    pub fn validate(self) -> WalkResult<Self> {
        if self.copy_routine.is_empty() {
            return Err(WalkError::invalid_input("copy_routine must not be empty"));
        }
        if self.max_nesting == 0 {
            return Err(WalkError::invalid_input("max_nesting must be at least 1"));
        }
        Ok(self)
    }
}

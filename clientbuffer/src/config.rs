//! Module configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settings for one [`SuppressionEngine`](crate::SuppressionEngine)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EngineConfig {
    /// Register every identified client automatically when it logs in
    pub autoadd: bool,
    pub parser: ParserConfig,
}

/// Controls which lines the [`LineParser`](crate::LineParser) attributes to a
/// target.
///
/// The numeric table exists because upstream servers differ in the replies
/// they send during channel attach; only 353 is known to need an override.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ParserConfig {
    /// Commands whose first parameter is the target
    pub target_commands: Vec<String>,
    /// Parameter index of the target for numerics not listed in `numeric_targets`
    pub default_numeric_target: usize,
    /// Per-numeric parameter index of the target, keyed by three-digit code
    pub numeric_targets: BTreeMap<String, usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            target_commands: ["PRIVMSG", "NOTICE", "JOIN", "PART", "MODE", "KICK", "TOPIC"]
                .into_iter()
                .map(String::from)
                .collect(),
            // parameter 0 of a numeric is always our own nick
            default_numeric_target: 1,
            numeric_targets: [("353".to_string(), 2)].into_iter().collect(),
        }
    }
}

impl ParserConfig {
    pub fn numeric_target(&self, code: &str) -> usize {
        self.numeric_targets
            .get(code)
            .copied()
            .unwrap_or(self.default_numeric_target)
    }

    pub fn is_target_command(&self, command: &str) -> bool {
        self.target_commands
            .iter()
            .any(|c| c.eq_ignore_ascii_case(command))
    }
}

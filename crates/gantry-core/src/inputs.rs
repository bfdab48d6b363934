use std::collections::HashMap;

use crate::context::ActionEnv;

/// Default mention phrase looked for in comment and issue bodies.
pub const DEFAULT_TRIGGER_PHRASE: &str = "@claude";
/// Default prefix for agent working branches.
pub const DEFAULT_BRANCH_PREFIX: &str = "claude/";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `GateInputs` used across Gantry components.
pub struct GateInputs {
    pub mode: String,
    pub trigger_phrase: String,
    pub assignee_trigger: String,
    pub label_trigger: String,
    pub allowed_tools: Vec<String>,
    pub disallowed_tools: Vec<String>,
    pub custom_instructions: String,
    pub direct_prompt: String,
    pub override_prompt: String,
    pub base_branch: Option<String>,
    pub branch_prefix: String,
    pub use_sticky_comment: bool,
    pub additional_permissions: HashMap<String, String>,
    pub use_commit_signing: bool,
}

impl Default for GateInputs {
    fn default() -> Self {
        Self {
            mode: crate::modes::registry::DEFAULT_MODE.to_string(),
            trigger_phrase: DEFAULT_TRIGGER_PHRASE.to_string(),
            assignee_trigger: String::new(),
            label_trigger: String::new(),
            allowed_tools: Vec::new(),
            disallowed_tools: Vec::new(),
            custom_instructions: String::new(),
            direct_prompt: String::new(),
            override_prompt: String::new(),
            base_branch: None,
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
            use_sticky_comment: false,
            additional_permissions: HashMap::new(),
            use_commit_signing: false,
        }
    }
}

impl GateInputs {
    /// Assembles the inputs block from workflow configuration. The mode name
    /// has already been validated by the normalizer.
    pub fn from_env(mode: &str, env: &ActionEnv) -> Self {
        Self {
            mode: mode.to_string(),
            trigger_phrase: env.var_or("TRIGGER_PHRASE", DEFAULT_TRIGGER_PHRASE),
            assignee_trigger: env.var_or("ASSIGNEE_TRIGGER", ""),
            label_trigger: env.var_or("LABEL_TRIGGER", ""),
            allowed_tools: parse_multiline_input(&env.var_or("ALLOWED_TOOLS", "")),
            disallowed_tools: parse_multiline_input(&env.var_or("DISALLOWED_TOOLS", "")),
            custom_instructions: env.var_or("CUSTOM_INSTRUCTIONS", ""),
            direct_prompt: env.var_or("DIRECT_PROMPT", ""),
            override_prompt: env.var_or("OVERRIDE_PROMPT", ""),
            base_branch: env.var("BASE_BRANCH").map(ToString::to_string),
            branch_prefix: env.var_or("BRANCH_PREFIX", DEFAULT_BRANCH_PREFIX),
            use_sticky_comment: env.var("USE_STICKY_COMMENT") == Some("true"),
            additional_permissions: parse_additional_permissions(
                &env.var_or("ADDITIONAL_PERMISSIONS", ""),
            ),
            use_commit_signing: env.var("USE_COMMIT_SIGNING") == Some("true"),
        }
    }
}

/// Splits a tool list on commas or newline runs, stripping inline `#`
/// comment suffixes. Order and duplicates are preserved.
pub fn parse_multiline_input(raw: &str) -> Vec<String> {
    raw.split(|c| c == ',' || c == '\n' || c == '\r')
        .map(|token| token.find('#').map_or(token, |at| &token[..at]))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Parses a `key: value` block into a map. Lines without a colon, or with an
/// empty key or value after trimming, are dropped silently.
pub fn parse_additional_permissions(raw: &str) -> HashMap<String, String> {
    let mut permissions = HashMap::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if !key.is_empty() && !value.is_empty() {
            permissions.insert(key.to_string(), value.to_string());
        }
    }
    permissions
}

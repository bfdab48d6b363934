use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Appends step outputs and exported environment variables to the files the
/// workflow runner points `GITHUB_OUTPUT` / `GITHUB_ENV` at. Multiline values
/// use the runner's heredoc form.
pub struct ActionOutputs {
    output_path: Option<PathBuf>,
    env_path: Option<PathBuf>,
}

impl ActionOutputs {
    pub fn new(output_path: Option<PathBuf>, env_path: Option<PathBuf>) -> Self {
        Self {
            output_path,
            env_path,
        }
    }

    pub fn from_process_env() -> Self {
        Self {
            output_path: std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from),
            env_path: std::env::var_os("GITHUB_ENV").map(PathBuf::from),
        }
    }

    pub fn set_output(&self, key: &str, value: &str) -> Result<()> {
        let Some(path) = self.output_path.as_deref() else {
            tracing::warn!(key, "GITHUB_OUTPUT is not set; dropping step output");
            return Ok(());
        };
        append_entry(path, key, value)
    }

    pub fn export_env(&self, key: &str, value: &str) -> Result<()> {
        let Some(path) = self.env_path.as_deref() else {
            tracing::warn!(key, "GITHUB_ENV is not set; dropping exported variable");
            return Ok(());
        };
        append_entry(path, key, value)
    }
}

fn append_entry(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    if value.contains('\n') {
        let mut delimiter = "GANTRY_EOF".to_string();
        while value.contains(&delimiter) {
            delimiter.push('_');
        }
        writeln!(file, "{key}<<{delimiter}\n{value}\n{delimiter}")
            .with_context(|| format!("failed to append to {}", path.display()))?;
    } else {
        writeln!(file, "{key}={value}")
            .with_context(|| format!("failed to append to {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ActionOutputs;

    #[test]
    fn functional_set_output_appends_key_value_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("output");
        let outputs = ActionOutputs::new(Some(path.clone()), None);
        outputs.set_output("contains_trigger", "true").expect("set");
        outputs.set_output("claude_comment_id", "99").expect("set");
        let written = std::fs::read_to_string(&path).expect("read");
        assert_eq!(written, "contains_trigger=true\nclaude_comment_id=99\n");
    }

    #[test]
    fn functional_multiline_values_use_heredoc_form() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("output");
        let outputs = ActionOutputs::new(Some(path.clone()), None);
        outputs
            .set_output("mcp_config", "{\n  \"a\": 1\n}")
            .expect("set");
        let written = std::fs::read_to_string(&path).expect("read");
        assert!(written.starts_with("mcp_config<<GANTRY_EOF\n"));
        assert!(written.ends_with("\nGANTRY_EOF\n"));
    }

    #[test]
    fn regression_missing_output_file_is_tolerated() {
        let outputs = ActionOutputs::new(None, None);
        assert!(outputs.set_output("key", "value").is_ok());
        assert!(outputs.export_env("KEY", "value").is_ok());
    }

    #[test]
    fn regression_heredoc_delimiter_avoids_collision_with_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("output");
        let outputs = ActionOutputs::new(Some(path.clone()), None);
        outputs
            .set_output("tricky", "line1\nGANTRY_EOF\nline3")
            .expect("set");
        let written = std::fs::read_to_string(&path).expect("read");
        assert!(written.starts_with("tricky<<GANTRY_EOF_\n"));
        assert!(written.ends_with("\nGANTRY_EOF_\n"));
    }
}

//! Configuration for the coordinator.
//!
//! # Security
//!
//! - Config file permission validation on Unix systems
//! - Rejects world-writable files, and world-readable files holding API keys
//! - Warns about API keys stored in config files

use carelink_llm::LlmConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::llm_resolver::DEFAULT_MAX_INPUT_CHARS;

pub const DEFAULT_GREETING: &str = "Welcome to the hospital information desk. I can help with \
    patient registration, appointments, medical records, and billing or insurance. \
    How can I help you today?";

/// Main coordinator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Simulated remote-operation delay inside a delegated execution
    #[serde(default = "default_handler_delay_ms")]
    pub handler_delay_ms: u64,

    /// Prior log entries forwarded to the resolver as context
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,

    /// Seeded as the first Coordinator entry of a fresh log
    #[serde(default = "default_greeting")]
    pub greeting: Option<String>,

    /// Longer user text is refused before reaching the model
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    Llm,
    #[default]
    Keyword,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub kind: ResolverKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmConfig>,
}

fn default_handler_delay_ms() -> u64 {
    1500
}

fn default_context_turns() -> usize {
    6
}

fn default_greeting() -> Option<String> {
    Some(DEFAULT_GREETING.to_string())
}

fn default_max_input_chars() -> usize {
    DEFAULT_MAX_INPUT_CHARS
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            handler_delay_ms: default_handler_delay_ms(),
            context_turns: default_context_turns(),
            greeting: default_greeting(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

impl CoordinatorConfig {
    /// Defaults with no handler delay and no greeting, for tests and scripts.
    pub fn immediate() -> Self {
        Self {
            handler_delay_ms: 0,
            greeting: None,
            ..Self::default()
        }
    }

    pub fn handler_delay(&self) -> Duration {
        Duration::from_millis(self.handler_delay_ms)
    }

    /// Load configuration from a TOML file.
    ///
    /// On Unix the file must be a regular file, must not be world-writable,
    /// and must not be world-readable if it holds an API key.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        #[cfg(unix)]
        validate_config_file_permissions(path)?;

        let config = Self::from_file_unchecked(path)?;

        let has_key = config
            .resolver
            .llm
            .as_ref()
            .is_some_and(|llm| llm.api_key.as_deref().is_some_and(|k| !k.is_empty()));
        if has_key {
            warn!(
                "API key found in config file '{}'. For better security, \
                 use environment variables instead (OPENAI_API_KEY, ANTHROPIC_API_KEY).",
                path.display()
            );
        }

        Ok(config)
    }

    /// Load configuration from a TOML file without permission checks.
    pub fn from_file_unchecked(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(unix)]
fn validate_config_file_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

    if !metadata.is_file() {
        anyhow::bail!("Config path '{}' is not a regular file", path.display());
    }

    let permission_bits = metadata.permissions().mode() & 0o777;

    if permission_bits & 0o002 != 0 {
        anyhow::bail!(
            "Config file '{}' is world-writable (mode {:04o}). Fix with: chmod o-w {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    let content = std::fs::read_to_string(path).unwrap_or_default();
    let has_api_key = content.lines().any(|line| {
        let line = line.trim_start();
        line.starts_with("api_key") && line.contains('=')
    });

    if has_api_key && permission_bits & 0o004 != 0 {
        anyhow::bail!(
            "Config file '{}' contains an API key but is world-readable (mode {:04o}). \
             Fix with: chmod 600 {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_when_file_is_empty() {
        let file = write_config("");
        let config = CoordinatorConfig::from_file_unchecked(file.path()).unwrap();
        assert_eq!(config.resolver.kind, ResolverKind::Keyword);
        assert!(config.resolver.llm.is_none());
        assert_eq!(config.handler_delay_ms, 1500);
        assert_eq!(config.context_turns, 6);
        assert_eq!(config.max_input_chars, 10_000);
        assert_eq!(config.greeting.as_deref(), Some(DEFAULT_GREETING));
    }

    #[test]
    fn parses_llm_section() {
        let file = write_config(
            r#"
handler_delay_ms = 0
context_turns = 4

[resolver]
kind = "llm"

[resolver.llm]
provider = "anthropic"
model = "claude-sonnet"
timeout_ms = 5000

[resolver.llm.retry]
max_retries = 1
"#,
        );
        let config = CoordinatorConfig::from_file_unchecked(file.path()).unwrap();
        assert_eq!(config.resolver.kind, ResolverKind::Llm);
        let llm = config.resolver.llm.as_ref().unwrap();
        assert_eq!(llm.provider, "anthropic");
        assert_eq!(llm.timeout_ms, 5000);
        assert!((llm.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(llm.retry.max_retries, 1);
        assert_eq!(config.handler_delay(), Duration::ZERO);
        assert_eq!(config.context_turns, 4);
    }

    #[test]
    fn rejects_unknown_resolver_kind() {
        let file = write_config("[resolver]\nkind = \"oracle\"\n");
        assert!(CoordinatorConfig::from_file_unchecked(file.path()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn refuses_world_writable_file() {
        use std::os::unix::fs::PermissionsExt;

        let file = write_config("handler_delay_ms = 0\n");
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o666)).unwrap();
        let err = CoordinatorConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("world-writable"));

        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o600)).unwrap();
        assert!(CoordinatorConfig::from_file(file.path()).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn refuses_world_readable_file_with_key() {
        use std::os::unix::fs::PermissionsExt;

        let file = write_config(
            "[resolver.llm]\nprovider = \"openai\"\nmodel = \"gpt-4o-mini\"\napi_key = \"sk-test\"\n",
        );
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o644)).unwrap();
        let err = CoordinatorConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("world-readable"));
    }
}

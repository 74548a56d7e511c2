//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables (`AGENTWATCH_*`)
//! - CLI arguments (for the `agentwatch` binary)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};

/// Upper bound on masked samples kept per PII type.
pub const MAX_PII_SAMPLES: usize = 5;

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Audit log configuration
    #[serde(default)]
    pub audit: AuditConfig,

    /// Threat detection configuration
    #[serde(default)]
    pub threat: ThreatConfig,

    /// PII scanning configuration
    #[serde(default)]
    pub privacy: PrivacyConfig,

    /// Score and summary windows
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| GuardError::Config(format!("Failed to read config file: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| GuardError::Config(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `AGENTWATCH_*` environment variables on top of `self`.
    ///
    /// Unset or unparsable variables leave the current value in place.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = var("AGENTWATCH_AUDIT_CAPACITY").and_then(|v| v.parse().ok()) {
            self.audit.capacity = val;
        }
        if let Some(val) = var("AGENTWATCH_MAX_CONTENT_BYTES").and_then(|v| v.parse().ok()) {
            self.threat.max_content_bytes = val;
        }
        if let Some(val) = var("AGENTWATCH_PII_SAMPLES").and_then(|v| v.parse().ok()) {
            self.privacy.max_samples = val;
        }
        if let Some(val) = var("AGENTWATCH_SCORE_WINDOW_SECS").and_then(|v| v.parse().ok()) {
            self.scoring.score_window_secs = val;
        }
        if let Some(val) = var("AGENTWATCH_SUMMARY_WINDOW_SECS").and_then(|v| v.parse().ok()) {
            self.scoring.summary_window_secs = val;
        }
        self
    }

    /// Default config file location (`<config_dir>/agentwatch/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("agentwatch").join("config.toml"))
    }

    /// Load the file at the default path (or defaults when absent), then
    /// apply environment overrides. Environment variables win over the file.
    pub fn load() -> Result<Self> {
        let base = match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(path)?,
            _ => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.audit.capacity == 0 {
            return Err(GuardError::Config(
                "audit.capacity must be at least 1".to_string(),
            ));
        }
        if self.scoring.score_window_secs == 0 || self.scoring.summary_window_secs == 0 {
            return Err(GuardError::Config(
                "scoring windows must be non-zero".to_string(),
            ));
        }
        for rule in &self.threat.custom_rules {
            if rule.name.trim().is_empty() || rule.category.trim().is_empty() {
                return Err(GuardError::Config(format!(
                    "custom rule `{}` needs a name and a category",
                    rule.pattern
                )));
            }
        }
        Ok(())
    }
}

/// Audit log configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Maximum entries retained per log (security and compliance)
    pub capacity: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { capacity: 1000 }
    }
}

/// Threat detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatConfig {
    /// Content above this size is flagged as `oversized_payload`
    pub max_content_bytes: usize,

    /// Extra rules appended to the built-in catalog
    pub custom_rules: Vec<CustomRule>,
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self {
            max_content_bytes: 100_000,
            custom_rules: Vec::new(),
        }
    }
}

/// User-supplied threat rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRule {
    /// Rule name, reported in matches
    pub name: String,
    /// Threat category; categories outside the severity map score `medium`
    pub category: String,
    /// Regex source
    pub pattern: String,
}

/// PII scanning configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    /// Masked samples reported per PII type (1..=5)
    pub max_samples: usize,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            max_samples: MAX_PII_SAMPLES,
        }
    }
}

impl PrivacyConfig {
    /// Sample limit clamped to the supported range
    pub fn sample_limit(&self) -> usize {
        self.max_samples.clamp(1, MAX_PII_SAMPLES)
    }
}

/// Score and summary windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Window for security/compliance scores
    pub score_window_secs: u64,

    /// Window for the "recent" counters in summaries
    pub summary_window_secs: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            score_window_secs: 86_400,  // 24 hours
            summary_window_secs: 3_600, // 1 hour
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.audit.capacity, 1000);
        assert_eq!(config.threat.max_content_bytes, 100_000);
        assert_eq!(config.privacy.max_samples, 5);
        assert_eq!(config.scoring.score_window_secs, 86_400);
        assert_eq!(config.scoring.summary_window_secs, 3_600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sample_limit_clamped() {
        assert_eq!(PrivacyConfig { max_samples: 0 }.sample_limit(), 1);
        assert_eq!(PrivacyConfig { max_samples: 3 }.sample_limit(), 3);
        assert_eq!(PrivacyConfig { max_samples: 50 }.sample_limit(), 5);
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [audit]
            capacity = 250

            [threat]
            max_content_bytes = 2048

            [[threat.custom_rules]]
            name = "prompt_leak"
            category = "prompt_injection"
            pattern = '(?i)reveal\s+your\s+system\s+prompt'

            [scoring]
            summary_window_secs = 600
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.audit.capacity, 250);
        assert_eq!(config.threat.max_content_bytes, 2048);
        assert_eq!(config.threat.custom_rules.len(), 1);
        assert_eq!(config.threat.custom_rules[0].category, "prompt_injection");
        assert_eq!(config.scoring.summary_window_secs, 600);
        // untouched fields keep their defaults
        assert_eq!(config.scoring.score_window_secs, 86_400);
        assert_eq!(config.privacy.max_samples, 5);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[privacy]\nmax_samples = 3\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.privacy.max_samples, 3);
    }

    #[test]
    fn test_env_overrides_apply_on_top_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[audit]\ncapacity = 250\n\n[privacy]\nmax_samples = 3\n").unwrap();

        let env = |key: &str| match key {
            "AGENTWATCH_AUDIT_CAPACITY" => Some("40".to_string()),
            "AGENTWATCH_SUMMARY_WINDOW_SECS" => Some("not-a-number".to_string()),
            _ => None,
        };
        let config = Config::from_file(&path).unwrap().with_overrides(env);

        assert_eq!(config.audit.capacity, 40);
        // file value survives when the variable is unset
        assert_eq!(config.privacy.max_samples, 3);
        // unparsable values are ignored
        assert_eq!(config.scoring.summary_window_secs, 3_600);
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, GuardError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = Config::default();
        config.audit.capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unnamed_rule() {
        let mut config = Config::default();
        config.threat.custom_rules.push(CustomRule {
            name: " ".to_string(),
            category: "x".to_string(),
            pattern: "x".to_string(),
        });
        assert!(config.validate().is_err());
    }
}

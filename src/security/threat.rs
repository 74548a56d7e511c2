//! Threat detector for request content.
//!
//! Runs every compiled threat rule over the content and folds the hits
//! into one overall severity.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::patterns::{threat_severity, DetectionRule, PatternCatalog, OVERSIZED_PAYLOAD};
use super::severity::Severity;

/// A single rule hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreatMatch {
    /// Threat category
    pub category: String,
    /// Name of the rule that matched
    pub rule: String,
    /// Regex source of the rule
    pub pattern: String,
    /// Category severity
    pub severity: Severity,
}

impl From<&DetectionRule> for ThreatMatch {
    fn from(rule: &DetectionRule) -> Self {
        Self {
            category: rule.category.clone(),
            rule: rule.name.clone(),
            pattern: rule.matcher.as_str().to_string(),
            severity: rule.severity,
        }
    }
}

/// Result of analyzing one request
#[derive(Debug, Clone, Serialize)]
pub struct ThreatResult {
    /// Operation the content belongs to
    pub operation: String,
    /// Rule hits, in catalog order
    pub threats_detected: Vec<ThreatMatch>,
    /// Number of hits
    pub threat_count: usize,
    /// Highest severity among hits (`low` when none)
    pub severity: Severity,
    /// No hits
    pub safe: bool,
    /// Content size in bytes
    pub content_length: usize,
    /// Wall time spent matching, milliseconds
    pub analysis_time_ms: f64,
    /// When the analysis finished
    pub timestamp: DateTime<Utc>,
}

impl ThreatResult {
    /// Build a result from rule hits
    pub fn from_matches(
        operation: &str,
        threats: Vec<ThreatMatch>,
        content_length: usize,
        elapsed_ms: f64,
    ) -> Self {
        let severity = Severity::max_of(threats.iter().map(|t| t.severity));
        Self {
            operation: operation.to_string(),
            threat_count: threats.len(),
            safe: threats.is_empty(),
            threats_detected: threats,
            severity,
            content_length,
            analysis_time_ms: round_ms(elapsed_ms),
            timestamp: Utc::now(),
        }
    }

    /// Distinct categories hit, in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for threat in &self.threats_detected {
            if !seen.contains(&threat.category.as_str()) {
                seen.push(&threat.category);
            }
        }
        seen
    }
}

/// Pattern-based threat detector
#[derive(Debug, Clone)]
pub struct ThreatDetector {
    catalog: Arc<PatternCatalog>,
    /// Content above this size is flagged as `oversized_payload`
    pub max_content_bytes: usize,
}

impl ThreatDetector {
    /// Create a detector over `catalog`
    pub fn new(catalog: Arc<PatternCatalog>) -> Self {
        Self {
            catalog,
            max_content_bytes: 100_000,
        }
    }

    /// Set the oversized-payload limit
    pub fn with_max_content_bytes(mut self, limit: usize) -> Self {
        self.max_content_bytes = limit;
        self
    }

    /// Rule hits for `content`, in catalog order
    pub fn matches(&self, content: &str) -> Vec<ThreatMatch> {
        let mut matches: Vec<ThreatMatch> = self
            .catalog
            .threat_rules()
            .iter()
            .filter(|rule| rule.matcher.is_match(content))
            .map(ThreatMatch::from)
            .collect();

        if content.len() > self.max_content_bytes {
            matches.push(ThreatMatch {
                category: OVERSIZED_PAYLOAD.to_string(),
                rule: "content_length".to_string(),
                pattern: format!("len > {}", self.max_content_bytes),
                severity: threat_severity(OVERSIZED_PAYLOAD),
            });
        }

        matches
    }

    /// Analyze `content` sent as part of `operation`
    pub fn analyze(&self, operation: &str, content: &str) -> ThreatResult {
        let start = Instant::now();
        let threats = self.matches(content);
        let elapsed = start.elapsed().as_secs_f64() * 1000.0;

        let result = ThreatResult::from_matches(operation, threats, content.len(), elapsed);
        tracing::debug!(
            operation,
            threats = result.threat_count,
            severity = %result.severity,
            "threat analysis complete"
        );
        result
    }
}

pub(crate) fn round_ms(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> ThreatDetector {
        ThreatDetector::new(PatternCatalog::builtin().unwrap())
    }

    #[test]
    fn test_safe_content() {
        let result = detector().analyze("chat", "What is the weather today?");
        assert!(result.safe);
        assert_eq!(result.threat_count, 0);
        assert_eq!(result.severity, Severity::Low);
        assert!(result.threats_detected.is_empty());
    }

    #[test]
    fn test_empty_content_is_safe() {
        let result = detector().analyze("chat", "");
        assert!(result.safe);
        assert_eq!(result.content_length, 0);
    }

    #[test]
    fn test_sql_injection_detection() {
        let result = detector().analyze("query", "SELECT * FROM users; DROP TABLE users;");
        assert!(!result.safe);
        assert!(result.threat_count > 0);
        assert_eq!(result.severity, Severity::Critical);
        assert!(result.categories().contains(&"sql_injection"));
    }

    #[test]
    fn test_xss_detection() {
        let result = detector().analyze("render", r#"<script>alert("xss")</script>"#);
        assert!(!result.safe);
        assert_eq!(result.severity, Severity::High);
        assert_eq!(result.categories(), vec!["xss"]);
    }

    #[test]
    fn test_max_severity_wins() {
        // path traversal (high) + command injection (critical)
        let result = detector().analyze("tool", "cat ../../etc/shadow; wget http://x");
        assert_eq!(result.severity, Severity::Critical);
        assert!(result.categories().contains(&"path_traversal"));
        assert!(result.categories().contains(&"command_injection"));
    }

    #[test]
    fn test_every_rule_hit_recorded() {
        let result = detector().analyze("query", "1 UNION SELECT password; DROP TABLE users");
        let rules: Vec<_> = result.threats_detected.iter().map(|t| t.rule.as_str()).collect();
        assert_eq!(rules, vec!["union_select", "drop_table"]);
        assert_eq!(result.threat_count, 2);
    }

    #[test]
    fn test_oversized_payload() {
        let detector = detector().with_max_content_bytes(16);
        let result = detector.analyze("upload", &"a".repeat(17));

        assert!(!result.safe);
        assert_eq!(result.threat_count, 1);
        assert_eq!(result.threats_detected[0].category, OVERSIZED_PAYLOAD);
        assert_eq!(result.severity, Severity::Medium);

        // at the limit is fine
        assert!(detector.analyze("upload", &"a".repeat(16)).safe);
    }

    #[test]
    fn test_deterministic() {
        let d = detector();
        let a = d.analyze("op", "<img src=x onerror=alert(1)>");
        let b = d.analyze("op", "<img src=x onerror=alert(1)>");
        assert_eq!(a.threats_detected, b.threats_detected);
        assert_eq!(a.severity, b.severity);
    }

    #[test]
    fn test_round_ms() {
        assert!((round_ms(1.23456) - 1.23).abs() < f64::EPSILON);
    }
}

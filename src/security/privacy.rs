//! PII scanner.
//!
//! Finds personal data with the catalog's PII rules and reports it in
//! masked form only. Raw values never leave this module.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::patterns::{PatternCatalog, PiiKind};
use super::severity::{ComplianceStatus, Severity};
use super::threat::round_ms;
use crate::config::MAX_PII_SAMPLES;

/// Mask a sensitive value for reporting.
///
/// Values longer than 4 characters keep their first and last two
/// characters; everything else becomes `*`. Length (in characters) is
/// preserved.
///
/// ```
/// use agentwatch::security::mask_value;
///
/// assert_eq!(mask_value("john@example.com"), "jo************om");
/// assert_eq!(mask_value("1234"), "****");
/// ```
pub fn mask_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    if len <= 4 {
        return "*".repeat(len);
    }
    let mut masked = String::with_capacity(value.len());
    masked.extend(&chars[..2]);
    masked.push_str(&"*".repeat(len - 4));
    masked.extend(&chars[len - 2..]);
    masked
}

/// PII of one kind found in a text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PiiMatch {
    /// PII kind
    #[serde(rename = "type")]
    pub pii_type: PiiKind,
    /// Number of occurrences
    pub count: usize,
    /// Masked forms of the first few occurrences
    pub samples: Vec<String>,
    /// Severity of the kind
    pub severity: Severity,
}

/// Result of a privacy check
#[derive(Debug, Clone, Serialize)]
pub struct PrivacyResult {
    /// PII found, one entry per kind
    pub pii_detected: Vec<PiiMatch>,
    /// Number of kinds found
    pub pii_types_count: usize,
    /// Occurrences across all kinds
    pub total_pii_instances: usize,
    /// Derived compliance status
    pub compliance_status: ComplianceStatus,
    /// Severity mirroring the status
    pub severity: Severity,
    /// No PII found
    pub privacy_safe: bool,
    /// Text size in bytes
    pub text_length: usize,
    /// Wall time spent matching, milliseconds
    pub analysis_time_ms: f64,
    /// When the scan finished
    pub timestamp: DateTime<Utc>,
}

impl PrivacyResult {
    /// Build a result from per-kind matches
    pub fn from_matches(pii: Vec<PiiMatch>, text_length: usize, elapsed_ms: f64) -> Self {
        let compliance_status = ComplianceStatus::from_severities(pii.iter().map(|p| p.severity));
        Self {
            pii_types_count: pii.len(),
            total_pii_instances: pii.iter().map(|p| p.count).sum(),
            privacy_safe: pii.is_empty(),
            pii_detected: pii,
            compliance_status,
            severity: compliance_status.severity(),
            text_length,
            analysis_time_ms: round_ms(elapsed_ms),
            timestamp: Utc::now(),
        }
    }

    /// Kinds found, in catalog order
    pub fn pii_types(&self) -> Vec<PiiKind> {
        self.pii_detected.iter().map(|p| p.pii_type).collect()
    }

    /// Entry for `kind`, if found
    pub fn get(&self, kind: PiiKind) -> Option<&PiiMatch> {
        self.pii_detected.iter().find(|p| p.pii_type == kind)
    }
}

/// Regex-based PII scanner
#[derive(Debug, Clone)]
pub struct PrivacyScanner {
    catalog: Arc<PatternCatalog>,
    max_samples: usize,
}

impl PrivacyScanner {
    /// Create a scanner over `catalog`
    pub fn new(catalog: Arc<PatternCatalog>) -> Self {
        Self {
            catalog,
            max_samples: MAX_PII_SAMPLES,
        }
    }

    /// Limit masked samples per kind (clamped to 1..=5)
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples.clamp(1, MAX_PII_SAMPLES);
        self
    }

    /// Per-kind matches for `text`
    pub fn matches(&self, text: &str) -> Vec<PiiMatch> {
        self.catalog
            .pii_rules()
            .iter()
            .filter_map(|rule| {
                let mut count = 0;
                let mut samples = Vec::new();
                for found in rule.matcher.find_iter(text) {
                    count += 1;
                    if samples.len() < self.max_samples {
                        samples.push(mask_value(found.as_str()));
                    }
                }
                (count > 0).then(|| PiiMatch {
                    pii_type: rule.kind,
                    count,
                    samples,
                    severity: rule.severity,
                })
            })
            .collect()
    }

    /// Scan `text` for PII
    pub fn scan(&self, text: &str) -> PrivacyResult {
        let start = Instant::now();
        let pii = self.matches(text);
        let elapsed = start.elapsed().as_secs_f64() * 1000.0;

        let result = PrivacyResult::from_matches(pii, text.len(), elapsed);
        tracing::debug!(
            pii_types = result.pii_types_count,
            instances = result.total_pii_instances,
            status = %result.compliance_status,
            "privacy scan complete"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> PrivacyScanner {
        PrivacyScanner::new(PatternCatalog::builtin().unwrap())
    }

    #[test]
    fn test_mask_value() {
        assert_eq!(mask_value("john@example.com"), format!("jo{}om", "*".repeat(12)));
        assert_eq!(mask_value("12345"), "12*45");
        assert_eq!(mask_value("abcd"), "****");
        assert_eq!(mask_value("a"), "*");
        assert_eq!(mask_value(""), "");
    }

    #[test]
    fn test_mask_multibyte() {
        assert_eq!(mask_value("żółwiątko"), "żó*****ko");
    }

    #[test]
    fn test_no_pii() {
        let result = scanner().scan("Hello, how are you today?");
        assert!(result.privacy_safe);
        assert_eq!(result.pii_types_count, 0);
        assert_eq!(result.compliance_status, ComplianceStatus::Compliant);
        assert_eq!(result.severity, Severity::Low);
    }

    #[test]
    fn test_email_is_warning() {
        let result = scanner().scan("Contact me at john.doe@example.com");
        assert!(!result.privacy_safe);
        let email = result.get(PiiKind::Email).unwrap();
        assert_eq!(email.count, 1);
        assert_eq!(email.samples, vec!["jo****************om".to_string()]);
        assert_eq!(result.compliance_status, ComplianceStatus::Warning);
        assert_eq!(result.severity, Severity::Medium);
    }

    #[test]
    fn test_phone_detection() {
        let result = scanner().scan("Call me at 555-123-4567");
        assert_eq!(result.pii_types(), vec![PiiKind::Phone]);
    }

    #[test]
    fn test_ssn_is_non_compliant() {
        let result = scanner().scan("My SSN is 123-45-6789 and email is a@b.com");
        assert_eq!(result.pii_types_count, 2);
        assert_eq!(result.total_pii_instances, 2);
        assert_eq!(result.compliance_status, ComplianceStatus::NonCompliant);
        assert_eq!(result.severity, Severity::High);

        let ssn = result.get(PiiKind::Ssn).unwrap();
        assert_eq!(ssn.severity, Severity::Critical);
        assert_eq!(ssn.samples, vec!["12*******89".to_string()]);
    }

    #[test]
    fn test_low_severity_only_is_warning() {
        let result = scanner().scan("see https://example.org/docs");
        assert_eq!(result.pii_types(), vec![PiiKind::Url]);
        assert_eq!(result.compliance_status, ComplianceStatus::Warning);
    }

    #[test]
    fn test_samples_are_capped() {
        let text: String = (0..8).map(|i| format!("user{i}@mail.com ")).collect();
        let result = scanner().with_max_samples(3).scan(&text);

        let email = result.get(PiiKind::Email).unwrap();
        assert_eq!(email.count, 8);
        assert_eq!(email.samples.len(), 3);
        assert!(email.samples.iter().all(|s| s.contains('*')));
    }

    #[test]
    fn test_samples_never_raw() {
        let result = scanner().scan("card 4111 1111 1111 1111, ssn 987-65-4321");
        for pii in &result.pii_detected {
            for sample in &pii.samples {
                assert!(!sample.contains("4111 1111 1111 1111"));
                assert!(!sample.contains("987-65-4321"));
            }
        }
    }
}

//! Security monitor facade.
//!
//! [`SecurityMonitor`] ties the detectors to the audit log and the score
//! calculator. It is the entry point the rest of an agent SDK calls:
//!
//! ```text
//!  text ──> ThreatDetector ──┐
//!                            ├──> EventLog ──> ScoreCalculator ──> SecuritySummary
//!  text ──> PrivacyScanner ──┘    (RwLock)
//! ```
//!
//! Every call is synchronous. The monitor is `Send + Sync` and can be
//! shared across threads behind an `Arc`.
//!
//! # Usage
//!
//! ```rust
//! use agentwatch::{ComplianceStatus, SecurityMonitor};
//!
//! let monitor = SecurityMonitor::new().unwrap();
//!
//! let threats = monitor.analyze_request_security("chat", "DROP TABLE users");
//! assert!(!threats.safe);
//!
//! let privacy = monitor.check_data_privacy("My SSN is 123-45-6789");
//! assert_eq!(privacy.compliance_status, ComplianceStatus::NonCompliant);
//!
//! let summary = monitor.get_security_summary();
//! assert_eq!(summary.total_security_events, 1);
//! assert_eq!(summary.total_compliance_logs, 1);
//! assert!(summary.security_score < 100.0);
//! ```

mod report;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

pub use report::{SecurityReport, SecuritySummary, REPORT_EVENT_TAIL, SUMMARY_TAIL};

use crate::audit::{ComplianceEvent, EventLog, Metadata, SecurityEvent};
use crate::config::Config;
use crate::error::Result;
use crate::scoring::{duration_from_secs, ScoreCalculator};
use crate::security::{
    ComplianceStatus, PatternCatalog, PrivacyResult, PrivacyScanner, Severity, ThreatDetector,
    ThreatResult,
};

/// Event type recorded for threat findings
pub const THREAT_DETECTION: &str = "threat_detection";

/// Compliance type recorded for PII scans
pub const PII_DETECTION: &str = "pii_detection";

/// Threat detection, PII scanning and audit scoring behind one handle
#[derive(Debug)]
pub struct SecurityMonitor {
    config: Config,
    threats: ThreatDetector,
    privacy: PrivacyScanner,
    scorer: ScoreCalculator,
    summary_window: Duration,
    log: RwLock<EventLog>,
}

impl SecurityMonitor {
    /// Monitor with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Monitor with `config`.
    ///
    /// Fails if the configuration is invalid or any rule does not compile.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let catalog = PatternCatalog::with_custom_rules(&config.threat.custom_rules)?;

        let threats = ThreatDetector::new(catalog.clone())
            .with_max_content_bytes(config.threat.max_content_bytes);
        let privacy = PrivacyScanner::new(catalog.clone())
            .with_max_samples(config.privacy.sample_limit());
        let scorer = ScoreCalculator::from_secs(config.scoring.score_window_secs);
        let summary_window = duration_from_secs(config.scoring.summary_window_secs);

        tracing::info!(
            threat_rules = catalog.threat_rules().len(),
            pii_rules = catalog.pii_rules().len(),
            capacity = config.audit.capacity,
            "security monitor ready"
        );

        Ok(Self {
            log: RwLock::new(EventLog::new(config.audit.capacity)),
            config,
            threats,
            privacy,
            scorer,
            summary_window,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Threat detector in use
    pub fn threat_detector(&self) -> &ThreatDetector {
        &self.threats
    }

    /// PII scanner in use
    pub fn privacy_scanner(&self) -> &PrivacyScanner {
        &self.privacy
    }

    /// Analyze request content sent as part of `operation`.
    ///
    /// Records one `threat_detection` security event when anything matches.
    pub fn analyze_request_security(&self, operation: &str, content: &str) -> ThreatResult {
        let result = self.threats.analyze(operation, content);

        if !result.safe {
            let event = SecurityEvent::new(
                THREAT_DETECTION,
                format!(
                    "Detected {} security threats in {}",
                    result.threat_count, operation
                ),
                result.severity,
            )
            .with_metadata(threat_metadata(&result))
            .at(result.timestamp);

            let id = self.log_security_event(event);
            tracing::warn!(
                event_id = id,
                operation,
                threats = result.threat_count,
                severity = %result.severity,
                categories = ?result.categories(),
                "threats detected"
            );
        }

        result
    }

    /// Analyze the `content` field of a JSON request payload.
    ///
    /// Strings are analyzed verbatim, other values by their compact JSON
    /// text; a missing field is treated as empty content.
    pub fn analyze_request_payload(&self, operation: &str, payload: &Value) -> ThreatResult {
        let content = match payload.get("content") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        self.analyze_request_security(operation, &content)
    }

    /// Check `text` for PII.
    ///
    /// Always records one `pii_detection` compliance event.
    pub fn check_data_privacy(&self, text: &str) -> PrivacyResult {
        let result = self.privacy.scan(text);

        let event = ComplianceEvent::new(
            PII_DETECTION,
            result.compliance_status,
            format!("Detected {} types of PII in data", result.pii_types_count),
        )
        .with_metadata(privacy_metadata(&result))
        .at(result.timestamp);

        let id = self.log_compliance_event(event);
        if result.compliance_status == ComplianceStatus::NonCompliant {
            tracing::warn!(
                event_id = id,
                pii_types = ?result.pii_types(),
                instances = result.total_pii_instances,
                "sensitive PII detected"
            );
        }

        result
    }

    /// Record a caller-built security event, returning its id
    pub fn log_security_event(&self, event: SecurityEvent) -> u64 {
        self.write_log().append_security(event)
    }

    /// Record a caller-built compliance event, returning its id
    pub fn log_compliance_event(&self, event: ComplianceEvent) -> u64 {
        self.write_log().append_compliance(event)
    }

    /// Summary of the audit log as of now
    pub fn get_security_summary(&self) -> SecuritySummary {
        self.security_summary_at(Utc::now())
    }

    /// Summary of the audit log as of `now`
    pub fn security_summary_at(&self, now: DateTime<Utc>) -> SecuritySummary {
        let log = self.read_log();
        self.summarize(&log, now)
    }

    /// Summary plus the last security and compliance events, as of now
    pub fn generate_security_report(&self) -> SecurityReport {
        self.security_report_at(Utc::now())
    }

    /// Report as of `now`
    pub fn security_report_at(&self, now: DateTime<Utc>) -> SecurityReport {
        let log = self.read_log();
        SecurityReport {
            report_id: Uuid::new_v4(),
            summary: self.summarize(&log, now),
            recent_events: log.security().tail(REPORT_EVENT_TAIL).cloned().collect(),
            compliance_status: log.compliance().tail(SUMMARY_TAIL).cloned().collect(),
            generated_at: now,
        }
    }

    /// Current security score
    pub fn security_score(&self) -> f64 {
        self.scorer.security_score(self.read_log().security(), Utc::now())
    }

    /// Current compliance score
    pub fn compliance_score(&self) -> f64 {
        self.scorer
            .compliance_score(self.read_log().compliance(), Utc::now())
    }

    /// Copy of the retained security events, oldest first
    pub fn security_events(&self) -> Vec<SecurityEvent> {
        self.read_log().security().iter().cloned().collect()
    }

    /// Copy of the retained compliance events, oldest first
    pub fn compliance_events(&self) -> Vec<ComplianceEvent> {
        self.read_log().compliance().iter().cloned().collect()
    }

    fn summarize(&self, log: &EventLog, now: DateTime<Utc>) -> SecuritySummary {
        let security = log.security();
        let compliance = log.compliance();

        SecuritySummary {
            total_security_events: security.len(),
            recent_events_count: security.count_recent(self.summary_window, now),
            event_types: log.event_type_counts().clone(),
            severity_distribution: log.severity_counts().clone(),
            evicted_security_events: security.evicted(),
            critical_events: security
                .iter()
                .filter(|e| e.severity == Severity::Critical)
                .count(),
            blocked_events: security.iter().filter(|e| e.blocked).count(),
            total_compliance_logs: compliance.len(),
            recent_compliance_count: compliance.count_recent(self.summary_window, now),
            compliance_status_distribution: log.status_counts().clone(),
            evicted_compliance_logs: compliance.evicted(),
            latest_security_events: security.tail(SUMMARY_TAIL).cloned().collect(),
            latest_compliance_logs: compliance.tail(SUMMARY_TAIL).cloned().collect(),
            last_event_at: security.last().map(|e| e.timestamp),
            security_score: self.scorer.security_score(security, now),
            compliance_score: self.scorer.compliance_score(compliance, now),
            generated_at: now,
        }
    }

    fn read_log(&self) -> RwLockReadGuard<'_, EventLog> {
        self.log.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_log(&self) -> RwLockWriteGuard<'_, EventLog> {
        self.log.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn threat_metadata(result: &ThreatResult) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("operation".into(), json!(result.operation));
    metadata.insert(
        "threats".into(),
        serde_json::to_value(&result.threats_detected).unwrap_or(Value::Null),
    );
    metadata.insert("content_length".into(), json!(result.content_length));
    metadata
}

fn privacy_metadata(result: &PrivacyResult) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("pii_types".into(), json!(result.pii_types()));
    metadata.insert("total_pii_count".into(), json!(result.total_pii_instances));
    metadata.insert("text_length".into(), json!(result.text_length));
    metadata
}

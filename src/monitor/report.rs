//! Summary and report structures returned by the monitor.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::audit::{ComplianceEvent, SecurityEvent};
use crate::security::{ComplianceStatus, Severity};

/// Events shown in a summary's "latest" lists
pub const SUMMARY_TAIL: usize = 5;

/// Security events included in a full report
pub const REPORT_EVENT_TAIL: usize = 10;

/// Snapshot of the audit log with derived scores
#[derive(Debug, Clone, Serialize)]
pub struct SecuritySummary {
    /// Retained security events
    pub total_security_events: usize,
    /// Security events inside the summary window
    pub recent_events_count: usize,
    /// Lifetime security events by type
    pub event_types: BTreeMap<String, u64>,
    /// Lifetime security events by severity
    pub severity_distribution: BTreeMap<Severity, u64>,
    /// Security events dropped to stay within capacity
    pub evicted_security_events: u64,
    /// Retained critical events
    pub critical_events: usize,
    /// Retained events marked as blocked
    pub blocked_events: usize,
    /// Retained compliance events
    pub total_compliance_logs: usize,
    /// Compliance events inside the summary window
    pub recent_compliance_count: usize,
    /// Lifetime compliance events by status
    pub compliance_status_distribution: BTreeMap<ComplianceStatus, u64>,
    /// Compliance events dropped to stay within capacity
    pub evicted_compliance_logs: u64,
    /// Newest security events, oldest first
    pub latest_security_events: Vec<SecurityEvent>,
    /// Newest compliance events, oldest first
    pub latest_compliance_logs: Vec<ComplianceEvent>,
    /// Timestamp of the newest security event
    pub last_event_at: Option<DateTime<Utc>>,
    /// Security score (0-100)
    pub security_score: f64,
    /// Compliance score (0-100)
    pub compliance_score: f64,
    /// Evaluation time
    pub generated_at: DateTime<Utc>,
}

/// Summary plus a longer event history
#[derive(Debug, Clone, Serialize)]
pub struct SecurityReport {
    /// Unique report id
    pub report_id: Uuid,
    /// Summary at generation time
    pub summary: SecuritySummary,
    /// Last security events, oldest first
    pub recent_events: Vec<SecurityEvent>,
    /// Last compliance events, oldest first
    pub compliance_status: Vec<ComplianceEvent>,
    /// Generation time
    pub generated_at: DateTime<Utc>,
}

//! In-memory audit trail.
//!
//! [`EventLog`] owns two [`BoundedLog`]s, one for security events and one
//! for compliance checks, each capped at a fixed number of entries
//! (1000 by default). When a log is full the oldest entry is dropped;
//! overflow is never an error.
//!
//! ```text
//!   append ──> [ id 51 | id 52 | ... | id 1050 ] <── capacity 1000
//!               ^ evicted first            ^ newest
//! ```
//!
//! `EventLog` itself is not synchronized. [`SecurityMonitor`](crate::SecurityMonitor)
//! keeps it behind a `RwLock`: appends (id assignment plus eviction) take the
//! write lock, summaries and scores read a consistent snapshot under the
//! read lock.

mod event;
mod log;

use std::collections::BTreeMap;

pub use event::{AuditRecord, ComplianceEvent, Metadata, SecurityEvent, DEFAULT_DATA_LOCATION};
pub use log::BoundedLog;

use crate::security::{ComplianceStatus, Severity};

/// Default entries kept per log
pub const DEFAULT_CAPACITY: usize = 1000;

/// Security and compliance logs plus lifetime counters
#[derive(Debug, Clone)]
pub struct EventLog {
    security: BoundedLog<SecurityEvent>,
    compliance: BoundedLog<ComplianceEvent>,
    event_types: BTreeMap<String, u64>,
    severities: BTreeMap<Severity, u64>,
    statuses: BTreeMap<ComplianceStatus, u64>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventLog {
    /// Create empty logs of `capacity` entries each
    pub fn new(capacity: usize) -> Self {
        Self {
            security: BoundedLog::new(capacity),
            compliance: BoundedLog::new(capacity),
            event_types: BTreeMap::new(),
            severities: BTreeMap::new(),
            statuses: BTreeMap::new(),
        }
    }

    /// Record a security event, returning its id
    pub fn append_security(&mut self, event: SecurityEvent) -> u64 {
        *self.event_types.entry(event.event_type.clone()).or_default() += 1;
        *self.severities.entry(event.severity).or_default() += 1;
        self.security.append(event)
    }

    /// Record a compliance event, returning its id
    pub fn append_compliance(&mut self, event: ComplianceEvent) -> u64 {
        *self.statuses.entry(event.status).or_default() += 1;
        self.compliance.append(event)
    }

    /// Security events
    pub fn security(&self) -> &BoundedLog<SecurityEvent> {
        &self.security
    }

    /// Compliance events
    pub fn compliance(&self) -> &BoundedLog<ComplianceEvent> {
        &self.compliance
    }

    /// Security events ever logged, by event type (includes evicted)
    pub fn event_type_counts(&self) -> &BTreeMap<String, u64> {
        &self.event_types
    }

    /// Security events ever logged, by severity (includes evicted)
    pub fn severity_counts(&self) -> &BTreeMap<Severity, u64> {
        &self.severities
    }

    /// Compliance events ever logged, by status (includes evicted)
    pub fn status_counts(&self) -> &BTreeMap<ComplianceStatus, u64> {
        &self.statuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logs_are_independent() {
        let mut log = EventLog::new(10);
        log.append_security(SecurityEvent::new("a", "a", Severity::High));
        log.append_security(SecurityEvent::new("b", "b", Severity::High));
        let id = log.append_compliance(ComplianceEvent::new(
            "pii_detection",
            ComplianceStatus::Compliant,
            "none",
        ));

        assert_eq!(id, 1);
        assert_eq!(log.security().len(), 2);
        assert_eq!(log.compliance().len(), 1);
    }

    #[test]
    fn test_counters_survive_eviction() {
        let mut log = EventLog::new(2);
        for _ in 0..5 {
            log.append_security(SecurityEvent::new("threat_detection", "x", Severity::Critical));
        }
        log.append_security(SecurityEvent::new("login_failure", "x", Severity::Low));

        assert_eq!(log.security().len(), 2);
        assert_eq!(log.event_type_counts()["threat_detection"], 5);
        assert_eq!(log.event_type_counts()["login_failure"], 1);
        assert_eq!(log.severity_counts()[&Severity::Critical], 5);
        assert_eq!(log.severity_counts()[&Severity::Low], 1);
    }

    #[test]
    fn test_status_counts() {
        let mut log = EventLog::default();
        log.append_compliance(ComplianceEvent::new("c", ComplianceStatus::Warning, ""));
        log.append_compliance(ComplianceEvent::new("c", ComplianceStatus::Warning, ""));
        assert_eq!(log.status_counts()[&ComplianceStatus::Warning], 2);
        assert_eq!(log.security().capacity(), DEFAULT_CAPACITY);
    }
}

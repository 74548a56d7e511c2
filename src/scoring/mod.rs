//! Rolling security and compliance scores.
//!
//! Both scores are 0-100 (100 = best) and are recomputed from the audit log
//! on every call; nothing is cached between calls.
//!
//! | Score      | Inputs (inside window)  | Formula                                   |
//! |------------|-------------------------|-------------------------------------------|
//! | Security   | security events         | `100 - Σ penalty(severity)`, clamped      |
//! | Compliance | compliance events       | mean of compliant=100, warning=50, nc=0   |
//!
//! Penalties: critical 20, high 10, medium 5, low 1. An empty window
//! scores 100 regardless of older history.

use chrono::{DateTime, Duration, Utc};

use crate::audit::{BoundedLog, ComplianceEvent, SecurityEvent};
use crate::security::{ComplianceStatus, Severity};

/// Best possible score
pub const MAX_SCORE: f64 = 100.0;

/// Points deducted per security event
pub fn severity_penalty(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 20.0,
        Severity::High => 10.0,
        Severity::Medium => 5.0,
        Severity::Low => 1.0,
    }
}

/// Points contributed by one compliance check
pub fn status_weight(status: ComplianceStatus) -> f64 {
    match status {
        ComplianceStatus::Compliant => 100.0,
        ComplianceStatus::Warning => 50.0,
        ComplianceStatus::NonCompliant => 0.0,
    }
}

/// Score calculator over a fixed window
#[derive(Debug, Clone, Copy)]
pub struct ScoreCalculator {
    window: Duration,
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new(Duration::hours(24))
    }
}

impl ScoreCalculator {
    /// Calculator considering events no older than `window`
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Calculator with the window given in seconds
    pub fn from_secs(secs: u64) -> Self {
        Self::new(duration_from_secs(secs))
    }

    /// Scoring window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Security score at `now`
    pub fn security_score(&self, events: &BoundedLog<SecurityEvent>, now: DateTime<Utc>) -> f64 {
        let deductions: f64 = events
            .recent(self.window, now)
            .into_iter()
            .map(|e| severity_penalty(e.severity))
            .sum();
        round1((MAX_SCORE - deductions).clamp(0.0, MAX_SCORE))
    }

    /// Compliance score at `now`
    pub fn compliance_score(
        &self,
        events: &BoundedLog<ComplianceEvent>,
        now: DateTime<Utc>,
    ) -> f64 {
        let recent = events.recent(self.window, now);
        if recent.is_empty() {
            return MAX_SCORE;
        }
        let total: f64 = recent.iter().map(|e| status_weight(e.status)).sum();
        round1(total / recent.len() as f64)
    }
}

/// Seconds to a chrono duration, saturating at the representable maximum
pub fn duration_from_secs(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

fn round1(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

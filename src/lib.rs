//! # AgentWatch - Security and Compliance Analysis for Agent Traffic
//!
//! Embedded engine that inspects request/response text from AI agents for
//! injection attacks and personally identifiable information, keeps a
//! bounded audit trail of findings, and derives rolling security and
//! compliance scores.
//!
//! ## Features
//!
//! - **Threat detection**: SQL injection, XSS, command injection, path traversal
//! - **PII scanning**: email, phone, SSN, credit card, IP address, URL, with masking
//! - **Audit log**: FIFO-bounded security and compliance history (1000 entries each)
//! - **Scoring**: 0-100 security/compliance scores over a 24h window
//! - **Reports**: summaries with histograms, recent counts and latest events
//!
//! ## Architecture
//!
//! ```text
//!                ┌───────────────────────── SecurityMonitor ─────────────────────────┐
//!                │                                                                   │
//!  request ────> │  ThreatDetector ──┐                                               │
//!                │                   ├──> EventLog ──> ScoreCalculator ──> Summary ──┼──> caller
//!  text ───────> │  PrivacyScanner ──┘    (bounded)                                  │
//!                │        ^                                                          │
//!                │        └── PatternCatalog (compiled once)                         │
//!                └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use agentwatch::{SecurityMonitor, Severity};
//!
//! let monitor = SecurityMonitor::new().unwrap();
//!
//! let result = monitor.analyze_request_security("user_input", "'; DROP TABLE users; --");
//! assert!(!result.safe);
//! assert_eq!(result.severity, Severity::Critical);
//!
//! let privacy = monitor.check_data_privacy("reach me at john@example.com");
//! assert!(!privacy.privacy_safe);
//! assert_eq!(privacy.pii_detected[0].samples[0], "jo************om");
//!
//! let summary = monitor.get_security_summary();
//! println!("security score: {}", summary.security_score);
//! println!("compliance score: {}", summary.compliance_score);
//! ```
//!
//! ## Modules
//!
//! - [`security`]: Rule catalog, threat detector, PII scanner
//! - [`audit`]: Bounded event log
//! - [`scoring`]: Security and compliance scores
//! - [`monitor`]: The [`SecurityMonitor`] facade
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod audit;
pub mod config;
pub mod error;
pub mod monitor;
pub mod scoring;
pub mod security;

// Re-exports for convenience
pub use audit::{ComplianceEvent, EventLog, Metadata, SecurityEvent};
pub use config::Config;
pub use error::{GuardError, Result};
pub use monitor::{SecurityMonitor, SecurityReport, SecuritySummary};
pub use scoring::ScoreCalculator;
pub use security::{
    mask_value, ComplianceStatus, PatternCatalog, PiiKind, PiiMatch, PrivacyResult,
    PrivacyScanner, Severity, ThreatDetector, ThreatMatch, ThreatResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Threat detection and PII scanning for agent traffic.
//!
//! This module holds the pure analysis side of AgentWatch: the rule
//! catalog, the threat detector and the PII scanner. Nothing here touches
//! the audit log; [`SecurityMonitor`](crate::SecurityMonitor) records the
//! findings.
//!
//! # Threat Categories
//!
//! | Category            | Examples                                  | Severity |
//! |---------------------|-------------------------------------------|----------|
//! | `sql_injection`     | `UNION SELECT`, `DROP TABLE`, `' OR 1=1`  | Critical |
//! | `command_injection` | `; rm -rf`, `$(...)`, `\| nc`             | Critical |
//! | `xss`               | `<script>`, `javascript:`, `onerror=`     | High     |
//! | `path_traversal`    | `../../`, `/etc/passwd`, `..%2f`          | High     |
//! | anything else       | custom rules, `oversized_payload`         | Medium   |
//!
//! # PII Categories
//!
//! | Kind          | Severity |
//! |---------------|----------|
//! | `ssn`         | Critical |
//! | `credit_card` | Critical |
//! | `email`       | Medium   |
//! | `phone`       | Medium   |
//! | `ip_address`  | Low      |
//! | `url`         | Low      |
//!
//! Any high or critical kind makes a text `non_compliant`; any other PII
//! makes it a `warning`.
//!
//! # Usage
//!
//! ```rust
//! use agentwatch::security::{PatternCatalog, PrivacyScanner, Severity, ThreatDetector};
//!
//! let catalog = PatternCatalog::builtin().unwrap();
//!
//! let detector = ThreatDetector::new(catalog.clone());
//! let result = detector.analyze("search", "1' OR 1=1 --");
//! assert!(!result.safe);
//! assert_eq!(result.severity, Severity::Critical);
//!
//! let scanner = PrivacyScanner::new(catalog);
//! let result = scanner.scan("reach me at jane@corp.io");
//! assert_eq!(result.pii_detected[0].samples[0], "ja********io");
//! ```

mod patterns;
mod privacy;
mod severity;
mod threat;

pub use patterns::{
    pii_severity, threat_severity, DetectionRule, PatternCatalog, PiiKind, PiiPattern, PiiRule,
    ThreatCategory, ThreatPattern, OVERSIZED_PAYLOAD, PII_PATTERNS, THREAT_TABLES,
};
pub use privacy::{mask_value, PiiMatch, PrivacyResult, PrivacyScanner};
pub use severity::{ComplianceStatus, Severity};
pub use threat::{ThreatDetector, ThreatMatch, ThreatResult};

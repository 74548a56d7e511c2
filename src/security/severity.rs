//! Severity levels and compliance status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GuardError;

/// Ordinal risk level.
///
/// The derived ordering is the aggregation order: `Low < Medium < High < Critical`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    #[default]
    Low,
    /// Worth reviewing
    Medium,
    /// Likely attack or sensitive exposure
    High,
    /// Confirmed attack signature or regulated data
    Critical,
}

impl Severity {
    /// All levels, lowest first
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// Lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Highest severity in `levels`, or `Low` when empty
    pub fn max_of<I>(levels: I) -> Self
    where
        I: IntoIterator<Item = Severity>,
    {
        levels.into_iter().max().unwrap_or(Severity::Low)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(GuardError::Config(format!("Unknown severity: {other}"))),
        }
    }
}

/// Outcome of a PII compliance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    /// No PII found
    Compliant,
    /// Only low/medium PII found
    Warning,
    /// High or critical PII found
    NonCompliant,
}

impl ComplianceStatus {
    /// Derive status from the severities of the PII types found
    pub fn from_severities<I>(levels: I) -> Self
    where
        I: IntoIterator<Item = Severity>,
    {
        let mut any = false;
        for level in levels {
            if level >= Severity::High {
                return ComplianceStatus::NonCompliant;
            }
            any = true;
        }
        if any {
            ComplianceStatus::Warning
        } else {
            ComplianceStatus::Compliant
        }
    }

    /// Overall severity reported alongside the status
    pub fn severity(self) -> Severity {
        match self {
            ComplianceStatus::Compliant => Severity::Low,
            ComplianceStatus::Warning => Severity::Medium,
            ComplianceStatus::NonCompliant => Severity::High,
        }
    }

    /// Snake-case name
    pub fn as_str(self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "compliant",
            ComplianceStatus::Warning => "warning",
            ComplianceStatus::NonCompliant => "non_compliant",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ComplianceStatus {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compliant" => Ok(ComplianceStatus::Compliant),
            "warning" => Ok(ComplianceStatus::Warning),
            "non_compliant" | "non-compliant" => Ok(ComplianceStatus::NonCompliant),
            other => Err(GuardError::Config(format!(
                "Unknown compliance status: {other}"
            ))),
        }
    }
}

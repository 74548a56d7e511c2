//! Security and compliance audit events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::security::{ComplianceStatus, Severity};

/// Free-form event metadata
pub type Metadata = serde_json::Map<String, Value>;

/// Storage location recorded when none is given
pub const DEFAULT_DATA_LOCATION: &str = "cloud";

fn default_encryption() -> bool {
    true
}

fn default_data_location() -> String {
    DEFAULT_DATA_LOCATION.to_string()
}

/// Entry stored in a [`BoundedLog`](super::BoundedLog).
pub trait AuditRecord {
    /// Log-assigned id (0 until appended)
    fn id(&self) -> u64;
    /// Called once by the log on append
    fn assign_id(&mut self, id: u64);
    /// When the event happened
    fn timestamp(&self) -> DateTime<Utc>;
}

/// A recorded security event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Log-assigned id
    pub id: u64,
    /// Event type, e.g. `threat_detection`
    pub event_type: String,
    /// Human-readable description
    pub description: String,
    /// Event severity
    pub severity: Severity,
    /// Client address, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
    /// Endpoint involved, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Whether the request was blocked
    #[serde(default)]
    pub blocked: bool,
    /// Additional data
    #[serde(default)]
    pub metadata: Metadata,
    /// When the event happened
    pub timestamp: DateTime<Utc>,
}

impl SecurityEvent {
    /// New event stamped with the current time
    pub fn new(
        event_type: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            id: 0,
            event_type: event_type.into(),
            description: description.into(),
            severity,
            source_ip: None,
            endpoint: None,
            blocked: false,
            metadata: Metadata::new(),
            timestamp: Utc::now(),
        }
    }

    /// Replace the metadata map
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add one metadata entry
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set the client address
    pub fn with_source_ip(mut self, ip: impl Into<String>) -> Self {
        self.source_ip = Some(ip.into());
        self
    }

    /// Set the endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Mark the request as blocked
    pub fn blocked(mut self, blocked: bool) -> Self {
        self.blocked = blocked;
        self
    }

    /// Override the timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl AuditRecord for SecurityEvent {
    fn id(&self) -> u64 {
        self.id
    }

    fn assign_id(&mut self, id: u64) {
        self.id = id;
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// A recorded compliance check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceEvent {
    /// Log-assigned id
    pub id: u64,
    /// Check type, e.g. `pii_detection`
    pub compliance_type: String,
    /// Outcome
    pub status: ComplianceStatus,
    /// Human-readable details
    pub details: String,
    /// Description of the data that was processed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_processed: Option<Metadata>,
    /// Whether the data subject consented; `None` when unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_consent: Option<bool>,
    /// Whether the data was encrypted
    #[serde(default = "default_encryption")]
    pub encryption_status: bool,
    /// Where the data is stored or processed
    #[serde(default = "default_data_location")]
    pub data_location: String,
    /// Additional data
    #[serde(default)]
    pub metadata: Metadata,
    /// When the check ran
    pub timestamp: DateTime<Utc>,
}

impl ComplianceEvent {
    /// New event stamped with the current time
    pub fn new(
        compliance_type: impl Into<String>,
        status: ComplianceStatus,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            compliance_type: compliance_type.into(),
            status,
            details: details.into(),
            data_processed: None,
            user_consent: None,
            encryption_status: true,
            data_location: default_data_location(),
            metadata: Metadata::new(),
            timestamp: Utc::now(),
        }
    }

    /// Replace the metadata map
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add one metadata entry
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Describe the data that was processed
    pub fn with_data_processed(mut self, data: Metadata) -> Self {
        self.data_processed = Some(data);
        self
    }

    /// Record whether the data subject consented
    pub fn with_user_consent(mut self, consent: bool) -> Self {
        self.user_consent = Some(consent);
        self
    }

    /// Record whether the data was encrypted (default `true`)
    pub fn with_encryption(mut self, encrypted: bool) -> Self {
        self.encryption_status = encrypted;
        self
    }

    /// Set the data location (default `cloud`)
    pub fn with_data_location(mut self, location: impl Into<String>) -> Self {
        self.data_location = location.into();
        self
    }

    /// Override the timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl AuditRecord for ComplianceEvent {
    fn id(&self) -> u64 {
        self.id
    }

    fn assign_id(&mut self, id: u64) {
        self.id = id;
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

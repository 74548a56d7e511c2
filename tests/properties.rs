//! Property tests for detection, masking, log bounds and scores.

use agentwatch::audit::BoundedLog;
use agentwatch::{
    mask_value, ComplianceEvent, ComplianceStatus, PiiKind, ScoreCalculator, SecurityEvent,
    SecurityMonitor, Severity,
};
use chrono::Utc;
use proptest::prelude::*;

fn severity() -> impl Strategy<Value = Severity> {
    prop::sample::select(Severity::ALL.to_vec())
}

fn status() -> impl Strategy<Value = ComplianceStatus> {
    prop::sample::select(vec![
        ComplianceStatus::Compliant,
        ComplianceStatus::Warning,
        ComplianceStatus::NonCompliant,
    ])
}

proptest! {
    #[test]
    fn test_drop_table_any_case_is_critical(
        prefix in "[a-zA-Z0-9 ,.;]{0,24}",
        verb in "[dD][rR][oO][pP]",
        gap in "[ \t\n]{1,4}",
        table in "[tT][aA][bB][lL][eE]",
        suffix in "[a-zA-Z0-9 ,.;]{0,24}",
    ) {
        let monitor = SecurityMonitor::new().unwrap();
        let content = format!("{prefix}{verb}{gap}{table}{suffix}");
        let result = monitor.analyze_request_security("user_input", &content);

        prop_assert!(!result.safe);
        prop_assert_eq!(result.severity, Severity::Critical);
        prop_assert!(result.categories().contains(&"sql_injection"));
    }

    #[test]
    fn test_ssn_in_text_is_critical(
        prefix in "([a-zA-Z,.:]{0,12} ){0,3}",
        ssn in "[0-9]{3}-[0-9]{2}-[0-9]{4}",
        suffix in "( [a-zA-Z,.:]{0,12}){0,3}",
    ) {
        let monitor = SecurityMonitor::new().unwrap();
        let text = format!("{prefix}{ssn}{suffix}");
        let result = monitor.check_data_privacy(&text);

        prop_assert!(!result.privacy_safe);
        prop_assert_eq!(result.compliance_status, ComplianceStatus::NonCompliant);
        let found = result.get(PiiKind::Ssn);
        prop_assert!(found.is_some());
        prop_assert_eq!(found.map(|m| m.severity), Some(Severity::Critical));
    }

    #[test]
    fn test_mask_preserves_length(value in "\\PC{0,64}") {
        let masked = mask_value(&value);
        prop_assert_eq!(masked.chars().count(), value.chars().count());
    }

    #[test]
    fn test_mask_keeps_only_edges(value in "[a-z0-9@.]{5,40}") {
        let masked = mask_value(&value);
        let chars: Vec<char> = masked.chars().collect();
        prop_assert_eq!(&masked[..2], &value[..2]);
        prop_assert_eq!(&masked[value.len() - 2..], &value[value.len() - 2..]);
        prop_assert!(chars[2..chars.len() - 2].iter().all(|c| *c == '*'));
    }

    #[test]
    fn test_short_values_fully_masked(value in "[a-z0-9]{0,4}") {
        prop_assert!(mask_value(&value).chars().all(|c| c == '*'));
    }

    #[test]
    fn test_log_never_exceeds_capacity(capacity in 1usize..64, appends in 0usize..200) {
        let mut log = BoundedLog::new(capacity);
        for _ in 0..appends {
            log.append(SecurityEvent::new("probe", "p", Severity::Low));
        }

        prop_assert_eq!(log.len(), appends.min(capacity));
        prop_assert_eq!(log.last_id(), appends as u64);
        let ids: Vec<u64> = log.iter().map(|e| e.id).collect();
        prop_assert!(ids.windows(2).all(|w| w[1] == w[0] + 1));
        if let Some(last) = ids.last() {
            prop_assert_eq!(*last, appends as u64);
        }
    }

    #[test]
    fn test_scores_bounded(
        severities in prop::collection::vec(severity(), 0..40),
        statuses in prop::collection::vec(status(), 0..40),
    ) {
        let now = Utc::now();
        let calculator = ScoreCalculator::default();

        let mut security = BoundedLog::new(1000);
        for level in severities {
            security.append(SecurityEvent::new("probe", "p", level).at(now));
        }
        let mut compliance = BoundedLog::new(1000);
        for status in statuses {
            compliance.append(ComplianceEvent::new("audit", status, "p").at(now));
        }

        let security_score = calculator.security_score(&security, now);
        let compliance_score = calculator.compliance_score(&compliance, now);
        prop_assert!((0.0..=100.0).contains(&security_score));
        prop_assert!((0.0..=100.0).contains(&compliance_score));
    }

    #[test]
    fn test_scanning_never_panics(text in "\\PC{0,256}") {
        let monitor = SecurityMonitor::new().unwrap();
        let threats = monitor.analyze_request_security("fuzz", &text);
        let privacy = monitor.check_data_privacy(&text);

        prop_assert_eq!(threats.safe, threats.threats_detected.is_empty());
        prop_assert_eq!(threats.threat_count, threats.threats_detected.len());
        prop_assert_eq!(privacy.privacy_safe, privacy.pii_detected.is_empty());
        for pii in &privacy.pii_detected {
            prop_assert!(!pii.samples.is_empty() && pii.samples.len() <= 5);
        }
    }
}

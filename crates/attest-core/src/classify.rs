//! Event-name classification.
//!
//! Event names are dot-namespaced (`"job.created"`, `"auth.role_violation"`).
//! The namespace determines the reporting category; the action suffix
//! determines severity and outcome. Classification is reporting-only
//! metadata; it is never a hash input.

use crate::enums::{Category, Outcome, Severity};

/// Classification derived from an event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventClass {
    pub severity: Severity,
    pub category: Category,
    pub outcome: Outcome,
}

/// Classify an event name into severity, category, and outcome.
///
/// Unknown namespaces fall back to `operations` / `info` / `success` so a
/// new producer never fails to append.
#[must_use]
pub fn classify(event_name: &str) -> EventClass {
    let namespace = event_name.split('.').next().unwrap_or(event_name);
    let category = match namespace {
        "auth" => Category::Security,
        "export" | "report" | "retention" => Category::Compliance,
        "hazard" | "incident" | "inspection" => Category::Safety,
        "team" | "billing" | "org" => Category::Admin,
        _ => Category::Operations,
    };

    let outcome = if event_name.ends_with("_violation")
        || event_name.ends_with(".denied")
        || event_name.ends_with(".blocked")
    {
        Outcome::Blocked
    } else if event_name.ends_with("_failed") || event_name.ends_with(".failed") {
        Outcome::Failure
    } else {
        Outcome::Success
    };

    let severity = match (category, outcome) {
        (Category::Security, Outcome::Blocked) => Severity::High,
        (Category::Security, _) => Severity::Medium,
        (Category::Safety, Outcome::Failure | Outcome::Blocked) => Severity::Critical,
        (Category::Safety, Outcome::Success) => Severity::Medium,
        (_, Outcome::Failure | Outcome::Blocked) => Severity::Medium,
        (Category::Compliance, Outcome::Success) => Severity::Low,
        _ => Severity::Info,
    };

    EventClass {
        severity,
        category,
        outcome,
    }
}

/// Whether an event is *material*: important enough to invalidate cached
/// reporting aggregates for its organization. Routine operational events
/// are not.
#[must_use]
pub fn is_material(event_name: &str, category: Category) -> bool {
    matches!(category, Category::Security | Category::Compliance)
        || event_name.starts_with("auth.")
        || event_name.starts_with("export.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("auth.role_violation", Category::Security, Severity::High, Outcome::Blocked)]
    #[case("auth.login", Category::Security, Severity::Medium, Outcome::Success)]
    #[case("job.created", Category::Operations, Severity::Info, Outcome::Success)]
    #[case("sync.upload_failed", Category::Operations, Severity::Medium, Outcome::Failure)]
    #[case("incident.reported", Category::Safety, Severity::Medium, Outcome::Success)]
    #[case("incident.response_failed", Category::Safety, Severity::Critical, Outcome::Failure)]
    #[case("export.generated", Category::Compliance, Severity::Low, Outcome::Success)]
    #[case("team.member_added", Category::Admin, Severity::Info, Outcome::Success)]
    fn classification_table(
        #[case] event_name: &str,
        #[case] category: Category,
        #[case] severity: Severity,
        #[case] outcome: Outcome,
    ) {
        let class = classify(event_name);
        assert_eq!(class.category, category, "{event_name}");
        assert_eq!(class.severity, severity, "{event_name}");
        assert_eq!(class.outcome, outcome, "{event_name}");
    }

    #[test]
    fn materiality_tracks_category_and_namespace() {
        assert!(is_material("auth.login", Category::Security));
        assert!(is_material("export.generated", Category::Compliance));
        assert!(!is_material("job.created", Category::Operations));
        assert!(!is_material("team.member_added", Category::Admin));
    }

    #[test]
    fn unknown_namespace_falls_back() {
        let class = classify("something.new");
        assert_eq!(class.category, Category::Operations);
        assert_eq!(class.outcome, Outcome::Success);
    }

    #[test]
    fn bare_event_name_without_namespace() {
        let class = classify("login");
        assert_eq!(class.category, Category::Operations);
    }
}

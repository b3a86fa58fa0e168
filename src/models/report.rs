use crate::models::inhibitor::InhibitorRecord;
use crate::models::wake_source::WakeSourceRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Why a source could not be collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCause {
    Missing,
    PermissionDenied,
    CommandNotFound,
    Timeout,
    CommandFailed,
    ReadFailed,
    Unparseable,
}

impl ErrorCause {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorCause::Missing          => "missing",
            ErrorCause::PermissionDenied => "permission-denied",
            ErrorCause::CommandNotFound  => "command-not-found",
            ErrorCause::Timeout          => "timeout",
            ErrorCause::CommandFailed    => "command-failed",
            ErrorCause::ReadFailed       => "read-failed",
            ErrorCause::Unparseable      => "unparseable",
        }
    }
}

/// A non-fatal record of one source being unavailable or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionError {
    pub source:  &'static str,
    pub cause:   ErrorCause,
    pub message: String,
}

impl CollectionError {
    pub fn new(source: &'static str, cause: ErrorCause, message: impl Into<String>) -> Self {
        Self { source, cause, message: message.into() }
    }
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.source, self.cause.label(), self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub inhibitor_count:   usize,
    pub wake_device_count: usize,
}

/// Result of one run. Built once by [`Report::aggregate`] and read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    inhibitors:   Vec<InhibitorRecord>,
    wake_sources: BTreeMap<String, WakeSourceRecord>,
    errors:       Vec<CollectionError>,
    summary:      Summary,
}

impl Report {
    pub fn aggregate(
        inhibitors:   Vec<InhibitorRecord>,
        wake_sources: BTreeMap<String, WakeSourceRecord>,
        errors:       Vec<CollectionError>,
    ) -> Self {
        let summary = Summary {
            inhibitor_count:   inhibitors.len(),
            wake_device_count: wake_sources.values().filter(|w| w.is_enabled()).count(),
        };
        Report { inhibitors, wake_sources, errors, summary }
    }

    pub fn inhibitors(&self) -> &[InhibitorRecord] { &self.inhibitors }
    pub fn wake_sources(&self) -> &BTreeMap<String, WakeSourceRecord> { &self.wake_sources }
    pub fn errors(&self) -> &[CollectionError] { &self.errors }
    pub fn summary(&self) -> Summary { self.summary }

    /// Wake sources whose status is enabled, in key order.
    pub fn enabled_wake_sources(&self) -> impl Iterator<Item = &WakeSourceRecord> {
        self.wake_sources.values().filter(|w| w.is_enabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::wake_source::{WakeOrigin, WakeStatus};

    fn wake(name: &str, status: WakeStatus) -> (String, WakeSourceRecord) {
        (name.to_string(), WakeSourceRecord {
            name:    name.to_string(),
            status,
            sysfs:   None,
            s_state: None,
            origin:  WakeOrigin::Acpi,
        })
    }

    fn inhibitor(who: &str) -> InhibitorRecord {
        InhibitorRecord::from_fields(&[who, "0", "root", "1", "c", "sleep", "why", "block"]).unwrap()
    }

    #[test]
    fn test_counts_only_enabled_wake_sources() {
        let wake_sources: BTreeMap<_, _> = [
            wake("XHC", WakeStatus::Enabled),
            wake("LID0", WakeStatus::Enabled),
            wake("GPP0", WakeStatus::Disabled),
            wake("RP01", WakeStatus::Unknown),
        ].into_iter().collect();

        let report = Report::aggregate(vec![inhibitor("a")], wake_sources, Vec::new());
        assert_eq!(report.summary().wake_device_count, 2);
        assert_eq!(report.summary().inhibitor_count, 1);
        assert_eq!(report.enabled_wake_sources().count(), 2);
    }

    #[test]
    fn test_inhibitor_order_is_kept() {
        let report = Report::aggregate(
            vec![inhibitor("b"), inhibitor("a"), inhibitor("c")],
            BTreeMap::new(),
            Vec::new(),
        );
        let who: Vec<&str> = report.inhibitors().iter().map(|i| i.who.as_str()).collect();
        assert_eq!(who, ["b", "a", "c"]);
    }

    #[test]
    fn test_empty_inputs_give_empty_report() {
        let report = Report::aggregate(Vec::new(), BTreeMap::new(), Vec::new());
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["summary"]["inhibitor_count"], 0);
        assert_eq!(v["summary"]["wake_device_count"], 0);
        assert_eq!(v["inhibitors"].as_array().unwrap().len(), 0);
        assert_eq!(v["wake_sources"].as_object().unwrap().len(), 0);
        assert_eq!(v["errors"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_errors_serialize_structured() {
        let report = Report::aggregate(
            Vec::new(),
            BTreeMap::new(),
            vec![CollectionError::new("acpi", ErrorCause::Missing, "/proc/acpi/wakeup not found")],
        );
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["errors"][0]["source"], "acpi");
        assert_eq!(v["errors"][0]["cause"], "missing");
        assert_eq!(v["errors"][0]["message"], "/proc/acpi/wakeup not found");
    }

    #[test]
    fn test_display() {
        let e = CollectionError::new("systemd", ErrorCause::Timeout, "no reply after 5s");
        assert_eq!(e.to_string(), "systemd (timeout): no reply after 5s");
    }
}

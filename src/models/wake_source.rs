use serde::Serialize;
use std::path::PathBuf;

/// Wake configuration of one device, collapsed to three states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WakeStatus {
    Enabled,
    Disabled,
    Unknown,
}

impl WakeStatus {
    /// Normalize a status cell. Kernels prefix the active method with `*`;
    /// anything outside the known set is `Unknown`.
    pub fn normalize(cell: &str) -> Self {
        let cell = cell.trim();
        let bare = cell.strip_prefix('*').unwrap_or(cell);
        if bare.eq_ignore_ascii_case("enabled") {
            WakeStatus::Enabled
        } else if bare.eq_ignore_ascii_case("disabled") {
            WakeStatus::Disabled
        } else {
            WakeStatus::Unknown
        }
    }

    /// True if the cell is one of the recognised status tokens.
    pub fn is_status_token(cell: &str) -> bool {
        Self::normalize(cell) != WakeStatus::Unknown
    }

    pub fn label(&self) -> &'static str {
        match self {
            WakeStatus::Enabled  => "enabled",
            WakeStatus::Disabled => "disabled",
            WakeStatus::Unknown  => "unknown",
        }
    }
}

/// Which interface a wake source was discovered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WakeOrigin {
    Acpi,
    Sysfs,
}

/// One device's wake configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WakeSourceRecord {
    #[serde(skip)]
    pub name:    String,
    pub status:  WakeStatus,
    /// Best-effort path of the underlying device under /sys.
    pub sysfs:   Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s_state: Option<String>,
    pub origin:  WakeOrigin,
}

impl WakeSourceRecord {
    pub fn is_enabled(&self) -> bool {
        self.status == WakeStatus::Enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_known_tokens() {
        assert_eq!(WakeStatus::normalize("enabled"), WakeStatus::Enabled);
        assert_eq!(WakeStatus::normalize("*enabled"), WakeStatus::Enabled);
        assert_eq!(WakeStatus::normalize("disabled"), WakeStatus::Disabled);
        assert_eq!(WakeStatus::normalize("*disabled"), WakeStatus::Disabled);
    }

    #[test]
    fn test_normalize_ignores_case() {
        assert_eq!(WakeStatus::normalize("*Enabled"), WakeStatus::Enabled);
        assert_eq!(WakeStatus::normalize("DISABLED"), WakeStatus::Disabled);
    }

    #[test]
    fn test_normalize_unknown_tokens() {
        assert_eq!(WakeStatus::normalize("S4*"), WakeStatus::Unknown);
        assert_eq!(WakeStatus::normalize(""), WakeStatus::Unknown);
        assert_eq!(WakeStatus::normalize("on"), WakeStatus::Unknown);
        assert_eq!(WakeStatus::normalize("**enabled"), WakeStatus::Unknown);
    }

    #[test]
    fn test_serialized_shape() {
        let rec = WakeSourceRecord {
            name:    "XHC".into(),
            status:  WakeStatus::Enabled,
            sysfs:   None,
            s_state: Some("S3".into()),
            origin:  WakeOrigin::Acpi,
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["status"], "enabled");
        assert!(v["sysfs"].is_null());
        assert_eq!(v["s_state"], "S3");
        assert_eq!(v["origin"], "acpi");
        assert!(v.get("name").is_none());
    }
}

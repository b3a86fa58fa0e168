use crate::models::report::{CollectionError, ErrorCause};
use crate::models::wake_source::{WakeOrigin, WakeSourceRecord, WakeStatus};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const SOURCE: &str = "sysfs";

/// Deepest directory level visited under `<root>/devices`.
const MAX_SCAN_DEPTH: usize = 16;

/// ACPI node prefixes and the bus directory each one lives in.
const NODE_BUSES: &[(&str, &str)] = &[
    ("pci:",      "bus/pci/devices"),
    ("platform:", "bus/platform/devices"),
    ("usb:",      "bus/usb/devices"),
];

/// Find the sysfs directory behind an ACPI wakeup row.
///
/// Tries the node column first (`pci:0000:00:14.0`), then matches the name
/// against the ACPI namespace paths under `bus/acpi/devices`. Not finding
/// anything is common and yields None.
pub fn resolve_device(sysfs_root: &Path, name: &str, acpi_node: Option<&str>) -> Option<PathBuf> {
    acpi_node
        .and_then(|node| resolve_node(sysfs_root, node))
        .or_else(|| resolve_acpi_name(sysfs_root, name))
}

fn resolve_node(sysfs_root: &Path, node: &str) -> Option<PathBuf> {
    NODE_BUSES.iter().find_map(|(prefix, bus)| {
        let id = node.strip_prefix(prefix)?;
        if id.is_empty() || id.contains('/') { return None; }
        let path = sysfs_root.join(bus).join(id);
        path.exists().then_some(path)
    })
}

/// `bus/acpi/devices/PNP0A08:00/path` holds e.g. `\_SB_.PCI0.XHC_`;
/// the last segment, minus padding underscores, is the wakeup table name.
fn resolve_acpi_name(sysfs_root: &Path, name: &str) -> Option<PathBuf> {
    let want = name.trim_end_matches('_');
    if want.is_empty() { return None; }

    let entries = fs::read_dir(sysfs_root.join("bus/acpi/devices")).ok()?;
    for entry in entries.flatten() {
        let dir = entry.path();
        let Ok(ns_path) = fs::read_to_string(dir.join("path")) else { continue };
        let last = ns_path.trim().rsplit('.').next().unwrap_or("").trim_end_matches('_');
        if !last.eq_ignore_ascii_case(want) { continue; }

        let physical = dir.join("physical_node");
        return Some(if physical.exists() { physical } else { dir });
    }
    None
}

/// Walk `<root>/devices` for devices whose `power/wakeup` reads `enabled`.
///
/// Devices already known by name, or resolving to the same canonical path as
/// a known record, are left out. Only an unreadable scan root is an error.
pub fn scan_wake_devices(
    sysfs_root: &Path,
    known:      &BTreeMap<String, WakeSourceRecord>,
) -> (Vec<WakeSourceRecord>, Option<CollectionError>) {
    let base = sysfs_root.join("devices");
    let top = match fs::read_dir(&base) {
        Ok(rd) => rd,
        Err(e) => {
            let cause = match e.kind() {
                std::io::ErrorKind::NotFound         => ErrorCause::Missing,
                std::io::ErrorKind::PermissionDenied => ErrorCause::PermissionDenied,
                _                                    => ErrorCause::ReadFailed,
            };
            tracing::info!(path = %base.display(), error = %e, "sysfs device tree unreadable");
            return (Vec::new(), Some(CollectionError::new(
                SOURCE, cause, format!("{}: {}", base.display(), e),
            )));
        }
    };

    let seen: HashSet<PathBuf> = known.values()
        .filter_map(|w| w.sysfs.as_ref())
        .filter_map(|p| fs::canonicalize(p).ok())
        .collect();

    let mut found = Vec::new();
    let mut stack: Vec<(PathBuf, usize)> = top.flatten()
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|e| (e.path(), 1))
        .collect();

    while let Some((dir, depth)) = stack.pop() {
        if wakeup_enabled(&dir) {
            let name = dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            let canonical = fs::canonicalize(&dir).unwrap_or_else(|_| dir.clone());
            if !name.is_empty() && !known.contains_key(&name) && !seen.contains(&canonical) {
                found.push(WakeSourceRecord {
                    name,
                    status:  WakeStatus::Enabled,
                    sysfs:   Some(dir.clone()),
                    s_state: None,
                    origin:  WakeOrigin::Sysfs,
                });
            }
        }

        if depth >= MAX_SCAN_DEPTH { continue; }
        let Ok(children) = fs::read_dir(&dir) else { continue };
        // DirEntry::file_type does not follow symlinks, so links back up the tree are skipped.
        for child in children.flatten() {
            if child.file_type().map(|t| t.is_dir()).unwrap_or(false) && child.file_name() != "power" {
                stack.push((child.path(), depth + 1));
            }
        }
    }

    found.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(count = found.len(), "wake-armed sysfs devices");
    (found, None)
}

fn wakeup_enabled(dir: &Path) -> bool {
    fs::read_to_string(dir.join("power/wakeup"))
        .map(|s| WakeStatus::normalize(&s) == WakeStatus::Enabled)
        .unwrap_or(false)
}

use crate::collectors::sysfs;
use crate::models::report::{CollectionError, ErrorCause};
use crate::models::wake_source::{WakeOrigin, WakeSourceRecord, WakeStatus};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

pub const SOURCE: &str = "acpi";

/// Where the wake-source collector reads from.
#[derive(Debug, Clone)]
pub struct WakePaths {
    pub acpi_wakeup: PathBuf,
    pub sysfs_root:  PathBuf,
}

/// One parsed row of the wakeup table, before sysfs enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeupRow {
    pub name:      String,
    pub s_state:   Option<String>,
    pub status:    WakeStatus,
    pub acpi_node: Option<String>,
}

/// Column indices discovered from the `Device S-state Status Sysfs node` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    device:  usize,
    s_state: Option<usize>,
    status:  Option<usize>,
}

impl Default for Layout {
    fn default() -> Self {
        Layout { device: 0, s_state: None, status: None }
    }
}

/// Read `/proc/acpi/wakeup` and enrich each row with a sysfs path.
/// Any failure leaves the mapping empty and yields exactly one error.
pub fn collect(paths: &WakePaths) -> (BTreeMap<String, WakeSourceRecord>, Option<CollectionError>) {
    let mut sources = BTreeMap::new();

    tracing::debug!(path = %paths.acpi_wakeup.display(), "reading wakeup table");
    match fs::read_to_string(&paths.acpi_wakeup) {
        Ok(text) => match parse_wakeup_table(&text) {
            Some(rows) => {
                for row in rows {
                    let sysfs = sysfs::resolve_device(&paths.sysfs_root, &row.name, row.acpi_node.as_deref());
                    sources.insert(row.name.clone(), WakeSourceRecord {
                        name:    row.name,
                        status:  row.status,
                        sysfs,
                        s_state: row.s_state,
                        origin:  WakeOrigin::Acpi,
                    });
                }
            }
            None => return (sources, Some(CollectionError::new(
                SOURCE,
                ErrorCause::Unparseable,
                format!("{}: no rows could be parsed", paths.acpi_wakeup.display()),
            ))),
        },
        Err(e) => {
            let err = read_error(&paths.acpi_wakeup, &e);
            tracing::info!(error = %err, "wakeup table unavailable");
            return (sources, Some(err));
        }
    }

    (sources, None)
}

fn read_error(path: &std::path::Path, e: &io::Error) -> CollectionError {
    match e.kind() {
        io::ErrorKind::NotFound => CollectionError::new(
            SOURCE,
            ErrorCause::Missing,
            format!("{} does not exist (not provided by this kernel or firmware)", path.display()),
        ),
        io::ErrorKind::PermissionDenied => CollectionError::new(
            SOURCE,
            ErrorCause::PermissionDenied,
            format!("{}: permission denied (try running as root)", path.display()),
        ),
        _ => CollectionError::new(
            SOURCE,
            ErrorCause::ReadFailed,
            format!("{}: {}", path.display(), e),
        ),
    }
}

/// Parse the wakeup table.
///
/// Column positions come from the header when one is present. Rows too short
/// for the header's status column fall back to the first recognised status
/// token after the name, then to the last cell. Returns None only when there
/// are data lines and none of them parse.
pub fn parse_wakeup_table(text: &str) -> Option<Vec<WakeupRow>> {
    let mut layout = Layout::default();
    let mut rows = Vec::new();
    let mut data_lines = 0usize;
    let mut header_seen = false;

    for line in text.lines() {
        let cells: Vec<&str> = line.split_whitespace().collect();
        if cells.is_empty() { continue; }

        if !header_seen && cells[0].eq_ignore_ascii_case("device") {
            layout = header_layout(&cells);
            header_seen = true;
            continue;
        }

        data_lines += 1;
        if let Some(row) = parse_row(&cells, &layout) {
            rows.push(row);
        }
    }

    if data_lines > 0 && rows.is_empty() {
        return None;
    }
    Some(rows)
}

fn header_layout(cells: &[&str]) -> Layout {
    let find = |want: &str| cells.iter().position(|c| c.eq_ignore_ascii_case(want));
    Layout {
        device:  find("device").unwrap_or(0),
        s_state: find("s-state"),
        status:  find("status"),
    }
}

fn parse_row(cells: &[&str], layout: &Layout) -> Option<WakeupRow> {
    if cells.len() < 2 { return None; }
    let name = cells.get(layout.device).copied().unwrap_or(cells[0]);
    let name_idx = if layout.device < cells.len() { layout.device } else { 0 };

    let status_idx = layout.status
        .filter(|&i| i < cells.len() && i != name_idx && WakeStatus::is_status_token(cells[i]))
        .or_else(|| (0..cells.len()).find(|&i| i != name_idx && WakeStatus::is_status_token(cells[i])))
        .or_else(|| layout.status.filter(|&i| i < cells.len() && i != name_idx))
        .unwrap_or(cells.len() - 1);

    let s_state_idx = layout.s_state
        .filter(|&i| i < cells.len() && i != name_idx && i != status_idx);

    // Whatever follows the last claimed column is the node, e.g. "pci:0000:00:14.0".
    let claimed = name_idx.max(status_idx).max(s_state_idx.unwrap_or(0));
    let acpi_node = (claimed + 1 < cells.len()).then(|| cells[claimed + 1..].join(" "));

    Some(WakeupRow {
        name: name.to_string(),
        s_state: s_state_idx.map(|i| cells[i].to_string()),
        status:  WakeStatus::normalize(cells[status_idx]),
        acpi_node,
    })
}

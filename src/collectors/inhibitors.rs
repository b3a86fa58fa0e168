use crate::collectors::command::{CommandError, CommandRunner, CommandSpec};
use crate::models::inhibitor::{InhibitorRecord, INHIBITOR_FIELDS};
use crate::models::report::{CollectionError, ErrorCause};
use std::time::Duration;

pub const SOURCE: &str = "systemd";

/// Header cells of `systemd-inhibit --list`, in column order.
const COLUMNS: [&str; INHIBITOR_FIELDS] = ["WHO", "UID", "USER", "PID", "COMM", "WHAT", "WHY", "MODE"];

/// Command used to list inhibitors.
pub fn list_command(program: &str, timeout: Duration) -> CommandSpec {
    CommandSpec::new(program, &["--list", "--no-pager"], timeout)
}

/// Query systemd for active inhibitor locks.
/// Disabled collection is a deliberate skip: no records and no error.
pub fn collect(
    enabled: bool,
    runner:  &dyn CommandRunner,
    spec:    &CommandSpec,
) -> (Vec<InhibitorRecord>, Option<CollectionError>) {
    if !enabled {
        tracing::debug!("systemd checks disabled, skipping inhibitors");
        return (Vec::new(), None);
    }

    tracing::debug!(cmd = %spec.display(), "listing inhibitors");
    let text = match runner.run(spec) {
        Ok(t)  => t,
        Err(e) => {
            let err = command_error(spec, e);
            tracing::info!(error = %err, "inhibitor listing unavailable");
            return (Vec::new(), Some(err));
        }
    };

    match parse_listing(&text) {
        Some(records) => {
            tracing::debug!(count = records.len(), "parsed inhibitors");
            (records, None)
        }
        None => (Vec::new(), Some(CollectionError::new(
            SOURCE,
            ErrorCause::Unparseable,
            format!("could not make sense of `{}` output", spec.display()),
        ))),
    }
}

fn command_error(spec: &CommandSpec, e: CommandError) -> CollectionError {
    let cause = match &e {
        CommandError::NotFound(_)         => ErrorCause::CommandNotFound,
        CommandError::PermissionDenied(_) => ErrorCause::PermissionDenied,
        CommandError::Timeout(_)          => ErrorCause::Timeout,
        CommandError::Failed { .. }       => ErrorCause::CommandFailed,
        CommandError::Io(_)               => ErrorCause::CommandFailed,
    };
    CollectionError::new(SOURCE, cause, format!("{}: {}", spec.program, e))
}

/// Parse the text listing into records, in listing order.
///
/// Rows that do not yield eight cells are dropped. Returns None only when the
/// output has data lines but neither a header nor a single parseable row.
pub fn parse_listing(text: &str) -> Option<Vec<InhibitorRecord>> {
    let mut layout: Option<[usize; INHIBITOR_FIELDS]> = None;
    let mut records = Vec::new();
    let mut data_lines = 0usize;

    for line in text.lines() {
        if line.trim().is_empty() || is_footer(line) { continue; }

        if layout.is_none() {
            if let Some(cols) = header_layout(line) {
                layout = Some(cols);
                continue;
            }
        }

        data_lines += 1;
        let cells = match &layout {
            Some(cols) => slice_columns(line, cols),
            None       => split_wide(line),
        };
        if let Some(rec) = cells.and_then(|c| InhibitorRecord::from_fields(&c)) {
            records.push(rec);
        }
    }

    if layout.is_none() && data_lines > 0 && records.is_empty() {
        return None;
    }
    Some(records)
}

/// "2 inhibitors listed." / "No inhibitors."
fn is_footer(line: &str) -> bool {
    let t = line.trim();
    t.ends_with("inhibitors listed.") || t.ends_with("inhibitor listed.") || t == "No inhibitors."
}

/// Character offset of each column, if `line` is the listing header.
fn header_layout(line: &str) -> Option<[usize; INHIBITOR_FIELDS]> {
    let tokens = token_offsets(line);
    let mut cols = [0usize; INHIBITOR_FIELDS];
    for (i, name) in COLUMNS.iter().enumerate() {
        cols[i] = tokens.iter().find(|(_, t)| t == name).map(|(off, _)| *off)?;
    }
    cols.windows(2).all(|w| w[0] < w[1]).then_some(cols)
}

fn token_offsets(line: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut current: Option<(usize, String)> = None;
    for (i, ch) in line.chars().enumerate() {
        if ch.is_whitespace() {
            if let Some(tok) = current.take() { out.push(tok); }
        } else {
            current.get_or_insert_with(|| (i, String::new())).1.push(ch);
        }
    }
    out.extend(current);
    out
}

/// Cut a row at the header's column offsets. A row that ends before the last
/// column starts has no MODE cell and yields None.
fn slice_columns(line: &str, cols: &[usize; INHIBITOR_FIELDS]) -> Option<Vec<String>> {
    let chars: Vec<char> = line.trim_end().chars().collect();
    let last = cols[INHIBITOR_FIELDS - 1];
    if chars.len() <= last { return None; }

    let cells: Vec<String> = (0..INHIBITOR_FIELDS).map(|i| {
        let start = cols[i];
        let end   = cols.get(i + 1).copied().unwrap_or(chars.len());
        chars[start..end].iter().collect::<String>().trim().to_string()
    }).collect();

    if cells[INHIBITOR_FIELDS - 1].is_empty() { return None; }
    Some(cells)
}

/// Split a headerless row. Tab-separated rows split on tabs alone and keep
/// empty cells; anything else splits on runs of two or more spaces. Cells
/// beyond eight are folded back into WHY, the only free-text column.
fn split_wide(line: &str) -> Option<Vec<String>> {
    let (mut parts, sep) = if line.contains('\t') {
        (line.split('\t').map(|c| c.trim().to_string()).collect::<Vec<_>>(), "\t")
    } else {
        (split_spaces(line.trim()), " ")
    };

    if parts.len() < INHIBITOR_FIELDS { return None; }
    if parts.len() > INHIBITOR_FIELDS {
        let mode = parts.pop()?;
        let why  = parts.split_off(INHIBITOR_FIELDS - 2).join(sep);
        parts.push(why);
        parts.push(mode);
    }
    Some(parts)
}

fn split_spaces(line: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut cell = String::new();
    let mut spaces = 0usize;

    for ch in line.chars() {
        if ch == ' ' {
            spaces += 1;
            continue;
        }
        if spaces >= 2 {
            parts.push(std::mem::take(&mut cell));
        } else if spaces == 1 {
            cell.push(' ');
        }
        spaces = 0;
        cell.push(ch);
    }
    if !cell.is_empty() { parts.push(cell); }
    parts
}

use crate::models::inhibitor::InhibitorRecord;
use crate::models::report::Report;
use crate::models::wake_source::WakeSourceRecord;
use crate::ui::theme::Painter;

/// Render the report as human-readable text.
pub fn generate(report: &Report, p: &Painter) -> String {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let mut out = String::new();

    out.push_str(&p.paint(|t| t.text_dim, &format!("sleepwhy report — {}", now)));
    out.push_str("\n\n");

    // ── Inhibitors ─────────────────────────────────────────────────────
    out.push_str(&section(p, "systemd Inhibitors"));
    if report.inhibitors().is_empty() {
        out.push_str(&p.paint(|t| t.ok, "No active inhibitors found."));
        out.push('\n');
    } else {
        out.push_str(&p.paint(|t| t.title, "These inhibitors currently block suspend:"));
        out.push('\n');
        for inh in report.inhibitors() {
            out.push_str(&inhibitor_entry(inh, p));
        }
    }
    out.push('\n');

    // ── Wake sources ───────────────────────────────────────────────────
    out.push_str(&section(p, "Wake Sources"));
    let enabled: Vec<&WakeSourceRecord> = report.enabled_wake_sources().collect();
    if enabled.is_empty() {
        out.push_str(&p.paint(|t| t.ok, "No wake-enabled devices found."));
        out.push('\n');
    } else {
        out.push_str(&p.paint(|t| t.title, "These devices are configured as wake sources:"));
        out.push('\n');
        for w in enabled {
            out.push_str(&wake_entry(w, p));
        }
    }
    out.push('\n');

    // ── Summary ────────────────────────────────────────────────────────
    let summary = report.summary();
    out.push_str(&section(p, "Summary"));
    out.push_str(&format!("Found {} active inhibitor(s) blocking suspend.\n", summary.inhibitor_count));
    out.push_str(&format!("Found {} wake-enabled device(s).\n", summary.wake_device_count));

    if !report.errors().is_empty() {
        out.push('\n');
        out.push_str(&section(p, "Collection Issues"));
        for e in report.errors() {
            out.push_str(&format!("  • {}\n", p.paint(|t| t.crit, &e.to_string())));
        }
    }
    out
}

fn section(p: &Painter, name: &str) -> String {
    format!("{}\n", p.paint(|t| t.header, &format!("=== {} ===", name)))
}

fn inhibitor_entry(inh: &InhibitorRecord, p: &Painter) -> String {
    let mut info = Vec::new();
    if let Some(pid) = inh.pid { info.push(format!("PID {}", pid)); }
    if !inh.user.is_empty()    { info.push(format!("user: {}", inh.user)); }

    let who  = if inh.who.is_empty() { "Unknown" } else { inh.who.as_str() };
    let comm = if inh.comm.is_empty() { String::new() } else { format!(" ({})", inh.comm) };
    let info = if info.is_empty() { String::new() } else { format!(" ({})", info.join(", ")) };

    let mut out = format!("  • {}{}{}\n", p.paint(|t| t.warn, who), comm, info);
    if !inh.what.is_empty() || !inh.why.is_empty() {
        let reason = if inh.why.is_empty() { inh.what.clone() } else { format!("{} ({})", inh.what, inh.why) };
        out.push_str(&format!("    Reason: {} [{}]", reason, inh.mode));
        if !inh.blocks_sleep() {
            out.push_str(&p.paint(|t| t.text_dim, " (does not cover sleep)"));
        }
        out.push('\n');
    }
    out
}

fn wake_entry(w: &WakeSourceRecord, p: &Painter) -> String {
    let state = w.s_state.as_deref().map(|s| format!(", {}", s)).unwrap_or_default();
    let head  = format!("  • {} ({}{})", p.paint(|t| t.warn, &w.name), w.status.label(), state);
    match &w.sysfs {
        Some(path) => format!("{} - {}\n", head, p.paint(|t| t.text_dim, &path.display().to_string())),
        None       => format!("{}\n", head),
    }
}

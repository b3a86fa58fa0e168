mod collectors;
mod config;
mod models;
mod ui;
mod util;

use anyhow::Result;
use clap::{ArgAction, Parser};
use collectors::acpi_wakeup::{self, WakePaths};
use collectors::command::{CommandRunner, SystemRunner};
use collectors::{inhibitors, sysfs};
use config::Config;
use models::report::Report;
use std::io::{self, IsTerminal, Write};
use tracing_subscriber::EnvFilter;
use ui::theme::{Painter, Theme, ThemeVariant};

#[derive(Parser, Debug)]
#[command(
    name = "sleepwhy",
    about = "Explain why a Linux system cannot suspend or stay asleep",
    version
)]
struct Cli {
    /// Output structured JSON instead of human-readable text
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Skip systemd-specific checks
    #[arg(long)]
    no_systemd: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print config file path and current values, then exit
    #[arg(long)]
    show_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = Config::load();
    if cli.show_config {
        return run_print_config(&cfg);
    }

    let report = collect_report(&cfg, !cli.no_systemd, &SystemRunner);
    let use_color = !cli.no_color
        && std::env::var_os("NO_COLOR").is_none()
        && io::stdout().is_terminal();
    let mut stdout = io::stdout().lock();

    if cli.json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        let painter = if use_color {
            Painter::colored(Theme::for_variant(ThemeVariant::from_name(&cfg.general.theme)))
        } else {
            Painter::plain()
        };
        write!(stdout, "{}", util::report::generate(&report, &painter))?;
    }
    Ok(())
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sleepwhy={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Take one snapshot of every source. The inhibitor and ACPI collectors run
/// at once; the sysfs device scan follows the ACPI one because it skips
/// devices ACPI already reported. No collector can fail the run, so this
/// always yields a report.
fn collect_report(cfg: &Config, systemd_enabled: bool, runner: &dyn CommandRunner) -> Report {
    let spec = inhibitors::list_command(&cfg.sources.systemd_inhibit, cfg.command_timeout());
    let paths = WakePaths {
        acpi_wakeup: cfg.sources.acpi_wakeup_path.clone(),
        sysfs_root:  cfg.sources.sysfs_root.clone(),
    };

    let ((inhibitors, inhibit_err), (mut wake_sources, acpi_err)) = std::thread::scope(|s| {
        let wake = s.spawn(|| acpi_wakeup::collect(&paths));
        let inhibit = inhibitors::collect(systemd_enabled, runner, &spec);
        let wake = wake.join().unwrap_or_else(|_| {
            tracing::warn!("wake-source collector panicked");
            Default::default()
        });
        (inhibit, wake)
    });

    let scan_err = if cfg.sources.scan_sysfs_devices {
        let (found, err) = sysfs::scan_wake_devices(&cfg.sources.sysfs_root, &wake_sources);
        for rec in found {
            wake_sources.insert(rec.name.clone(), rec);
        }
        err
    } else {
        None
    };

    let errors: Vec<_> = inhibit_err.into_iter().chain(acpi_err).chain(scan_err).collect();

    tracing::info!(
        inhibitors = inhibitors.len(),
        wake_sources = wake_sources.len(),
        errors = errors.len(),
        "collection finished"
    );
    Report::aggregate(inhibitors, wake_sources, errors)
}

fn run_print_config(cfg: &Config) -> Result<()> {
    let path = Config::config_path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string());
    let mut out = io::stdout().lock();
    writeln!(out, "Config: {}", path)?;
    writeln!(out)?;
    writeln!(out, "[general]")?;
    writeln!(out, "  command_timeout_secs = {}", cfg.general.command_timeout_secs)?;
    writeln!(out, "  theme                = {}", cfg.general.theme)?;
    writeln!(out)?;
    writeln!(out, "[sources]")?;
    writeln!(out, "  systemd_inhibit      = {}", cfg.sources.systemd_inhibit)?;
    writeln!(out, "  acpi_wakeup_path     = {}", cfg.sources.acpi_wakeup_path.display())?;
    writeln!(out, "  sysfs_root           = {}", cfg.sources.sysfs_root.display())?;
    writeln!(out, "  scan_sysfs_devices   = {}", cfg.sources.scan_sysfs_devices)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use collectors::command::{CommandError, CommandSpec};
    use models::report::ErrorCause;
    use models::wake_source::WakeOrigin;
    use std::fs;
    use tempfile::TempDir;

    enum CannedRunner {
        Output(&'static str),
        Missing,
    }

    impl CommandRunner for CannedRunner {
        fn run(&self, spec: &CommandSpec) -> Result<String, CommandError> {
            match self {
                CannedRunner::Output(text) => Ok(text.to_string()),
                CannedRunner::Missing      => Err(CommandError::NotFound(spec.program.clone())),
            }
        }
    }

    fn config_for(tmp: &TempDir, wakeup: Option<&str>) -> Config {
        let mut cfg = Config::default();
        cfg.sources.acpi_wakeup_path = tmp.path().join("wakeup");
        cfg.sources.sysfs_root = tmp.path().join("sys");
        cfg.sources.scan_sysfs_devices = false;
        if let Some(text) = wakeup {
            fs::write(&cfg.sources.acpi_wakeup_path, text).unwrap();
        }
        cfg
    }

    const TWO_INHIBITORS: &str = "\
Realtime Kit\t0\troot\t1768\trtkit-daemon\tsleep\tDemote realtime scheduling and stop canary.\tdelay
UPower\t0\troot\t2281\tupowerd\tsleep\tPause device polling\tdelay
";

    #[test]
    fn test_end_to_end_json() {
        let tmp = TempDir::new().unwrap();
        let cfg = config_for(&tmp, Some("USB2 enabled\nXHC enabled\n"));
        let report = collect_report(&cfg, true, &CannedRunner::Output(TWO_INHIBITORS));

        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["summary"]["inhibitor_count"], 2);
        assert_eq!(v["summary"]["wake_device_count"], 2);
        assert_eq!(v["wake_sources"]["USB2"]["status"], "enabled");
        assert_eq!(v["inhibitors"][0]["who"], "Realtime Kit");
        assert_eq!(v["inhibitors"][0]["pid"], 1768);
        assert_eq!(v["inhibitors"][0]["why"], "Demote realtime scheduling and stop canary.");
        assert_eq!(v["inhibitors"][1]["comm"], "upowerd");
        assert_eq!(v["errors"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_no_systemd_means_no_inhibitors_and_no_systemd_error() {
        let tmp = TempDir::new().unwrap();
        let cfg = config_for(&tmp, Some("XHC enabled\n"));
        let report = collect_report(&cfg, false, &CannedRunner::Missing);

        assert!(report.inhibitors().is_empty());
        assert!(report.errors().iter().all(|e| e.source != "systemd"));
        assert_eq!(report.summary().wake_device_count, 1);
    }

    #[test]
    fn test_everything_empty_is_still_a_report() {
        let tmp = TempDir::new().unwrap();
        let cfg = config_for(&tmp, Some(""));
        let report = collect_report(&cfg, true, &CannedRunner::Output("No inhibitors.\n"));

        assert_eq!(report.summary().inhibitor_count, 0);
        assert_eq!(report.summary().wake_device_count, 0);
        assert!(report.inhibitors().is_empty());
        assert!(report.wake_sources().is_empty());
        assert!(report.errors().is_empty());
    }

    #[test]
    fn test_all_sources_missing() {
        let tmp = TempDir::new().unwrap();
        let cfg = config_for(&tmp, None);
        let report = collect_report(&cfg, true, &CannedRunner::Missing);

        let sources: Vec<&str> = report.errors().iter().map(|e| e.source).collect();
        assert_eq!(sources, ["systemd", "acpi"]);
        assert!(report.inhibitors().is_empty());
        assert!(report.wake_sources().is_empty());
    }

    fn write(tmp: &TempDir, rel: &str, content: &str) {
        let p = tmp.path().join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, content).unwrap();
    }

    #[test]
    fn test_missing_acpi_table_with_default_device_scan() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "sys/devices/platform/i8042/serio0/power/wakeup", "enabled\n");
        let mut cfg = config_for(&tmp, None);
        cfg.sources.scan_sysfs_devices = Config::default().sources.scan_sysfs_devices;

        let report = collect_report(&cfg, false, &CannedRunner::Missing);

        let acpi: Vec<_> = report.errors().iter().filter(|e| e.source == "acpi").collect();
        assert_eq!(acpi.len(), 1);
        assert_eq!(acpi[0].cause, ErrorCause::Missing);
        assert!(report.errors().iter().all(|e| e.source != "sysfs"));
        assert!(report.wake_sources().values().all(|w| w.origin == WakeOrigin::Sysfs));
        assert_eq!(report.wake_sources()["serio0"].origin, WakeOrigin::Sysfs);
    }

    #[test]
    fn test_device_scan_skips_devices_acpi_reported() {
        let tmp = TempDir::new().unwrap();
        let mut cfg = config_for(&tmp, Some("Device\tS-state\t  Status   Sysfs node\nXHC\t  S3\t*enabled   pci:0000:00:14.0\n"));
        cfg.sources.scan_sysfs_devices = true;
        write(&tmp, "sys/devices/pci0000:00/0000:00:14.0/power/wakeup", "enabled\n");
        write(&tmp, "sys/devices/pci0000:00/0000:00:14.0/usb1/1-4/power/wakeup", "enabled\n");
        fs::create_dir_all(tmp.path().join("sys/bus/pci/devices")).unwrap();
        std::os::unix::fs::symlink(
            tmp.path().join("sys/devices/pci0000:00/0000:00:14.0"),
            tmp.path().join("sys/bus/pci/devices/0000:00:14.0"),
        ).unwrap();

        let report = collect_report(&cfg, false, &CannedRunner::Missing);
        assert!(report.errors().is_empty());
        let names: Vec<&str> = report.wake_sources().keys().map(String::as_str).collect();
        assert_eq!(names, ["1-4", "XHC"]);
        assert_eq!(report.wake_sources()["XHC"].origin, WakeOrigin::Acpi);
        assert_eq!(report.wake_sources()["1-4"].origin, WakeOrigin::Sysfs);
        assert_eq!(report.summary().wake_device_count, 2);
    }
}

use serde::Serialize;

/// Number of cells in one `systemd-inhibit --list` row.
pub const INHIBITOR_FIELDS: usize = 8;

/// One active inhibitor lock as reported by systemd-logind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InhibitorRecord {
    pub who:  String,
    pub uid:  String,
    pub user: String,
    /// `None` when the PID cell was empty or not a number.
    pub pid:  Option<u32>,
    pub comm: String,
    pub what: String,
    pub why:  String,
    pub mode: String,
}

impl InhibitorRecord {
    /// Build a record from exactly eight cells in listing order
    /// (who, uid, user, pid, comm, what, why, mode).
    /// Returns None for any other arity.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Option<Self> {
        if fields.len() != INHIBITOR_FIELDS { return None; }
        let cell = |i: usize| fields[i].as_ref().trim().to_string();

        let uid  = cell(1);
        let user = match cell(2) {
            u if u.is_empty() => resolve_user(&uid),
            u                 => u,
        };

        Some(InhibitorRecord {
            who:  cell(0),
            user,
            pid:  cell(3).parse().ok(),
            comm: cell(4),
            what: cell(5),
            why:  cell(6),
            mode: cell(7),
            uid,
        })
    }

    /// True when this lock covers suspend ("sleep" appears in `what`).
    pub fn blocks_sleep(&self) -> bool {
        self.what.split([':', ',']).any(|w| w.trim() == "sleep")
    }
}

/// Look up a username for a numeric uid; falls back to the uid itself.
fn resolve_user(uid: &str) -> String {
    uid.parse::<u32>()
        .ok()
        .and_then(|raw| nix::unistd::User::from_uid(nix::unistd::Uid::from_raw(raw)).ok().flatten())
        .map(|u| u.name)
        .unwrap_or_else(|| uid.to_string())
}

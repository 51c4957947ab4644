//! Autosave state machine for the document editor.
//!
//! ```text
//! Synced ──edit──▶ Editing ──input──▶ Pending ──deadline──▶ Saving ──ok──▶ Synced
//!                                        ▲                    │  └──err──▶ Error
//!                                        └──edit during save──┘
//! ```
//!
//! The machine is driven by the caller's clock (milliseconds), so the
//! debounce can be exercised without real timers. The doc store owns the
//! actual `gloo-timers` timeout and calls [`Autosave::begin_save`] when it
//! fires.

/// Sync status shown next to the editor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncStatus {
    #[default]
    Synced,
    Editing,
    Pending,
    Saving,
    Error,
}

impl SyncStatus {
    /// Short identifier used as a CSS modifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Synced => "synced",
            Self::Editing => "editing",
            Self::Pending => "pending",
            Self::Saving => "saving",
            Self::Error => "error",
        }
    }
}

/// Identifies one save attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveTicket {
    session: u64,
    generation: u64,
}

/// What the caller should do after a save finished.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SaveOutcome {
    /// Everything is saved.
    Synced,
    /// Edits arrived while saving; arm the timer for `deadline`.
    Pending { deadline: f64 },
    /// The save failed; the buffer stays dirty.
    Failed,
    /// The save belonged to a previous document and was ignored.
    Stale,
}

#[derive(Clone, Debug)]
pub struct Autosave {
    status: SyncStatus,
    dirty: bool,
    deadline: Option<f64>,
    generation: u64,
    session: u64,
    in_flight: Option<SaveTicket>,
    last_saved_at: Option<f64>,
    last_error: Option<String>,
    debounce_ms: f64,
}

impl Autosave {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            status: SyncStatus::Synced,
            dirty: false,
            deadline: None,
            generation: 0,
            session: 0,
            in_flight: None,
            last_saved_at: None,
            last_error: None,
            debounce_ms: f64::from(debounce_ms),
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_saved_at(&self) -> Option<f64> {
        self.last_saved_at
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn debounce_ms(&self) -> f64 {
        self.debounce_ms
    }

    /// Record a content or title change at `now`.
    ///
    /// Returns the new debounce deadline, or `None` when a save is in
    /// flight (the machine re-arms itself once that save finishes).
    pub fn record_edit(&mut self, now: f64) -> Option<f64> {
        self.generation += 1;
        self.dirty = true;

        if self.in_flight.is_some() {
            return None;
        }

        let deadline = now + self.debounce_ms;
        self.deadline = Some(deadline);
        self.status = SyncStatus::Pending;
        Some(deadline)
    }

    /// Whether the debounce deadline has passed.
    pub fn due(&self, now: f64) -> bool {
        self.in_flight.is_none() && self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Start the debounced save if it is due.
    pub fn begin_save(&mut self, now: f64) -> Option<SaveTicket> {
        if !self.due(now) {
            return None;
        }
        self.start()
    }

    /// Save immediately (Ctrl+S) from `Editing` or `Pending`.
    pub fn save_now(&mut self) -> Option<SaveTicket> {
        if !matches!(self.status, SyncStatus::Editing | SyncStatus::Pending) {
            return None;
        }
        self.start()
    }

    /// Retry after a failed save.
    pub fn retry(&mut self) -> Option<SaveTicket> {
        if self.status != SyncStatus::Error {
            return None;
        }
        self.start()
    }

    fn start(&mut self) -> Option<SaveTicket> {
        if !self.dirty || self.in_flight.is_some() {
            return None;
        }
        let ticket = SaveTicket {
            session: self.session,
            generation: self.generation,
        };
        self.in_flight = Some(ticket);
        self.deadline = None;
        self.status = SyncStatus::Saving;
        Some(ticket)
    }

    /// Apply the result of the save identified by `ticket`.
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<(), String>,
        now: f64,
    ) -> SaveOutcome {
        if ticket.session != self.session || self.in_flight != Some(ticket) {
            return SaveOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(()) => {
                self.last_saved_at = Some(now);
                self.last_error = None;
                if self.generation == ticket.generation {
                    self.dirty = false;
                    self.status = SyncStatus::Synced;
                    SaveOutcome::Synced
                } else {
                    let deadline = now + self.debounce_ms;
                    self.deadline = Some(deadline);
                    self.status = SyncStatus::Pending;
                    SaveOutcome::Pending { deadline }
                }
            }
            Err(message) => {
                self.last_error = Some(message);
                self.status = SyncStatus::Error;
                SaveOutcome::Failed
            }
        }
    }

    /// Forget everything (document switched or closed). Any save still in
    /// flight becomes stale.
    pub fn reset(&mut self) {
        self.session += 1;
        self.status = SyncStatus::Synced;
        self.dirty = false;
        self.deadline = None;
        self.generation = 0;
        self.in_flight = None;
        self.last_saved_at = None;
        self.last_error = None;
    }

    /// Human readable status line.
    pub fn status_text(&self, now: f64) -> String {
        match self.status {
            SyncStatus::Synced => match self.last_saved_at {
                Some(at) => format!("Saved · {}", elapsed_text(now - at)),
                None => "Saved".to_string(),
            },
            SyncStatus::Editing => "Editing".to_string(),
            SyncStatus::Pending => "Waiting to save…".to_string(),
            SyncStatus::Saving => "Saving…".to_string(),
            SyncStatus::Error => match &self.last_error {
                Some(message) => format!("Save failed: {message}"),
                None => "Save failed".to_string(),
            },
        }
    }
}

fn elapsed_text(ms: f64) -> String {
    const MINUTE: f64 = 60_000.0;
    const HOUR: f64 = 60.0 * MINUTE;
    const DAY: f64 = 24.0 * HOUR;

    if ms < MINUTE {
        "just now".to_string()
    } else if ms < HOUR {
        format!("{} min ago", (ms / MINUTE).floor())
    } else if ms < DAY {
        format!("{} h ago", (ms / HOUR).floor())
    } else {
        format!("{} d ago", (ms / DAY).floor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBOUNCE: u32 = 1000;

    /// Drive the machine the way the doc store does: check the timer on
    /// every tick and complete saves instantly.
    fn tick(machine: &mut Autosave, now: f64, saves: &mut usize) {
        if let Some(ticket) = machine.begin_save(now) {
            *saves += 1;
            machine.finish_save(ticket, Ok(()), now);
        }
    }

    #[test]
    fn test_edit_arms_debounce() {
        let mut machine = Autosave::new(DEBOUNCE);
        assert_eq!(machine.record_edit(0.0), Some(1000.0));
        assert_eq!(machine.status(), SyncStatus::Pending);
        assert!(machine.is_dirty());
        assert!(!machine.due(999.0));
        assert!(machine.due(1000.0));
    }

    #[test]
    fn test_single_save_after_exact_interval() {
        let mut machine = Autosave::new(DEBOUNCE);
        let mut saves = 0;
        machine.record_edit(0.0);
        tick(&mut machine, 999.0, &mut saves);
        assert_eq!(saves, 0);
        tick(&mut machine, 1000.0, &mut saves);
        assert_eq!(saves, 1);
        tick(&mut machine, 5000.0, &mut saves);
        assert_eq!(saves, 1);
        assert_eq!(machine.status(), SyncStatus::Synced);
        assert!(!machine.is_dirty());
    }

    #[test]
    fn test_continuous_typing_saves_once() {
        let mut machine = Autosave::new(DEBOUNCE);
        let mut saves = 0;
        let mut now = 0.0;
        while now < 10_000.0 {
            machine.record_edit(now);
            tick(&mut machine, now, &mut saves);
            now += 100.0;
        }
        assert_eq!(saves, 0);

        let last_edit = now - 100.0;
        tick(&mut machine, last_edit + 999.0, &mut saves);
        assert_eq!(saves, 0);
        tick(&mut machine, last_edit + 1000.0, &mut saves);
        assert_eq!(saves, 1);
    }

    #[test]
    fn test_edit_during_save_returns_to_pending() {
        let mut machine = Autosave::new(DEBOUNCE);
        machine.record_edit(0.0);
        let ticket = machine.begin_save(1000.0).unwrap();
        assert_eq!(machine.status(), SyncStatus::Saving);

        assert_eq!(machine.record_edit(1200.0), None);
        assert_eq!(machine.status(), SyncStatus::Saving);

        let outcome = machine.finish_save(ticket, Ok(()), 1500.0);
        assert_eq!(outcome, SaveOutcome::Pending { deadline: 2500.0 });
        assert_eq!(machine.status(), SyncStatus::Pending);
        assert!(machine.is_dirty());
        assert_eq!(machine.last_saved_at(), Some(1500.0));
    }

    #[test]
    fn test_one_save_in_flight() {
        let mut machine = Autosave::new(DEBOUNCE);
        machine.record_edit(0.0);
        assert!(machine.begin_save(1000.0).is_some());
        assert!(machine.save_now().is_none());
        assert!(machine.begin_save(5000.0).is_none());
    }

    #[test]
    fn test_failure_then_retry() {
        let mut machine = Autosave::new(DEBOUNCE);
        machine.record_edit(0.0);
        let ticket = machine.begin_save(1000.0).unwrap();
        let outcome = machine.finish_save(ticket, Err("Server error (500)".into()), 1100.0);

        assert_eq!(outcome, SaveOutcome::Failed);
        assert_eq!(machine.status(), SyncStatus::Error);
        assert!(machine.is_dirty());
        assert_eq!(machine.status_text(1100.0), "Save failed: Server error (500)");

        assert!(machine.save_now().is_none());
        let retry = machine.retry().unwrap();
        assert_eq!(machine.finish_save(retry, Ok(()), 2000.0), SaveOutcome::Synced);
        assert_eq!(machine.last_error(), None);
    }

    #[test]
    fn test_edit_after_error_rearms() {
        let mut machine = Autosave::new(DEBOUNCE);
        machine.record_edit(0.0);
        let ticket = machine.begin_save(1000.0).unwrap();
        machine.finish_save(ticket, Err("offline".into()), 1000.0);

        assert_eq!(machine.record_edit(3000.0), Some(4000.0));
        assert_eq!(machine.status(), SyncStatus::Pending);
    }

    #[test]
    fn test_save_now_skips_debounce() {
        let mut machine = Autosave::new(DEBOUNCE);
        assert!(machine.save_now().is_none());
        assert_eq!(machine.status(), SyncStatus::Synced);

        machine.record_edit(0.0);
        assert!(machine.save_now().is_some());
        assert_eq!(machine.deadline(), None);
    }

    #[test]
    fn test_reset_discards_in_flight_save() {
        let mut machine = Autosave::new(DEBOUNCE);
        machine.record_edit(0.0);
        let ticket = machine.begin_save(1000.0).unwrap();

        machine.reset();
        assert_eq!(machine.status(), SyncStatus::Synced);
        assert_eq!(machine.finish_save(ticket, Ok(()), 1200.0), SaveOutcome::Stale);
        assert_eq!(machine.last_saved_at(), None);
        assert!(!machine.is_saving());
    }

    #[test]
    fn test_status_text() {
        let mut machine = Autosave::new(DEBOUNCE);
        assert_eq!(machine.status_text(0.0), "Saved");
        machine.record_edit(0.0);
        assert_eq!(machine.status_text(0.0), "Waiting to save…");
        let ticket = machine.begin_save(1000.0).unwrap();
        assert_eq!(machine.status_text(1000.0), "Saving…");
        machine.finish_save(ticket, Ok(()), 1000.0);
        assert_eq!(machine.status_text(30_000.0), "Saved · just now");
        assert_eq!(machine.status_text(1000.0 + 5.0 * 60_000.0), "Saved · 5 min ago");
        assert_eq!(machine.status_text(1000.0 + 2.0 * 3_600_000.0), "Saved · 2 h ago");
    }
}

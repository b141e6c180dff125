//! Debounced autosave scheduling.
//!
//! The scheduler never touches the store. It tracks when the open document
//! became dirty and answers "should we write now?" for a given instant;
//! the workspace performs the write and reports back with
//! [`AutoSaver::mark_flushed`] or [`AutoSaver::mark_failed`].
//!
//! Two triggers:
//! - debounce: a quiet window after the latest edit; every edit restarts it
//! - periodic: a fixed-interval flush of whatever is still unsaved

use chrono::{DateTime, Duration, Utc};

/// Default quiet window after the last edit.
pub const DEFAULT_DEBOUNCE_MS: i64 = 2_000;

/// Default periodic flush interval.
pub const DEFAULT_FLUSH_INTERVAL_SECS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveSettings {
    pub debounce: Duration,
    pub flush_interval: Duration,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::milliseconds(DEFAULT_DEBOUNCE_MS),
            flush_interval: Duration::seconds(DEFAULT_FLUSH_INTERVAL_SECS),
        }
    }
}

/// Why a flush is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    Debounce,
    Periodic,
}

/// Autosave state machine for one open document.
#[derive(Debug, Clone)]
pub struct AutoSaver {
    settings: AutosaveSettings,
    dirty: bool,
    failed: bool,
    last_edit: Option<DateTime<Utc>>,
    next_periodic: DateTime<Utc>,
}

impl AutoSaver {
    pub fn new(settings: AutosaveSettings, now: DateTime<Utc>) -> Self {
        Self {
            settings,
            dirty: false,
            failed: false,
            last_edit: None,
            next_periodic: now + settings.flush_interval,
        }
    }

    pub fn settings(&self) -> AutosaveSettings {
        self.settings
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the latest write attempt failed.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Forget pending work, e.g. when another document is opened.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.dirty = false;
        self.failed = false;
        self.last_edit = None;
        self.next_periodic = now + self.settings.flush_interval;
    }

    /// Note an edit; restarts the quiet window.
    pub fn record_edit(&mut self, now: DateTime<Utc>) {
        self.dirty = true;
        self.last_edit = Some(now);
    }

    /// Decide whether a flush is due at `now`.
    ///
    /// Advances the periodic schedule whenever its deadline has passed, so
    /// each interval fires at most once.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<FlushReason> {
        let periodic = now >= self.next_periodic;
        if periodic {
            self.next_periodic = now + self.settings.flush_interval;
        }
        if !self.dirty {
            return None;
        }
        if let Some(at) = self.last_edit {
            if now - at >= self.settings.debounce {
                return Some(FlushReason::Debounce);
            }
        }
        periodic.then_some(FlushReason::Periodic)
    }

    /// Earliest instant at which [`poll`](Self::poll) may return a reason.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        if !self.dirty {
            return None;
        }
        let periodic = self.next_periodic;
        Some(match self.last_edit {
            Some(at) => (at + self.settings.debounce).min(periodic),
            None => periodic,
        })
    }

    /// The write succeeded; everything up to now is persisted.
    pub fn mark_flushed(&mut self) {
        self.dirty = false;
        self.failed = false;
        self.last_edit = None;
    }

    /// The write failed; stay dirty and retry on the next periodic flush.
    pub fn mark_failed(&mut self) {
        self.failed = true;
        self.last_edit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saver() -> (AutoSaver, DateTime<Utc>) {
        let start = Utc::now();
        (AutoSaver::new(AutosaveSettings::default(), start), start)
    }

    #[test]
    fn test_clean_saver_never_flushes() {
        let (mut saver, start) = saver();
        assert_eq!(saver.poll(start + Duration::seconds(31)), None);
        assert_eq!(saver.next_deadline(), None);
    }

    #[test]
    fn test_burst_coalesces_into_one_debounce() {
        let (mut saver, start) = saver();
        for ms in [0, 500, 1_000, 1_500] {
            let at = start + Duration::milliseconds(ms);
            saver.record_edit(at);
            assert_eq!(saver.poll(at), None);
        }
        assert_eq!(saver.poll(start + Duration::milliseconds(3_000)), None);
        assert_eq!(
            saver.poll(start + Duration::milliseconds(3_500)),
            Some(FlushReason::Debounce)
        );
        saver.mark_flushed();
        assert_eq!(saver.poll(start + Duration::milliseconds(4_000)), None);
    }

    #[test]
    fn test_periodic_flush_while_typing() {
        let (mut saver, start) = saver();
        // Continuous edits never leave a quiet window
        let mut at = start;
        while at < start + Duration::seconds(29) {
            saver.record_edit(at);
            assert_eq!(saver.poll(at), None);
            at += Duration::seconds(1);
        }
        saver.record_edit(start + Duration::seconds(30));
        assert_eq!(
            saver.poll(start + Duration::seconds(30)),
            Some(FlushReason::Periodic)
        );
    }

    #[test]
    fn test_failed_write_retries_on_next_period() {
        let (mut saver, start) = saver();
        saver.record_edit(start);
        assert_eq!(
            saver.poll(start + Duration::seconds(2)),
            Some(FlushReason::Debounce)
        );
        saver.mark_failed();
        assert!(saver.is_dirty());
        assert!(saver.has_failed());

        assert_eq!(saver.poll(start + Duration::seconds(10)), None);
        assert_eq!(
            saver.poll(start + Duration::seconds(30)),
            Some(FlushReason::Periodic)
        );
        saver.mark_flushed();
        assert!(!saver.is_dirty());
    }

    #[test]
    fn test_next_deadline_is_earliest_trigger() {
        let (mut saver, start) = saver();
        saver.record_edit(start + Duration::seconds(5));
        assert_eq!(
            saver.next_deadline(),
            Some(start + Duration::seconds(7))
        );
        saver.record_edit(start + Duration::seconds(29));
        assert_eq!(saver.next_deadline(), Some(start + Duration::seconds(30)));
    }
}

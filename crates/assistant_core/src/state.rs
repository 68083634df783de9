use std::time::{Duration, Instant};

use crate::view_model::AppViewModel;
use crate::{build_menu, whitelist_panel, EntryBuckets, Settings};

/// Quiet period a burst of DOM mutations must settle for before healing runs.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    settings: Settings,
    entries: EntryBuckets,
    menu_open: bool,
    quiet_period: Duration,
    heal_due_at: Option<Instant>,
    follow_up_pending: bool,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_quiet_period(DEFAULT_QUIET_PERIOD)
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quiet_period(quiet_period: Duration) -> Self {
        Self {
            settings: Settings::default(),
            entries: EntryBuckets::default(),
            menu_open: false,
            quiet_period,
            heal_due_at: None,
            follow_up_pending: false,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            enabled: self.settings.enabled,
            menu_open: self.menu_open,
            menu: build_menu(&self.entries, &self.settings),
            panel: whitelist_panel(&self.entries, &self.settings.whitelist),
            first_time_setup_pending: self.settings.first_time_setup_pending,
            show_whitelist_help: !self.settings.hide_whitelist_help,
            heal_pending: self.heal_due_at.is_some(),
            dirty: self.dirty,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn entries(&self) -> &EntryBuckets {
        &self.entries
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn heal_due_at(&self) -> Option<Instant> {
        self.heal_due_at
    }

    /// Returns whether anything view-relevant changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn settings_mut(&mut self) -> &mut Settings {
        self.dirty = true;
        &mut self.settings
    }

    pub(crate) fn replace_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.dirty = true;
    }

    pub(crate) fn replace_entries(&mut self, entries: EntryBuckets) {
        self.entries = entries;
        self.dirty = true;
    }

    pub(crate) fn set_menu_open(&mut self, open: bool) {
        if self.menu_open != open {
            self.menu_open = open;
            self.dirty = true;
        }
    }

    /// Last-write-wins: every notification pushes the deadline out again.
    pub(crate) fn defer_healing(&mut self, at: Instant) {
        self.heal_due_at = Some(at + self.quiet_period);
    }

    pub(crate) fn take_due_healing(&mut self, now: Instant) -> bool {
        match self.heal_due_at {
            Some(due) if due <= now => {
                self.heal_due_at = None;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn request_follow_up(&mut self) {
        self.follow_up_pending = true;
    }

    pub(crate) fn take_follow_up(&mut self) -> bool {
        std::mem::take(&mut self.follow_up_pending)
    }
}

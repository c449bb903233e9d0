//! Time-of-day schedule poller.
//!
//! Wakes up periodically, reads the local wall clock and dispatches every
//! schedule entry due at the current minute. After a match it sleeps until the
//! next minute starts, and a minute that already fired is never fired again.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Timelike};
use parking_lot::RwLock;
use rand::seq::IndexedRandom;
use tokio_util::sync::CancellationToken;

use crate::error::{ErrorCode, HeraldError, HeraldResult};
use crate::events::{EventEmitter, ScheduleEvent};
use crate::protocol_constants::{
    DEFAULT_CHIME_SOUND, DEFAULT_FIRED_INTERVAL_SECS, DEFAULT_IDLE_INTERVAL_SECS,
};
use crate::schedule::{EntryKind, Schedule, ScheduleEntry, ScheduleError};
use crate::utils::now_millis;

use super::dispatch_coordinator::{DispatchCoordinator, DispatchRequest};
use super::history::PlaybackHistory;

/// Fires schedule entries through the dispatch coordinator.
pub struct Scheduler {
    schedule: RwLock<Arc<Schedule>>,
    schedule_path: Option<PathBuf>,
    coordinator: Arc<DispatchCoordinator>,
    history: Arc<PlaybackHistory>,
    emitter: Arc<dyn EventEmitter>,
    chime_sound: String,
    songs: Vec<String>,
    idle_interval: Duration,
    fired_interval: Duration,
}

impl Scheduler {
    pub fn new(
        schedule: Schedule,
        coordinator: Arc<DispatchCoordinator>,
        history: Arc<PlaybackHistory>,
        emitter: Arc<dyn EventEmitter>,
    ) -> Self {
        Self {
            schedule: RwLock::new(Arc::new(schedule)),
            schedule_path: None,
            coordinator,
            history,
            emitter,
            chime_sound: DEFAULT_CHIME_SOUND.to_string(),
            songs: Vec::new(),
            idle_interval: Duration::from_secs(DEFAULT_IDLE_INTERVAL_SECS),
            fired_interval: Duration::from_secs(DEFAULT_FIRED_INTERVAL_SECS),
        }
    }

    /// File re-read by [`Scheduler::reload`].
    pub fn with_schedule_path(mut self, path: PathBuf) -> Self {
        self.schedule_path = Some(path);
        self
    }

    pub fn with_sounds(mut self, chime_sound: impl Into<String>, songs: Vec<String>) -> Self {
        self.chime_sound = chime_sound.into();
        self.songs = songs;
        self
    }

    /// Sleep after a minute with no due entry, and the longest sleep after one
    /// that matched. A post-match sleep never runs past the next minute.
    pub fn with_intervals(mut self, idle: Duration, fired: Duration) -> Self {
        self.idle_interval = idle;
        self.fired_interval = fired;
        self
    }

    /// Snapshot of the active schedule.
    pub fn schedule(&self) -> Arc<Schedule> {
        Arc::clone(&self.schedule.read())
    }

    /// Dispatches every entry due at `hour:minute`.
    ///
    /// Returns the number of entries that matched, including ones that were
    /// skipped because no sound or device could be chosen.
    pub async fn fire_due(&self, hour: u32, minute: u32) -> usize {
        let schedule = self.schedule();
        let due: Vec<ScheduleEntry> = schedule.due(hour, minute).cloned().collect();

        for entry in &due {
            self.fire_entry(entry).await;
        }
        due.len()
    }

    async fn fire_entry(&self, entry: &ScheduleEntry) {
        let Some(sound_name) = self.pick_sound(entry.kind) else {
            log::warn!(
                "[Scheduler] {:02}:{:02} song slot skipped: song library is empty",
                entry.hour,
                entry.minute
            );
            self.skip(entry, "song library is empty");
            return;
        };

        if entry.devices.is_empty() {
            log::warn!(
                "[Scheduler] {:02}:{:02} entry has no devices, skipped",
                entry.hour,
                entry.minute
            );
            self.skip(entry, "no devices");
            return;
        }

        log::info!(
            "[Scheduler] {:02}:{:02} {:?} [{}] on {:?} ({})",
            entry.hour,
            entry.minute,
            entry.kind,
            sound_name,
            entry.devices,
            entry.note
        );

        if entry.kind == EntryKind::Song {
            self.history.record_async(&sound_name, &entry.note).await;
        }

        let request = DispatchRequest::new(sound_name.clone(), entry.devices.clone());
        match self.coordinator.dispatch_report(&request).await {
            Ok(_) => {
                self.emitter.emit_schedule(ScheduleEvent::Fired {
                    hour: entry.hour,
                    minute: entry.minute,
                    kind: entry.kind,
                    sound_name,
                    devices: entry.devices.clone(),
                    timestamp: now_millis(),
                });
            }
            Err(e) => {
                log::error!(
                    "[Scheduler] {:02}:{:02} dispatch rejected: {}",
                    entry.hour,
                    entry.minute,
                    e
                );
                self.skip(entry, &e.to_string());
            }
        }
    }

    fn pick_sound(&self, kind: EntryKind) -> Option<String> {
        match kind {
            EntryKind::Chime => Some(self.chime_sound.clone()),
            EntryKind::Song => self.songs.choose(&mut rand::rng()).cloned(),
        }
    }

    fn skip(&self, entry: &ScheduleEntry, reason: &str) {
        self.emitter.emit_schedule(ScheduleEvent::Skipped {
            hour: entry.hour,
            minute: entry.minute,
            reason: reason.to_string(),
            timestamp: now_millis(),
        });
    }

    /// Polls the local clock until `cancel` fires.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        log::info!(
            "[Scheduler] Started with {} entries (idle {:?}, fired {:?})",
            self.schedule().len(),
            self.idle_interval,
            self.fired_interval
        );

        let mut last_fired: Option<(u32, u32)> = None;
        loop {
            let now = Local::now();
            let minute = (now.hour(), now.minute());
            let pause = if last_fired == Some(minute) {
                until_next_minute(now.second(), now.nanosecond())
            } else if self.fire_due(minute.0, minute.1).await > 0 {
                last_fired = Some(minute);
                let after = Local::now();
                if (after.hour(), after.minute()) == minute {
                    self.fired_interval
                        .min(until_next_minute(after.second(), after.nanosecond()))
                } else {
                    Duration::ZERO
                }
            } else {
                self.idle_interval
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        log::info!("[Scheduler] Stopped");
    }

    /// Re-reads the schedule file and swaps it in.
    ///
    /// On failure the previous schedule stays active.
    pub async fn reload(&self) -> HeraldResult<usize> {
        let path = self
            .schedule_path
            .clone()
            .ok_or(ScheduleError::NotConfigured)?;
        let registry = Arc::clone(self.coordinator.registry());

        let loaded = tokio::task::spawn_blocking(move || Schedule::load(&path, &registry))
            .await
            .map_err(|e| HeraldError::Internal(format!("schedule reload task failed: {}", e)))?;

        let schedule = match loaded {
            Ok(schedule) => schedule,
            Err(e) => {
                log::error!(
                    "[Scheduler] Reload failed ({}), keeping previous schedule: {}",
                    e.code(),
                    e
                );
                return Err(e.into());
            }
        };

        let entries = schedule.len();
        *self.schedule.write() = Arc::new(schedule);
        log::info!("[Scheduler] Reloaded schedule with {} entries", entries);
        self.emitter.emit_schedule(ScheduleEvent::Reloaded {
            entries,
            timestamp: now_millis(),
        });
        Ok(entries)
    }
}

/// Time left in the current minute, given the wall clock's second and
/// nanosecond fields.
fn until_next_minute(second: u32, nanos: u32) -> Duration {
    // Leap seconds report nanos past one second
    let elapsed = Duration::new(u64::from(second.min(59)), nanos.min(999_999_999));
    Duration::from_secs(60) - elapsed
}

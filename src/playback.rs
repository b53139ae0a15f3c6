//! Playback Synchronizer: one source of truth for "current time".
//!
//! Two drivers can request a time change — the audio element (`timeupdate` events)
//! and the visual timeline (click/drag seeks). Each driver mirrors the other's
//! changes, which is exactly the setup for a feedback oscillation: a seek on the
//! timeline moves the audio element, whose time event re-seeks the timeline, and so
//! on within a single tick.
//!
//! We prevent that with an explicit state machine rather than scattered boolean
//! flags: a seek begun by one driver moves the synchronizer to `Seeking`, and any
//! update arriving before the in-flight one settles — from either driver — is
//! dropped, not queued. Dropped updates are expected under normal interaction; they
//! are reported as [`SeekOutcome::Dropped`] and logged at trace level, never as
//! errors.
//!
//! Every settled time change refreshes the active word: the word with the greatest
//! `start_time <= current_time`, found by binary search (start times are
//! non-decreasing in index order, an indexer guarantee).

use tracing::trace;

use crate::transcript::Transcript;

/// Which side requested a time change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// The audio element (`timeupdate` events).
    Audio,

    /// The visual timeline (waveform/spectrogram interaction).
    Timeline,
}

/// Synchronizer lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No media loaded.
    Idle,

    /// Media loaded, no update in flight.
    Ready,

    /// The named driver's time change is propagating; everything else is dropped.
    Seeking(Driver),
}

/// Result of asking for a time change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekOutcome {
    /// The change settled; this is the new shared state.
    Applied {
        time: f64,
        active_word: Option<usize>,
    },

    /// The change lost to an in-flight update (or no media is loaded) and was
    /// discarded. Expected under normal interaction; not an error.
    Dropped,
}

/// The single source of truth shared by the audio element and the visual timeline.
///
/// One `PlaybackSync` is live per visible transcript; loading a different
/// transcript replaces its state wholesale.
#[derive(Debug)]
pub struct PlaybackSync {
    state: SyncState,
    current_time: f64,
    is_playing: bool,
    active_word: Option<usize>,

    /// In-flight target time while `Seeking`.
    pending_time: Option<f64>,

    /// `(start_time, index)` per word, in index order. Kept separately so lookups
    /// don't need the full transcript.
    starts: Vec<(f64, usize)>,
}

impl Default for PlaybackSync {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackSync {
    pub fn new() -> Self {
        Self {
            state: SyncState::Idle,
            current_time: 0.0,
            is_playing: false,
            active_word: None,
            pending_time: None,
            starts: Vec::new(),
        }
    }

    /// Load a transcript+audio pair, replacing any previous one.
    ///
    /// Switching while `Seeking` silently discards the in-flight update — no retry,
    /// no error. Time resets to zero.
    pub fn load(&mut self, transcript: &Transcript) {
        if matches!(self.state, SyncState::Seeking(_)) {
            trace!("transcript switch discarded an in-flight seek");
        }
        self.starts = transcript
            .words
            .iter()
            .map(|w| (w.start_time, w.index))
            .collect();
        self.state = SyncState::Ready;
        self.current_time = 0.0;
        self.is_playing = false;
        self.active_word = None;
        self.pending_time = None;
    }

    /// Drop the loaded pair and return to `Idle`.
    pub fn unload(&mut self) {
        *self = Self::new();
    }

    /// Request a time change and settle it in one step.
    ///
    /// This is the normal entry point for both drivers; `begin_seek`/`settle` exist
    /// separately so callers that propagate the change to the other driver can keep
    /// the lock held across that propagation.
    pub fn set_time(&mut self, driver: Driver, time: f64) -> SeekOutcome {
        if !self.begin_seek(driver, time) {
            return SeekOutcome::Dropped;
        }
        self.settle()
    }

    /// Timeline-driven seek (waveform click/drag).
    pub fn seek_to(&mut self, time: f64) -> SeekOutcome {
        self.set_time(Driver::Timeline, time)
    }

    /// Audio-driven time event (the element's `timeupdate`).
    pub fn on_time_update(&mut self, time: f64) -> SeekOutcome {
        self.set_time(Driver::Audio, time)
    }

    /// Start propagating a time change from `driver`.
    ///
    /// Returns `false` (and changes nothing) when no media is loaded or another
    /// update is already in flight — including a re-entrant update from the same
    /// driver in the same tick.
    pub fn begin_seek(&mut self, driver: Driver, time: f64) -> bool {
        match self.state {
            SyncState::Idle => {
                trace!(?driver, time, "time update with no media loaded; dropped");
                false
            }
            SyncState::Seeking(holder) => {
                trace!(?driver, ?holder, time, "re-entrant time update dropped");
                false
            }
            SyncState::Ready => {
                self.state = SyncState::Seeking(driver);
                self.pending_time = Some(time);
                true
            }
        }
    }

    /// Settle the in-flight time change: commit the time, refresh the active word,
    /// release the lock.
    pub fn settle(&mut self) -> SeekOutcome {
        let SyncState::Seeking(_) = self.state else {
            return SeekOutcome::Dropped;
        };
        let Some(time) = self.pending_time.take() else {
            // Unreachable by construction; keep the machine consistent anyway.
            self.state = SyncState::Ready;
            return SeekOutcome::Dropped;
        };

        self.current_time = time;
        self.active_word = self.lookup_active(time);
        self.state = SyncState::Ready;

        SeekOutcome::Applied {
            time,
            active_word: self.active_word,
        }
    }

    pub fn play(&mut self) {
        if self.state != SyncState::Idle {
            self.is_playing = true;
        }
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// The word whose interval contains the current time, if any.
    pub fn active_word(&self) -> Option<usize> {
        self.active_word
    }

    /// Greatest `start_time <= time`, ties broken toward the higher index.
    fn lookup_active(&self, time: f64) -> Option<usize> {
        let n = self.starts.partition_point(|&(start, _)| start <= time);
        if n == 0 {
            return None;
        }
        Some(self.starts[n - 1].1)
    }
}

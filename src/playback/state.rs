use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Control instruction delivered from the input side to the playback thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Flip between running and paused (what SPACE does)
    TogglePause,
    /// Ensure paused; no effect when already paused
    Pause,
    /// Ensure running; no effect when already running
    Resume,
    /// Stop playback for good
    Exit,
}

/// Phase the controller last reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// Spawned, not yet at its first checkpoint
    Starting,
    Running,
    Paused,
    Exited,
}

#[derive(Debug)]
pub(crate) struct ControlState {
    pub paused: bool,
    pub exit_requested: bool,
    pub phase: PlaybackPhase,
}

/// Mutex-protected control flags plus the condition variable used to wake
/// whichever side is waiting on them.
#[derive(Debug)]
pub(crate) struct SharedControl {
    state: Mutex<ControlState>,
    pub wake: Condvar,
}

impl SharedControl {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ControlState {
                paused: false,
                exit_requested: false,
                phase: PlaybackPhase::Starting,
            }),
            wake: Condvar::new(),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a phase change and wake observers. Caller holds the lock.
    pub fn report_phase(&self, state: &mut ControlState, phase: PlaybackPhase) {
        if state.phase != phase {
            log::debug!("Playback phase {:?} -> {:?}", state.phase, phase);
            state.phase = phase;
            self.wake.notify_all();
        }
    }
}

/// Cloneable sender side of the playback controls.
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    shared: Arc<SharedControl>,
}

impl PlaybackHandle {
    pub(crate) fn new(shared: Arc<SharedControl>) -> Self {
        Self { shared }
    }

    /// Apply a signal and wake the controller.
    ///
    /// The flag update and the notification happen under the same lock, so a
    /// controller that has checked the flags but not yet started waiting cannot
    /// miss it. Returns whether the control state changed; everything after
    /// `Exit` is ignored.
    pub fn send(&self, signal: Signal) -> bool {
        let mut state = self.shared.lock();
        if state.exit_requested {
            return false;
        }

        let changed = match signal {
            Signal::TogglePause => {
                state.paused = !state.paused;
                true
            }
            Signal::Pause => !std::mem::replace(&mut state.paused, true),
            Signal::Resume => std::mem::replace(&mut state.paused, false),
            Signal::Exit => {
                state.exit_requested = true;
                true
            }
        };

        if changed {
            log::debug!("Signal {:?} applied (paused={}, exit={})", signal, state.paused, state.exit_requested);
            self.shared.wake.notify_all();
        }
        changed
    }

    pub fn toggle_pause(&self) -> bool {
        self.send(Signal::TogglePause)
    }

    pub fn pause(&self) -> bool {
        self.send(Signal::Pause)
    }

    pub fn resume(&self) -> bool {
        self.send(Signal::Resume)
    }

    pub fn exit(&self) -> bool {
        self.send(Signal::Exit)
    }

    pub fn is_paused(&self) -> bool {
        self.shared.lock().paused
    }

    pub fn exit_requested(&self) -> bool {
        self.shared.lock().exit_requested
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.shared.lock().phase
    }

    /// Block until the controller reports `phase` or `timeout` elapses.
    /// A timeout too large to express as a deadline waits without one.
    pub fn wait_for_phase(&self, phase: PlaybackPhase, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.shared.lock();
        while state.phase != phase {
            state = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    self.shared
                        .wake
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self.shared.wake.wait(state).unwrap_or_else(PoisonError::into_inner),
            };
        }
        true
    }

    /// Block for at most `timeout`, returning early once exit is requested.
    /// Returns whether exit has been requested.
    pub fn wait_for_exit(&self, timeout: Duration) -> bool {
        let state = self.shared.lock();
        let (state, _) = self
            .shared
            .wake
            .wait_timeout_while(state, timeout, |state| !state.exit_requested)
            .unwrap_or_else(PoisonError::into_inner);
        state.exit_requested
    }
}

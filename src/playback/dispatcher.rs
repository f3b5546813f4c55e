use std::collections::VecDeque;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::playback::controller::PlaybackSummary;
use crate::playback::state::{PlaybackHandle, Signal};

/// Keys the viewer reacts to. Everything else collapses into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Space,
    Other,
}

impl Key {
    /// ESC exits, SPACE toggles pause, all other keys do nothing.
    pub fn signal(self) -> Option<Signal> {
        match self {
            Key::Escape => Some(Signal::Exit),
            Key::Space => Some(Signal::TogglePause),
            Key::Other => None,
        }
    }
}

/// Source of key presses, usually the window.
pub trait KeySource {
    /// Wait at most `timeout` for the next key press.
    fn poll_key(&mut self, timeout: Duration) -> Option<Key>;

    /// `false` once the source is gone (e.g. the window was closed).
    fn is_open(&self) -> bool {
        true
    }
}

/// Keys already collected by someone else; never blocks. An empty queue only
/// means nothing is pending, so it never reports itself closed.
impl KeySource for VecDeque<Key> {
    fn poll_key(&mut self, _timeout: Duration) -> Option<Key> {
        self.pop_front()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Continue,
    Exit,
}

/// Translates key presses into playback signals and owns the playback thread
/// so it can be joined before the display goes away.
pub struct InputDispatcher {
    handle: PlaybackHandle,
    worker: Option<JoinHandle<PlaybackSummary>>,
    poll_interval: Duration,
}

impl InputDispatcher {
    pub fn new(handle: PlaybackHandle, worker: JoinHandle<PlaybackSummary>, poll_interval: Duration) -> Self {
        Self {
            handle,
            worker: Some(worker),
            poll_interval,
        }
    }

    pub fn handle(&self) -> &PlaybackHandle {
        &self.handle
    }

    pub fn dispatch(&self, key: Key) -> DispatchOutcome {
        match key.signal() {
            Some(signal) => {
                log::debug!("Key {:?} -> {:?}", key, signal);
                self.handle.send(signal);
            }
            None => log::trace!("Ignoring key {:?}", key),
        }

        if self.handle.exit_requested() {
            DispatchOutcome::Exit
        } else {
            DispatchOutcome::Continue
        }
    }

    /// Dispatch every key the source has ready without blocking.
    pub fn pump<S: KeySource + ?Sized>(&mut self, source: &mut S) -> DispatchOutcome {
        while let Some(key) = source.poll_key(Duration::ZERO) {
            if self.dispatch(key) == DispatchOutcome::Exit {
                return DispatchOutcome::Exit;
            }
        }

        if !source.is_open() {
            self.handle.exit();
        }

        if self.handle.exit_requested() {
            DispatchOutcome::Exit
        } else {
            DispatchOutcome::Continue
        }
    }

    /// Poll `source` with the bounded interval until exit is requested or the
    /// source closes, then join the playback thread.
    pub fn run<S: KeySource + ?Sized>(mut self, source: &mut S) -> Option<PlaybackSummary> {
        while !self.handle.exit_requested() {
            let polled_at = Instant::now();
            match source.poll_key(self.poll_interval) {
                Some(key) => {
                    self.dispatch(key);
                }
                None if !source.is_open() => {
                    log::info!("Input source closed, stopping playback");
                    self.handle.exit();
                }
                None => {
                    // Non-blocking sources come back at once; wait out the interval
                    let remaining = self.poll_interval.saturating_sub(polled_at.elapsed());
                    if !remaining.is_zero() {
                        self.handle.wait_for_exit(remaining);
                    }
                }
            }
        }
        self.shutdown()
    }

    /// Request exit and wait for the playback thread. Safe to call repeatedly;
    /// only the first call returns the summary.
    pub fn shutdown(&mut self) -> Option<PlaybackSummary> {
        self.handle.exit();

        let worker = self.worker.take()?;
        match worker.join() {
            Ok(summary) => {
                log::debug!("Playback thread joined: {:?}", summary);
                Some(summary)
            }
            Err(_) => {
                log::error!("Playback thread panicked");
                None
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_none()
    }
}

impl Drop for InputDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// =============================================================================
// PLAYBACK CONTROLLER
// =============================================================================
//
// Owns the decoded frames and the cursor, and runs the timed advance loop on
// its own thread:
//
//   Running: paint frame at cursor, advance cursor, wait up to one frame delay
//   Paused:  no painting, wait until resumed or exited
//   Exited:  terminal, nothing more is painted
//
// Every wait is on the shared condition variable, so a signal sent mid-sleep
// is handled immediately instead of after the remaining delay.
// =============================================================================

use std::io;
use std::sync::{Arc, PoisonError};
use std::thread::{self, JoinHandle};

use crate::media::{Frame, FrameDelay, FrameSequence};
use crate::playback::state::{PlaybackHandle, PlaybackPhase, SharedControl};

/// Whatever shows frames on screen.
pub trait FrameSink: Send {
    fn paint(&mut self, index: usize, frame: &Frame);
}

impl<F> FrameSink for F
where
    F: FnMut(usize, &Frame) + Send,
{
    fn paint(&mut self, index: usize, frame: &Frame) {
        self(index, frame)
    }
}

/// Returned by the playback thread when it stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub frames_painted: u64,
    /// Index of the frame that would have been painted next
    pub cursor: usize,
}

pub struct PlaybackController {
    frames: FrameSequence,
    delay: FrameDelay,
    cursor: usize,
    shared: Arc<SharedControl>,
}

impl PlaybackController {
    pub fn new(frames: FrameSequence, delay: FrameDelay) -> (Self, PlaybackHandle) {
        let shared = Arc::new(SharedControl::new());
        let handle = PlaybackHandle::new(shared.clone());
        let controller = Self {
            frames,
            delay,
            cursor: 0,
            shared,
        };
        (controller, handle)
    }

    /// Run the playback loop on a dedicated thread.
    pub fn spawn<S>(self, mut sink: S) -> io::Result<JoinHandle<PlaybackSummary>>
    where
        S: FrameSink + 'static,
    {
        thread::Builder::new()
            .name("gif-playback".to_string())
            .spawn(move || self.run(&mut sink))
    }

    /// Run the playback loop on the calling thread until exit is requested.
    pub fn run<S: FrameSink + ?Sized>(mut self, sink: &mut S) -> PlaybackSummary {
        log::info!(
            "Playback started: {} frames, {}ms per frame",
            self.frames.len(),
            self.delay.as_millis()
        );

        let mut frames_painted = 0u64;

        loop {
            {
                let mut state = self.shared.lock();
                if state.exit_requested {
                    break;
                }

                if state.paused {
                    self.shared.report_phase(&mut state, PlaybackPhase::Paused);
                    let _state = self
                        .shared
                        .wake
                        .wait_while(state, |s| s.paused && !s.exit_requested)
                        .unwrap_or_else(PoisonError::into_inner);
                    continue;
                }

                self.shared.report_phase(&mut state, PlaybackPhase::Running);
            }

            sink.paint(self.cursor, self.frames.get(self.cursor));
            frames_painted += 1;
            self.cursor = self.frames.next_index(self.cursor);

            // Sleep for one frame delay unless paused or exited in the meantime.
            // The predicate is checked under the lock before blocking, so a
            // signal sent while painting is seen here too.
            let state = self.shared.lock();
            let _ = self
                .shared
                .wake
                .wait_timeout_while(state, self.delay.as_duration(), |s| {
                    !s.paused && !s.exit_requested
                })
                .unwrap_or_else(PoisonError::into_inner);
        }

        {
            let mut state = self.shared.lock();
            self.shared.report_phase(&mut state, PlaybackPhase::Exited);
        }

        log::info!("Playback stopped after {} frames", frames_painted);

        PlaybackSummary {
            frames_painted,
            cursor: self.cursor,
        }
    }
}

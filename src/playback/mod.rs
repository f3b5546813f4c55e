pub mod controller;
pub mod dispatcher;
pub mod state;


pub use controller::*;
pub use dispatcher::*;
pub use state::{PlaybackHandle, PlaybackPhase, Signal};

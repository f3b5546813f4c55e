use std::io::Cursor;
use std::time::Duration;

use gif::streaming_decoder::{Block, Decoded, OutputBuffer, StreamingDecoder};
use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;

use crate::media::{Animation, Frame, FrameDelay, FrameSequence, LoadError};

/// Decode a GIF payload into composited RGBA frames plus a single playback delay.
///
/// The delay comes from the nominal frame rate of the whole animation; GIFs
/// that encode no timing at all fall back to `fallback_delay`.
pub fn decode_animation(bytes: &[u8], fallback_delay: Duration) -> Result<Animation, LoadError> {
    // The frame decoder refuses a container with no image block before
    // yielding anything, so classify that case up front.
    if contains_no_frames(bytes) {
        return Err(LoadError::Empty);
    }

    let decoder = GifDecoder::new(Cursor::new(bytes))?;
    let raw_frames = decoder.into_frames().collect_frames()?;

    if raw_frames.is_empty() {
        return Err(LoadError::Empty);
    }

    let delays: Vec<Duration> = raw_frames
        .iter()
        .map(|frame| Duration::from(frame.delay()))
        .collect();
    let fps = nominal_frame_rate(&delays);
    let delay = FrameDelay::from_frame_rate_or(fps, fallback_delay);

    let frames = raw_frames
        .into_iter()
        .map(|frame| Frame::new(frame.into_buffer()))
        .collect();
    let frames = FrameSequence::new(frames)?;

    let (width, height) = frames.dimensions();
    log::info!(
        "Decoded GIF: {}x{}, {} frames, {:.2} fps nominal, {}ms per frame",
        width,
        height,
        frames.len(),
        fps,
        delay.as_millis()
    );

    Ok(Animation { frames, delay })
}

/// Frames per second over the whole animation, or 0.0 when no frame carries a delay.
pub fn nominal_frame_rate(delays: &[Duration]) -> f64 {
    let total: Duration = delays.iter().sum();
    if delays.is_empty() || total.is_zero() {
        return 0.0;
    }
    delays.len() as f64 / total.as_secs_f64()
}

/// True when `bytes` is a well-formed GIF container that reaches its trailer
/// without a single image descriptor.
///
/// Anything malformed or truncated returns false and is left to the frame
/// decoder to report.
pub fn contains_no_frames(bytes: &[u8]) -> bool {
    let mut scanner = StreamingDecoder::new();

    // A block introducer is only acted on once the byte after it arrives, so
    // the payload is followed by one byte that is never a valid block type.
    for chunk in [bytes, &[0u8][..]] {
        let mut rest = chunk;
        while !rest.is_empty() {
            let (consumed, decoded) = match scanner.update(rest, &mut OutputBuffer::None) {
                Ok(step) => step,
                Err(e) => {
                    log::debug!("GIF container scan stopped: {}", e);
                    return false;
                }
            };
            match decoded {
                Decoded::BlockStart(Block::Image) => return false,
                Decoded::BlockStart(Block::Trailer) => return true,
                Decoded::Nothing if consumed == 0 => return false,
                _ => {}
            }
            rest = &rest[consumed..];
        }
    }
    false
}

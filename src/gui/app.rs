use eframe::egui;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::media::{Animation, Frame};
use crate::playback::{DispatchOutcome, FrameSink, InputDispatcher, Key, PlaybackController, PlaybackPhase};

impl From<egui::Key> for Key {
    fn from(key: egui::Key) -> Self {
        match key {
            egui::Key::Escape => Key::Escape,
            egui::Key::Space => Key::Space,
            _ => Key::Other,
        }
    }
}

/// Latest painted frame, handed from the playback thread to the UI thread.
pub type FrameSlot = Arc<Mutex<Option<egui::ColorImage>>>;

/// Display Sink backed by an egui window: the playback thread drops the frame
/// into a slot and asks egui to repaint.
pub struct EguiFrameSink {
    ctx: egui::Context,
    slot: FrameSlot,
}

impl EguiFrameSink {
    pub fn new(ctx: egui::Context, slot: FrameSlot) -> Self {
        Self { ctx, slot }
    }
}

impl FrameSink for EguiFrameSink {
    fn paint(&mut self, index: usize, frame: &Frame) {
        let size = [frame.width() as usize, frame.height() as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, frame.pixels());
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(image);
        log::trace!("Painted frame {}", index);
        self.ctx.request_repaint();
    }
}

pub struct GifViewerApp {
    pub dispatcher: InputDispatcher,
    pub slot: FrameSlot,
    pub texture: Option<egui::TextureHandle>,
    pub poll_interval: Duration,
    pub closing: bool,
}

impl GifViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, animation: Animation, poll_interval: Duration) -> anyhow::Result<Self> {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let slot: FrameSlot = Arc::new(Mutex::new(None));
        let sink = EguiFrameSink::new(cc.egui_ctx.clone(), slot.clone());

        let (controller, handle) = PlaybackController::new(animation.frames, animation.delay);
        let worker = controller
            .spawn(sink)
            .map_err(|e| anyhow::anyhow!("Failed to start playback thread: {}", e))?;

        Ok(Self {
            dispatcher: InputDispatcher::new(handle, worker, poll_interval),
            slot,
            texture: None,
            poll_interval,
            closing: false,
        })
    }

    /// Key presses that arrived since the last frame, in order.
    pub(crate) fn collect_keys(ctx: &egui::Context) -> VecDeque<Key> {
        ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key { key, pressed: true, repeat: false, .. } => Some(Key::from(*key)),
                    _ => None,
                })
                .collect()
        })
    }

    /// Stop playback and wait for the playback thread before the window goes away.
    pub(crate) fn begin_close(&mut self, ctx: &egui::Context, close_window: bool) {
        if self.closing {
            return;
        }
        self.closing = true;

        if let Some(summary) = self.dispatcher.shutdown() {
            log::info!("Viewer closing after {} painted frames", summary.frames_painted);
        }
        if close_window {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    pub(crate) fn upload_latest_frame(&mut self, ctx: &egui::Context) {
        let latest = self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(image) = latest {
            match &mut self.texture {
                Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
                None => {
                    self.texture = Some(ctx.load_texture("gif-frame", image, egui::TextureOptions::NEAREST));
                }
            }
        }
    }
}

impl eframe::App for GifViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let close_requested = ctx.input(|i| i.viewport().close_requested());
        if close_requested {
            self.begin_close(ctx, false);
        }

        if !self.closing {
            let mut keys = Self::collect_keys(ctx);
            if self.dispatcher.pump(&mut keys) == DispatchOutcome::Exit {
                self.begin_close(ctx, true);
            }
        }

        self.upload_latest_frame(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                if let Some(texture) = &self.texture {
                    let size = ui.available_size();
                    ui.add(egui::Image::from_texture(egui::load::SizedTexture::from_handle(texture)).fit_to_exact_size(size));
                }
            });

        if self.dispatcher.handle().phase() == PlaybackPhase::Paused {
            egui::Area::new(egui::Id::new("paused_badge"))
                .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new("Paused")
                            .color(egui::Color32::WHITE)
                            .background_color(egui::Color32::from_black_alpha(160)),
                    );
                });
        }

        // Bounded wait before the next input poll
        ctx.request_repaint_after(self.poll_interval);
    }
}

mod core;
mod gui;
mod media;
mod playback;

use std::process::ExitCode;

use clap::Parser;
use eframe::egui;

use crate::core::{Args, ViewerConfig};
use crate::gui::GifViewerApp;
use crate::media::{GifLoader, LoadError};

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<LoadError>() {
            Some(load_error) => {
                eprintln!("Error ({} stage): {}", load_error.stage(), load_error);
                ExitCode::from(load_error.exit_code())
            }
            None => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = ViewerConfig::load(args.config.as_deref())?.apply_args(&args);

    // Everything is downloaded and decoded before a window exists
    let loader = GifLoader::new(config.loader_options())?;
    let animation = loader.load(&args.url)?;

    let (width, height) = animation.frames.dimensions();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width as f32, height as f32])
            .with_title(config.window_title.clone()),
        ..Default::default()
    };

    let poll_interval = config.poll_interval();
    eframe::run_native(
        &config.window_title,
        options,
        Box::new(move |cc| {
            match GifViewerApp::new(cc, animation, poll_interval) {
                Ok(app) => Ok(Box::new(app)),
                Err(e) => {
                    log::error!("Failed to initialize viewer: {:#}", e);
                    Err(e.into())
                }
            }
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run viewer window: {}", e))?;

    log::info!("Viewer closed");
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use console::style;
use log::error;
use meme_frame_picker::cli::Cli;
use meme_frame_picker::component::meme_picker::{MemeFramePicker, MetricComputer};
use meme_frame_picker::config::PickerConfig;
use meme_frame_picker::signal::setup_shutdown_signal;
use meme_frame_picker::tools::{CommandFaceDetector, SidecarClipEmbedder, resolve_text_recognizer};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Cli::parse().into_config();

    if let Err(e) = run(config) {
        error!("執行失敗: {e:#}");
        eprintln!("{} {e:#}", style("錯誤:").red().bold());
        std::process::exit(1);
    }
}

fn run(config: PickerConfig) -> Result<()> {
    config.validate()?;

    let shutdown_signal = setup_shutdown_signal();
    let face_detector = Box::new(CommandFaceDetector::new(config.face_cmd.as_str()));
    let clip_embedder = Box::new(SidecarClipEmbedder::new(config.clip_cmd.as_str()));
    let text_recognizer = resolve_text_recognizer(config.enable_ocr);

    let metrics = MetricComputer::new(
        config.clone(),
        face_detector,
        clip_embedder,
        text_recognizer,
    );
    let picker = MemeFramePicker::new(config, metrics, shutdown_signal);
    picker.run()?;

    Ok(())
}

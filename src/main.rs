use anyhow::Context;
use clap::Parser;
use eframe::egui;
use env_logger::Env;

use pose_edit::app::PoseEditorApp;
use pose_edit::config::Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("warn")
    };
    env_logger::Builder::from_env(env).init();

    let app = PoseEditorApp::new(&cli).context("failed to set up the editor")?;

    let title = match &cli.overlay {
        Some(path) => format!(
            "pose-edit — {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        ),
        None => "pose-edit".to_string(),
    };
    let size = cli.canvas_size();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([size.x + 340.0, size.y + 120.0])
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(&title, options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("failed to run eframe")
}

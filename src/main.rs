use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use launch_dashboard::app::LaunchDashboardApp;
use launch_dashboard::config::DashboardConfig;
use launch_dashboard::state::DashboardState;

#[derive(Parser, Debug)]
#[command(author, version, about = "Launch records dashboard", long_about = None)]
struct Cli {
    /// Launch records to open (.csv, .json or .parquet)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    data: Option<PathBuf>,

    /// Dashboard configuration file (TOML)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = DashboardConfig::resolve(cli.config.as_deref()).context("loading configuration")?;
    let mut state = DashboardState::new(config);

    // An explicit --data must load; the configured default may be absent.
    let (path, explicit) = match cli.data {
        Some(path) => (path, true),
        None => (state.config.data_path.clone(), false),
    };
    if explicit || path.exists() {
        if let Err(e) = state.load_path(&path) {
            log::error!("Failed to load {}: {e:#}", path.display());
            return Err(e.context(format!("loading {}", path.display())));
        }
    } else {
        log::warn!("{} not found, starting without data", path.display());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([600.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "SpaceX Launch Records Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(LaunchDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
}

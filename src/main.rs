#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]

use anyhow::{bail, Result};
use clap::Parser;
use eframe::egui;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use runbox::actions::{launch, DetachedSpawner};
use runbox::app::RunBoxApp;
use runbox::icons::IconSet;
use runbox::lister::load_entries;
use runbox::prefs::{
    configured_dir, default_preferences_path, FilePreferences, MemoryPreferences, PreferenceStore,
};
use runbox::search::filter_entries;

#[derive(Parser, Debug)]
#[command(name = "runbox")]
#[command(about = "Search a folder and launch a program from it")]
struct Args {
    #[arg(default_value = "")]
    query: String,
    /// Print matching file names instead of opening the window.
    #[arg(long, default_value_t = false)]
    cli: bool,
    /// With --cli, launch the first match.
    #[arg(long, default_value_t = false, requires = "cli")]
    launch: bool,
    /// Preference file to use instead of the per-user default.
    #[arg(long)]
    prefs: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_preferences(args: &Args) -> Box<dyn PreferenceStore> {
    match args.prefs.clone().or_else(default_preferences_path) {
        Some(path) => Box::new(FilePreferences::open(path)),
        None => {
            tracing::warn!("no config directory available, settings will not persist");
            Box::new(MemoryPreferences::default())
        }
    }
}

fn run_cli(args: &Args, prefs: &dyn PreferenceStore) -> Result<()> {
    let configured = configured_dir(prefs);
    let entries = load_entries(configured.as_deref())?;
    let results = filter_entries(&entries, &args.query);

    if args.launch {
        let Some(first) = results.first() else {
            bail!("no file matches {:?}", args.query);
        };
        launch(configured.as_deref(), first, &mut DetachedSpawner)?;
        return Ok(());
    }

    for name in results {
        println!("{name}");
    }
    Ok(())
}

fn run_gui(args: &Args, prefs: Box<dyn PreferenceStore>) -> Result<()> {
    let icons = IconSet::load()?;
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Run Box")
            .with_inner_size(egui::vec2(500.0, 200.0))
            .with_resizable(false)
            .with_icon(icons.app.to_icon_data()),
        ..Default::default()
    };
    let query = args.query.clone();

    eframe::run_native(
        "Run Box",
        native_options,
        Box::new(move |cc| {
            let mut app = RunBoxApp::new(prefs, Box::new(DetachedSpawner), query);
            app.install_icons(&cc.egui_ctx, &icons);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let prefs = open_preferences(&args);
    if args.cli {
        run_cli(&args, prefs.as_ref())
    } else {
        run_gui(&args, prefs)
    }
}

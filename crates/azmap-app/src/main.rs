//! The binary entry point for the azimuthal map.

use std::path::Path;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use azmap_app::hud::{clock_line, location_label};
use azmap_app::session::{MapSession, SessionOptions};
use azmap_app::{AppError, PlatformDirs, export, shapes};
use azmap_config::{CliArgs, Config};
use chrono::Utc;
use clap::Parser;
use tracing::{debug, info, warn};

/// How often `--watch` checks whether the sun is due to move.
const WATCH_POLL: Duration = Duration::from_secs(1);

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("azmap: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<(), AppError> {
    let dirs = PlatformDirs::resolve()?.with_config_dir(args.config.as_deref());
    dirs.create_dirs()?;

    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(args);
    azmap_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));

    let plan = config.resolve_launch(args)?;
    let mut session = MapSession::new(
        plan.center.point,
        plan.target.point,
        SessionOptions::from_config(&config),
    )?;

    let sources = shapes::layer_sources(&config.layers, &dirs.data_dir);
    let loaded = shapes::load_layers(&mut session, &sources, config.layers.ring_limit)?;
    debug!(loaded, "data layers loaded");

    let now = args.time.unwrap_or_else(Utc::now);
    if config.night.enabled
        && let Err(e) = session.update_night(now)
    {
        warn!(error = %e, "night overlay left empty");
    }

    let center_label = location_label(plan.center.name.as_deref(), plan.center.point);
    let target_label = location_label(plan.target.name.as_deref(), plan.target.point);
    println!("Center: {center_label}");
    println!("Target: {target_label}");
    println!("{}", session.path_summary());
    println!("{}", clock_line(now));
    info!(
        mode = %session.mode(),
        graticule_segments = session.graticule().segment_count(),
        night_triangles = session.night().triangle_count(),
        "map built"
    );

    if let Some(path) = &args.export {
        export::write_export(&session, path)?;
        info!(path = %path.display(), "exported geometry");
    }

    if args.watch {
        watch(&mut session, &config, args.export.as_deref())?;
    }
    Ok(())
}

/// Move the sun every `night.refresh_seconds` until the process is stopped,
/// rewriting the export after each update.
fn watch(session: &mut MapSession, config: &Config, export_path: Option<&Path>) -> Result<(), AppError> {
    let interval = config.night.refresh_interval();
    info!(seconds = interval.as_secs(), "watching sun position");
    loop {
        thread::sleep(WATCH_POLL);
        let now = Utc::now();
        match session.refresh_night(now, interval) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(e) => warn!(error = %e, "night overlay left empty"),
        }
        println!("{}", clock_line(now));
        if let Some(path) = export_path {
            export::write_export(session, path)?;
            debug!(path = %path.display(), "export refreshed");
        }
    }
}

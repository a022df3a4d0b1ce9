//! Runs one navigation scenario against the simulated world.
//!
//! Usage: `nav-sim <scenario.json>`. Navigator tuning comes from `NAV_*`
//! environment variables (a `.env` file is honored), `NAV_SIM_SEED` fixes the
//! random source and `NAV_SIM_LOG_DIR` overrides where logs are written.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use nav_sim::{Scenario, SimWorld, collaborators};
use navigator::{Navigator, NavigatorConfig, StaticTarget};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: nav-sim <scenario.json>")?;

    setup_logging()?;

    let scenario = Scenario::load(&path)
        .with_context(|| format!("loading scenario {}", path.display()))?;
    let config = NavigatorConfig::from_env();
    let world = Arc::new(SimWorld::from_scenario(&scenario));

    let mut navigator = match std::env::var("NAV_SIM_SEED")
        .ok()
        .and_then(|seed| seed.parse::<u64>().ok())
    {
        Some(seed) => Navigator::with_seed(collaborators(&world), config, seed),
        None => Navigator::new(collaborators(&world), config),
    };

    tracing::info!(
        scenario = %scenario.name,
        from = %scenario.snapshot.player.position,
        goal = %scenario.goal,
        "starting navigation"
    );
    let outcome = navigator.move_to(&mut StaticTarget(scenario.goal)).await;
    let stats = navigator.stats();

    match &outcome {
        Ok(()) => tracing::info!(at = %world.player_position(), "navigation finished"),
        Err(err) => tracing::info!(
            error = %err,
            severity = err.severity().as_str(),
            "navigation failed"
        ),
    }
    println!(
        "{}: {} at {} after {} move commands, {} plans ({} failed), {} interactions, {} nudges",
        if scenario.name.is_empty() { "scenario" } else { scenario.name.as_str() },
        match &outcome {
            Ok(()) => "arrived".to_string(),
            Err(err) => err.to_string(),
        },
        world.player_position(),
        stats.move_commands,
        stats.total_plans(),
        stats.failed_plans,
        stats.interactions,
        stats.nudges,
    );

    outcome.map_err(Into::into)
}

/// Setup logging to both stderr and file
fn setup_logging() -> Result<()> {
    let log_dir = log_directory();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "nav-sim.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    // Leak the guard to keep file writer alive
    std::mem::forget(guard);

    tracing::info!("Log file: {}/nav-sim.log", log_dir.display());
    Ok(())
}

fn log_directory() -> PathBuf {
    if let Some(dir) = std::env::var_os("NAV_SIM_LOG_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(xdg_cache) = std::env::var_os("XDG_CACHE_HOME") {
        return PathBuf::from(xdg_cache).join("nav-sim").join("logs");
    }
    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home).join(".cache").join("nav-sim").join("logs");
    }
    std::env::temp_dir().join("nav-sim").join("logs")
}

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use gb_config::{Config, ConfigCell, ConfigError};
use gb_controls::{Actuator, LoggingActuator, SwitchActuator};
use gb_core::GaugeRegistry;
use gb_engine::{Engine, EngineBuilder, EngineError};
use gb_sensor::{ChamberState, SimulatedChamber};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "gb-cli")]
#[command(about = "Growbox CLI - closed-chamber environment regulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a chamber configuration file
    Validate {
        /// Path to the configuration YAML file
        config_path: PathBuf,
    },
    /// Run the control loop against a simulated chamber
    Run {
        /// Path to the configuration YAML file
        config_path: PathBuf,
        /// Stop after this many ticks (runs until killed by default)
        #[arg(long)]
        ticks: Option<u64>,
        /// Seconds of simulated chamber time per tick (defaults to the
        /// configured tick interval)
        #[arg(long)]
        sim_dt: Option<f64>,
    },
    /// Run a number of ticks and dump the resulting gauges
    Metrics {
        /// Path to the configuration YAML file
        config_path: PathBuf,
        /// Number of ticks to simulate before dumping
        #[arg(long, default_value_t = 10)]
        ticks: u64,
        /// Emit JSON instead of Prometheus text format
        #[arg(long)]
        json: bool,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

type CliResult<T> = Result<T, CliError>;

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Run {
            config_path,
            ticks,
            sim_dt,
        } => cmd_run(&config_path, ticks, sim_dt),
        Commands::Metrics {
            config_path,
            ticks,
            json,
        } => cmd_metrics(&config_path, ticks, json),
    }
}

fn cmd_validate(config_path: &Path) -> CliResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = gb_config::load_yaml(config_path)?;
    println!("✓ Configuration is valid");
    println!(
        "  {} sensor(s), {} monitor(s), {} controller(s)",
        config.sensors.len(),
        config.monitors.len(),
        config.controllers.len()
    );
    Ok(())
}

fn cmd_run(config_path: &Path, ticks: Option<u64>, sim_dt: Option<f64>) -> CliResult<()> {
    let config = gb_config::load_yaml(config_path)?;
    let registry = Arc::new(GaugeRegistry::new());
    let dt_s = sim_dt.unwrap_or(config.tick_interval_seconds);
    let mut engine = build_sim_engine(&config, registry.clone(), dt_s)?;

    let stop = Arc::new(AtomicBool::new(false));
    let reload = Arc::new(ConfigCell::new());
    let watcher = spawn_reload_watcher(config_path.to_path_buf(), reload.clone(), stop.clone());

    info!(
        config = %config_path.display(),
        tick_interval_s = config.tick_interval_seconds,
        "starting control loop"
    );
    engine.run(&stop, &reload, ticks);
    stop.store(true, Ordering::Relaxed);
    let _ = watcher.join();

    println!("✓ Stopped after {} tick(s)", engine.ticks());
    print!("{}", registry.render_text());
    Ok(())
}

fn cmd_metrics(config_path: &Path, ticks: u64, json: bool) -> CliResult<()> {
    let config = gb_config::load_yaml(config_path)?;
    let registry = Arc::new(GaugeRegistry::new());
    let mut engine = build_sim_engine(&config, registry.clone(), config.tick_interval_seconds)?;

    for _ in 0..ticks {
        engine.tick();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&registry.snapshot())?);
    } else {
        print!("{}", registry.render_text());
    }
    Ok(())
}

/// Build an engine whose sensors read a shared simulated chamber and
/// whose `humidifier` / `exhaust_fan` actuators feed back into it. Any
/// other device gets a log-only actuator.
fn build_sim_engine(
    config: &Config,
    registry: Arc<GaugeRegistry>,
    dt_s: f64,
) -> Result<Engine, EngineError> {
    let humidifier_on = Arc::new(AtomicBool::new(false));
    let exhaust_on = Arc::new(AtomicBool::new(false));
    let chamber = Arc::new(Mutex::new(ChamberState::new(
        humidifier_on.clone(),
        exhaust_on.clone(),
    )));

    let mut builder = EngineBuilder::new(registry);
    for sensor in &config.sensors {
        builder = builder.transport(
            sensor.id.clone(),
            Box::new(SimulatedChamber::new(chamber.clone(), sensor.kind, dt_s)),
        );
    }
    for controller in &config.controllers {
        let actuator: Box<dyn Actuator> = match controller.device.as_str() {
            "humidifier" => Box::new(SwitchActuator::new("humidifier", humidifier_on.clone())),
            "exhaust_fan" => Box::new(SwitchActuator::new("exhaust_fan", exhaust_on.clone())),
            other => Box::new(LoggingActuator::new(other)),
        };
        builder = builder.actuator(controller.device.clone(), actuator);
    }
    builder.build(config)
}

/// Watch the configuration file's mtime and hand validated replacements
/// to the engine through the reload cell. Invalid replacements are
/// logged and dropped; the engine keeps running on its current
/// configuration.
fn spawn_reload_watcher(
    path: PathBuf,
    reload: Arc<ConfigCell>,
    stop: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let mut last_mtime = file_mtime(&path);
        while !stop.load(Ordering::Relaxed) {
            std::thread::sleep(Duration::from_secs(2));
            let mtime = file_mtime(&path);
            if mtime.is_some() && mtime != last_mtime {
                last_mtime = mtime;
                match gb_config::load_yaml(&path) {
                    Ok(config) => {
                        info!(config = %path.display(), "queued reloaded configuration");
                        reload.store(Arc::new(config));
                    }
                    Err(err) => {
                        warn!(error = %err, "ignoring invalid configuration change");
                    }
                }
            }
        }
    })
}

fn file_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

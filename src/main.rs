//! Balance ball application
//!
//! Wires the broker to its collaborators:
//! - producers: accelerometer (`accl`) and button (`btn`) threads
//! - consumers: game control, message logger, LED
//!
//! Runs until Ctrl-C (or `--run-for` seconds), then stops and joins every
//! producer thread.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use balance_bus::broker::Broker;
use balance_bus::broker::message::{TOPIC_ACCEL, TOPIC_BOUNDARY, TOPIC_BUTTON};
use balance_bus::config::{Settings, load_config, load_config_from};
use balance_bus::consumers::{GameControl, Led, LogFormat, Logger, TracingDisplay};
use balance_bus::producers::{
    Accelerometer, Button, FileButtonDevice, Producer, SimulatedAccelDevice, SimulatedButtonDevice,
};
use balance_bus::utils::logging;
use clap::Parser;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "balance-bus", about = "Balance ball game on an in-process message bus")]
struct Cli {
    /// Configuration file; defaults to config/default.* when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides `logging.level`
    #[arg(long)]
    log_level: Option<String>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    run_for: Option<u64>,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => load_config_from(path, true),
        None => load_config(),
    };
    let settings = match loaded {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("info");
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    logging::init(cli.log_level.as_deref().unwrap_or(&settings.logging.level));

    if let Err(e) = run(settings, cli.run_for).await {
        error!("balance-bus failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(settings: Settings, run_for: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let broker = Arc::new(Broker::new());

    let game = Arc::new(GameControl::new(
        broker.clone(),
        Arc::new(TracingDisplay),
        settings.game.clone(),
    ));
    broker.subscribe(TOPIC_ACCEL, &game);
    broker.subscribe(TOPIC_BUTTON, &game);
    broker.subscribe(TOPIC_BOUNDARY, &game);

    let format = settings
        .logging
        .format
        .parse::<LogFormat>()
        .unwrap_or_else(|e| {
            warn!("{}; falling back to plain", e);
            LogFormat::Plain
        });
    let logger = Arc::new(Logger::new(format));
    broker.subscribe(TOPIC_BUTTON, &logger);
    broker.subscribe(TOPIC_BOUNDARY, &logger);

    let led = Arc::new(Led::new(settings.led.device.as_deref().map(PathBuf::from)));
    broker.subscribe(TOPIC_BUTTON, &led);

    let producers = spawn_producers(&settings, &broker)?;
    info!(topics = ?broker.topics(), "balance-bus running");

    let deadline = async {
        match run_for {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Stopping producers.");
        }
        _ = deadline => {
            info!("Run time elapsed. Stopping producers.");
        }
    }

    for producer in &producers {
        producer.stop();
    }
    let results = tokio::task::spawn_blocking(move || {
        producers
            .into_iter()
            .map(Producer::join)
            .collect::<Vec<_>>()
    })
    .await?;

    for result in results {
        if let Err(e) = result {
            error!("{}", e);
        }
    }

    info!(score = game.state().score, led_on = led.is_on(), "final state");
    Ok(())
}

fn spawn_producers(
    settings: &Settings,
    broker: &Arc<Broker>,
) -> Result<Vec<Producer>, Box<dyn std::error::Error>> {
    let accl = Producer::spawn(
        "accl",
        broker.clone(),
        Accelerometer::new(SimulatedAccelDevice::default()),
        Duration::from_millis(settings.accelerometer.poll_interval_ms),
    )?;

    let interval = Duration::from_millis(settings.button.poll_interval_ms);
    let gpio = settings.button.gpio;
    let btn = match settings.button.device.as_deref() {
        Some(device) => {
            info!(device, gpio, "reading button from device");
            Producer::spawn(
                "btn",
                broker.clone(),
                Button::new(gpio, FileButtonDevice::new(Path::new(device))),
                interval,
            )?
        }
        None => Producer::spawn(
            "btn",
            broker.clone(),
            Button::new(gpio, SimulatedButtonDevice::new(settings.button.press_every)),
            interval,
        )?,
    };

    Ok(vec![accl, btn])
}

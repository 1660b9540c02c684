use anyhow::Result;
use clap::Parser;
use route_replay::adapter::{ConsoleAdapter, PresentationAdapter};
use route_replay::playback::{PlaybackConfig, PlaybackDriver, PlaybackState};
use route_replay::source::RouteSource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Replay a vehicle route in the terminal
#[derive(Parser)]
#[command(name = "route-replay", version, about)]
struct Args {
    /// Time frame to replay: today, lastWeek, lastMonth or nextWeek
    time_frame: Option<String>,

    /// CSV file with a custom base route (lat,lng columns)
    #[arg(long)]
    route: Option<String>,

    /// Playback speed multiplier, 1 to 10
    #[arg(long)]
    speed: Option<f64>,

    /// Milliseconds between ticks at 1x speed
    #[arg(long)]
    tick_ms: Option<u64>,
}

/// Persistent application settings
#[derive(Serialize, Deserialize)]
struct AppSettings {
    default_time_frame: String,
    base_tick_ms: u64,
    default_speed: f64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_time_frame: "today".to_string(),
            base_tick_ms: 1000,
            default_speed: 1.0,
        }
    }
}

impl AppSettings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("route-replay").join("settings.json"))
    }

    fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                if let Ok(contents) = fs::read_to_string(&path) {
                    if let Ok(settings) = serde_json::from_str(&contents) {
                        return settings;
                    }
                }
            }
        }
        Self::default()
    }

    fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Ok(json) = serde_json::to_string_pretty(self) {
                let _ = fs::write(&path, json);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut settings = AppSettings::load();

    let source = match &args.route {
        Some(path) => RouteSource::from_csv(path)?,
        None => RouteSource::new(),
    };

    let token = args
        .time_frame
        .clone()
        .unwrap_or_else(|| settings.default_time_frame.clone());
    let route = source.generate(&token);
    info!(
        "Replaying {} waypoints for time frame '{}'",
        route.len(),
        route.label
    );

    let config = PlaybackConfig {
        base_tick_ms: args.tick_ms.unwrap_or(settings.base_tick_ms),
        speed: 1.0,
    };
    let mut driver = PlaybackDriver::with_config(config);
    let mut updates = driver.subscribe().await;

    driver.load_route(route).await?;
    let speed = args.speed.unwrap_or(settings.default_speed);
    if speed != 1.0 {
        driver.set_speed(speed).await?;
    }
    driver.play().await?;

    let mut console = ConsoleAdapter::new();
    while let Some(snapshot) = updates.recv().await {
        console.on_snapshot(&snapshot).await;
        if snapshot.state == PlaybackState::Finished {
            break;
        }
    }
    info!("Route complete");

    settings.default_time_frame = token;
    settings.save();
    Ok(())
}

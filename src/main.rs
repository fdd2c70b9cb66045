//! airwave command line - list stations and play them through the playback
//! coordinator.
//!
//! Playback runs against the in-process simulated backend, which is enough to
//! watch the coordinator's state machine and tick delivery end to end.

use std::{error::Error, sync::Arc, time::Duration};

use airwave::{
    config::{Config, Station},
    services::playback::{
        PeriodicTimeObserver, PlaybackHandle, PlaybackObserver, PlaybackService, PlaybackState,
        SimulatedBackend, SimulatedOutput,
    },
    tracing_config,
};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use tracing::{info, instrument};

#[derive(Parser)]
#[command(name = "airwave")]
#[command(about = "Live radio playback")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured stations
    Stations,
    /// Play a station
    Play {
        /// Station id (see `airwave stations`) or a stream URL
        station: String,
        /// Stop after this many seconds; runs until Ctrl-C when omitted
        #[arg(short, long)]
        seconds: Option<u64>,
        /// Also write logs to the log directory
        #[arg(long)]
        log_file: bool,
    },
    /// Print the effective configuration
    Config,
    /// Print the configuration JSON schema
    Schema,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = Config::load_or_default()?;

    match cli.command {
        Commands::Stations => {
            for station in &config.stations {
                println!("{:<12} {:<20} {}", station.id, station.name, station.url);
            }
        }
        Commands::Play {
            station,
            seconds,
            log_file,
        } => {
            let _guard = if log_file {
                Some(tracing_config::init_with_file(config.general.log_level)?)
            } else {
                tracing_config::init(config.general.log_level)?;
                None
            };
            let station = config.resolve(&station)?;
            play_station(&config, &station, seconds.map(Duration::from_secs)).await?;
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(Config);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

/// Prints state changes and ticks for one station.
struct ConsoleObserver {
    station: String,
}

impl PlaybackObserver for ConsoleObserver {
    fn playback_state_changed(&self, state: PlaybackState) {
        println!("[{}] {state}", self.station);
    }

    fn player_item_set(&self) {
        println!("[{}] stream attached", self.station);
    }
}

impl PeriodicTimeObserver for ConsoleObserver {
    fn update(&self, time: Duration) {
        println!("[{}] {}s", self.station, time.as_secs());
    }
}

#[instrument(skip(config, station), fields(station = %station.id))]
async fn play_station(
    config: &Config,
    station: &Station,
    limit: Option<Duration>,
) -> Result<(), Box<dyn Error>> {
    let playback = PlaybackService::start(
        SimulatedBackend::default(),
        SimulatedOutput::new(),
        &config.playback,
    );

    let observer = Arc::new(ConsoleObserver {
        station: station.name.clone(),
    });
    let state_observer: Arc<dyn PlaybackObserver> = observer.clone();
    let time_observer: Arc<dyn PeriodicTimeObserver> = observer;
    playback.add_playback_observer(&state_observer).await?;
    playback.add_periodic_time_observer(&time_observer).await?;

    info!(url = %station.url, "Starting playback");
    playback.play_url(station.url.clone()).await?;

    wait_for_stop(limit).await;

    stop(&playback, config.playback.end_session_on_pause).await?;
    playback.remove_periodic_time_observer(&time_observer).await?;
    playback.remove_playback_observer(&state_observer).await?;
    playback.shutdown().await?;

    Ok(())
}

async fn wait_for_stop(limit: Option<Duration>) {
    match limit {
        Some(limit) => {
            tokio::select! {
                _ = tokio::time::sleep(limit) => {}
                _ = tokio::signal::ctrl_c() => {}
            }
        }
        None => {
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

async fn stop(playback: &PlaybackHandle, release_output: bool) -> Result<(), Box<dyn Error>> {
    let mut states = Box::pin(playback.playback_state_monitored());
    playback.pause().await?;

    if release_output {
        let paused = async {
            while let Some(state) = states.next().await {
                if !state.is_playing() {
                    break;
                }
            }
        };
        if tokio::time::timeout(Duration::from_secs(2), paused).await.is_err() {
            info!("Still playing after pause, keeping audio output");
        }
        playback.end_unused_audio_session().await?;
    }
    Ok(())
}

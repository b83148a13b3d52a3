//! Guardian host runtime.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HostDevice            LogEventSink   KvStore        HostClock │
//! │  (Haptic+Notify+       (EventSink)    (ProfileStore+ (clock)   │
//! │   Location+Speech)                     StoragePort)            │
//! │  console reader thread ──▶ CMD_CHANNEL                         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            GuardianService (pure logic)                │    │
//! │  │  SOS FSM · HazardMonitor · AlertSink · SpeechBridge    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Control loop: advance → sleep until next_due or a command    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use guardian::adapters::console::{self, HELP};
use guardian::adapters::host::HostDevice;
use guardian::adapters::log_sink::LogEventSink;
use guardian::adapters::store::KvStore;
use guardian::adapters::time::HostClock;
use guardian::app::ports::Location;
use guardian::app::service::GuardianService;
use guardian::config::RuntimeConfig;
use guardian::hazard::SimulatedHazards;
use guardian::runtime::{self, Runtime};

#[derive(Debug, Parser)]
#[command(name = "guardian", version, about = "Hazard alerts and SOS escalation")]
struct Args {
    /// Profile store file.
    #[arg(long, default_value = "guardian.store")]
    store: PathBuf,

    /// Keep the profile in memory only.
    #[arg(long)]
    in_memory: bool,

    /// Seed for the simulated hazard stream.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 5_000)]
    dispatch_timeout_ms: u32,

    #[arg(long, default_value_t = 250)]
    idle_poll_ms: u32,

    /// Report simulated haptics as available.
    #[arg(long)]
    haptics: bool,

    /// Report simulated speech synthesis as available.
    #[arg(long)]
    speech: bool,

    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Default log filter when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            store_path: (!self.in_memory).then(|| self.store.clone()),
            dispatch_timeout_ms: self.dispatch_timeout_ms,
            idle_poll_ms: self.idle_poll_ms,
            hazard_seed: self.seed,
            haptics_simulated: self.haptics,
            speech_simulated: self.speech,
            location: self.lat.zip(self.lon).map(|(latitude, longitude)| Location {
                latitude,
                longitude,
                accuracy_m: None,
            }),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    info!("Guardian v{} starting", env!("CARGO_PKG_VERSION"));

    let config = args.runtime_config();
    config.validate()?;

    let mut store = match &config.store_path {
        Some(path) => KvStore::open(path)
            .with_context(|| format!("opening profile store {}", path.display()))?,
        None => KvStore::in_memory(),
    };

    let mut device = HostDevice::new(&config);
    let mut sink = LogEventSink::new();
    let clock = HostClock::new();

    let source = match config.hazard_seed {
        Some(seed) => {
            info!("Hazard simulation seeded with {seed}");
            SimulatedHazards::seeded(seed)
        }
        None => SimulatedHazards::from_entropy(),
    };

    let mut service = GuardianService::load(&mut store, &device, source, &config)?;
    service.start(clock.now_ms(), &mut device, &mut sink);

    let _reader = console::spawn_reader().context("spawning console reader")?;
    println!("{HELP}");

    let rt = Runtime {
        service,
        device,
        store,
        sink,
        clock,
        idle: Duration::from_millis(u64::from(config.idle_poll_ms)),
    };

    let rt = runtime::run(rt);

    info!(
        "Guardian stopped ({} notification(s) delivered)",
        rt.device.notified()
    );
    Ok(())
}

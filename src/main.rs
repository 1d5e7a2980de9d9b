//! EchoSense Firmware: Main Entry Point
//!
//! Hexagonal architecture around one cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter          SerialLineSink       Esp32Time       │
//! │  (Range+Acoustic+Actuator) (EventSink)          (Clock)        │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Calibrator · Scheduler · Alert · ToneSequencer        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_svc::hal::delay::FreeRtos;
use log::{error, info, warn};

use echosense::adapters::hardware::HardwareAdapter;
use echosense::adapters::serial_sink::SerialLineSink;
use echosense::adapters::time::Esp32TimeAdapter;
use echosense::app::ports::Clock;
use echosense::app::service::AppService;
use echosense::config::SystemConfig;
use echosense::drivers::{hw_init, watchdog::Watchdog};

/// Optional JSON override baked in at build time, e.g.
/// `ECHOSENSE_CONFIG='{"output_mode":"Human"}' cargo build`.
const CONFIG_OVERRIDE: Option<&str> = option_env!("ECHOSENSE_CONFIG");

fn load_config() -> SystemConfig {
    let Some(json) = CONFIG_OVERRIDE else {
        return SystemConfig::default();
    };
    match SystemConfig::from_json(json) {
        Ok(cfg) => {
            info!("Config: build-time override applied");
            cfg
        }
        Err(e) => {
            warn!("Config: override rejected ({}), using defaults", e);
            SystemConfig::default()
        }
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  EchoSense v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config();
    config.validate()?;

    // ── 3. Initialise hardware peripherals ────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is fatal.
        // The watchdog is not armed yet, so this parks until power-cycle.
        error!("HAL init failed: {}, halting", e);
        loop {
            FreeRtos::delay_ms(1_000);
        }
    }
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    // ── 4. Construct adapters ─────────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut hw = HardwareAdapter::board(&config);
    let mut sink = SerialLineSink::stdout(config.output_mode);

    // ── 5. Construct app service ──────────────────────────────
    let idle_ms = config.loop_idle_ms;
    let mut app = AppService::new(config, clock.now_ms());
    app.start(&mut hw, &mut sink);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        app.tick(clock.now_ms(), &mut hw, &mut sink);
        watchdog.feed();
        // Yield so the idle task (and its TWDT entry) gets to run.
        FreeRtos::delay_ms(idle_ms);
    }
}

/*
 *  main.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use std::future::Future;

use wxstrip::config::{self, Cli, Mode};
use wxstrip::display::drivers::console::ConsoleDriver;
use wxstrip::display::{BoxedDriver, DisplayController, LedDriver};
use wxstrip::refresh::{CycleOutcome, RefreshConfig, RefreshLoop};
use wxstrip::weather::{ConditionSource, FixedSource, RandomSource, WeatherClient};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for SIGINT, SIGTERM, or SIGHUP.
#[cfg(unix)]
async fn signal_handler() -> Result<(), Box<dyn std::error::Error>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Blanking strip.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Blanking strip.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Blanking strip.");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn signal_handler() -> Result<(), Box<dyn std::error::Error>> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received. Blanking strip.");
    Ok(())
}

fn select_driver(emulated: bool) -> BoxedDriver {
    #[cfg(feature = "pi")]
    if !emulated {
        return Box::new(wxstrip::display::drivers::spi::SpiDriver::new());
    }
    #[cfg(not(feature = "pi"))]
    if !emulated {
        warn!("built without the pi feature, rendering to the log");
    }
    Box::new(ConsoleDriver::new(true))
}

/// Drive the strip from `source` until done or `shutdown` resolves.
///
/// Only configuration and strip init failures end the process non-zero; a
/// failed cycle or a failed blank on the way out is logged and ignored.
async fn run<S, D, F>(
    source: S,
    display: DisplayController<D>,
    refresh: RefreshConfig,
    shutdown: F,
) -> anyhow::Result<()>
where
    S: ConditionSource,
    D: LedDriver,
    F: Future<Output = ()>,
{
    let mut refresh = RefreshLoop::new(source, display, refresh);

    let finished = tokio::select! {
        outcome = refresh.run() => Some(outcome),
        _ = shutdown => None,
    };

    match finished {
        Some(CycleOutcome::Displayed) => info!("rendered, leaving strip lit"),
        Some(outcome) => warn!("single cycle ended with {:?}, strip not updated", outcome),
        None => {
            let (_, mut display) = refresh.into_parts();
            if let Err(e) = display.blank() {
                error!("blank strip on shutdown: {}", e);
            }
        }
    }
    Ok(())
}

async fn wait_for_signal() {
    if let Err(e) = signal_handler().await {
        error!("signal handler failed: {}", e);
        // no way to be told to stop, keep running
        std::future::pending::<()>().await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let loaded = config::load(&cli);

    let level = match &loaded {
        Ok(cfg) => cfg.log_level.clone().unwrap_or_else(|| "info".to_string()),
        Err(_) if cli.debug => "debug".to_string(),
        Err(_) => "info".to_string(),
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("{} v.{} built {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let cfg = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("configuration: {}", e);
            std::process::exit(2);
        }
    };

    if cli.dump_config {
        print!("{}", serde_yaml::to_string(&cfg)?);
        return Ok(());
    }

    let settings = cfg.resolve();
    info!(
        "mode {:?}, {} LEDs on GPIO {}",
        settings.mode, settings.strip.led_count, settings.strip.gpio_pin
    );

    let driver = select_driver(cli.emulated);
    let display = match DisplayController::initialize(driver, &settings.strip, settings.slots.clone()) {
        Ok(display) => display,
        Err(e) => {
            error!("LED strip init failed: {}", e);
            std::process::exit(1);
        }
    };

    match settings.mode {
        Mode::Poll => {
            let client = WeatherClient::new(&settings.weather).context("build weather client")?;
            run(client, display, settings.refresh, wait_for_signal()).await
        }
        Mode::Demo => run(RandomSource::new(), display, settings.refresh, wait_for_signal()).await,
        Mode::Fixed => {
            let source = FixedSource::from_names(&settings.fixed.current, &settings.fixed.forecast);
            run(source, display, settings.refresh, wait_for_signal()).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wxstrip::config::StripConfig;
    use wxstrip::display::drivers::mock::MockDriver;
    use wxstrip::display::LayoutPreset;
    use wxstrip::ConditionCode;

    fn display(driver: MockDriver) -> DisplayController<MockDriver> {
        let strip = StripConfig { gpio_pin: 10, led_count: 5, brightness: 255 };
        DisplayController::initialize(driver, &strip, LayoutPreset::Strip5.slot_map()).unwrap()
    }

    fn fixed() -> FixedSource {
        FixedSource::new(ConditionCode::Rain, vec![ConditionCode::Clear; 3])
    }

    #[tokio::test]
    async fn test_one_shot_render_failure_exits_cleanly() {
        let driver = MockDriver::new();
        let state = driver.state();
        let display = display(driver);
        state.lock().unwrap().simulate_render_failure = true;

        let res = run(fixed(), display, RefreshConfig::diagnostic(), std::future::pending()).await;
        assert!(res.is_ok());
        assert_eq!(state.lock().unwrap().render_count, 0);
    }

    #[tokio::test]
    async fn test_one_shot_fetch_failure_exits_cleanly() {
        let driver = MockDriver::new();
        let state = driver.state();
        // too few forecast conditions for three slots
        let source = FixedSource::new(ConditionCode::Rain, Vec::new());

        let res = run(source, display(driver), RefreshConfig::diagnostic(), std::future::pending()).await;
        assert!(res.is_ok());
        assert_eq!(state.lock().unwrap().rendered(0), wxstrip::display::color::ERROR.pack());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_blanks_strip() {
        let driver = MockDriver::new();
        let state = driver.state();
        let shutdown = tokio::time::sleep(std::time::Duration::from_secs(45));

        let res = run(fixed(), display(driver), RefreshConfig::polling(), shutdown).await;
        assert!(res.is_ok());
        let s = state.lock().unwrap();
        assert!(s.pixels.iter().all(|p| p.color == 0));
    }

    #[tokio::test]
    async fn test_shutdown_blank_failure_exits_cleanly() {
        let driver = MockDriver::new();
        let state = driver.state();
        let display = display(driver);
        state.lock().unwrap().simulate_render_failure = true;

        let res = run(fixed(), display, RefreshConfig::polling(), std::future::ready(())).await;
        assert!(res.is_ok());
    }
}

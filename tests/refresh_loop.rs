/*
 *  tests/refresh_loop.rs
 *
 *  Refresh loop against a scripted source and the mock strip
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 */

use std::collections::VecDeque;
use std::time::Duration;

use wxstrip::condition::ConditionCode;
use wxstrip::config::StripConfig;
use wxstrip::display::color::{self, map_to_color, map_to_dim_color};
use wxstrip::display::drivers::mock::MockDriver;
use wxstrip::display::{DisplayController, LayoutPreset};
use wxstrip::refresh::{CycleOutcome, ForecastEmphasis, RefreshConfig, RefreshLoop, RefreshState};
use wxstrip::weather::{ConditionSource, FetchError, FixedSource};

use test_case::test_case;

use ConditionCode::*;

/// Replays one scripted answer per cycle.
struct ScriptedSource {
    cycles: VecDeque<Result<(ConditionCode, Vec<ConditionCode>), String>>,
    pending_forecast: Vec<ConditionCode>,
    calls: usize,
}

impl ScriptedSource {
    fn new(cycles: Vec<Result<(ConditionCode, Vec<ConditionCode>), String>>) -> Self {
        Self {
            cycles: cycles.into(),
            pending_forecast: Vec::new(),
            calls: 0,
        }
    }
}

impl ConditionSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_current(&mut self) -> Result<ConditionCode, FetchError> {
        self.calls += 1;
        match self.cycles.pop_front() {
            Some(Ok((current, forecast))) => {
                self.pending_forecast = forecast;
                Ok(current)
            }
            Some(Err(msg)) => Err(FetchError::MissingData(msg)),
            None => Err(FetchError::Status(503)),
        }
    }

    async fn fetch_forecast(&mut self, steps: usize) -> Result<Vec<ConditionCode>, FetchError> {
        let forecast = std::mem::take(&mut self.pending_forecast);
        if forecast.len() < steps {
            return Err(FetchError::MissingData("short forecast".into()));
        }
        Ok(forecast[..steps].to_vec())
    }
}

fn strip5(driver: MockDriver) -> DisplayController<MockDriver> {
    let strip = StripConfig { gpio_pin: 10, led_count: 5, brightness: 255 };
    DisplayController::initialize(driver, &strip, LayoutPreset::Strip5.slot_map()).unwrap()
}

fn config(emphasis: ForecastEmphasis) -> RefreshConfig {
    RefreshConfig {
        interval: Duration::from_secs(30),
        forecast_steps: 3,
        emphasis,
        one_shot: false,
    }
}

#[tokio::test]
async fn test_successful_cycle_paints_every_slot() {
    let driver = MockDriver::new();
    let state = driver.state();
    let source = ScriptedSource::new(vec![Ok((Clear, vec![Rain, Snow, Clouds]))]);
    let mut refresh = RefreshLoop::new(source, strip5(driver), config(ForecastEmphasis::Dim));

    assert_eq!(refresh.run_cycle().await, CycleOutcome::Displayed);
    assert_eq!(refresh.state(), RefreshState::Committing);

    let s = state.lock().unwrap();
    assert_eq!(s.rendered(0), color::BLACK.pack());
    assert_eq!(s.rendered(1), map_to_color(Clear).pack());
    assert_eq!(s.rendered(2), map_to_dim_color(Rain).pack());
    assert_eq!(s.rendered(3), map_to_dim_color(Snow).pack());
    assert_eq!(s.rendered(4), map_to_dim_color(Clouds).pack());
    // error clear, then the weather frame
    assert_eq!(s.render_count, 2);
}

#[tokio::test]
async fn test_fetch_failure_lights_error_and_keeps_last_frame() {
    let driver = MockDriver::new();
    let state = driver.state();
    let source = ScriptedSource::new(vec![
        Ok((Snow, vec![Clear, Clear, Rain])),
        Err("connection reset".into()),
    ]);
    let mut refresh = RefreshLoop::new(source, strip5(driver), config(ForecastEmphasis::Full));

    assert_eq!(refresh.run_cycle().await, CycleOutcome::Displayed);
    let before = state.lock().unwrap().render_count;

    assert_eq!(refresh.run_cycle().await, CycleOutcome::FetchFailed);

    let s = state.lock().unwrap();
    assert_eq!(s.rendered(0), color::ERROR.pack());
    assert_eq!(s.rendered(1), map_to_color(Snow).pack());
    assert_eq!(s.rendered(2), map_to_color(Clear).pack());
    assert_eq!(s.rendered(4), map_to_color(Rain).pack());
    // indicator cleared, then lit; no weather frame
    assert_eq!(s.render_count - before, 2);
}

#[tokio::test]
async fn test_recovery_clears_error_before_weather() {
    let driver = MockDriver::new();
    let state = driver.state();
    let source = ScriptedSource::new(vec![
        Err("timeout".into()),
        Ok((Rain, vec![Rain, Rain, Rain])),
    ]);
    let mut refresh = RefreshLoop::new(source, strip5(driver), config(ForecastEmphasis::Full));

    assert_eq!(refresh.run_cycle().await, CycleOutcome::FetchFailed);
    assert_eq!(state.lock().unwrap().rendered(0), color::ERROR.pack());

    assert_eq!(refresh.run_cycle().await, CycleOutcome::Displayed);
    let s = state.lock().unwrap();
    let frames = &s.frames;
    let clear_frame = &frames[frames.len() - 2];
    assert_eq!(clear_frame[0].color, color::BLACK.pack());
    // slots still dark when the indicator went out
    assert_eq!(clear_frame[1].color, 0);
    assert_eq!(s.rendered(0), color::BLACK.pack());
    assert_eq!(s.rendered(1), map_to_color(Rain).pack());
}

#[tokio::test]
async fn test_forecast_failure_counts_as_fetch_failure() {
    let driver = MockDriver::new();
    let state = driver.state();
    // two forecast entries where three are wired
    let source = ScriptedSource::new(vec![Ok((Clear, vec![Rain, Rain]))]);
    let mut refresh = RefreshLoop::new(source, strip5(driver), config(ForecastEmphasis::Full));

    assert_eq!(refresh.run_cycle().await, CycleOutcome::FetchFailed);
    let s = state.lock().unwrap();
    assert_eq!(s.rendered(0), color::ERROR.pack());
    assert_eq!(s.rendered(1), 0);
}

#[tokio::test]
async fn test_brightness_emphasis() {
    let driver = MockDriver::new();
    let state = driver.state();
    let source = FixedSource::new(Clouds, vec![Snow, Snow, Snow]);
    let mut refresh =
        RefreshLoop::new(source, strip5(driver), config(ForecastEmphasis::Brightness(128)));

    assert_eq!(refresh.run_cycle().await, CycleOutcome::Displayed);
    let s = state.lock().unwrap();
    assert_eq!(s.pixels[1].brightness, 255);
    for led in 2..5 {
        assert_eq!(s.pixels[led].color, map_to_color(Snow).pack());
        assert_eq!(s.pixels[led].brightness, 128);
    }
}

#[test_case(ForecastEmphasis::Full ; "full")]
#[test_case(ForecastEmphasis::Dim ; "dim")]
#[test_case(ForecastEmphasis::Brightness(128) ; "half")]
#[tokio::test]
async fn test_strip_brightness_caps_every_slot(emphasis: ForecastEmphasis) {
    let driver = MockDriver::new();
    let state = driver.state();
    let strip = StripConfig { gpio_pin: 10, led_count: 5, brightness: 50 };
    let display =
        DisplayController::initialize(driver, &strip, LayoutPreset::Strip5.slot_map()).unwrap();
    let source = ScriptedSource::new(vec![
        Ok((Clear, vec![Rain, Snow, Clouds])),
        Err("down".into()),
    ]);
    let mut refresh = RefreshLoop::new(source, display, config(emphasis));

    assert_eq!(refresh.run_cycle().await, CycleOutcome::Displayed);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.pixels[1].brightness, 50);
        assert!(s.pixels.iter().all(|p| p.brightness <= 50), "{:?}", s.pixels);
    }

    // error LED lit at strip brightness too
    assert_eq!(refresh.run_cycle().await, CycleOutcome::FetchFailed);
    let s = state.lock().unwrap();
    assert_eq!(s.rendered(0), color::ERROR.pack());
    assert_eq!(s.pixels[0].brightness, 50);
    assert!(s.pixels.iter().all(|p| p.brightness <= 50));
}

#[tokio::test]
async fn test_current_only() {
    let driver = MockDriver::new();
    let state = driver.state();
    let mut cfg = config(ForecastEmphasis::Full);
    cfg.forecast_steps = 0;
    // no forecast supplied; must not be asked for one
    let source = FixedSource::new(Thunderstorm, Vec::new());
    let mut refresh = RefreshLoop::new(source, strip5(driver), cfg);

    assert_eq!(refresh.run_cycle().await, CycleOutcome::Displayed);
    let s = state.lock().unwrap();
    assert_eq!(s.rendered(1), map_to_color(Thunderstorm).pack());
    assert_eq!(s.rendered(2), 0);
}

#[tokio::test]
async fn test_steps_clamped_to_wired_slots() {
    let strip = StripConfig { gpio_pin: 10, led_count: 3, brightness: 255 };
    let slots = wxstrip::display::SlotMap {
        current: vec![0],
        forecast: vec![vec![1]],
        error: vec![2],
    };
    let display = DisplayController::initialize(MockDriver::new(), &strip, slots).unwrap();
    let refresh = RefreshLoop::new(FixedSource::new(Clear, vec![Clear]), display, RefreshConfig::polling());
    assert_eq!(refresh.config().forecast_steps, 1);
}

#[tokio::test]
async fn test_render_failure_reported() {
    let driver = MockDriver::new();
    let state = driver.state();
    let mut refresh = RefreshLoop::new(
        FixedSource::new(Clear, vec![Clear, Clear, Clear]),
        strip5(driver),
        config(ForecastEmphasis::Full),
    );
    state.lock().unwrap().simulate_render_failure = true;
    assert_eq!(refresh.run_cycle().await, CycleOutcome::RenderFailed);
}

#[tokio::test(start_paused = true)]
async fn test_step_sleeps_for_interval() {
    let source = ScriptedSource::new(vec![Ok((Clear, vec![Clear, Clear, Clear]))]);
    let mut refresh = RefreshLoop::new(source, strip5(MockDriver::new()), config(ForecastEmphasis::Dim));

    let start = tokio::time::Instant::now();
    assert_eq!(refresh.step().await, CycleOutcome::Displayed);
    assert_eq!(start.elapsed(), Duration::from_secs(30));
    assert_eq!(refresh.state(), RefreshState::Idle);
    assert_eq!(refresh.cycles(), 1);

    // script exhausted: the next cycle fails but the loop carries on
    assert_eq!(refresh.step().await, CycleOutcome::FetchFailed);
    assert_eq!(refresh.cycles(), 2);
    assert_eq!(refresh.source().calls, 2);
}

#[tokio::test(start_paused = true)]
async fn test_run_keeps_polling_after_errors() {
    let driver = MockDriver::new();
    let state = driver.state();
    let source = ScriptedSource::new(vec![Err("down".into())]);
    let mut refresh = RefreshLoop::new(source, strip5(driver), config(ForecastEmphasis::Dim));

    let res = tokio::time::timeout(Duration::from_secs(95), refresh.run()).await;
    assert!(res.is_err(), "polling loop never returns");
    // cycles at t=0, 30, 60, 90
    assert_eq!(state.lock().unwrap().render_count, 8);
}

#[tokio::test]
async fn test_one_shot_matrix() {
    let driver = MockDriver::new();
    let state = driver.state();
    let strip = StripConfig { gpio_pin: 10, led_count: 26, brightness: 255 };
    let display =
        DisplayController::initialize(driver, &strip, LayoutPreset::Matrix26.slot_map()).unwrap();
    let source = FixedSource::from_names("Rain", &["Clear", "Clouds", "Snow"]);
    let mut refresh = RefreshLoop::new(source, display, RefreshConfig::diagnostic());

    assert_eq!(refresh.run().await, CycleOutcome::Displayed);
    assert_eq!(refresh.cycles(), 1);
    assert_eq!(refresh.state(), RefreshState::Idle);

    let s = state.lock().unwrap();
    for led in 20..=25 {
        assert_eq!(s.rendered(led), map_to_color(Rain).pack(), "led {}", led);
    }
    for led in 14..=19 {
        assert_eq!(s.rendered(led), map_to_color(Clear).pack());
    }
    for led in 7..=13 {
        assert_eq!(s.rendered(led), map_to_color(Clouds).pack());
    }
    for led in 0..=6 {
        assert_eq!(s.rendered(led), map_to_color(Snow).pack());
    }
}

/*
 *  config.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  YAML configuration layered under command line overrides
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

use std::time::Duration;
use std::{fs, path::{Path, PathBuf}};

use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::display::layout::{LayoutPreset, SlotMap};
use crate::refresh::{ForecastEmphasis, RefreshConfig};

pub const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org/data/2.5";

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// What feeds the strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Live OpenWeatherMap data
    #[default]
    Poll,
    /// Random conditions
    Demo,
    /// Conditions given with --w0..--w3, rendered once
    Fixed,
}

impl Mode {
    fn default_layout(&self) -> LayoutPreset {
        match self {
            Mode::Poll => LayoutPreset::Strip5,
            Mode::Demo | Mode::Fixed => LayoutPreset::Matrix26,
        }
    }

    fn refresh_preset(&self) -> RefreshConfig {
        match self {
            Mode::Poll => RefreshConfig::polling(),
            Mode::Demo => RefreshConfig::demo(),
            Mode::Fixed => RefreshConfig::diagnostic(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EmphasisKind {
    Full,
    Dim,
    Brightness,
}

/// Top-level app configuration as read from YAML
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>, // e.g., "info" | "debug"
    pub mode: Option<Mode>,
    pub weather: Option<WeatherConfig>,
    pub strip: Option<StripSection>,
    pub refresh: Option<RefreshSection>,
    pub fixed: Option<FixedConditions>,
}

/// OpenWeatherMap access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: String,
    pub lat: f64,
    pub lon: f64,
    pub base_url: String,
    /// Whole-request timeout
    pub timeout_ms: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            lat: 0.0,
            lon: 0.0,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StripSection {
    pub gpio_pin: Option<u8>,       // BCM numbering
    pub led_count: Option<usize>,
    pub brightness: Option<u8>,     // 0-255
    pub layout: Option<LayoutPreset>,
    pub slots: Option<SlotMap>,     // <- overrides layout when present
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RefreshSection {
    pub interval_secs: Option<u64>,
    pub forecast_steps: Option<usize>,
    pub emphasis: Option<EmphasisKind>,
    pub forecast_brightness: Option<u8>,
}

/// Diagnostic mode conditions, provider spelling ("Clear", "Rain", ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedConditions {
    pub current: String,
    pub forecast: Vec<String>,
}

impl Default for FixedConditions {
    fn default() -> Self {
        Self {
            current: "Clear".to_string(),
            forecast: vec!["Clear".to_string(); 3],
        }
    }
}

/// Hardware parameters handed to the LED driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripConfig {
    pub gpio_pin: u8,
    pub led_count: usize,
    pub brightness: u8,
}

/// Fully resolved, immutable settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub mode: Mode,
    pub log_level: String,
    pub weather: WeatherConfig,
    pub strip: StripConfig,
    pub slots: SlotMap,
    pub refresh: RefreshConfig,
    pub fixed: FixedConditions,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "wxstrip", version, about = "Weather at a glance on a WS281x LED strip")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, short = 'c', value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(long, short = 'v', alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,
    /// OpenWeatherMap API key
    #[arg(long, env = "OWM_APPID", hide_env_values = true)]
    pub api_key: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,
    #[arg(long)]
    pub gpio_pin: Option<u8>,
    #[arg(long)]
    pub led_count: Option<usize>,
    #[arg(long)]
    pub brightness: Option<u8>,
    #[arg(long, value_enum)]
    pub layout: Option<LayoutPreset>,
    #[arg(long)]
    pub interval_secs: Option<u64>,
    /// Current slot weather (Clear, Clouds, Rain, or Snow)
    #[arg(long)]
    pub w0: Option<String>,
    /// Forecast 1 weather (Clear, Clouds, Rain, or Snow)
    #[arg(long)]
    pub w1: Option<String>,
    /// Forecast 2 weather (Clear, Clouds, Rain, or Snow)
    #[arg(long)]
    pub w2: Option<String>,
    /// Forecast 3 weather (Clear, Clouds, Rain, or Snow)
    #[arg(long)]
    pub w3: Option<String>,
    /// Render to the log instead of the strip
    #[arg(long, action = ArgAction::SetTrue)]
    pub emulated: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: read YAML, apply CLI overrides, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) YAML file (explicit path or search), else defaults
    let mut cfg = if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            read_yaml(p)?
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        read_yaml(&p)?
    } else {
        Config::default()
    };

    // 2) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 3) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/wxstrip/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/wxstrip/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/wxstrip.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["wxstrip.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

pub fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.debug                     { cfg.log_level = Some("debug".to_string()); }
    if cli.log_level.is_some()       { cfg.log_level = cli.log_level.clone(); }
    if cli.mode.is_some()            { cfg.mode = cli.mode; }

    let any_weather = cli.api_key.is_some() || cli.lat.is_some() || cli.lon.is_some();
    if any_weather {
        let weather = cfg.weather.get_or_insert_with(WeatherConfig::default);
        if let Some(key) = &cli.api_key { weather.api_key = key.clone(); }
        if let Some(lat) = cli.lat      { weather.lat = lat; }
        if let Some(lon) = cli.lon      { weather.lon = lon; }
    }

    let any_strip = cli.gpio_pin.is_some()
        || cli.led_count.is_some()
        || cli.brightness.is_some()
        || cli.layout.is_some();
    if any_strip {
        let strip = cfg.strip.get_or_insert_with(StripSection::default);
        if cli.gpio_pin.is_some()    { strip.gpio_pin = cli.gpio_pin; }
        if cli.led_count.is_some()   { strip.led_count = cli.led_count; }
        if cli.brightness.is_some()  { strip.brightness = cli.brightness; }
        if cli.layout.is_some()      {
            strip.layout = cli.layout;
            // an explicit preset wins over custom slots from the file
            strip.slots = None;
        }
    }

    if cli.interval_secs.is_some() {
        cfg.refresh.get_or_insert_with(RefreshSection::default).interval_secs = cli.interval_secs;
    }

    // any --wN selects diagnostic mode unless a mode was given
    let weathers = [&cli.w0, &cli.w1, &cli.w2, &cli.w3];
    if weathers.iter().any(|w| w.is_some()) {
        let fixed = cfg.fixed.get_or_insert_with(FixedConditions::default);
        if let Some(w) = &cli.w0 { fixed.current = w.clone(); }
        for (i, w) in [&cli.w1, &cli.w2, &cli.w3].into_iter().enumerate() {
            if let Some(w) = w {
                if fixed.forecast.len() <= i {
                    fixed.forecast.resize(i + 1, "Clear".to_string());
                }
                fixed.forecast[i] = w.clone();
            }
        }
        if cli.mode.is_none() {
            cfg.mode = Some(Mode::Fixed);
        }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let mode = cfg.mode.unwrap_or_default();

    if mode == Mode::Poll {
        let weather = cfg.weather.as_ref().ok_or_else(|| {
            ConfigError::Validation("poll mode needs a weather section (api_key, lat, lon)".into())
        })?;
        if weather.api_key.trim().is_empty() {
            return Err(ConfigError::Validation("weather api_key must be set".into()));
        }
    }
    if let Some(weather) = cfg.weather.as_ref() {
        if !(-90.0..=90.0).contains(&weather.lat) {
            return Err(ConfigError::Validation("weather lat must be -90..=90".into()));
        }
        if !(-180.0..=180.0).contains(&weather.lon) {
            return Err(ConfigError::Validation("weather lon must be -180..=180".into()));
        }
        if weather.timeout_ms == 0 {
            return Err(ConfigError::Validation("weather timeout_ms must be > 0".into()));
        }
    }
    if let Some(strip) = cfg.strip.as_ref() {
        if strip.led_count == Some(0) {
            return Err(ConfigError::Validation("strip led_count must be > 0".into()));
        }
    }
    if let Some(refresh) = cfg.refresh.as_ref() {
        if refresh.interval_secs == Some(0) && mode != Mode::Fixed {
            return Err(ConfigError::Validation("refresh interval_secs must be > 0".into()));
        }
        if let Some(steps) = refresh.forecast_steps {
            if steps > 3 {
                return Err(ConfigError::Validation("refresh forecast_steps must be 0..=3".into()));
            }
        }
    }
    Ok(())
}

impl Config {
    /// Fill in per-mode defaults and freeze.
    pub fn resolve(&self) -> Settings {
        let mode = self.mode.unwrap_or_default();
        let strip = self.strip.clone().unwrap_or_default();

        let slots = strip
            .slots
            .clone()
            .unwrap_or_else(|| strip.layout.unwrap_or(mode.default_layout()).slot_map());
        let led_count = strip.led_count.unwrap_or_else(|| match (&strip.slots, strip.layout) {
            (Some(custom), _) => max_index(custom) + 1,
            (None, Some(preset)) => preset.led_count(),
            (None, None) => mode.default_layout().led_count(),
        });

        let mut refresh = mode.refresh_preset();
        if let Some(section) = self.refresh.as_ref() {
            if let Some(secs) = section.interval_secs {
                refresh.interval = Duration::from_secs(secs);
            }
            if let Some(steps) = section.forecast_steps {
                refresh.forecast_steps = steps;
            }
            match section.emphasis {
                Some(EmphasisKind::Full) => refresh.emphasis = ForecastEmphasis::Full,
                Some(EmphasisKind::Dim) => refresh.emphasis = ForecastEmphasis::Dim,
                Some(EmphasisKind::Brightness) => {
                    refresh.emphasis =
                        ForecastEmphasis::Brightness(section.forecast_brightness.unwrap_or(128));
                }
                None => {}
            }
        }

        Settings {
            mode,
            log_level: self.log_level.clone().unwrap_or_else(|| "info".to_string()),
            weather: self.weather.clone().unwrap_or_default(),
            strip: StripConfig {
                gpio_pin: strip.gpio_pin.unwrap_or(10),
                led_count,
                brightness: strip.brightness.unwrap_or(255),
            },
            slots,
            refresh,
            fixed: self.fixed.clone().unwrap_or_default(),
        }
    }
}

fn max_index(slots: &SlotMap) -> usize {
    slots
        .current
        .iter()
        .chain(slots.forecast.iter().flatten())
        .chain(slots.error.iter())
        .copied()
        .max()
        .unwrap_or(0)
}

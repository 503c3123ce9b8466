use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::geometry::Size;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub carousel: CarouselConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Direction the carousel content travels.
///
/// `Forward` moves content to the right (offset decreases), `Backward`
/// moves it to the left (offset increases).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    #[default]
    #[serde(alias = "right")]
    Forward,
    #[serde(alias = "left")]
    Backward,
}

impl ScrollDirection {
    /// Sign applied to the per-tick advance.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            ScrollDirection::Forward => -1.0,
            ScrollDirection::Backward => 1.0,
        }
    }
}

impl std::str::FromStr for ScrollDirection {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "forward" | "right" => Ok(ScrollDirection::Forward),
            "backward" | "left" => Ok(ScrollDirection::Backward),
            other => Err(crate::Error::Config(format!(
                "unknown scroll direction '{}' (expected forward or backward)",
                other
            ))),
        }
    }
}

/// Motion parameters for the autoscroll processor.
///
/// Treated as immutable once a processor has been built from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Points moved per nominal tick
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Nominal tick interval in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Idle time after a gesture before scrolling resumes, in milliseconds
    #[serde(default = "default_idle_resume_delay")]
    pub idle_resume_delay_ms: u64,
    /// Delay before the first automatic start, in milliseconds
    #[serde(default = "default_initial_resume_delay")]
    pub initial_resume_delay_ms: u64,
    /// Scroll direction
    #[serde(default)]
    pub direction: ScrollDirection,
    /// Cell width
    #[serde(default = "default_cell_extent")]
    pub cell_width: f64,
    /// Cell height
    #[serde(default = "default_cell_extent")]
    pub cell_height: f64,
    /// Spacing between cells
    #[serde(default)]
    pub cell_spacing: f64,
    /// Upper bound for the normalized frame delta after a stall
    #[serde(default = "default_max_frame_delta")]
    pub max_frame_delta: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            tick_interval_ms: default_tick_interval(),
            idle_resume_delay_ms: default_idle_resume_delay(),
            initial_resume_delay_ms: default_initial_resume_delay(),
            direction: ScrollDirection::default(),
            cell_width: default_cell_extent(),
            cell_height: default_cell_extent(),
            cell_spacing: 0.0,
            max_frame_delta: default_max_frame_delta(),
        }
    }
}

impl MotionConfig {
    #[inline]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    #[inline]
    pub fn idle_resume_delay(&self) -> Duration {
        Duration::from_millis(self.idle_resume_delay_ms)
    }

    #[inline]
    pub fn initial_resume_delay(&self) -> Duration {
        Duration::from_millis(self.initial_resume_delay_ms)
    }

    #[inline]
    pub fn cell_size(&self) -> Size {
        Size::new(self.cell_width, self.cell_height)
    }

    /// Cell width plus spacing: the distance corrected on every wrap.
    #[inline]
    pub fn pitch(&self) -> f64 {
        self.cell_width + self.cell_spacing
    }

    /// Reject settings that would produce no motion or runaway motion.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(config_error(format!("speed must be > 0, got {}", self.speed)));
        }
        if self.tick_interval_ms == 0 {
            return Err(config_error("tick_interval_ms must be > 0"));
        }
        if self.idle_resume_delay_ms == 0 {
            return Err(config_error("idle_resume_delay_ms must be > 0"));
        }
        if self.initial_resume_delay_ms == 0 {
            return Err(config_error("initial_resume_delay_ms must be > 0"));
        }
        if !self.cell_width.is_finite() || self.cell_width <= 0.0 {
            return Err(config_error(format!(
                "cell_width must be > 0, got {}",
                self.cell_width
            )));
        }
        if !self.cell_spacing.is_finite() || self.cell_spacing < 0.0 {
            return Err(config_error(format!(
                "cell_spacing must be >= 0, got {}",
                self.cell_spacing
            )));
        }
        if !self.max_frame_delta.is_finite() || self.max_frame_delta < 1.0 {
            return Err(config_error(format!(
                "max_frame_delta must be >= 1.0, got {}",
                self.max_frame_delta
            )));
        }
        // One tick may cross at most one cell, even after a clamped stall.
        let max_step = self.speed * self.max_frame_delta;
        if max_step > self.pitch() {
            return Err(config_error(format!(
                "speed * max_frame_delta ({}) must not exceed the cell pitch ({})",
                max_step,
                self.pitch()
            )));
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> crate::Error {
    crate::Error::Config(message.into())
}

/// Content and viewport used by the headless carousel host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselConfig {
    /// Item labels, in initial display order
    #[serde(default = "default_items")]
    pub items: Vec<String>,
    /// Visible width of the viewport
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            items: default_items(),
            viewport_width: default_viewport_width(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_speed() -> f64 {
    1.0
}

fn default_tick_interval() -> u64 {
    15
}

fn default_idle_resume_delay() -> u64 {
    5000
}

fn default_initial_resume_delay() -> u64 {
    1000
}

fn default_cell_extent() -> f64 {
    50.0
}

fn default_max_frame_delta() -> f64 {
    4.0 // at most four nominal ticks of catch-up after a stall
}

fn default_viewport_width() -> f64 {
    320.0
}

fn default_items() -> Vec<String> {
    [
        "Apple",
        "Google",
        "Amazon",
        "S & P 500",
        "Dow Jones",
        "Nasdaq",
        "Oil",
        "Gold",
        "US Bonds",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.motion.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the configuration file path
    /// Always uses ~/.config/marquee/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("marquee")
            .join("config.toml")
    }
}

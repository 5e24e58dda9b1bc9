// config.rs — 命令行 / 环境变量配置

use crate::mesh::{DEFAULT_RADIUS, DEFAULT_SEGMENTS, MAX_SEGMENTS, MIN_SEGMENTS};
use crate::motion::{DEFAULT_SAMPLE_RATE_HZ, MAX_SAMPLE_RATE_HZ, MIN_SAMPLE_RATE_HZ};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "panorama_view", about = "360° panorama viewer", version)]
pub struct ViewerConfig {
    /// Panorama to open at startup
    pub image: Option<PathBuf>,

    /// UI language (en, fr, ...)
    #[arg(long, env = "PANORAMA_LANG", default_value = "en")]
    pub lang: String,

    /// Vertical field of view in degrees
    #[arg(long, default_value_t = 60.0)]
    pub fov: f32,

    /// Start the simulated device-attitude source at launch
    #[arg(long)]
    pub motion: bool,

    /// Run without any device-attitude source, as on hardware without sensors
    #[arg(long, conflicts_with = "motion")]
    pub pan_only: bool,

    /// Device-attitude sample rate (Hz)
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE_HZ, value_parser = parse_sample_rate)]
    pub sample_rate: f32,

    /// Sphere radius
    #[arg(long, default_value_t = DEFAULT_RADIUS, value_parser = parse_radius)]
    pub radius: f32,

    /// Sphere segment count along each axis
    #[arg(long, default_value_t = DEFAULT_SEGMENTS, value_parser = parse_segments)]
    pub segments: usize,
}

/// Smallest sphere whose far plane stays well clear of the camera's near plane.
pub const MIN_RADIUS: f32 = 1.0;

fn parse_bounded_f32(s: &str, min: f32, max: f32) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if !value.is_finite() || value < min || value > max {
        return Err(format!("`{s}` must be between {min} and {max}"));
    }
    Ok(value)
}

fn parse_sample_rate(s: &str) -> Result<f32, String> {
    parse_bounded_f32(s, MIN_SAMPLE_RATE_HZ, MAX_SAMPLE_RATE_HZ)
}

fn parse_radius(s: &str) -> Result<f32, String> {
    parse_bounded_f32(s, MIN_RADIUS, f32::MAX)
}

fn parse_segments(s: &str) -> Result<usize, String> {
    let value: usize = s.parse().map_err(|e| format!("`{s}` is not a count: {e}"))?;
    if !(MIN_SEGMENTS..=MAX_SEGMENTS).contains(&value) {
        return Err(format!("`{s}` must be between {MIN_SEGMENTS} and {MAX_SEGMENTS}"));
    }
    Ok(value)
}

impl ViewerConfig {
    pub fn from_args() -> Self {
        Self::parse()
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            image: None,
            lang: "en".to_string(),
            fov: 60.0,
            motion: false,
            pan_only: false,
            sample_rate: DEFAULT_SAMPLE_RATE_HZ,
            radius: DEFAULT_RADIUS,
            segments: DEFAULT_SEGMENTS,
        }
    }
}

// motion.rs — 设备姿态来源（陀螺仪/加速度计融合后的四元数）
//
// 桌面端没有传感器：`Unsupported` 表示能力缺失（只能拖拽），
// `SimulatedAttitude` 以固定频率模拟手持设备的缓慢转头。

use glam::{Quat, Vec3};
use std::f32::consts::FRAC_PI_2;
use std::time::{Duration, Instant};

pub const DEFAULT_SAMPLE_RATE_HZ: f32 = 60.0;
pub const MIN_SAMPLE_RATE_HZ: f32 = 1.0;
pub const MAX_SAMPLE_RATE_HZ: f32 = 1000.0;

/// A device-attitude collaborator delivering unit quaternions at a steady rate.
pub trait AttitudeSource {
    /// Capability check, done once at startup.
    fn is_available(&self) -> bool;
    fn start(&mut self, now: Instant);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    /// At most one sample per call, and only once the sample interval has elapsed.
    fn poll(&mut self, now: Instant) -> Option<Quat>;
}

/// No attitude hardware.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unsupported;

impl AttitudeSource for Unsupported {
    fn is_available(&self) -> bool {
        false
    }

    fn start(&mut self, _now: Instant) {
        log::warn!("device attitude is not available, staying in pan-only mode");
    }

    fn stop(&mut self) {}

    fn is_running(&self) -> bool {
        false
    }

    fn poll(&mut self, _now: Instant) -> Option<Quat> {
        None
    }
}

/// Sweeps a slow look-around as if the device were held upright in portrait.
#[derive(Debug, Clone)]
pub struct SimulatedAttitude {
    interval: Duration,
    started_at: Option<Instant>,
    next_due: Option<Instant>,
    /// rad/s
    yaw_rate: f32,
    sway: f32,
}

impl SimulatedAttitude {
    pub fn new(sample_rate_hz: f32) -> Self {
        let hz = if sample_rate_hz.is_finite() && sample_rate_hz > 0.0 {
            sample_rate_hz.clamp(MIN_SAMPLE_RATE_HZ, MAX_SAMPLE_RATE_HZ)
        } else {
            DEFAULT_SAMPLE_RATE_HZ
        };

        Self {
            interval: Duration::from_secs_f32(1.0 / hz),
            started_at: None,
            next_due: None,
            yaw_rate: 0.25,
            sway: 0.15,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Attitude after `t` seconds of simulated motion.
    pub fn sample_at(&self, t: f32) -> Quat {
        let yaw = t * self.yaw_rate;
        let pitch = (t * 0.7).sin() * self.sway;
        // 竖持设备：传感器坐标系相对于屏幕绕 X 轴转了 90°
        let upright = Quat::from_axis_angle(Vec3::X, FRAC_PI_2);
        (upright * Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch)).normalize()
    }
}

impl Default for SimulatedAttitude {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE_HZ)
    }
}

impl AttitudeSource for SimulatedAttitude {
    fn is_available(&self) -> bool {
        true
    }

    fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            log::info!(
                "simulated attitude started at {:.0} Hz",
                1.0 / self.interval.as_secs_f32()
            );
            self.started_at = Some(now);
            self.next_due = Some(now);
        }
    }

    fn stop(&mut self) {
        if self.started_at.take().is_some() {
            log::info!("simulated attitude stopped");
        }
        self.next_due = None;
    }

    fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    fn poll(&mut self, now: Instant) -> Option<Quat> {
        let started_at = self.started_at?;
        let due = self.next_due?;
        if now < due {
            return None;
        }

        // 落后太多时不补发，直接从当前时间重新计时
        let next = due + self.interval;
        self.next_due = Some(if next <= now { now + self.interval } else { next });

        Some(self.sample_at(now.duration_since(started_at).as_secs_f32()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_never_samples() {
        let mut source = Unsupported;
        let now = Instant::now();
        source.start(now);
        assert!(!source.is_available());
        assert!(!source.is_running());
        assert!(source.poll(now + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn samples_at_fixed_rate() {
        let mut source = SimulatedAttitude::new(60.0);
        let t0 = Instant::now();
        source.start(t0);

        assert!(source.poll(t0).is_some());
        assert!(source.poll(t0 + Duration::from_millis(5)).is_none());
        assert!(source.poll(t0 + Duration::from_millis(17)).is_some());
        assert!(source.poll(t0 + Duration::from_millis(18)).is_none());
    }

    #[test]
    fn stopped_source_is_silent() {
        let mut source = SimulatedAttitude::default();
        let t0 = Instant::now();
        source.start(t0);
        source.stop();
        assert!(!source.is_running());
        assert!(source.poll(t0 + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn samples_are_unit_quaternions() {
        let source = SimulatedAttitude::default();
        for i in 0..100 {
            let q = source.sample_at(i as f32 * 0.37);
            assert!((q.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn bad_rate_falls_back_to_default() {
        let source = SimulatedAttitude::new(0.0);
        assert_eq!(source.interval(), Duration::from_secs_f32(1.0 / DEFAULT_SAMPLE_RATE_HZ));
    }

    #[test]
    fn extreme_rates_are_clamped() {
        for hz in [1e-20, 1e-40, 0.5] {
            let source = SimulatedAttitude::new(hz);
            assert_eq!(source.interval(), Duration::from_secs_f32(1.0 / MIN_SAMPLE_RATE_HZ));
        }
        let fast = SimulatedAttitude::new(1e9);
        assert_eq!(fast.interval(), Duration::from_secs_f32(1.0 / MAX_SAMPLE_RATE_HZ));
    }
}

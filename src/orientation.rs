// orientation.rs — 四元数工具：相机旋转合成与屏幕方向重映射

use glam::{Quat, Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

/// Interface orientation reported by the windowing collaborator.
///
/// The sensor frame is fixed to the device chassis, while the displayed
/// content follows this value, so every attitude sample has to be remapped
/// with the orientation that is current *at that sample*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    Unknown,
}

impl ScreenOrientation {
    pub const ALL: [ScreenOrientation; 5] = [
        ScreenOrientation::Portrait,
        ScreenOrientation::PortraitUpsideDown,
        ScreenOrientation::LandscapeLeft,
        ScreenOrientation::LandscapeRight,
        ScreenOrientation::Unknown,
    ];

    /// i18n key used by the UI.
    pub fn label_key(self) -> &'static str {
        match self {
            ScreenOrientation::Portrait => "screen.portrait",
            ScreenOrientation::PortraitUpsideDown => "screen.portrait_upside_down",
            ScreenOrientation::LandscapeLeft => "screen.landscape_left",
            ScreenOrientation::LandscapeRight => "screen.landscape_right",
            ScreenOrientation::Unknown => "screen.unknown",
        }
    }
}

/// Renormalizes `q`. Degenerate input (zero length, NaN, Inf) collapses to identity.
pub fn normalize(q: Quat) -> Quat {
    let len = q.length();
    if len.is_finite() && len > f32::EPSILON {
        q / len
    } else {
        Quat::IDENTITY
    }
}

/// Applies a `(pitch, yaw)` offset (radians, `offset.x` = pitch, `offset.y` = yaw) to `base`.
///
/// Pitch turns about the camera's local X axis (`base * pitch`), yaw about the
/// world Y axis (`yaw * result`). The order is not commutative: looking up and
/// down stays relative to the current heading while turning stays level.
pub fn rotate(base: Quat, offset: Vec2) -> Quat {
    let pitch = Quat::from_axis_angle(Vec3::X, offset.x);
    let yaw = Quat::from_axis_angle(Vec3::Y, offset.y);

    let q = normalize(base * pitch);
    normalize(yaw * q)
}

/// Remaps a raw device attitude into a camera base orientation for the given screen orientation.
pub fn gaze(attitude: Quat, screen: ScreenOrientation) -> Quat {
    let (axis, angle) = correction(screen);
    let q = Quat::from_axis_angle(axis, angle) * attitude;

    // 轴重标定：传感器坐标 -> 屏幕坐标
    let remapped = match screen {
        ScreenOrientation::LandscapeRight => Quat::from_xyzw(-q.y, q.x, q.z, q.w),
        ScreenOrientation::LandscapeLeft => Quat::from_xyzw(q.y, -q.x, q.z, q.w),
        ScreenOrientation::PortraitUpsideDown => Quat::from_xyzw(-q.x, -q.y, q.z, q.w),
        ScreenOrientation::Portrait | ScreenOrientation::Unknown => q,
    };

    normalize(remapped)
}

fn correction(screen: ScreenOrientation) -> (Vec3, f32) {
    match screen {
        ScreenOrientation::LandscapeRight => (Vec3::Y, FRAC_PI_2),
        ScreenOrientation::LandscapeLeft => (Vec3::Y, -FRAC_PI_2),
        ScreenOrientation::PortraitUpsideDown => (Vec3::X, FRAC_PI_2),
        ScreenOrientation::Portrait | ScreenOrientation::Unknown => (Vec3::X, -FRAC_PI_2),
    }
}

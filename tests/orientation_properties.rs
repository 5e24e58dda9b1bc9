use glam::{Quat, Vec2};
use image::{Rgba, RgbaImage};
use panorama_view::orientation::{gaze, normalize, rotate};
use panorama_view::{
    DisplayContext, GesturePhase, OrientationEngine, PanoramaView, ScreenOrientation, Viewport,
};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

const EPSILON: f32 = 1e-5;

fn assert_quat_eq(a: Quat, b: Quat) {
    for (lhs, rhs) in a.to_array().into_iter().zip(b.to_array()) {
        assert!((lhs - rhs).abs() <= EPSILON, "{a:?} != {b:?}");
    }
}

/// Hamilton product written out, independent of glam's operator.
fn hamilton(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    let [ax, ay, az, aw] = a;
    let [bx, by, bz, bw] = b;
    [
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
        aw * bw - ax * bx - ay * by - az * bz,
    ]
}

fn axis_angle(axis: [f32; 3], angle: f32) -> [f32; 4] {
    let s = (angle / 2.0).sin();
    [axis[0] * s, axis[1] * s, axis[2] * s, (angle / 2.0).cos()]
}

fn display(width: f32, height: f32) -> DisplayContext {
    DisplayContext::new(Viewport::new(width, height), ScreenOrientation::Portrait)
}

#[test]
fn normalize_is_unit_for_many_inputs() {
    for i in 0..200 {
        let f = i as f32;
        let q = Quat::from_xyzw(f.sin() * 3.0, (f * 0.7).cos(), f * 0.01 - 1.0, 0.5 + f.cos());
        let n = normalize(q);
        assert!((n.length() - 1.0).abs() <= EPSILON, "{q:?}");
    }
}

#[test]
fn identity_offset_is_noop() {
    let q = normalize(Quat::from_xyzw(0.2, -0.5, 0.1, 0.8));
    assert_quat_eq(rotate(q, Vec2::ZERO), q);
}

#[test]
fn quarter_width_drag_turns_ninety_degrees() {
    let (w, h) = (800.0, 600.0);
    let mut engine = OrientationEngine::new();
    engine.on_gesture(GesturePhase::Began, Vec2::ZERO, display(w, h));
    let q = engine.on_gesture(GesturePhase::Changed, Vec2::new(w / 4.0, 0.0), display(w, h));

    assert_quat_eq(q, Quat::from_axis_angle(glam::Vec3::Y, FRAC_PI_2));
}

#[test]
fn vertical_drag_pitches_by_half_turn_per_height() {
    let (w, h) = (800.0, 600.0);
    let mut engine = OrientationEngine::new();
    engine.on_gesture(GesturePhase::Began, Vec2::ZERO, display(w, h));
    let q = engine.on_gesture(GesturePhase::Changed, Vec2::new(0.0, h / 4.0), display(w, h));

    assert_quat_eq(q, Quat::from_axis_angle(glam::Vec3::X, PI / 4.0));
}

#[test]
fn cumulative_offset_survives_gesture_boundaries() {
    let (w, h) = (400.0, 400.0);
    let d = display(w, h);
    let mut engine = OrientationEngine::new();
    engine.on_device_attitude(Quat::IDENTITY, d);

    engine.on_gesture(GesturePhase::Began, Vec2::ZERO, d);
    engine.on_gesture(GesturePhase::Changed, Vec2::new(10.0, 0.0), d);
    let first = engine.cumulative_offset().y;
    engine.on_gesture(GesturePhase::Ended, Vec2::new(10.0, 0.0), d);

    // attitude samples in between must not reset anything
    engine.on_device_attitude(Quat::from_rotation_z(0.1), d);
    assert_eq!(engine.cumulative_offset().y, first);

    engine.on_gesture(GesturePhase::Began, Vec2::ZERO, d);
    engine.on_gesture(GesturePhase::Changed, Vec2::new(20.0, 0.0), d);
    let second = engine.cumulative_offset().y;
    engine.on_gesture(GesturePhase::Cancelled, Vec2::ZERO, d);

    assert!(first > 0.0);
    assert!(second > first);
    assert!((first - 10.0 / w * TAU).abs() <= EPSILON);
    assert!((second - 30.0 / w * TAU).abs() <= EPSILON);
    assert_eq!(engine.cumulative_offset().y, second);
}

#[test]
fn attitude_mode_applies_offset_on_top_of_gaze() {
    let d = DisplayContext::new(Viewport::new(400.0, 400.0), ScreenOrientation::LandscapeRight);
    let attitude = normalize(Quat::from_xyzw(0.3, 0.1, -0.2, 0.9));
    let mut engine = OrientationEngine::new();
    engine.on_device_attitude(attitude, d);
    engine.on_gesture(GesturePhase::Began, Vec2::ZERO, d);
    let q = engine.on_gesture(GesturePhase::Changed, Vec2::new(100.0, 0.0), d);

    let expected = rotate(gaze(attitude, d.screen), Vec2::new(0.0, 100.0 / 400.0 * TAU));
    assert_quat_eq(q, expected);

    // gaze is not accumulated: the same sample yields the same orientation
    let again = engine.on_device_attitude(attitude, d);
    assert_quat_eq(again, expected);
}

#[test]
fn remap_table_holds_for_every_screen_orientation() {
    let aq = normalize(Quat::from_xyzw(0.18, -0.36, 0.27, 0.87));
    let a = aq.to_array();
    let half_pi = FRAC_PI_2;

    let cases = [
        (ScreenOrientation::LandscapeRight, axis_angle([0.0, 1.0, 0.0], half_pi)),
        (ScreenOrientation::LandscapeLeft, axis_angle([0.0, 1.0, 0.0], -half_pi)),
        (ScreenOrientation::PortraitUpsideDown, axis_angle([1.0, 0.0, 0.0], half_pi)),
        (ScreenOrientation::Portrait, axis_angle([1.0, 0.0, 0.0], -half_pi)),
        (ScreenOrientation::Unknown, axis_angle([1.0, 0.0, 0.0], -half_pi)),
    ];

    for (screen, cq) in cases {
        let [x, y, z, w] = hamilton(cq, a);
        let expected = match screen {
            ScreenOrientation::LandscapeRight => [-y, x, z, w],
            ScreenOrientation::LandscapeLeft => [y, -x, z, w],
            ScreenOrientation::PortraitUpsideDown => [-x, -y, z, w],
            ScreenOrientation::Portrait | ScreenOrientation::Unknown => [x, y, z, w],
        };
        assert_quat_eq(gaze(aq, screen), Quat::from_array(expected));
    }
}

#[test]
fn image_round_trips_bit_for_bit() {
    let img = RgbaImage::from_fn(17, 9, |x, y| {
        Rgba([(x * 13) as u8, (y * 29) as u8, (x ^ y) as u8, (200 + x) as u8])
    });
    let mut view = PanoramaView::default();
    view.set_image(&img);

    assert_ne!(view.scene().texture(), Some(&img));
    assert_eq!(view.image(), Some(img));
}

#[test]
fn zero_viewport_leaves_orientation_unchanged() {
    let mut engine = OrientationEngine::new();
    engine.on_gesture(GesturePhase::Began, Vec2::ZERO, display(800.0, 600.0));
    let before = engine.on_gesture(GesturePhase::Changed, Vec2::new(50.0, 30.0), display(800.0, 600.0));

    let zero = display(0.0, 0.0);
    let after = engine.on_gesture(GesturePhase::Changed, Vec2::new(120.0, 90.0), zero);
    assert!(after.is_finite());
    assert_quat_eq(after, before);

    let zero_height = display(800.0, 0.0);
    let after = engine.on_gesture(GesturePhase::Changed, Vec2::new(200.0, 10.0), zero_height);
    assert!(after.is_finite());
    assert_quat_eq(after, before);
}

#[test]
fn changed_delta_is_difference_from_previous_translation() {
    let (w, h) = (1000.0, 500.0);
    let d = display(w, h);
    let mut engine = OrientationEngine::new();

    engine.on_gesture(GesturePhase::Began, Vec2::ZERO, d);
    let first = engine.on_gesture(GesturePhase::Changed, Vec2::new(10.0, 0.0), d);
    let second = engine.on_gesture(GesturePhase::Changed, Vec2::new(20.0, 0.0), d);
    let ended = engine.on_gesture(GesturePhase::Ended, Vec2::new(20.0, 0.0), d);

    let step = 10.0 / w * TAU;
    assert_quat_eq(first, Quat::from_rotation_y(step));
    assert_quat_eq(second, Quat::from_rotation_y(2.0 * step));
    assert_quat_eq(ended, second);
}

#[test]
fn repeated_composition_stays_normalized() {
    let d = display(640.0, 480.0);
    let mut engine = OrientationEngine::new();
    engine.on_gesture(GesturePhase::Began, Vec2::ZERO, d);
    let mut q = Quat::IDENTITY;
    for i in 1..=10_000 {
        let t = i as f32;
        q = engine.on_gesture(GesturePhase::Changed, Vec2::new(t * 3.0, (t * 0.1).sin() * 40.0), d);
    }
    assert!((q.length() - 1.0).abs() <= EPSILON);
}

#[test]
fn stale_attitude_stays_until_cleared() {
    let d = display(400.0, 400.0);
    let mut view = PanoramaView::default();
    view.set_viewport(400.0, 400.0);
    let attitude = Quat::from_rotation_x(0.5);
    let gaze_q = view.handle_device_attitude(attitude);

    // no further samples, but a gesture still lands on top of the last gaze
    view.handle_pan(GesturePhase::Began, Vec2::ZERO);
    let q = view.handle_pan(GesturePhase::Changed, Vec2::new(0.0, 100.0));
    assert_quat_eq(q, rotate(gaze(attitude, d.screen), Vec2::new(100.0 / 400.0 * PI, 0.0)));
    assert!(view.engine().has_device_attitude());

    let cleared = view.clear_device_attitude();
    assert!(!view.engine().has_device_attitude());
    assert_quat_eq(cleared, q);
    assert!(!gaze_q.abs_diff_eq(q, 1e-4));
}

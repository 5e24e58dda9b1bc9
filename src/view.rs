// view.rs — 全景视图：姿态融合引擎 + 场景适配层

use crate::engine::{DisplayContext, GesturePhase, OrientationEngine, Viewport};
use crate::orientation::ScreenOrientation;
use crate::scene::{CameraNode, SceneAdapter, SphereNode};
use glam::{Quat, Vec2};
use image::RgbaImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Gestures only.
    Pan,
    /// Device attitude with gesture offset on top.
    Motion,
}

/// Panoramic image view: routes gesture and attitude events through the engine
/// and writes every resulting orientation into the scene's camera.
#[derive(Debug, Clone, Default)]
pub struct PanoramaView {
    engine: OrientationEngine,
    scene: SceneAdapter,
    display: DisplayContext,
}

impl PanoramaView {
    pub fn new(sphere: SphereNode, fov: f32) -> Self {
        Self {
            engine: OrientationEngine::new(),
            scene: SceneAdapter::new(sphere, fov),
            display: DisplayContext::default(),
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.display.viewport = Viewport::new(width, height);
    }

    /// Picked up by the next recompute; nothing is cached per session.
    pub fn set_screen_orientation(&mut self, screen: ScreenOrientation) {
        self.display.screen = screen;
    }

    pub fn display(&self) -> DisplayContext {
        self.display
    }

    pub fn handle_pan(&mut self, phase: GesturePhase, translation: Vec2) -> Quat {
        let q = self.engine.on_gesture(phase, translation, self.display);
        self.scene.apply_orientation(q);
        q
    }

    pub fn handle_device_attitude(&mut self, attitude: Quat) -> Quat {
        let q = self.engine.on_device_attitude(attitude, self.display);
        self.scene.apply_orientation(q);
        q
    }

    pub fn clear_device_attitude(&mut self) -> Quat {
        let q = self.engine.clear_device_attitude(self.display);
        self.scene.apply_orientation(q);
        q
    }

    pub fn set_image(&mut self, image: &RgbaImage) {
        self.scene.set_image(image);
    }

    pub fn image(&self) -> Option<RgbaImage> {
        self.scene.image()
    }

    pub fn mode(&self) -> InputMode {
        if self.engine.has_device_attitude() {
            InputMode::Motion
        } else {
            InputMode::Pan
        }
    }

    pub fn camera(&self) -> &CameraNode {
        self.scene.camera()
    }

    pub fn camera_mut(&mut self) -> &mut CameraNode {
        self.scene.camera_mut()
    }

    pub fn scene(&self) -> &SceneAdapter {
        &self.scene
    }

    pub fn engine(&self) -> &OrientationEngine {
        &self.engine
    }
}

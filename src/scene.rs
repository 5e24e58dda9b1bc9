// scene.rs — 场景适配层：球体 + 球心相机 + 镜像纹理

use crate::mesh::{build_sphere, SphereMesh, DEFAULT_RADIUS, DEFAULT_SEGMENTS};
use glam::{Mat4, Quat, Vec3};
use image::{imageops, RgbaImage};

const NEAR_PLANE: f32 = 0.1;

/// Which side of the sphere's triangles the renderer may skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// The outside of the sphere is culled; only the inner surface is drawn.
    Front,
    Back,
    None,
}

#[derive(Debug, Clone)]
pub struct SphereNode {
    pub radius: f32,
    pub segments: usize,
    pub cull_mode: CullMode,
    pub position: Vec3,
    pub mesh: SphereMesh,
}

impl SphereNode {
    pub fn new(radius: f32, segments: usize) -> Self {
        Self {
            radius,
            segments,
            // 相机在球内，看到的是球的“背面”
            cull_mode: CullMode::Front,
            position: Vec3::ZERO,
            mesh: build_sphere(radius, segments, segments),
        }
    }
}

impl Default for SphereNode {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS, DEFAULT_SEGMENTS)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CameraNode {
    pub position: Vec3,
    pub orientation: Quat,
    /// Vertical field of view, degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraNode {
    /// A camera at `center` whose far plane still reaches past a sphere of `radius`.
    pub fn inside_sphere(center: Vec3, radius: f32, fov: f32) -> Self {
        Self {
            position: center,
            orientation: Quat::IDENTITY,
            fov,
            near: NEAR_PLANE,
            far: (radius * 2.0).max(NEAR_PLANE * 2.0),
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Mat4::perspective_rh(self.fov.clamp(1.0, 179.0).to_radians(), aspect, self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

/// Owns the sphere and the camera at its center. Performs no rotation math itself.
#[derive(Debug, Clone)]
pub struct SceneAdapter {
    sphere: SphereNode,
    camera: CameraNode,
    texture: Option<RgbaImage>,
    texture_revision: u64,
}

impl Default for SceneAdapter {
    fn default() -> Self {
        Self::new(SphereNode::default(), 60.0)
    }
}

impl SceneAdapter {
    pub fn new(sphere: SphereNode, fov: f32) -> Self {
        let camera = CameraNode::inside_sphere(sphere.position, sphere.radius, fov);
        Self {
            sphere,
            camera,
            texture: None,
            texture_revision: 0,
        }
    }

    /// Stores a horizontally mirrored copy of `image` as the sphere texture.
    ///
    /// The image is seen from inside the sphere, where an unmirrored texture reads
    /// left-to-right reversed. An image without pixels leaves nothing displayable.
    pub fn set_image(&mut self, image: &RgbaImage) {
        self.texture = mirrored(image);
        self.texture_revision += 1;

        match &self.texture {
            Some(t) => log::info!("panorama texture set ({}x{})", t.width(), t.height()),
            None => log::warn!("image has no pixel data, texture cleared"),
        }
    }

    /// The image last passed to [`SceneAdapter::set_image`], unmirrored.
    pub fn image(&self) -> Option<RgbaImage> {
        self.texture.as_ref().map(imageops::flip_horizontal)
    }

    /// The mirrored texture as it should be uploaded.
    pub fn texture(&self) -> Option<&RgbaImage> {
        self.texture.as_ref()
    }

    /// Bumped on every `set_image`, including ones that cleared the texture.
    pub fn texture_revision(&self) -> u64 {
        self.texture_revision
    }

    pub fn apply_orientation(&mut self, orientation: Quat) {
        self.camera.orientation = orientation;
    }

    pub fn camera(&self) -> &CameraNode {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraNode {
        &mut self.camera
    }

    pub fn sphere(&self) -> &SphereNode {
        &self.sphere
    }
}

fn mirrored(image: &RgbaImage) -> Option<RgbaImage> {
    if image.width() == 0 || image.height() == 0 {
        return None;
    }
    Some(imageops::flip_horizontal(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, (x * 7 + y) as u8, 255]))
    }

    #[test]
    fn small_sphere_keeps_far_beyond_near() {
        for radius in [0.05, 0.0, -5.0] {
            let camera = CameraNode::inside_sphere(Vec3::ZERO, radius, 60.0);
            assert!(camera.far > camera.near, "radius {radius}");
            assert!(camera.view_projection(16.0 / 9.0).is_finite(), "radius {radius}");
        }
    }

    #[test]
    fn texture_is_mirrored() {
        let mut scene = SceneAdapter::default();
        let img = gradient(4, 2);
        scene.set_image(&img);
        let tex = scene.texture().unwrap();
        assert_eq!(tex.get_pixel(0, 1), img.get_pixel(3, 1));
        assert_eq!(tex.get_pixel(3, 0), img.get_pixel(0, 0));
    }

    #[test]
    fn empty_image_clears_texture() {
        let mut scene = SceneAdapter::default();
        scene.set_image(&gradient(2, 2));
        scene.set_image(&RgbaImage::new(0, 0));
        assert!(scene.texture().is_none());
        assert!(scene.image().is_none());
        assert_eq!(scene.texture_revision(), 2);
    }

    #[test]
    fn camera_sits_at_sphere_center() {
        let scene = SceneAdapter::default();
        assert_eq!(scene.camera().position, scene.sphere().position);
        assert!(scene.camera().far > scene.sphere().radius);
        assert_eq!(scene.sphere().cull_mode, CullMode::Front);
    }

    #[test]
    fn identity_camera_looks_down_negative_z() {
        let scene = SceneAdapter::default();
        let p = scene.camera().view_projection(1.0).project_point3(Vec3::new(0.0, 0.0, -10.0));
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
    }

    #[test]
    fn apply_orientation_writes_camera() {
        let mut scene = SceneAdapter::default();
        let q = Quat::from_rotation_y(1.0);
        scene.apply_orientation(q);
        assert_eq!(scene.camera().orientation, q);
    }
}

//! Perspective camera and pointer projection

use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::layout::CameraPlacement;
use crate::sim::collision::Ray;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view (degrees)
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 20.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update the aspect ratio from a viewport size in pixels
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn placement(&self) -> CameraPlacement {
        CameraPlacement {
            position: self.position,
            target: self.target,
            fov: self.fov,
        }
    }

    pub fn apply_placement(&mut self, placement: &CameraPlacement) {
        self.position = placement.position;
        self.target = placement.target;
        self.fov = placement.fov;
    }

    /// World-space ray through a point in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection().inverse();
        let far = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let far = far.truncate() / far.w;
        Ray::new(self.position, far - self.position)
    }
}

/// Convert pixel coordinates (origin top-left) to normalized device coordinates
pub fn pixel_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        2.0 * x / width.max(1.0) - 1.0,
        1.0 - 2.0 * y / height.max(1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = Camera::default();
        let ray = camera.ray_from_ndc(Vec2::ZERO);
        let expected = (camera.target - camera.position).normalize();
        assert!((ray.dir - expected).length() < 1e-4);
    }

    #[test]
    fn test_ray_hits_projected_point() {
        let camera = Camera::default();
        let point = Vec3::new(3.0, -1.0, 0.0);
        let clip = camera.view_projection() * point.extend(1.0);
        let ndc = Vec2::new(clip.x / clip.w, clip.y / clip.w);

        let ray = camera.ray_from_ndc(ndc);
        let t = (point - ray.origin).dot(ray.dir);
        assert!((ray.at(t) - point).length() < 1e-3);
    }

    #[test]
    fn test_pixel_to_ndc() {
        assert_eq!(pixel_to_ndc(0.0, 0.0, 800.0, 600.0), Vec2::new(-1.0, 1.0));
        assert_eq!(pixel_to_ndc(400.0, 300.0, 800.0, 600.0), Vec2::ZERO);
    }
}

//! Ray picking against tile bounding spheres and drag planes

use glam::Vec3;

use super::state::{TileId, TileState};

/// A ray with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Distance along the ray to a sphere, `None` when it misses or lies behind.
/// A ray starting inside the sphere hits its far side.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.dir);
    let c = oc.dot(oc) - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let near = -b - sqrt_d;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + sqrt_d;
    (far >= 0.0).then_some(far)
}

/// Intersection with the plane through `point` with `normal`
pub fn ray_plane(ray: &Ray, point: Vec3, normal: Vec3) -> Option<Vec3> {
    let denom = ray.dir.dot(normal);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (point - ray.origin).dot(normal) / denom;
    (t >= 0.0).then(|| ray.at(t))
}

/// Intersection with the plane `z = z` (drag plane, normal +Z)
pub fn ray_plane_z(ray: &Ray, z: f32) -> Option<Vec3> {
    ray_plane(ray, Vec3::new(0.0, 0.0, z), Vec3::Z)
}

/// Nearest tile under the ray, skipping `exclude` (the dragged tile)
pub fn pick_tile(ray: &Ray, tiles: &[TileState], exclude: Option<&TileId>) -> Option<(usize, f32)> {
    tiles
        .iter()
        .enumerate()
        .filter(|(_, tile)| Some(&tile.id) != exclude)
        .filter_map(|(i, tile)| {
            ray_sphere(ray, tile.visible.position, tile.bounding_radius()).map(|t| (i, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentItem;
    use crate::settings::SceneSettings;

    fn tile_at(id: &str, position: Vec3) -> TileState {
        TileState::new(ContentItem::new(id, id), position, &SceneSettings::default())
    }

    #[test]
    fn test_ray_sphere_hit_and_miss() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let t = ray_sphere(&ray, Vec3::ZERO, 1.0).unwrap();
        assert!((t - 9.0).abs() < 1e-5);

        assert!(ray_sphere(&ray, Vec3::new(5.0, 0.0, 0.0), 1.0).is_none());
        // Behind the origin
        assert!(ray_sphere(&ray, Vec3::new(0.0, 0.0, 20.0), 1.0).is_none());
    }

    #[test]
    fn test_ray_sphere_from_inside() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = ray_sphere(&ray, Vec3::ZERO, 2.0).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_plane_z() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, 10.0), Vec3::NEG_Z);
        let hit = ray_plane_z(&ray, 3.0).unwrap();
        assert!((hit - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);

        let parallel = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(ray_plane_z(&parallel, 1.0).is_none());
    }

    #[test]
    fn test_pick_nearest_tile() {
        let tiles = vec![
            tile_at("far", Vec3::new(0.0, 0.0, -5.0)),
            tile_at("near", Vec3::new(0.0, 0.0, 2.0)),
            tile_at("aside", Vec3::new(10.0, 0.0, 0.0)),
        ];
        let ray = Ray::new(Vec3::new(0.0, 0.0, 20.0), Vec3::NEG_Z);
        let (index, _) = pick_tile(&ray, &tiles, None).unwrap();
        assert_eq!(tiles[index].id.as_str(), "near");

        // Dragged tile is transparent to picking
        let dragged = TileId::from("near");
        let (index, _) = pick_tile(&ray, &tiles, Some(&dragged)).unwrap();
        assert_eq!(tiles[index].id.as_str(), "far");
    }
}

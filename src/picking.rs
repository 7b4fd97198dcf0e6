use crate::stage::{NodeBounds, Transform3D};
use glam::{Mat4, Vec3};

/// Ray versus oriented box: transform the ray into node-local space and run
/// the slab test there, then report the world-space hit distance.
pub fn ray_hit_obb(
    origin: Vec3,
    dir: Vec3,
    transform: &Transform3D,
    bounds: &NodeBounds,
) -> Option<f32> {
    if !transform.scale.is_finite() {
        return None;
    }
    let min_scale = 0.0001;
    let scale = Vec3::new(
        transform.scale.x.abs().max(min_scale),
        transform.scale.y.abs().max(min_scale),
        transform.scale.z.abs().max(min_scale),
    );
    let world = Mat4::from_scale_rotation_translation(scale, transform.rotation, transform.translation);
    let inv = world.inverse();
    if !matrix_is_finite(&inv) {
        return None;
    }
    let origin_local = inv.transform_point3(origin);
    let dir_local = inv.transform_vector3(dir);
    if dir_local.length_squared() <= f32::EPSILON {
        return None;
    }
    let dir_local = dir_local.normalize();
    let (t_local, hit_local) = ray_aabb_intersection(origin_local, dir_local, bounds.min, bounds.max)?;
    if t_local < 0.0 {
        return None;
    }
    let hit_world = world.transform_point3(hit_local);
    Some((hit_world - origin).length())
}

pub fn matrix_is_finite(mat: &Mat4) -> bool {
    mat.to_cols_array().iter().all(|v| v.is_finite())
}

pub fn ray_aabb_intersection(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let mut t_min: f32 = 0.0;
    let mut t_max: f32 = f32::INFINITY;
    let origin_arr = origin.to_array();
    let dir_arr = dir.to_array();
    let min_arr = min.to_array();
    let max_arr = max.to_array();
    for i in 0..3 {
        let o = origin_arr[i];
        let d = dir_arr[i];
        let min_axis = min_arr[i];
        let max_axis = max_arr[i];
        if d.abs() < 1e-6 {
            if o < min_axis || o > max_axis {
                return None;
            }
        } else {
            let inv_d = 1.0 / d;
            let mut t1 = (min_axis - o) * inv_d;
            let mut t2 = (max_axis - o) * inv_d;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }
    }
    if t_max < 0.0 {
        return None;
    }
    let t_hit = if t_min >= 0.0 { t_min } else { t_max };
    let hit = origin + dir * t_hit;
    Some((t_hit, hit))
}

/// Intersection of a ray with the plane z = `plane_z`, if the ray crosses it.
pub fn ray_plane_z(origin: Vec3, dir: Vec3, plane_z: f32) -> Option<Vec3> {
    if dir.z.abs() < 1e-6 {
        return None;
    }
    let t = (plane_z - origin.z) / dir.z;
    if t < 0.0 {
        return None;
    }
    Some(origin + dir * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn axis_aligned_box_reports_near_face() {
        let transform = Transform3D::default();
        let bounds = NodeBounds::from_half_extent(Vec3::splat(1.0));
        let hit = ray_hit_obb(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, &transform, &bounds);
        assert!((hit.unwrap() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn rotated_box_is_still_hit() {
        let transform = Transform3D {
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_4),
            ..Transform3D::default()
        };
        let bounds = NodeBounds::from_half_extent(Vec3::new(1.5, 0.5, 0.05));
        let hit = ray_hit_obb(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, &transform, &bounds);
        assert!(hit.is_some());
    }

    #[test]
    fn miss_returns_none() {
        let transform = Transform3D::default();
        let bounds = NodeBounds::from_half_extent(Vec3::splat(0.5));
        let hit = ray_hit_obb(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z, &transform, &bounds);
        assert!(hit.is_none());
    }

    #[test]
    fn plane_hit_lands_on_plane() {
        let hit = ray_plane_z(Vec3::new(1.0, 2.0, 10.0), Vec3::new(0.0, 0.0, -1.0), 0.0).unwrap();
        assert_eq!(hit, Vec3::new(1.0, 2.0, 0.0));
    }
}

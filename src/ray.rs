//! Amanatides-Woo voxel ray traversal.
//!
//! Ported from the reference engine's `vx::intersectedVoxel`: walks the
//! voxel grid along a ray, advancing whichever axis has the smallest
//! accumulated "max" parameter at each step. Used by gameplay code for
//! block picking; not consulted by the mesher.

use glam::{IVec3, Vec3};

/// Returns the ordered sequence of integer voxel positions a ray
/// travels through, starting with the voxel containing `origin`.
///
/// Bounded to `range * 3` entries, matching the source's early-exit
/// guard rather than looping until `end` is reached exactly.
pub fn intersected_voxels(origin: Vec3, direction: Vec3, range: f32) -> Vec<IVec3> {
    let direction = if direction == Vec3::ZERO {
        Vec3::ZERO
    } else {
        direction.normalize()
    };
    let end = origin + direction * range;

    let start_voxel = IVec3::new(
        origin.x.floor() as i32,
        origin.y.floor() as i32,
        origin.z.floor() as i32,
    );

    let step = IVec3::new(
        signum(direction.x),
        signum(direction.y),
        signum(direction.z),
    );

    let delta_x = axis_delta(step.x, end.x, origin.x);
    let delta_y = axis_delta(step.y, end.y, origin.y);
    let delta_z = axis_delta(step.z, end.z, origin.z);

    let mut max_x = initial_max(step.x, delta_x, origin.x, start_voxel.x);
    let mut max_y = initial_max(step.y, delta_y, origin.y, start_voxel.y);
    let mut max_z = initial_max(step.z, delta_z, origin.z, start_voxel.z);

    let mut voxel = start_voxel;
    let mut result = vec![voxel];

    let limit = (range * 3.0).max(0.0) as usize;
    while result.len() < limit {
        if max_x > 1.0 && max_y > 1.0 && max_z > 1.0 {
            break;
        }

        if max_x < max_y {
            if max_x < max_z {
                voxel.x += step.x;
                max_x += delta_x;
            } else {
                voxel.z += step.z;
                max_z += delta_z;
            }
        } else if max_y < max_z {
            voxel.y += step.y;
            max_y += delta_y;
        } else {
            voxel.z += step.z;
            max_z += delta_z;
        }

        result.push(voxel);
    }

    result
}

fn signum(component: f32) -> i32 {
    if component > 0.0 {
        1
    } else if component < 0.0 {
        -1
    } else {
        0
    }
}

fn axis_delta(step: i32, end_component: f32, origin_component: f32) -> f32 {
    if step != 0 {
        (step as f32 / (end_component - origin_component)).min(f32::MAX)
    } else {
        f32::MAX
    }
}

fn initial_max(step: i32, delta: f32, origin_component: f32, start_voxel_component: i32) -> f32 {
    if step > 0 {
        delta * (1.0 - origin_component + start_voxel_component as f32)
    } else if step < 0 {
        delta * (origin_component - start_voxel_component as f32)
    } else {
        f32::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_along_x_axis_visits_consecutive_voxels() {
        let voxels = intersected_voxels(Vec3::new(0.5, 0.5, 0.5), Vec3::X, 5.0);
        assert_eq!(voxels[0], IVec3::new(0, 0, 0));
        assert!(voxels.len() >= 2);
        assert_eq!(voxels[1], IVec3::new(1, 0, 0));
    }

    #[test]
    fn zero_direction_stays_put() {
        let voxels = intersected_voxels(Vec3::new(1.5, 1.5, 1.5), Vec3::ZERO, 3.0);
        assert_eq!(voxels[0], IVec3::new(1, 1, 1));
    }

    #[test]
    fn respects_range_bound() {
        let voxels = intersected_voxels(Vec3::ZERO, Vec3::X, 2.0);
        assert!(voxels.len() <= 6);
    }
}

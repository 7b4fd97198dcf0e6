use bevy_ecs::prelude::*;
use glam::{EulerRot, Quat, Vec2};
use rand::Rng;

use crate::stage::{
    ElapsedTime, FloatBob, HeadSway, MouthPulse, Pose, PoseRig, Transform3D, Visibility,
};

const RESAMPLE_ATTEMPTS: usize = 8;

fn mix(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t
}

fn apply_pose(rig: &PoseRig, pose: Pose, query: &mut Query<&mut Transform3D>) {
    // Limb entities may be despawned during teardown in tests; skip quietly.
    if let Ok(mut left) = query.get_mut(rig.left_arm) {
        left.rotation = Quat::from_euler(EulerRot::XYZ, pose.left_arm.x, 0.0, pose.left_arm.y);
    }
    if let Ok(mut right) = query.get_mut(rig.right_arm) {
        right.rotation = Quat::from_euler(EulerRot::XYZ, pose.right_arm.x, 0.0, pose.right_arm.y);
    }
    if let Ok(mut torso) = query.get_mut(rig.torso) {
        torso.rotation = Quat::from_euler(EulerRot::XYZ, 0.0, pose.torso.x, pose.torso.y);
    }
}

/// Character pose cycle: blend into the target pose, hold it, then pick a new
/// target that differs from the settled one. Rejection sampling is bounded;
/// once the attempts run out the next pose in declaration order is taken.
pub fn sys_blend_pose(
    elapsed: Res<ElapsedTime>,
    rig: Option<ResMut<PoseRig>>,
    mut query: Query<&mut Transform3D>,
) {
    let Some(mut rig) = rig else {
        return;
    };
    if rig.poses.is_empty() {
        return;
    }
    let count = rig.poses.len();
    let current = rig.poses[rig.current.min(count - 1)];
    let next = rig.poses[rig.next.min(count - 1)];
    let time_in_pose = elapsed.0 - rig.pose_start;

    if time_in_pose < rig.transition_secs {
        let progress = (time_in_pose / rig.transition_secs).clamp(0.0, 1.0);
        let blended = Pose {
            left_arm: mix(current.left_arm, next.left_arm, progress),
            right_arm: mix(current.right_arm, next.right_arm, progress),
            torso: mix(current.torso, next.torso, progress),
        };
        apply_pose(&rig, blended, &mut query);
    } else if time_in_pose >= rig.transition_secs + rig.hold_secs {
        rig.current = rig.next;
        if count > 1 {
            let mut rng = rand::thread_rng();
            let mut candidate = rig.current;
            for _ in 0..RESAMPLE_ATTEMPTS {
                candidate = rng.gen_range(0..count);
                if candidate != rig.current {
                    break;
                }
            }
            if candidate == rig.current {
                candidate = (rig.current + 1) % count;
            }
            rig.next = candidate;
        }
        rig.pose_start = elapsed.0;
    } else {
        apply_pose(&rig, next, &mut query);
    }
}

/// Continuous idle motion layered over the pose cycle: head sway, mouth
/// pulse, and the gentle float of whichever menu group is visible.
pub fn sys_ambient_sway(
    elapsed: Res<ElapsedTime>,
    mut heads: Query<&mut Transform3D, (With<HeadSway>, Without<MouthPulse>, Without<FloatBob>)>,
    mut mouths: Query<(&mut Transform3D, &MouthPulse), Without<FloatBob>>,
    mut floaters: Query<(&mut Transform3D, &FloatBob, &Visibility)>,
) {
    let t = elapsed.0;
    for mut transform in heads.iter_mut() {
        transform.rotation = Quat::from_euler(
            EulerRot::XYZ,
            (t * 0.8).sin() * 0.05,
            (t * 1.2 + 0.3).sin() * 0.08,
            (t * 0.6 + 0.7).sin() * 0.03,
        );
    }
    for (mut transform, pulse) in mouths.iter_mut() {
        let scale_y = 1.0 + (t * 8.0).sin() * 0.2;
        transform.scale.y = scale_y;
        transform.translation.y = pulse.rest_y + (1.0 - scale_y);
    }
    // The cursor trails the original loop's half-speed clock.
    let float_t = t * 0.5;
    for (mut transform, bob, visible) in floaters.iter_mut() {
        if !visible.0 {
            continue;
        }
        transform.translation.y = (float_t * 0.8).sin() * bob.amplitude;
        transform.rotation = Quat::from_rotation_y((float_t * 0.3).sin() * bob.amplitude);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{default_poses, StageWorld};

    fn spawn_rig(stage: &mut StageWorld, poses: Vec<Pose>) {
        let left_arm = stage.world.spawn(Transform3D::default()).id();
        let right_arm = stage.world.spawn(Transform3D::default()).id();
        let torso = stage.world.spawn(Transform3D::default()).id();
        let next = if poses.len() > 1 { 1 } else { 0 };
        stage.world.insert_resource(PoseRig {
            poses,
            current: 0,
            next,
            pose_start: 0.0,
            transition_secs: 1.0,
            hold_secs: 2.0,
            left_arm,
            right_arm,
            torso,
        });
    }

    #[test]
    fn resampled_pose_differs_from_settled_one() {
        let mut stage = StageWorld::new();
        spawn_rig(&mut stage, default_poses());
        for _ in 0..(60 * 60) {
            stage.update(1.0 / 60.0);
            let rig = stage.world.resource::<PoseRig>();
            assert_ne!(rig.current, rig.next);
        }
    }

    #[test]
    fn single_pose_rig_never_spins() {
        let mut stage = StageWorld::new();
        spawn_rig(&mut stage, vec![default_poses()[0]]);
        for _ in 0..600 {
            stage.update(1.0 / 60.0);
        }
        let rig = stage.world.resource::<PoseRig>();
        assert_eq!(rig.current, 0);
        assert_eq!(rig.next, 0);
    }

    #[test]
    fn hold_phase_pins_the_target_pose() {
        let mut stage = StageWorld::new();
        let poses = default_poses();
        let expected = poses[1];
        spawn_rig(&mut stage, poses);
        // Past the 1s transition, inside the 2s hold.
        for _ in 0..90 {
            stage.update(1.0 / 60.0);
        }
        let rig_left = stage.world.resource::<PoseRig>().left_arm;
        let rotation = stage.transform(rig_left).unwrap().rotation;
        let target = Quat::from_euler(EulerRot::XYZ, expected.left_arm.x, 0.0, expected.left_arm.y);
        assert!(rotation.angle_between(target) < 1e-3);
    }
}

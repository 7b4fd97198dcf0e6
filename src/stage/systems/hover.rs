use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::stage::{
    CursorNode, HoverState, HoverTarget, HoverTint, Interactive, NodeMaterial, NodeTween,
    Transform3D,
};
use crate::tween::Easing;

const HOVER_LERP: f32 = 0.1;
const CURSOR_LERP: f32 = 0.2;
const CURSOR_HOT_SCALE: f32 = 0.7;
const CURSOR_SHRINK_SECS: f32 = 0.3;
const CURSOR_RESTORE_SECS: f32 = 0.5;

/// Relax interactive tints toward hot (pointer over) or rest each tick.
pub fn sys_hover_tint(
    hover: Res<HoverState>,
    mut query: Query<(&Interactive, &HoverTint, &mut NodeMaterial)>,
) {
    for (interactive, tint, mut material) in query.iter_mut() {
        let goal = if interactive.0 == hover.target { tint.hot } else { tint.rest };
        let delta = (goal - material.color) * HOVER_LERP;
        material.color += delta;
    }
}

/// The 3D cursor chases the projected pointer position with a fixed trailing
/// lerp, matching the soft lag of the shipped pointer. On hover edges the
/// cursor pinches to `CURSOR_HOT_SCALE` and springs back with an overshoot.
pub fn sys_follow_pointer(
    mut commands: Commands,
    hover: Res<HoverState>,
    mut was_hot: Local<bool>,
    mut query: Query<(Entity, &mut Transform3D), With<CursorNode>>,
) {
    let hot = hover.target != HoverTarget::None;
    for (entity, mut transform) in query.iter_mut() {
        if let Some(pointer) = hover.pointer_world {
            let step = (pointer - transform.translation) * CURSOR_LERP;
            transform.translation += step;
        }
        if hot != *was_hot {
            let start = transform.scale;
            let tween = if hot {
                NodeTween::new().rescale(
                    start,
                    Vec3::splat(CURSOR_HOT_SCALE),
                    CURSOR_SHRINK_SECS,
                    Easing::QuadOut,
                )
            } else {
                NodeTween::new().rescale(start, Vec3::ONE, CURSOR_RESTORE_SECS, Easing::BackOut)
            };
            commands.entity(entity).insert(tween);
        }
    }
    *was_hot = hot;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{HoverTarget, StageWorld};
    use glam::Vec3;

    #[test]
    fn hovered_tint_converges_to_hot() {
        let mut stage = StageWorld::new();
        let rest = Vec3::new(1.0, 0.0, 0.0);
        let entity = stage
            .world
            .spawn((
                Interactive(HoverTarget::ArrowLeft),
                HoverTint { rest, hot: Vec3::ONE },
                NodeMaterial { color: rest, opacity: 1.0 },
            ))
            .id();
        stage.set_hover(HoverTarget::ArrowLeft, None);
        for _ in 0..240 {
            stage.update(1.0 / 60.0);
        }
        let hot_color = stage.material(entity).unwrap().color;
        assert!((hot_color - Vec3::ONE).length() < 0.01);

        stage.set_hover(HoverTarget::None, None);
        for _ in 0..240 {
            stage.update(1.0 / 60.0);
        }
        let rest_color = stage.material(entity).unwrap().color;
        assert!((rest_color - rest).length() < 0.01);
    }

    #[test]
    fn cursor_trails_the_pointer() {
        let mut stage = StageWorld::new();
        let cursor = stage
            .world
            .spawn((Transform3D::default(), CursorNode))
            .id();
        let goal = Vec3::new(2.0, 1.0, 0.0);
        stage.set_hover(HoverTarget::None, Some(goal));
        stage.update(1.0 / 60.0);
        let after_one = stage.transform(cursor).unwrap().translation;
        assert!(after_one.length() > 0.0 && after_one.length() < goal.length());
        for _ in 0..120 {
            stage.update(1.0 / 60.0);
        }
        let settled = stage.transform(cursor).unwrap().translation;
        assert!((settled - goal).length() < 0.01);
    }

    #[test]
    fn cursor_pinches_over_interactive_nodes_and_springs_back() {
        let mut stage = StageWorld::new();
        let cursor = stage
            .world
            .spawn((Transform3D::default(), CursorNode))
            .id();
        stage.set_hover(HoverTarget::IdleButton, Some(Vec3::ZERO));
        for _ in 0..60 {
            stage.update(1.0 / 60.0);
        }
        let pinched = stage.transform(cursor).unwrap().scale;
        assert!((pinched - Vec3::splat(0.7)).length() < 1e-3);

        stage.set_hover(HoverTarget::None, Some(Vec3::ZERO));
        let mut overshot = false;
        for _ in 0..90 {
            stage.update(1.0 / 60.0);
            overshot |= stage.transform(cursor).unwrap().scale.x > 1.0;
        }
        let restored = stage.transform(cursor).unwrap().scale;
        assert!((restored - Vec3::ONE).length() < 1e-3);
        assert!(overshot, "restore eases with an overshoot");
    }
}

use bevy_ecs::prelude::*;
use bevy_ecs::system::Commands;
use glam::{EulerRot, Quat, Vec3};

use crate::events::{EventBus, SequenceTag, UiEvent};
use crate::stage::{DespawnOnFinish, NodeMaterial, TimeDelta, Transform3D};
use crate::tween::{Easing, Tween};

/// Per-node animation channels. Attaching a fresh `NodeTween` replaces any
/// running one, so a node never runs two conflicting animations. Rotation is
/// tweened in XYZ euler angles to keep endpoints exact.
#[derive(Component, Default)]
pub struct NodeTween {
    pub tag: Option<SequenceTag>,
    pub translation: Option<Tween<Vec3>>,
    pub rotation: Option<Tween<Vec3>>,
    pub scale: Option<Tween<Vec3>>,
    pub opacity: Option<Tween<f32>>,
    pub color: Option<Tween<Vec3>>,
}

impl NodeTween {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tagged(mut self, tag: SequenceTag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn translate(mut self, start: Vec3, end: Vec3, duration: f32, easing: Easing) -> Self {
        self.translation = Some(Tween::new(start, end, duration, easing));
        self
    }

    pub fn rotate(mut self, start: Vec3, end: Vec3, duration: f32, easing: Easing) -> Self {
        self.rotation = Some(Tween::new(start, end, duration, easing));
        self
    }

    pub fn rescale(mut self, start: Vec3, end: Vec3, duration: f32, easing: Easing) -> Self {
        self.scale = Some(Tween::new(start, end, duration, easing));
        self
    }

    pub fn fade(mut self, start: f32, end: f32, duration: f32, easing: Easing) -> Self {
        self.opacity = Some(Tween::new(start, end, duration, easing));
        self
    }

    pub fn fade_delayed(
        mut self,
        start: f32,
        end: f32,
        duration: f32,
        easing: Easing,
        delay: f32,
    ) -> Self {
        self.opacity = Some(Tween::new(start, end, duration, easing).with_delay(delay));
        self
    }

    pub fn recolor(mut self, start: Vec3, end: Vec3, duration: f32, easing: Easing) -> Self {
        self.color = Some(Tween::new(start, end, duration, easing));
        self
    }

    fn finished(&self) -> bool {
        self.translation.as_ref().map(|t| t.finished()).unwrap_or(true)
            && self.rotation.as_ref().map(|t| t.finished()).unwrap_or(true)
            && self.scale.as_ref().map(|t| t.finished()).unwrap_or(true)
            && self.opacity.as_ref().map(|t| t.finished()).unwrap_or(true)
            && self.color.as_ref().map(|t| t.finished()).unwrap_or(true)
    }
}

pub fn sys_drive_node_tweens(
    mut commands: Commands,
    dt: Res<TimeDelta>,
    mut bus: ResMut<EventBus>,
    mut query: Query<(
        Entity,
        &mut NodeTween,
        Option<&mut Transform3D>,
        Option<&mut NodeMaterial>,
        Option<&DespawnOnFinish>,
    )>,
) {
    for (entity, mut tween, transform, material, despawn) in query.iter_mut() {
        if let Some(mut transform) = transform {
            if let Some(channel) = tween.translation.as_mut() {
                transform.translation = channel.advance(dt.0);
            }
            if let Some(channel) = tween.rotation.as_mut() {
                let euler = channel.advance(dt.0);
                transform.rotation = Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z);
            }
            if let Some(channel) = tween.scale.as_mut() {
                transform.scale = channel.advance(dt.0);
            }
        }
        if let Some(mut material) = material {
            if let Some(channel) = tween.opacity.as_mut() {
                material.opacity = channel.advance(dt.0);
            }
            if let Some(channel) = tween.color.as_mut() {
                material.color = channel.advance(dt.0);
            }
        }
        if tween.finished() {
            if let Some(tag) = tween.tag {
                bus.push(UiEvent::TweenFinished { tag });
            }
            if despawn.is_some() {
                commands.entity(entity).despawn();
            } else {
                commands.entity(entity).remove::<NodeTween>();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageWorld;

    #[test]
    fn tween_detaches_and_reports_on_completion() {
        let mut stage = StageWorld::new();
        let entity = stage
            .world
            .spawn((Transform3D::default(), NodeMaterial::default()))
            .id();
        let tag = SequenceTag(7);
        stage.begin_tween(
            entity,
            NodeTween::new()
                .tagged(tag)
                .translate(Vec3::ZERO, Vec3::X, 0.5, Easing::QuadInOut)
                .fade(0.0, 1.0, 0.5, Easing::Linear),
        );
        for _ in 0..40 {
            stage.update(1.0 / 60.0);
        }
        assert!(!stage.has_tween(entity));
        let transform = stage.transform(entity).unwrap();
        assert!((transform.translation - Vec3::X).length() < 1e-4);
        assert_eq!(stage.material(entity).unwrap().opacity, 1.0);
        let events = stage.drain_events();
        assert!(events.contains(&UiEvent::TweenFinished { tag }));
    }

    #[test]
    fn despawn_marker_removes_entity() {
        let mut stage = StageWorld::new();
        let entity = stage
            .world
            .spawn((Transform3D::default(), NodeMaterial::default(), DespawnOnFinish))
            .id();
        stage.begin_tween(
            entity,
            NodeTween::new().rescale(Vec3::ONE, Vec3::splat(20.0), 0.1, Easing::QuadOut),
        );
        for _ in 0..20 {
            stage.update(1.0 / 60.0);
        }
        assert!(stage.world.get_entity(entity).is_err());
    }

    #[test]
    fn replacing_a_tween_drops_the_old_tag() {
        let mut stage = StageWorld::new();
        let entity = stage.world.spawn(Transform3D::default()).id();
        stage.begin_tween(
            entity,
            NodeTween::new()
                .tagged(SequenceTag(1))
                .translate(Vec3::ZERO, Vec3::X, 10.0, Easing::Linear),
        );
        stage.update(1.0 / 60.0);
        stage.begin_tween(
            entity,
            NodeTween::new()
                .tagged(SequenceTag(2))
                .translate(Vec3::ZERO, Vec3::Y, 0.05, Easing::Linear),
        );
        for _ in 0..10 {
            stage.update(1.0 / 60.0);
        }
        let events = stage.drain_events();
        assert!(events.contains(&UiEvent::TweenFinished { tag: SequenceTag(2) }));
        assert!(!events.contains(&UiEvent::TweenFinished { tag: SequenceTag(1) }));
    }
}

use bevy_ecs::prelude::Entity;
use glam::{Quat, Vec3};

use crate::picking::ray_hit_obb;
use crate::stage::{HoverTarget, NodeBounds, StageWorld, Transform3D};

/// Logical state of the rotating option ring. Geometry only; all animation
/// over it is driven by the orchestrator.
pub struct Carousel {
    options: Vec<String>,
    pub current: usize,
    pub radius: f32,
    /// Accumulated ring yaw. Updated to the new target the moment a rotation
    /// is requested; the visual tween catches up.
    pub ring_angle: f32,
}

impl Carousel {
    pub fn new(options: Vec<String>, radius: f32) -> Self {
        Self { options, current: 0, radius, ring_angle: 0.0 }
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    pub fn slot_angle(&self, index: usize) -> f32 {
        index as f32 / self.len() as f32 * std::f32::consts::TAU
    }

    /// Slot rest position in ring-local space. Slot 0 sits on +Z, in front
    /// of the camera.
    pub fn slot_position(&self, index: usize) -> Vec3 {
        let angle = self.slot_angle(index);
        Vec3::new(self.radius * angle.sin(), 0.0, self.radius * angle.cos())
    }

    /// Slots face outward, away from the ring center.
    pub fn slot_rotation(&self, index: usize) -> Quat {
        Quat::from_rotation_y(self.slot_angle(index))
    }

    /// Advances the selection and returns (old index, ring yaw delta).
    /// Positive direction moves to the next option, which spins the ring
    /// backward.
    pub fn step(&mut self, direction: i32) -> (usize, f32) {
        if self.options.is_empty() {
            return (0, 0.0);
        }
        let count = self.len() as i32;
        let old = self.current;
        self.current = ((self.current as i32 + direction).rem_euclid(count)) as usize;
        let delta = -std::f32::consts::TAU / count as f32 * direction as f32;
        self.ring_angle += delta;
        (old, delta)
    }

    pub fn reset(&mut self) {
        self.current = 0;
        self.ring_angle = 0.0;
    }

    /// Target (rect opacity, label opacity) per slot: the selected slot is
    /// fully lit, the rest sit dim with hidden labels.
    pub fn opacity_targets(&self) -> Vec<(f32, f32)> {
        (0..self.len())
            .map(|i| if i == self.current { (1.0, 1.0) } else { (0.55, 0.0) })
            .collect()
    }

    /// World transform of a slot once the ring yaw is applied.
    pub fn slot_world_transform(&self, index: usize, scale: Vec3) -> Transform3D {
        let ring = Quat::from_rotation_y(self.ring_angle);
        Transform3D {
            translation: ring * self.slot_position(index),
            rotation: Quat::from_rotation_y(self.slot_angle(index) + self.ring_angle),
            scale,
        }
    }
}

pub struct SlotHandles {
    pub rect: Entity,
    pub label: Entity,
}

/// Entity handles into the menu scene graph, resolved once at build time.
pub struct MenuHandles {
    pub idle_group: Entity,
    pub idle_button: Entity,
    pub idle_label: Entity,
    pub carousel_group: Entity,
    pub ring: Entity,
    pub slots: Vec<SlotHandles>,
    pub arrow_left: Entity,
    pub arrow_right: Entity,
    pub proxies: [Entity; 4],
    pub panel: Entity,
    pub cursor: Entity,
    pub exposure: Entity,
}

fn hit_entity(
    stage: &StageWorld,
    entity: Entity,
    origin: Vec3,
    dir: Vec3,
) -> Option<f32> {
    let transform = stage.transform(entity)?;
    let bounds = stage.world.get::<NodeBounds>(entity)?;
    ray_hit_obb(origin, dir, &transform, bounds)
}

/// Resolves the pointer ray against whichever interactive group is up.
/// Slots are tested through their ring-composed transforms so a mid-spin
/// ring still picks correctly.
pub fn hover_test(
    stage: &StageWorld,
    handles: &MenuHandles,
    carousel: &Carousel,
    origin: Vec3,
    dir: Vec3,
) -> HoverTarget {
    let mut best = f32::INFINITY;
    let mut target = HoverTarget::None;
    let mut consider = |distance: Option<f32>, candidate: HoverTarget| {
        if let Some(distance) = distance {
            if distance < best {
                best = distance;
                target = candidate;
            }
        }
    };

    if stage.is_visible(handles.idle_group) {
        consider(
            hit_entity(stage, handles.idle_button, origin, dir),
            HoverTarget::IdleButton,
        );
    }
    if stage.is_visible(handles.carousel_group) {
        consider(
            hit_entity(stage, handles.arrow_left, origin, dir),
            HoverTarget::ArrowLeft,
        );
        consider(
            hit_entity(stage, handles.arrow_right, origin, dir),
            HoverTarget::ArrowRight,
        );
        for (index, slot) in handles.slots.iter().enumerate() {
            let Some(bounds) = stage.world.get::<NodeBounds>(slot.rect) else {
                continue;
            };
            let scale = stage
                .transform(slot.rect)
                .map(|t| t.scale)
                .unwrap_or(Vec3::ONE);
            let transform = carousel.slot_world_transform(index, scale);
            consider(
                ray_hit_obb(origin, dir, &transform, bounds),
                HoverTarget::Slot(index),
            );
        }
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_options() -> Carousel {
        Carousel::new(
            vec!["Portfolio".into(), "Hire Me".into(), "Reviews".into(), "Contact Me".into()],
            4.5,
        )
    }

    #[test]
    fn step_wraps_both_directions() {
        let mut carousel = four_options();
        assert_eq!(carousel.step(-1).0, 0);
        assert_eq!(carousel.current, 3);
        carousel.step(1);
        assert_eq!(carousel.current, 0);
    }

    #[test]
    fn full_cycle_returns_ring_to_a_whole_turn() {
        let mut carousel = four_options();
        for _ in 0..4 {
            carousel.step(1);
        }
        assert_eq!(carousel.current, 0);
        assert!((carousel.ring_angle + std::f32::consts::TAU).abs() < 1e-5);
    }

    #[test]
    fn slots_sit_on_the_ring_radius() {
        let carousel = four_options();
        for i in 0..4 {
            let position = carousel.slot_position(i);
            assert!((position.length() - 4.5).abs() < 1e-4);
            assert_eq!(position.y, 0.0);
        }
        assert!((carousel.slot_position(0) - Vec3::new(0.0, 0.0, 4.5)).length() < 1e-4);
    }

    #[test]
    fn only_the_selected_slot_is_fully_lit() {
        let mut carousel = four_options();
        carousel.step(1);
        let targets = carousel.opacity_targets();
        assert_eq!(targets[1], (1.0, 1.0));
        assert_eq!(targets[0], (0.55, 0.0));
        assert_eq!(targets[2], (0.55, 0.0));
    }

    #[test]
    fn front_slot_world_transform_tracks_the_ring() {
        let mut carousel = four_options();
        carousel.step(1);
        // After one step the selected slot rotates to the front.
        let transform = carousel.slot_world_transform(carousel.current, Vec3::ONE);
        assert!((transform.translation - Vec3::new(0.0, 0.0, 4.5)).length() < 1e-4);
    }
}

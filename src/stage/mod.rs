use bevy_ecs::prelude::*;
use bevy_ecs::schedule::Schedule;
use glam::{Quat, Vec2, Vec3};
use std::borrow::Cow;

use crate::events::{EventBus, UiEvent};
use crate::theme::AccentPalette;

pub mod systems;

pub use systems::NodeTween;

// ---------- Components ----------
#[derive(Component, Clone, Copy)]
pub struct Transform3D {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}
impl Default for Transform3D {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}
impl Transform3D {
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::default() }
    }
}

#[derive(Component, Clone, Copy)]
pub struct NodeMaterial {
    pub color: Vec3,
    pub opacity: f32,
}
impl Default for NodeMaterial {
    fn default() -> Self {
        Self { color: Vec3::ONE, opacity: 1.0 }
    }
}

#[derive(Component, Clone)]
pub struct NodeName(pub Cow<'static, str>);

#[derive(Component, Clone, Copy)]
pub struct Visibility(pub bool);
impl Default for Visibility {
    fn default() -> Self {
        Self(true)
    }
}

#[derive(Component, Clone, Copy)]
pub struct Parent(pub Entity);

/// Local-space axis-aligned extent used for pointer picking.
#[derive(Component, Clone, Copy)]
pub struct NodeBounds {
    pub min: Vec3,
    pub max: Vec3,
}
impl NodeBounds {
    pub fn from_half_extent(half: Vec3) -> Self {
        Self { min: -half, max: half }
    }
}

#[derive(Component, Clone, Copy)]
pub struct Drift(pub Vec3);

/// Rest/hot tint pair for pointer feedback. `rest` is rewritten on theme
/// changes so hover always relaxes toward the active palette.
#[derive(Component, Clone, Copy)]
pub struct HoverTint {
    pub rest: Vec3,
    pub hot: Vec3,
}

#[derive(Component, Clone, Copy)]
pub struct Interactive(pub HoverTarget);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HoverTarget {
    #[default]
    None,
    IdleButton,
    Slot(usize),
    ArrowLeft,
    ArrowRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemedTextureKind {
    Windows,
    Clouds,
}

/// Marks a surface whose texture is regenerated on theme swaps.
#[derive(Component, Clone, Copy)]
pub struct ThemedSurface(pub ThemedTextureKind);

/// Generation counter a renderer compares against `ThemeTextures::generation`
/// to decide whether the bound image is stale.
#[derive(Component, Clone, Copy, Default)]
pub struct TextureRef(pub u32);

#[derive(Component, Clone, Copy)]
pub struct HeadSway;

#[derive(Component, Clone, Copy)]
pub struct MouthPulse {
    pub rest_y: f32,
}

#[derive(Component, Clone, Copy)]
pub struct FloatBob {
    pub amplitude: f32,
}

#[derive(Component, Clone, Copy)]
pub struct CursorNode;

/// Despawn the entity instead of detaching the tween when it completes.
#[derive(Component, Clone, Copy)]
pub struct DespawnOnFinish;

// ---------- Resources ----------
#[derive(Resource, Clone, Copy)]
pub struct TimeDelta(pub f32);

#[derive(Resource, Clone, Copy, Default)]
pub struct ElapsedTime(pub f32);

#[derive(Resource, Clone, Copy, Default)]
pub struct HoverState {
    pub target: HoverTarget,
    pub pointer_world: Option<Vec3>,
}

#[derive(Resource, Clone, Copy)]
pub struct ParticleBounds {
    pub extent: f32,
}

/// One character pose: per-limb rotation pairs, radians.
/// Arms carry (x, z) rotations, the torso carries (y, z).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub left_arm: Vec2,
    pub right_arm: Vec2,
    pub torso: Vec2,
}

pub fn default_poses() -> Vec<Pose> {
    vec![
        Pose { left_arm: Vec2::ZERO, right_arm: Vec2::ZERO, torso: Vec2::ZERO },
        Pose {
            left_arm: Vec2::new(-0.2, 0.1),
            right_arm: Vec2::new(-0.2, -0.1),
            torso: Vec2::new(0.0, 0.1),
        },
        Pose {
            left_arm: Vec2::new(-0.8, 0.5),
            right_arm: Vec2::ZERO,
            torso: Vec2::new(0.1, 0.0),
        },
        Pose {
            left_arm: Vec2::new(0.1, -0.1),
            right_arm: Vec2::new(0.1, 0.1),
            torso: Vec2::new(0.0, -0.1),
        },
        Pose {
            left_arm: Vec2::new(-0.3, -0.1),
            right_arm: Vec2::new(-0.6, -0.4),
            torso: Vec2::new(-0.05, 0.05),
        },
    ]
}

/// The character pose cycle. Limb entities are resolved at build time; the
/// blend system writes their transforms every tick.
#[derive(Resource)]
pub struct PoseRig {
    pub poses: Vec<Pose>,
    pub current: usize,
    pub next: usize,
    pub pose_start: f32,
    pub transition_secs: f32,
    pub hold_secs: f32,
    pub left_arm: Entity,
    pub right_arm: Entity,
    pub torso: Entity,
}

// ---------- World ----------
/// Scene-graph state plus the per-tick animation schedule. All mutation of
/// node transforms and materials flows through here on the main thread.
pub struct StageWorld {
    pub world: World,
    schedule: Schedule,
}

impl StageWorld {
    pub fn new() -> Self {
        let mut world = World::new();
        world.insert_resource(TimeDelta(0.0));
        world.insert_resource(ElapsedTime(0.0));
        world.insert_resource(HoverState::default());
        world.insert_resource(ParticleBounds { extent: 100.0 });
        world.insert_resource(EventBus::default());
        world.insert_resource(AccentPalette::default());

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                systems::sys_drive_node_tweens,
                systems::sys_drift_particles,
                systems::sys_blend_pose,
                systems::sys_ambient_sway,
                systems::sys_hover_tint,
                systems::sys_follow_pointer,
                crate::theme::sys_derive_accent,
            )
                .chain(),
        );
        Self { world, schedule }
    }

    pub fn update(&mut self, dt: f32) {
        {
            let mut elapsed = self.world.resource_mut::<ElapsedTime>();
            elapsed.0 += dt;
        }
        self.world.resource_mut::<TimeDelta>().0 = dt;
        self.schedule.run(&mut self.world);
    }

    pub fn set_hover(&mut self, target: HoverTarget, pointer_world: Option<Vec3>) {
        let mut hover = self.world.resource_mut::<HoverState>();
        hover.target = target;
        hover.pointer_world = pointer_world;
    }

    pub fn hover_target(&self) -> HoverTarget {
        self.world.resource::<HoverState>().target
    }

    pub fn set_visible(&mut self, entity: Entity, visible: bool) {
        if let Some(mut flag) = self.world.get_mut::<Visibility>(entity) {
            flag.0 = visible;
        }
    }

    pub fn is_visible(&self, entity: Entity) -> bool {
        self.world.get::<Visibility>(entity).map(|v| v.0).unwrap_or(false)
    }

    pub fn transform(&self, entity: Entity) -> Option<Transform3D> {
        self.world.get::<Transform3D>(entity).copied()
    }

    pub fn set_transform(&mut self, entity: Entity, transform: Transform3D) {
        if let Some(mut current) = self.world.get_mut::<Transform3D>(entity) {
            *current = transform;
        }
    }

    pub fn material(&self, entity: Entity) -> Option<NodeMaterial> {
        self.world.get::<NodeMaterial>(entity).copied()
    }

    pub fn set_material(&mut self, entity: Entity, material: NodeMaterial) {
        if let Some(mut current) = self.world.get_mut::<NodeMaterial>(entity) {
            *current = material;
        }
    }

    /// Replaces any running tween on the entity. Mid-flight values are kept:
    /// the new tween starts from wherever the node currently is.
    pub fn begin_tween(&mut self, entity: Entity, tween: NodeTween) {
        if let Ok(mut slot) = self.world.get_entity_mut(entity) {
            slot.insert(tween);
        }
    }

    pub fn has_tween(&self, entity: Entity) -> bool {
        self.world.get::<NodeTween>(entity).is_some()
    }

    pub fn push_event(&mut self, event: UiEvent) {
        self.world.resource_mut::<EventBus>().push(event);
    }

    pub fn drain_events(&mut self) -> Vec<UiEvent> {
        self.world.resource_mut::<EventBus>().drain()
    }
}

impl Default for StageWorld {
    fn default() -> Self {
        Self::new()
    }
}

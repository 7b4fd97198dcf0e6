use glam::{Quat, Vec3};
use rand::Rng;

use crate::config::PresentationConfig;
use crate::menu::{Carousel, MenuHandles, SlotHandles};
use crate::popup::{PopupHost, PopupSpec};
use crate::stage::{
    default_poses, CursorNode, Drift, FloatBob, HeadSway, HoverTarget, HoverTint, Interactive,
    MouthPulse, NodeBounds, NodeMaterial, NodeName, Parent, ParticleBounds, PoseRig, StageWorld,
    TextureRef, ThemedSurface, ThemedTextureKind, Transform3D, Visibility,
};
use crate::theme::{palette, AccentSource, ThemeId, ThemeSlots, ThemeTextures};

const CAROUSEL_RADIUS: f32 = 4.5;
const IDLE_BUTTON_SIZE: f32 = 2.2;
const CITY_RADIUS: f32 = 50.0;
const CLOUD_HEIGHT: f32 = 20.0;

/// The five shipped popups. The first four back the carousel slots.
pub fn register_default_popups(popups: &mut PopupHost) {
    popups.register(
        PopupSpec::new("portfolio", "Portfolio").with_body(vec![
            "#1 Urban Festival 'YADE LAUREN'".into(),
            "#2 Speculative Advertisement Project".into(),
            "#3 Nature's Yum Episode #1".into(),
        ]),
    );
    popups.register(
        PopupSpec::new("hire-me", "Hire Me")
            .with_body(vec!["Commissions open for events, ads and narration.".into()]),
    );
    popups.register(PopupSpec::new("reviews", "Reviews"));
    popups.register(
        PopupSpec::new("contact-me", "Contact Me")
            .with_body(vec!["Reach out through the contact form.".into()]),
    );
    popups.register(PopupSpec::new("contact-form", "Contact Form"));
}

fn spawn_material_node(stage: &mut StageWorld, name: &'static str, color: Vec3) -> bevy_ecs::entity::Entity {
    stage
        .world
        .spawn((
            NodeName(name.into()),
            NodeMaterial { color, opacity: 1.0 },
            Transform3D::default(),
            Visibility::default(),
        ))
        .id()
}

fn build_character(stage: &mut StageWorld, cfg: &PresentationConfig) -> ThemeSlots {
    let colors = palette(ThemeId::Red);

    let background = spawn_material_node(stage, "background", colors.background);
    let fog = spawn_material_node(stage, "fog", colors.fog);
    let rim_a = spawn_material_node(stage, "rim-light-1", colors.main_neon);
    let rim_b = spawn_material_node(stage, "rim-light-2", colors.main_neon);
    let accent = stage
        .world
        .spawn((
            NodeName("accent".into()),
            NodeMaterial { color: colors.main_neon, opacity: 1.0 },
            AccentSource,
        ))
        .id();

    // Character rig. The torso wears the suit material the theme drives.
    let torso = stage
        .world
        .spawn((
            NodeName("torso".into()),
            Transform3D::from_translation(Vec3::new(-1.5, 1.8, 0.0)),
            NodeMaterial { color: colors.suit, opacity: 1.0 },
            Visibility::default(),
        ))
        .id();
    let head = stage
        .world
        .spawn((
            NodeName("head".into()),
            Transform3D::from_translation(Vec3::new(0.0, 1.2, 0.0)),
            Parent(torso),
            Visibility::default(),
            HeadSway,
        ))
        .id();
    stage.world.spawn((
        NodeName("mouth".into()),
        Transform3D::from_translation(Vec3::new(0.0, -5.01, 0.4)),
        Parent(head),
        Visibility::default(),
        MouthPulse { rest_y: -5.01 },
    ));
    let left_arm = stage
        .world
        .spawn((
            NodeName("left-arm".into()),
            Transform3D::from_translation(Vec3::new(-0.6, 0.6, 0.0)),
            Parent(torso),
            Visibility::default(),
        ))
        .id();
    let right_arm = stage
        .world
        .spawn((
            NodeName("right-arm".into()),
            Transform3D::from_translation(Vec3::new(0.6, 0.6, 0.0)),
            Parent(torso),
            Visibility::default(),
        ))
        .id();
    stage.world.insert_resource(PoseRig {
        poses: default_poses(),
        current: 0,
        next: 1,
        pose_start: 0.0,
        transition_secs: cfg.pose.transition_secs,
        hold_secs: cfg.pose.hold_secs,
        left_arm,
        right_arm,
        torso,
    });

    ThemeSlots { background, fog, suit: torso, rim_lights: [rim_a, rim_b], accent }
}

fn build_cityscape(stage: &mut StageWorld, cfg: &PresentationConfig) {
    let mut rng = rand::thread_rng();
    let tints = [0.102, 0.125, 0.063];
    for i in 0..cfg.city.building_count {
        let height = rng.gen_range(10.0..50.0);
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let distance = CITY_RADIUS + rng.gen_range(0.0..40.0);
        let tint = tints[i as usize % tints.len()];
        stage.world.spawn((
            NodeName("building".into()),
            Transform3D {
                translation: Vec3::new(angle.cos() * distance, height / 2.0, angle.sin() * distance),
                rotation: Quat::IDENTITY,
                scale: Vec3::new(rng.gen_range(2.0..7.0), height, rng.gen_range(2.0..7.0)),
            },
            NodeMaterial { color: Vec3::splat(tint), opacity: 1.0 },
            Visibility::default(),
            ThemedSurface(ThemedTextureKind::Windows),
            TextureRef(0),
        ));
    }
}

fn build_clouds(stage: &mut StageWorld, cfg: &PresentationConfig) {
    let layer = stage
        .world
        .spawn((
            NodeName("cloud-layer".into()),
            Transform3D::default(),
            NodeMaterial { color: Vec3::ONE, opacity: 0.2 },
            Visibility::default(),
            ThemedSurface(ThemedTextureKind::Clouds),
            TextureRef(0),
        ))
        .id();
    let extent = cfg.particles.bound;
    let max_speed = cfg.particles.max_speed;
    let mut rng = rand::thread_rng();
    for _ in 0..cfg.particles.count {
        let position = Vec3::new(
            rng.gen_range(-extent..extent),
            CLOUD_HEIGHT + rng.gen_range(0.0..10.0),
            rng.gen_range(-extent..extent),
        );
        let velocity = Vec3::new(
            rng.gen_range(-max_speed..max_speed) / 2.0,
            0.0,
            rng.gen_range(-max_speed..max_speed) / 2.0,
        );
        stage.world.spawn((
            NodeName("cloud".into()),
            Transform3D::from_translation(position),
            Parent(layer),
            Drift(velocity),
            Visibility::default(),
        ));
    }
    stage.world.insert_resource(ParticleBounds { extent });
}

fn build_menu(stage: &mut StageWorld, carousel: &Carousel) -> MenuHandles {
    let colors = palette(ThemeId::Red);
    let accent = colors.main_neon;
    let hot = Vec3::ONE;

    let idle_group = stage
        .world
        .spawn((
            NodeName("idle-group".into()),
            Transform3D::default(),
            Visibility(true),
            FloatBob { amplitude: 0.02 },
        ))
        .id();
    let half_button = IDLE_BUTTON_SIZE / 2.0;
    let idle_button = stage
        .world
        .spawn((
            NodeName("idle-button".into()),
            Transform3D::default(),
            Parent(idle_group),
            NodeBounds::from_half_extent(Vec3::new(half_button, half_button, 0.15)),
            NodeMaterial { color: accent, opacity: 1.0 },
            Visibility(true),
            Interactive(HoverTarget::IdleButton),
            HoverTint { rest: accent, hot },
        ))
        .id();
    let idle_label = stage
        .world
        .spawn((
            NodeName("idle-label".into()),
            Transform3D::from_translation(Vec3::new(0.0, 0.0, 0.12)),
            Parent(idle_group),
            NodeMaterial { color: accent, opacity: 1.0 },
            Visibility(true),
        ))
        .id();

    let carousel_group = stage
        .world
        .spawn((
            NodeName("carousel-group".into()),
            Transform3D::default(),
            Visibility(false),
            FloatBob { amplitude: 0.02 },
        ))
        .id();
    let ring = stage
        .world
        .spawn((
            NodeName("carousel-ring".into()),
            Transform3D::default(),
            Parent(carousel_group),
            Visibility(true),
        ))
        .id();

    let mut slots = Vec::with_capacity(carousel.len());
    for index in 0..carousel.len() {
        let (rect_opacity, label_opacity) =
            if index == 0 { (1.0, 1.0) } else { (0.55, 0.0) };
        let rect = stage
            .world
            .spawn((
                NodeName("slot-rect".into()),
                Transform3D {
                    translation: carousel.slot_position(index),
                    rotation: carousel.slot_rotation(index),
                    scale: Vec3::ONE,
                },
                Parent(ring),
                NodeBounds::from_half_extent(Vec3::new(1.5, 0.5, 0.1)),
                NodeMaterial { color: accent, opacity: rect_opacity },
                Visibility(true),
                Interactive(HoverTarget::Slot(index)),
            ))
            .id();
        let label = stage
            .world
            .spawn((
                NodeName("slot-label".into()),
                Transform3D::from_translation(Vec3::new(0.0, 0.0, 0.12)),
                Parent(rect),
                NodeMaterial { color: accent, opacity: label_opacity },
                Visibility(true),
                Interactive(HoverTarget::Slot(index)),
                HoverTint { rest: accent, hot },
            ))
            .id();
        slots.push(SlotHandles { rect, label });
    }

    let arrow_bounds = NodeBounds::from_half_extent(Vec3::new(0.2, 0.35, 0.1));
    let arrow_left = stage
        .world
        .spawn((
            NodeName("arrow-left".into()),
            Transform3D {
                translation: Vec3::new(-6.0, 0.0, 0.0),
                rotation: Quat::from_rotation_z(std::f32::consts::PI),
                scale: Vec3::ONE,
            },
            Parent(carousel_group),
            arrow_bounds,
            NodeMaterial { color: accent, opacity: 1.0 },
            Visibility(true),
            Interactive(HoverTarget::ArrowLeft),
            HoverTint { rest: accent, hot },
        ))
        .id();
    let arrow_right = stage
        .world
        .spawn((
            NodeName("arrow-right".into()),
            Transform3D::from_translation(Vec3::new(6.0, 0.0, 0.0)),
            Parent(carousel_group),
            arrow_bounds,
            NodeMaterial { color: accent, opacity: 1.0 },
            Visibility(true),
            Interactive(HoverTarget::ArrowRight),
            HoverTint { rest: accent, hot },
        ))
        .id();

    let mut proxies = [idle_group; 4];
    for proxy in proxies.iter_mut() {
        *proxy = stage
            .world
            .spawn((
                NodeName("transition-proxy".into()),
                Transform3D::default(),
                NodeMaterial { color: accent, opacity: 1.0 },
                Visibility(false),
            ))
            .id();
    }

    let panel = stage
        .world
        .spawn((
            NodeName("wall-panel".into()),
            Transform3D::default(),
            NodeMaterial { color: Vec3::splat(0.05), opacity: 0.0 },
            Visibility(false),
        ))
        .id();
    let cursor = stage
        .world
        .spawn((
            NodeName("cursor".into()),
            Transform3D {
                rotation: Quat::from_rotation_z(std::f32::consts::PI / 12.0),
                ..Transform3D::default()
            },
            NodeMaterial { color: Vec3::ONE, opacity: 1.0 },
            Visibility(true),
            CursorNode,
        ))
        .id();
    // Exposure lives on a material channel so it tweens like everything else.
    let exposure = stage
        .world
        .spawn((
            NodeName("exposure".into()),
            NodeMaterial { color: Vec3::ONE, opacity: 1.2 },
        ))
        .id();

    MenuHandles {
        idle_group,
        idle_button,
        idle_label,
        carousel_group,
        ring,
        slots,
        arrow_left,
        arrow_right,
        proxies,
        panel,
        cursor,
        exposure,
    }
}

/// Populates a fresh stage: character, cityscape, cloud field, menu graph
/// and the initial red theme textures. Popups must already be registered;
/// the first four become carousel options.
pub fn build(
    stage: &mut StageWorld,
    cfg: &PresentationConfig,
    popups: &PopupHost,
) -> (MenuHandles, ThemeSlots, Carousel) {
    let options: Vec<String> = (0..popups.len().min(4))
        .filter_map(|i| popups.name(crate::popup::PopupId(i)))
        .map(str::to_string)
        .collect();
    let carousel = Carousel::new(options, CAROUSEL_RADIUS);

    let theme_slots = build_character(stage, cfg);
    build_cityscape(stage, cfg);
    build_clouds(stage, cfg);
    let menu = build_menu(stage, &carousel);
    stage
        .world
        .insert_resource(ThemeTextures::generate(ThemeId::Red, 0));
    (menu, theme_slots, carousel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PresentationConfig;

    fn built() -> (StageWorld, MenuHandles, ThemeSlots, Carousel) {
        let mut stage = StageWorld::new();
        let mut popups = PopupHost::default();
        register_default_popups(&mut popups);
        let cfg = PresentationConfig::default();
        let (menu, slots, carousel) = build(&mut stage, &cfg, &popups);
        (stage, menu, slots, carousel)
    }

    #[test]
    fn carousel_options_come_from_the_first_four_popups() {
        let (_, _, _, carousel) = built();
        assert_eq!(carousel.len(), 4);
        assert_eq!(carousel.option(0), Some("portfolio"));
        assert_eq!(carousel.option(3), Some("contact-me"));
    }

    #[test]
    fn menu_starts_idle_with_the_carousel_hidden() {
        let (stage, menu, _, _) = built();
        assert!(stage.is_visible(menu.idle_group));
        assert!(!stage.is_visible(menu.carousel_group));
        assert!(!stage.is_visible(menu.panel));
        for proxy in menu.proxies {
            assert!(!stage.is_visible(proxy));
        }
    }

    #[test]
    fn only_the_front_slot_starts_lit() {
        let (stage, menu, _, _) = built();
        assert_eq!(stage.material(menu.slots[0].rect).unwrap().opacity, 1.0);
        assert_eq!(stage.material(menu.slots[1].rect).unwrap().opacity, 0.55);
        assert_eq!(stage.material(menu.slots[1].label).unwrap().opacity, 0.0);
    }

    #[test]
    fn themed_surfaces_start_at_generation_zero() {
        let (stage, _, _, _) = built();
        let mut world = stage.world;
        let mut query = world.query::<(&ThemedSurface, &TextureRef)>();
        let mut seen = 0u32;
        for (_, texture) in query.iter(&world) {
            assert_eq!(texture.0, 0);
            seen += 1;
        }
        let cfg = PresentationConfig::default();
        assert_eq!(seen, cfg.city.building_count + 1);
    }
}

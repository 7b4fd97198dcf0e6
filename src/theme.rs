use bevy_ecs::prelude::*;
use glam::Vec3;
use image::{Rgba, RgbaImage};
use rand::Rng;

use crate::events::UiEvent;
use crate::stage::{
    HoverTint, Interactive, NodeMaterial, NodeTween, StageWorld, TextureRef, ThemedSurface,
};
use crate::tween::Easing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeId {
    Red,
    Blue,
}

fn rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Full color set for one theme. `cloud` stays in byte form because it only
/// feeds the texture painter.
#[derive(Debug, Clone, Copy)]
pub struct ThemePalette {
    pub main_neon: Vec3,
    pub light_neon: Vec3,
    pub lighter_neon: Vec3,
    pub suit: Vec3,
    pub background: Vec3,
    pub fog: Vec3,
    pub cloud: [u8; 3],
}

pub fn palette(theme: ThemeId) -> ThemePalette {
    match theme {
        ThemeId::Red => ThemePalette {
            main_neon: rgb(0xff0000),
            light_neon: rgb(0xff4d4d),
            lighter_neon: rgb(0xffaaaa),
            suit: rgb(0x8b0000),
            background: rgb(0x220000),
            fog: rgb(0x440000),
            cloud: [50, 0, 0],
        },
        ThemeId::Blue => ThemePalette {
            main_neon: rgb(0x00aeff),
            light_neon: rgb(0x61daff),
            lighter_neon: rgb(0xa3e6ff),
            suit: rgb(0x003366),
            background: rgb(0x001a22),
            fog: rgb(0x002244),
            cloud: [0, 20, 50],
        },
    }
}

/// Entities whose materials the theme crossfade drives.
#[derive(Clone, Copy)]
pub struct ThemeSlots {
    pub background: Entity,
    pub fog: Entity,
    pub suit: Entity,
    pub rim_lights: [Entity; 2],
    pub accent: Entity,
}

/// Marks the material the accent derivation reads each tick.
#[derive(Component, Clone, Copy)]
pub struct AccentSource;

/// Current accent color and its two white-shifted derivatives, refreshed
/// every tick so mid-crossfade frames stay consistent.
#[derive(Resource, Clone, Copy)]
pub struct AccentPalette {
    pub main: Vec3,
    pub light: Vec3,
    pub lighter: Vec3,
}

impl Default for AccentPalette {
    fn default() -> Self {
        derive_accent(palette(ThemeId::Red).main_neon)
    }
}

fn derive_accent(main: Vec3) -> AccentPalette {
    AccentPalette {
        main,
        light: main.lerp(Vec3::ONE, 0.3),
        lighter: main.lerp(Vec3::ONE, 0.6),
    }
}

pub fn sys_derive_accent(
    sources: Query<&NodeMaterial, With<AccentSource>>,
    mut accent: ResMut<AccentPalette>,
) {
    if let Some(material) = sources.iter().next() {
        *accent = derive_accent(material.color);
    }
}

/// Procedural textures for the themed surfaces. The generation counter is
/// bumped on every regeneration; surfaces carry a `TextureRef` that is
/// brought up to date at the same time.
#[derive(Resource)]
pub struct ThemeTextures {
    pub windows: RgbaImage,
    pub clouds: RgbaImage,
    pub generation: u32,
}

impl ThemeTextures {
    pub fn generate(theme: ThemeId, generation: u32) -> Self {
        let colors = palette(theme);
        Self {
            windows: windows_texture(colors.main_neon),
            clouds: cloud_texture(colors.cloud),
            generation,
        }
    }
}

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Night-facade texture: dark field with an 8x8 window grid on 16px pitch.
/// Roughly one window in ten burns in the accent color, a further fifth at
/// half brightness, the rest stay dim.
pub fn windows_texture(accent: Vec3) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(128, 256, Rgba([0x11, 0x11, 0x11, 0xff]));
    let mut rng = rand::thread_rng();
    let dim = rgb(0x333333);
    for y in (8..256u32).step_by(16) {
        for x in (8..128u32).step_by(16) {
            let color = if rng.gen::<f32>() > 0.9 {
                accent
            } else if rng.gen::<f32>() > 0.8 {
                accent * 0.5
            } else {
                dim
            };
            let pixel = Rgba([to_byte(color.x), to_byte(color.y), to_byte(color.z), 0xff]);
            for dy in 0..8 {
                for dx in 0..8 {
                    img.put_pixel(x + dx, y + dy, pixel);
                }
            }
        }
    }
    img
}

/// Soft radial puff: theme color throughout, alpha falling from 0.8 at the
/// center to 0 at the rim.
pub fn cloud_texture(color: [u8; 3]) -> RgbaImage {
    let size = 128u32;
    let mut img = RgbaImage::new(size, size);
    let center = (size as f32 - 1.0) / 2.0;
    let radius = size as f32 / 2.0;
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let falloff = (1.0 - (dx * dx + dy * dy).sqrt() / radius).clamp(0.0, 1.0);
            let alpha = to_byte(0.8 * falloff);
            img.put_pixel(x, y, Rgba([color[0], color[1], color[2], alpha]));
        }
    }
    img
}

/// Drives the red/blue crossfade: material tweens on the fixed slots, a rest
/// tint rewrite on every interactive node, and a texture regeneration for
/// the observer surfaces.
pub struct ThemeEngine {
    pub active: ThemeId,
    pub transition_secs: f32,
    slots: ThemeSlots,
}

impl ThemeEngine {
    pub fn new(slots: ThemeSlots, transition_secs: f32) -> Self {
        Self { active: ThemeId::Red, transition_secs, slots }
    }

    pub fn slots(&self) -> ThemeSlots {
        self.slots
    }

    /// No-op when the target theme is already active.
    pub fn transition_to(&mut self, theme: ThemeId, stage: &mut StageWorld) {
        if self.active == theme {
            return;
        }
        self.active = theme;
        let colors = palette(theme);
        let duration = self.transition_secs;

        self.recolor_slot(stage, self.slots.background, colors.background, duration);
        self.recolor_slot(stage, self.slots.fog, colors.fog, duration);
        self.recolor_slot(stage, self.slots.suit, colors.suit, duration);
        for light in self.slots.rim_lights {
            self.recolor_slot(stage, light, colors.main_neon, duration);
        }
        self.recolor_slot(stage, self.slots.accent, colors.main_neon, duration);

        let mut interactive = stage.world.query::<(&Interactive, &mut HoverTint)>();
        for (_, mut tint) in interactive.iter_mut(&mut stage.world) {
            tint.rest = colors.main_neon;
        }

        let generation = stage
            .world
            .get_resource::<ThemeTextures>()
            .map(|textures| textures.generation + 1)
            .unwrap_or(1);
        stage.world.insert_resource(ThemeTextures::generate(theme, generation));
        let mut surfaces = stage.world.query::<(&ThemedSurface, &mut TextureRef)>();
        for (_, mut texture) in surfaces.iter_mut(&mut stage.world) {
            texture.0 = generation;
        }

        stage.push_event(UiEvent::ThemeChanged { theme });
    }

    fn recolor_slot(&self, stage: &mut StageWorld, entity: Entity, end: Vec3, duration: f32) {
        let start = stage.material(entity).map(|m| m.color).unwrap_or(end);
        stage.begin_tween(entity, NodeTween::new().recolor(start, end, duration, Easing::QuadInOut));
    }
}

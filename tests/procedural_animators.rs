use glam::Vec3;

use proscenium::config::PresentationConfig;
use proscenium::input::InputEvent;
use proscenium::machine::UiState;
use proscenium::stage::{DespawnOnFinish, Drift, HoverTarget, Transform3D};
use proscenium::Presentation;

const DT: f32 = 1.0 / 60.0;

fn step(presentation: &mut Presentation, secs: f32) {
    let ticks = (secs / DT).ceil() as usize;
    for _ in 0..ticks {
        presentation.update(DT);
    }
}

fn ripple_count(presentation: &Presentation) -> usize {
    presentation
        .stage()
        .world
        .iter_entities()
        .filter(|entity| entity.contains::<DespawnOnFinish>())
        .count()
}

fn center_cursor(config: &PresentationConfig) -> InputEvent {
    InputEvent::CursorPos {
        x: config.window.width as f32 / 2.0,
        y: config.window.height as f32 / 2.0,
    }
}

#[test]
fn idle_button_floats_on_its_bob() {
    let mut presentation = Presentation::new(&PresentationConfig::default());
    let idle_group = presentation.menu().idle_group;

    let mut heights = Vec::new();
    for _ in 0..4 {
        step(&mut presentation, 0.8);
        if let Some(transform) = presentation.stage().transform(idle_group) {
            heights.push(transform.translation.y);
        }
    }
    let min = heights.iter().cloned().fold(f32::INFINITY, f32::min);
    let max = heights.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    assert!(max - min > 1e-4, "bob must actually move the group");
    assert!(max - min < 0.1, "bob stays subtle");
}

#[test]
fn hover_tint_warms_under_the_pointer_and_cools_off() {
    let config = PresentationConfig::default();
    let mut presentation = Presentation::new(&config);
    let idle_button = presentation.menu().idle_button;
    let rest = presentation
        .stage()
        .material(idle_button)
        .map(|m| m.color)
        .unwrap_or_default();

    presentation.input.push(center_cursor(&config));
    step(&mut presentation, 1.0);
    let hot = presentation
        .stage()
        .material(idle_button)
        .map(|m| m.color)
        .unwrap_or_default();
    assert!(
        (hot - Vec3::ONE).length() < 0.05,
        "button tint converges on white under the pointer"
    );

    // Park the pointer far away and the tint relaxes back.
    presentation.input.push(InputEvent::CursorPos { x: 10.0, y: 10.0 });
    step(&mut presentation, 1.5);
    let cooled = presentation
        .stage()
        .material(idle_button)
        .map(|m| m.color)
        .unwrap_or_default();
    assert!((cooled - rest).length() < 0.05);
}

#[test]
fn hover_is_suppressed_while_a_transition_plays() {
    let config = PresentationConfig::default();
    let mut presentation = Presentation::new(&config);

    presentation.input.push(center_cursor(&config));
    presentation.update(DT);
    assert_eq!(
        presentation.stage().hover_target(),
        HoverTarget::IdleButton
    );

    presentation.request_activate();
    presentation.input.push(center_cursor(&config));
    presentation.update(DT);
    assert_eq!(presentation.stage().hover_target(), HoverTarget::None);

    step(&mut presentation, 3.0);
    assert_eq!(presentation.state(), UiState::MenuActive);
    presentation.input.push(center_cursor(&config));
    presentation.update(DT);
    assert_ne!(presentation.stage().hover_target(), HoverTarget::None);
}

#[test]
fn cursor_node_trails_the_pointer() {
    let config = PresentationConfig::default();
    let mut presentation = Presentation::new(&config);
    let cursor = presentation.menu().cursor;

    presentation.input.push(center_cursor(&config));
    step(&mut presentation, 1.0);
    let settled = presentation
        .stage()
        .transform(cursor)
        .map(|t| t.translation)
        .unwrap_or_default();
    // Centre of the screen maps to the world origin on the menu plane.
    assert!(settled.length() < 0.05);

    presentation.input.push(InputEvent::CursorPos { x: 100.0, y: 100.0 });
    presentation.update(DT);
    let chasing = presentation
        .stage()
        .transform(cursor)
        .map(|t| t.translation)
        .unwrap_or_default();
    assert!(chasing.length() > 0.1, "one tick moves the cursor part of the way");
    step(&mut presentation, 1.0);
    let caught = presentation
        .stage()
        .transform(cursor)
        .map(|t| t.translation)
        .unwrap_or_default();
    assert!(caught.length() > chasing.length());
}

#[test]
fn click_ripples_spawn_and_clean_up() {
    let config = PresentationConfig::default();
    let mut presentation = Presentation::new(&config);
    presentation.request_activate();
    step(&mut presentation, 3.0);
    assert_eq!(presentation.state(), UiState::MenuActive);
    assert_eq!(ripple_count(&presentation), 0);

    // Click empty space so nothing is dispatched, only the ripple.
    presentation.input.push(InputEvent::CursorPos { x: 60.0, y: 60.0 });
    presentation.update(DT);
    presentation.input.push(InputEvent::MouseButton {
        button: winit::event::MouseButton::Left,
        pressed: true,
    });
    presentation.update(DT);
    assert_eq!(ripple_count(&presentation), 1);
    assert_eq!(presentation.state(), UiState::MenuActive);

    step(&mut presentation, 1.2);
    assert_eq!(ripple_count(&presentation), 0, "finished ripples despawn themselves");
}

#[test]
fn cloud_particles_stay_inside_their_bounds() {
    let mut config = PresentationConfig::default();
    config.particles.count = 40;
    config.particles.bound = 30.0;
    config.particles.max_speed = 0.3;
    let mut presentation = Presentation::new(&config);

    step(&mut presentation, 20.0);

    let stage = presentation.stage();
    let mut drifting = 0usize;
    for entity in stage.world.iter_entities() {
        if !entity.contains::<Drift>() {
            continue;
        }
        drifting += 1;
        if let Some(transform) = entity.get::<Transform3D>() {
            assert!(transform.translation.x.abs() < config.particles.bound + 1.0);
            assert!(transform.translation.z.abs() < config.particles.bound + 1.0);
        }
    }
    assert_eq!(drifting as u32, config.particles.count);
}

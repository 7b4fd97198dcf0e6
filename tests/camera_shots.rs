use glam::Vec3;

use proscenium::camera::{default_shots, Camera3D, ShotSequencer};
use proscenium::config::PresentationConfig;
use proscenium::events::{EventBus, UiEvent};
use proscenium::Presentation;

const DT: f32 = 1.0 / 60.0;

fn test_camera() -> Camera3D {
    Camera3D::new(Vec3::new(12.0, 4.0, 0.0), Vec3::ZERO, 75f32.to_radians(), 0.1, 500.0)
}

#[test]
fn shots_advance_round_robin_and_wrap() {
    let shots = default_shots(0.2);
    let count = shots.len();
    assert_eq!(count, 9);

    let mut camera = test_camera();
    let mut bus = EventBus::default();
    let mut sequencer = ShotSequencer::new(shots, 0.05);
    sequencer.start(&mut camera, &mut bus);

    let mut seen = Vec::new();
    for event in bus.drain() {
        if let UiEvent::ShotStarted { index } = event {
            seen.push(index);
        }
    }
    // Two full laps.
    for _ in 0..(count * 2 * 60) {
        sequencer.tick(DT, &mut camera, &mut bus);
        for event in bus.drain() {
            if let UiEvent::ShotStarted { index } = event {
                seen.push(index);
            }
        }
    }

    assert!(seen.len() > count, "sequencer must wrap past the last shot");
    for (step, index) in seen.iter().enumerate() {
        assert_eq!(*index, step % count);
    }
}

#[test]
fn overlay_covers_the_cut_and_clears_again() {
    let mut camera = test_camera();
    let mut bus = EventBus::default();
    let mut sequencer = ShotSequencer::new(default_shots(0.3), 0.1);
    sequencer.start(&mut camera, &mut bus);
    bus.drain();

    let mut peak = 0.0f32;
    let mut cut_seen = false;
    while sequencer.current_shot() == 0 {
        sequencer.tick(DT, &mut camera, &mut bus);
        peak = peak.max(sequencer.overlay_opacity());
        assert!(sequencer.overlay_opacity() <= 1.0);
        cut_seen |= !bus.drain().is_empty();
    }
    assert!(cut_seen);
    assert!(peak > 0.9, "overlay must reach full black before the cut");

    // Let the fade-in finish and the overlay vanish, before the next
    // travel segment completes and cues another cut.
    for _ in 0..8 {
        sequencer.tick(DT, &mut camera, &mut bus);
    }
    assert_eq!(sequencer.overlay_opacity(), 0.0);
}

#[test]
fn camera_tracks_the_shot_path() {
    let mut camera = test_camera();
    let mut bus = EventBus::default();
    let shots = default_shots(1.0);
    let start = shots[0].start_pos;
    let end = shots[0].end_pos;
    let mut sequencer = ShotSequencer::new(shots, 0.2);
    sequencer.start(&mut camera, &mut bus);
    assert!((camera.position - start).length() < 1e-5);

    for _ in 0..30 {
        sequencer.tick(DT, &mut camera, &mut bus);
    }
    let travelled = (camera.position - start).length();
    let remaining = (camera.position - end).length();
    assert!(travelled > 0.0, "camera must leave the start pose");
    assert!(remaining < (start - end).length(), "camera must head toward the end pose");
}

#[test]
fn presentation_surfaces_shot_cuts_as_events() {
    let mut config = PresentationConfig::default();
    config.shots.travel_secs = 0.4;
    config.shots.fade_secs = 0.05;
    let mut presentation = Presentation::new(&config);

    for _ in 0..120 {
        presentation.update(DT);
    }

    let cuts: Vec<usize> = presentation
        .take_events()
        .into_iter()
        .filter_map(|event| match event {
            UiEvent::ShotStarted { index } => Some(index),
            _ => None,
        })
        .collect();
    assert!(cuts.len() >= 2);
    assert_eq!(cuts[0], 0, "opening shot is announced on the first frame");
    assert_eq!(cuts[1], 1);
    assert_eq!(presentation.current_shot(), *cuts.last().unwrap());
}

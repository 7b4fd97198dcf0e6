use proscenium::config::PresentationConfig;
use proscenium::events::UiEvent;
use proscenium::input::InputEvent;
use proscenium::machine::UiState;
use proscenium::popup::PopupId;
use proscenium::theme::ThemeId;
use proscenium::Presentation;

const DT: f32 = 1.0 / 60.0;

fn step(presentation: &mut Presentation, secs: f32) {
    let ticks = (secs / DT).ceil() as usize;
    for _ in 0..ticks {
        presentation.update(DT);
    }
}

fn short_timers() -> PresentationConfig {
    let mut config = PresentationConfig::default();
    config.timers.inactivity_secs = 2.0;
    config.timers.auto_hide_secs = 1.0;
    config
}

fn settled_menu(presentation: &mut Presentation) {
    presentation.request_activate();
    step(presentation, 3.0);
    assert_eq!(presentation.state(), UiState::MenuActive);
}

#[test]
fn idle_menu_collapses_after_inactivity() {
    let mut presentation = Presentation::new(&short_timers());
    settled_menu(&mut presentation);
    presentation.take_events();

    step(&mut presentation, 2.2);
    assert!(
        presentation.state() == UiState::Idle || presentation.is_animating(),
        "inactivity must kick off the collapse"
    );
    step(&mut presentation, 3.0);
    assert_eq!(presentation.state(), UiState::Idle);
    assert_eq!(presentation.active_theme(), ThemeId::Red);

    let events = presentation.take_events();
    assert!(events
        .iter()
        .any(|event| matches!(event, UiEvent::TimerFired { .. })));
}

#[test]
fn pointer_activity_postpones_the_inactivity_collapse() {
    let mut presentation = Presentation::new(&short_timers());
    settled_menu(&mut presentation);

    // Nudge the pointer every second; the two second deadline never lands.
    for wave in 0..4 {
        presentation.input.push(InputEvent::CursorPos {
            x: 600.0 + wave as f32,
            y: 360.0,
        });
        step(&mut presentation, 1.0);
        assert_eq!(presentation.state(), UiState::MenuActive);
    }

    step(&mut presentation, 2.2);
    step(&mut presentation, 3.0);
    assert_eq!(presentation.state(), UiState::Idle);
}

#[test]
fn inactivity_is_paused_while_a_popup_is_open() {
    let mut presentation = Presentation::new(&short_timers());
    settled_menu(&mut presentation);

    presentation.request_open_popup(PopupId(0));
    step(&mut presentation, 1.5);
    assert_eq!(presentation.state(), UiState::PopupOpen(PopupId(0)));

    // Well past the inactivity deadline; the popup pins the menu state.
    step(&mut presentation, 4.0);
    assert_eq!(presentation.state(), UiState::PopupOpen(PopupId(0)));

    presentation.request_close_popup();
    step(&mut presentation, 1.5);
    assert_eq!(presentation.state(), UiState::MenuActive);

    // Closing re-arms the countdown from scratch.
    step(&mut presentation, 2.2);
    step(&mut presentation, 3.0);
    assert_eq!(presentation.state(), UiState::Idle);
}

#[test]
fn idle_button_hides_and_comes_back_on_interaction() {
    let mut presentation = Presentation::new(&short_timers());
    assert!(presentation.idle_button_visible());

    step(&mut presentation, 1.1);
    step(&mut presentation, 1.0);
    assert!(!presentation.idle_button_visible());
    let idle_group = presentation.menu().idle_group;
    let scale = presentation
        .stage()
        .transform(idle_group)
        .map(|t| t.scale.x)
        .unwrap_or(1.0);
    assert!(scale < 0.05, "button shrinks away when hidden");

    presentation.input.push(InputEvent::CursorPos { x: 500.0, y: 300.0 });
    presentation.update(DT);
    assert!(presentation.idle_button_visible());
    step(&mut presentation, 0.6);
    let scale = presentation
        .stage()
        .transform(idle_group)
        .map(|t| t.scale.x)
        .unwrap_or(0.0);
    assert!((scale - 1.0).abs() < 1e-3, "button grows back after a nudge");
}

#[test]
fn hidden_button_hides_again_without_further_interaction() {
    let mut presentation = Presentation::new(&short_timers());
    step(&mut presentation, 2.1);
    assert!(!presentation.idle_button_visible());

    presentation.input.push(InputEvent::CursorPos { x: 500.0, y: 300.0 });
    step(&mut presentation, 0.5);
    assert!(presentation.idle_button_visible());

    step(&mut presentation, 1.5);
    assert!(!presentation.idle_button_visible(), "auto-hide re-arms after the revival");
}

#[test]
fn activation_swaps_theme_and_recolors_the_stage() {
    let mut presentation = Presentation::new(&PresentationConfig::default());
    let suit = presentation.theme_slots().suit;
    let red_suit = presentation
        .stage()
        .material(suit)
        .map(|m| m.color)
        .unwrap_or_default();

    settled_menu(&mut presentation);
    assert_eq!(presentation.active_theme(), ThemeId::Blue);
    let blue_suit = presentation
        .stage()
        .material(suit)
        .map(|m| m.color)
        .unwrap_or_default();
    assert!(
        (blue_suit - red_suit).length() > 0.05,
        "suit tint must move with the theme"
    );

    presentation.request_deactivate();
    step(&mut presentation, 3.0);
    let back = presentation
        .stage()
        .material(suit)
        .map(|m| m.color)
        .unwrap_or_default();
    assert!((back - red_suit).length() < 1e-3);
}

#[test]
fn click_on_the_idle_button_activates_the_menu() {
    let config = PresentationConfig::default();
    let mut presentation = Presentation::new(&config);

    // Screen centre projects straight onto the idle button.
    let x = config.window.width as f32 / 2.0;
    let y = config.window.height as f32 / 2.0;
    presentation.input.push(InputEvent::CursorPos { x, y });
    presentation.update(DT);
    presentation.input.push(InputEvent::MouseButton {
        button: winit::event::MouseButton::Left,
        pressed: true,
    });
    presentation.update(DT);

    assert!(presentation.is_animating(), "click must launch the activation");
    step(&mut presentation, 3.0);
    assert_eq!(presentation.state(), UiState::MenuActive);
}

use anyhow::{Context, Result};
use glam::Vec3;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes};

use crate::camera::{default_shots, Camera3D, ShotSequencer};
use crate::config::{ConfigOverrides, PresentationConfig};
use crate::content;
use crate::events::UiEvent;
use crate::input::{Input, InputEvent};
use crate::machine::{MachineCtx, PresentationMachine, UiState};
use crate::menu::{hover_test, Carousel, MenuHandles};
use crate::picking::ray_plane_z;
use crate::popup::{PopupHost, PopupId, PopupView};
use crate::stage::{
    DespawnOnFinish, HoverTarget, NodeMaterial, NodeName, NodeTween, StageWorld, Transform3D,
    Visibility,
};
use crate::theme::{ThemeEngine, ThemeId, ThemeSlots};
use crate::time::Time;
use crate::tween::Easing;

mod runtime_loop;
use runtime_loop::RuntimeLoop;

const UI_CAMERA_Z: f32 = 10.0;
const MAX_FRAME_DT: f32 = 0.25;
const RIPPLE_GROW_SECS: f32 = 0.7;
const RIPPLE_FADE_SECS: f32 = 0.6;
const RIPPLE_FADE_DELAY: f32 = 0.2;

/// The whole scene, headless. Owns the stage, the orchestrator and both
/// cameras; a shell feeds it input events and a dt per frame.
pub struct Presentation {
    stage: StageWorld,
    machine: PresentationMachine,
    carousel: Carousel,
    menu: MenuHandles,
    popups: PopupHost,
    theme: ThemeEngine,
    sequencer: ShotSequencer,
    bg_camera: Camera3D,
    ui_camera: Camera3D,
    pub input: Input,
    elapsed: f32,
    viewport: (u32, u32),
    events_out: Vec<UiEvent>,
}

impl Presentation {
    pub fn new(config: &PresentationConfig) -> Self {
        let mut popups = PopupHost::default();
        content::register_default_popups(&mut popups);
        Self::with_popups(config, popups)
    }

    /// Build with a caller-supplied popup registry.
    pub fn with_popups(config: &PresentationConfig, popups: PopupHost) -> Self {
        let mut stage = StageWorld::new();
        let (menu, theme_slots, carousel) = content::build(&mut stage, config, &popups);
        let theme = ThemeEngine::new(theme_slots, config.theme.transition_secs);
        let machine = PresentationMachine::new(
            config.timers.inactivity_secs,
            config.timers.auto_hide_secs,
            0.0,
        );

        let fov = 75f32.to_radians();
        let mut bg_camera = Camera3D::new(Vec3::new(12.0, 4.0, 0.0), Vec3::ZERO, fov, 0.1, 500.0);
        let ui_camera =
            Camera3D::new(Vec3::new(0.0, 0.0, UI_CAMERA_Z), Vec3::ZERO, fov, 0.1, 100.0);
        let mut sequencer = ShotSequencer::new(
            default_shots(config.shots.travel_secs),
            config.shots.fade_secs,
        );
        {
            let bus = stage.world.resource_mut::<crate::events::EventBus>().into_inner();
            sequencer.start(&mut bg_camera, bus);
        }

        Self {
            stage,
            machine,
            carousel,
            menu,
            popups,
            theme,
            sequencer,
            bg_camera,
            ui_camera,
            input: Input::new(),
            elapsed: 0.0,
            viewport: (config.window.width, config.window.height),
            events_out: Vec::new(),
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt;
        self.handle_input();
        {
            let mut ctx = MachineCtx {
                stage: &mut self.stage,
                menu: &self.menu,
                carousel: &mut self.carousel,
                popups: &mut self.popups,
                theme: &mut self.theme,
                now: self.elapsed,
            };
            self.machine.tick(&mut ctx);
        }
        self.stage.update(dt);
        {
            let bus = self.stage.world.resource_mut::<crate::events::EventBus>().into_inner();
            self.sequencer.tick(dt, &mut self.bg_camera, bus);
        }
        self.route_events();
        self.input.clear_frame();
    }

    fn handle_input(&mut self) {
        if let Some(size) = self.input.take_resize() {
            self.viewport = (size.0.max(1), size.1.max(1));
        }
        let pointer = self.input.cursor_ndc(self.viewport).and_then(|ndc| {
            let (origin, dir) = self.ui_camera.ray_from_ndc(ndc, self.viewport)?;
            Some((origin, dir, ray_plane_z(origin, dir, 0.0)))
        });

        // Hover only resolves while the surface is settled outside a popup.
        let hover = match pointer {
            Some((origin, dir, _))
                if !self.machine.is_animating()
                    && !matches!(self.machine.state(), UiState::PopupOpen(_)) =>
            {
                hover_test(&self.stage, &self.menu, &self.carousel, origin, dir)
            }
            _ => HoverTarget::None,
        };
        let pointer_world = pointer.and_then(|(_, _, hit)| hit);
        self.stage.set_hover(hover, pointer_world);

        if self.input.take_interaction() {
            let mut ctx = MachineCtx {
                stage: &mut self.stage,
                menu: &self.menu,
                carousel: &mut self.carousel,
                popups: &mut self.popups,
                theme: &mut self.theme,
                now: self.elapsed,
            };
            self.machine.note_interaction(&mut ctx);
        }

        if self.input.take_left_click() {
            if let Some(position) = pointer_world {
                self.spawn_ripple(position);
            }
            self.dispatch_click(hover);
        }
    }

    fn dispatch_click(&mut self, hover: HoverTarget) {
        let mut ctx = MachineCtx {
            stage: &mut self.stage,
            menu: &self.menu,
            carousel: &mut self.carousel,
            popups: &mut self.popups,
            theme: &mut self.theme,
            now: self.elapsed,
        };
        match self.machine.state() {
            UiState::Idle => {
                if hover == HoverTarget::IdleButton {
                    self.machine.request_activate(&mut ctx);
                }
            }
            UiState::MenuActive => match hover {
                HoverTarget::ArrowLeft => self.machine.request_rotate(&mut ctx, -1),
                HoverTarget::ArrowRight => self.machine.request_rotate(&mut ctx, 1),
                HoverTarget::Slot(index) if index == ctx.carousel.current => {
                    self.machine.request_open_popup(&mut ctx, PopupId(index));
                }
                _ => {}
            },
            UiState::PopupOpen(_) => self.machine.request_close_popup(&mut ctx),
        }
    }

    fn spawn_ripple(&mut self, position: Vec3) {
        let entity = self
            .stage
            .world
            .spawn((
                NodeName("ripple".into()),
                Transform3D {
                    translation: position,
                    scale: Vec3::splat(0.01),
                    ..Transform3D::default()
                },
                NodeMaterial { color: Vec3::ONE, opacity: 0.8 },
                Visibility(true),
                DespawnOnFinish,
            ))
            .id();
        self.stage.begin_tween(
            entity,
            NodeTween::new()
                .rescale(Vec3::splat(0.01), Vec3::splat(20.0), RIPPLE_GROW_SECS, Easing::QuadOut)
                .fade_delayed(0.8, 0.0, RIPPLE_FADE_SECS, Easing::QuadOut, RIPPLE_FADE_DELAY),
        );
    }

    /// Tween completions feed back into the machine until the bus settles;
    /// everything else is kept for the shell.
    fn route_events(&mut self) {
        loop {
            let events = self.stage.drain_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                if let UiEvent::TweenFinished { tag } = event {
                    let mut ctx = MachineCtx {
                        stage: &mut self.stage,
                        menu: &self.menu,
                        carousel: &mut self.carousel,
                        popups: &mut self.popups,
                        theme: &mut self.theme,
                        now: self.elapsed,
                    };
                    self.machine.on_tween_finished(tag, &mut ctx);
                } else {
                    self.events_out.push(event);
                }
            }
        }
    }

    // ---- request passthroughs ----

    pub fn request_activate(&mut self) {
        let mut ctx = MachineCtx {
            stage: &mut self.stage,
            menu: &self.menu,
            carousel: &mut self.carousel,
            popups: &mut self.popups,
            theme: &mut self.theme,
            now: self.elapsed,
        };
        self.machine.request_activate(&mut ctx);
    }

    pub fn request_deactivate(&mut self) {
        let mut ctx = MachineCtx {
            stage: &mut self.stage,
            menu: &self.menu,
            carousel: &mut self.carousel,
            popups: &mut self.popups,
            theme: &mut self.theme,
            now: self.elapsed,
        };
        self.machine.request_deactivate(&mut ctx);
    }

    pub fn request_rotate(&mut self, direction: i32) {
        let mut ctx = MachineCtx {
            stage: &mut self.stage,
            menu: &self.menu,
            carousel: &mut self.carousel,
            popups: &mut self.popups,
            theme: &mut self.theme,
            now: self.elapsed,
        };
        self.machine.request_rotate(&mut ctx, direction);
    }

    pub fn request_open_popup(&mut self, popup: PopupId) {
        let mut ctx = MachineCtx {
            stage: &mut self.stage,
            menu: &self.menu,
            carousel: &mut self.carousel,
            popups: &mut self.popups,
            theme: &mut self.theme,
            now: self.elapsed,
        };
        self.machine.request_open_popup(&mut ctx, popup);
    }

    pub fn request_close_popup(&mut self) {
        let mut ctx = MachineCtx {
            stage: &mut self.stage,
            menu: &self.menu,
            carousel: &mut self.carousel,
            popups: &mut self.popups,
            theme: &mut self.theme,
            now: self.elapsed,
        };
        self.machine.request_close_popup(&mut ctx);
    }

    pub fn request_switch_popup(&mut self, to: PopupId) {
        let mut ctx = MachineCtx {
            stage: &mut self.stage,
            menu: &self.menu,
            carousel: &mut self.carousel,
            popups: &mut self.popups,
            theme: &mut self.theme,
            now: self.elapsed,
        };
        self.machine.request_switch_popup(&mut ctx, to);
    }

    // ---- observers ----

    pub fn state(&self) -> UiState {
        self.machine.state()
    }

    pub fn is_animating(&self) -> bool {
        self.machine.is_animating()
    }

    pub fn idle_button_visible(&self) -> bool {
        self.machine.idle_button_visible()
    }

    pub fn active_theme(&self) -> ThemeId {
        self.theme.active
    }

    pub fn theme_slots(&self) -> ThemeSlots {
        self.theme.slots()
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    pub fn menu(&self) -> &MenuHandles {
        &self.menu
    }

    pub fn stage(&self) -> &StageWorld {
        &self.stage
    }

    pub fn popup_view(&self) -> Option<&PopupView> {
        self.popups.view()
    }

    pub fn popup_id(&self, name: &str) -> Option<PopupId> {
        self.popups.id_by_name(name)
    }

    pub fn current_shot(&self) -> usize {
        self.sequencer.current_shot()
    }

    pub fn overlay_opacity(&self) -> f32 {
        self.sequencer.overlay_opacity()
    }

    pub fn background_camera(&self) -> &Camera3D {
        &self.bg_camera
    }

    pub fn exposure(&self) -> f32 {
        self.stage
            .material(self.menu.exposure)
            .map(|m| m.opacity)
            .unwrap_or(1.2)
    }

    pub fn take_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events_out)
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// Winit shell. Window creation can fail or be absent (CI); the scene keeps
/// ticking either way.
struct App {
    presentation: Presentation,
    runtime: RuntimeLoop,
    window: Option<Window>,
    window_config: crate::config::WindowConfig,
    should_close: bool,
}

impl App {
    fn new(config: PresentationConfig) -> Self {
        let window_config = config.window.clone();
        Self {
            presentation: Presentation::new(&config),
            runtime: RuntimeLoop::new(Time::new(), MAX_FRAME_DT),
            window: None,
            window_config,
            should_close: false,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attributes = WindowAttributes::default()
            .with_title(self.window_config.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.window_config.width,
                self.window_config.height,
            ));
        match event_loop.create_window(attributes) {
            Ok(window) => self.window = Some(window),
            Err(err) => {
                eprintln!("[app] window creation failed: {err:?}");
                self.should_close = true;
            }
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        self.presentation.input.push(InputEvent::from_window_event(&event));
        if matches!(event, WindowEvent::CloseRequested) {
            self.should_close = true;
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_close || self.presentation.input.take_close_requested() {
            event_loop.exit();
            return;
        }
        let (dt, dropped) = self.runtime.tick();
        if let Some(backlog) = dropped {
            eprintln!("[app] dropped {backlog:.2}s of frame backlog");
        }
        self.presentation.update(dt);
        for event in self.presentation.take_events() {
            eprintln!("[app] {event}");
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

pub fn run() -> Result<()> {
    run_with_overrides(ConfigOverrides::default())
}

pub fn run_with_overrides(overrides: ConfigOverrides) -> Result<()> {
    let mut config = PresentationConfig::load_or_default("config/presentation.json");
    config.apply_overrides(&overrides);
    let event_loop = EventLoop::new().context("Failed to create winit event loop")?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app).context("Event loop execution failed")?;
    Ok(())
}

use glam::{Quat, Vec3};

use crate::events::{SequenceTag, UiEvent};
use crate::menu::{Carousel, MenuHandles};
use crate::popup::{PopupHost, PopupId};
use crate::stage::{NodeTween, StageWorld, Transform3D};
use crate::theme::{ThemeEngine, ThemeId};
use crate::time::{TimerKind, TimerRegistry};
use crate::tween::Easing;

const PROXY_SIZE: f32 = 2.2;
const PROXY_FLY_SECS: f32 = 0.8;
const ARROW_POP_SECS: f32 = 0.5;
const SLOT_FADE_SECS: f32 = 0.3;
const ROTATE_SECS: f32 = 1.2;
const LABEL_FADE_SECS: f32 = 0.5;
const LABEL_FADE_DELAY: f32 = 0.7;
const MENU_SHRINK_SCALE: f32 = 0.5;
const PANEL_SECS: f32 = 0.4;
const SWITCH_FADE_SECS: f32 = 0.25;
const BUTTON_TOGGLE_SECS: f32 = 0.5;
const EXPOSURE_FULL: f32 = 1.2;
const EXPOSURE_DIM: f32 = 0.4;
const EXPOSURE_DIM_SECS: f32 = 0.6;
const EXPOSURE_RESTORE_SECS: f32 = 0.8;

/// Committed interaction state. During a transition the machine keeps
/// reporting the state it is leaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    Idle,
    MenuActive,
    PopupOpen(PopupId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransitionKind {
    Activate,
    Deactivate,
    Rotate,
    OpenPopup { popup: PopupId },
    ClosePopup { popup: PopupId },
    SwitchPopup { from: PopupId, to: PopupId },
}

struct InFlight {
    kind: TransitionKind,
    from: UiState,
    to: UiState,
    stage_index: u8,
    pending: usize,
    tag: SequenceTag,
}

enum Phase {
    Settled(UiState),
    Transitioning(InFlight),
}

/// Everything a transition touches besides the machine itself. Borrowed per
/// call so the machine never owns scene state.
pub struct MachineCtx<'a> {
    pub stage: &'a mut StageWorld,
    pub menu: &'a MenuHandles,
    pub carousel: &'a mut Carousel,
    pub popups: &'a mut PopupHost,
    pub theme: &'a mut ThemeEngine,
    /// Seconds since startup, shared with the timer registry.
    pub now: f32,
}

/// The presentation orchestrator. Requests arriving while a transition is in
/// flight, or from the wrong state, are dropped without effect; committed
/// state only changes when the final stage of a choreography reports in.
pub struct PresentationMachine {
    phase: Phase,
    timers: TimerRegistry,
    next_tag: u64,
    idle_button_visible: bool,
    inactivity_secs: f32,
    auto_hide_secs: f32,
}

impl PresentationMachine {
    pub fn new(inactivity_secs: f32, auto_hide_secs: f32, now: f32) -> Self {
        let mut timers = TimerRegistry::new();
        timers.arm(TimerKind::AutoHide, now, auto_hide_secs);
        Self {
            phase: Phase::Settled(UiState::Idle),
            timers,
            next_tag: 0,
            idle_button_visible: true,
            inactivity_secs,
            auto_hide_secs,
        }
    }

    pub fn state(&self) -> UiState {
        match &self.phase {
            Phase::Settled(state) => *state,
            Phase::Transitioning(flight) => flight.from,
        }
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, Phase::Transitioning(_))
    }

    pub fn idle_button_visible(&self) -> bool {
        self.idle_button_visible
    }

    pub fn timer_armed(&self, kind: TimerKind) -> bool {
        self.timers.is_armed(kind)
    }

    fn fresh_tag(&mut self) -> SequenceTag {
        self.next_tag += 1;
        SequenceTag(self.next_tag)
    }

    fn slot_scale() -> Vec3 {
        Vec3::new(3.0 / (PROXY_SIZE / 2.0), 1.0 / (PROXY_SIZE / 2.0), 1.0)
    }

    fn proxy_offsets() -> [Vec3; 4] {
        let w = PROXY_SIZE / 4.0;
        [
            Vec3::new(-w, w, 0.0),
            Vec3::new(w, w, 0.0),
            Vec3::new(-w, -w, 0.0),
            Vec3::new(w, -w, 0.0),
        ]
    }

    // ---- requests ----

    /// Idle -> MenuActive: the idle button shatters into four proxy tiles
    /// that fly onto the ring, then the carousel proper pops in.
    pub fn request_activate(&mut self, ctx: &mut MachineCtx<'_>) {
        if self.is_animating() || self.state() != UiState::Idle {
            return;
        }
        ctx.theme.transition_to(ThemeId::Blue, ctx.stage);
        self.timers.cancel(TimerKind::AutoHide);
        ctx.stage.set_visible(ctx.menu.idle_group, false);

        let tag = self.fresh_tag();
        let offsets = Self::proxy_offsets();
        let count = ctx.menu.proxies.len().min(ctx.carousel.len());
        for (index, proxy) in ctx.menu.proxies.iter().take(count).enumerate() {
            let start = offsets[index];
            ctx.stage.set_transform(*proxy, Transform3D::from_translation(start));
            ctx.stage.set_visible(*proxy, true);
            ctx.stage.begin_tween(
                *proxy,
                NodeTween::new()
                    .tagged(tag)
                    .translate(start, ctx.carousel.slot_position(index), PROXY_FLY_SECS, Easing::QuadInOut)
                    .rotate(
                        Vec3::ZERO,
                        Vec3::new(0.0, ctx.carousel.slot_angle(index), 0.0),
                        PROXY_FLY_SECS,
                        Easing::QuadInOut,
                    )
                    .rescale(Vec3::ONE, Self::slot_scale(), PROXY_FLY_SECS, Easing::QuadInOut),
            );
        }
        self.phase = Phase::Transitioning(InFlight {
            kind: TransitionKind::Activate,
            from: UiState::Idle,
            to: UiState::MenuActive,
            stage_index: 0,
            pending: count,
            tag,
        });
        // No proxies to wait on means the fly-in stage is already over.
        if count == 0 {
            self.advance_stage(ctx);
        }
    }

    /// MenuActive -> Idle: reverse of activation, with the ring snapped back
    /// to the first option before the proxies fly home.
    pub fn request_deactivate(&mut self, ctx: &mut MachineCtx<'_>) {
        if self.is_animating() || self.state() != UiState::MenuActive {
            return;
        }
        ctx.theme.transition_to(ThemeId::Red, ctx.stage);
        self.timers.cancel(TimerKind::Inactivity);
        ctx.carousel.reset();
        self.snap_slot_opacities(ctx);
        if let Some(mut ring) = ctx.stage.transform(ctx.menu.ring) {
            ring.rotation = Quat::IDENTITY;
            ctx.stage.set_transform(ctx.menu.ring, ring);
        }

        let tag = self.fresh_tag();
        let count = ctx.menu.proxies.len().min(ctx.carousel.len());
        let offsets = Self::proxy_offsets();
        for (index, proxy) in ctx.menu.proxies.iter().take(count).enumerate() {
            let start_pos = ctx.carousel.slot_position(index);
            let start_rot = Vec3::new(0.0, ctx.carousel.slot_angle(index), 0.0);
            ctx.stage.set_transform(
                *proxy,
                Transform3D {
                    translation: start_pos,
                    rotation: ctx.carousel.slot_rotation(index),
                    scale: Self::slot_scale(),
                },
            );
            ctx.stage.set_visible(*proxy, true);
            ctx.stage.begin_tween(
                *proxy,
                NodeTween::new()
                    .tagged(tag)
                    .translate(start_pos, offsets[index], PROXY_FLY_SECS, Easing::QuadInOut)
                    .rotate(start_rot, Vec3::ZERO, PROXY_FLY_SECS, Easing::QuadInOut)
                    .rescale(Self::slot_scale(), Vec3::ONE, PROXY_FLY_SECS, Easing::QuadInOut),
            );
        }
        ctx.stage.set_visible(ctx.menu.carousel_group, false);
        self.phase = Phase::Transitioning(InFlight {
            kind: TransitionKind::Deactivate,
            from: UiState::MenuActive,
            to: UiState::Idle,
            stage_index: 0,
            pending: count,
            tag,
        });
        if count == 0 {
            self.advance_stage(ctx);
        }
    }

    /// Spin the ring one option left or right. Selection advances
    /// immediately; the visuals catch up over the spin.
    pub fn request_rotate(&mut self, ctx: &mut MachineCtx<'_>, direction: i32) {
        if self.is_animating() || self.state() != UiState::MenuActive {
            return;
        }
        if ctx.carousel.len() < 2 || direction == 0 {
            return;
        }
        self.timers.arm(TimerKind::Inactivity, ctx.now, self.inactivity_secs);
        let old_angle = ctx.carousel.ring_angle;
        let (old, _delta) = ctx.carousel.step(direction.signum());
        let new = ctx.carousel.current;

        let tag = self.fresh_tag();
        ctx.stage.begin_tween(
            ctx.menu.ring,
            NodeTween::new().tagged(tag).rotate(
                Vec3::new(0.0, old_angle, 0.0),
                Vec3::new(0.0, ctx.carousel.ring_angle, 0.0),
                ROTATE_SECS,
                Easing::QuartInOut,
            ),
        );
        let old_slot = &ctx.menu.slots[old];
        let new_slot = &ctx.menu.slots[new];
        let old_label_start = ctx.stage.material(old_slot.label).map(|m| m.opacity).unwrap_or(1.0);
        ctx.stage.begin_tween(
            old_slot.label,
            NodeTween::new().tagged(tag).fade(old_label_start, 0.0, LABEL_FADE_SECS, Easing::QuadIn),
        );
        let old_rect_start = ctx.stage.material(old_slot.rect).map(|m| m.opacity).unwrap_or(1.0);
        ctx.stage.begin_tween(
            old_slot.rect,
            NodeTween::new().tagged(tag).fade(old_rect_start, 0.55, ROTATE_SECS, Easing::QuadInOut),
        );
        let new_rect_start = ctx.stage.material(new_slot.rect).map(|m| m.opacity).unwrap_or(0.55);
        ctx.stage.begin_tween(
            new_slot.rect,
            NodeTween::new().tagged(tag).fade(new_rect_start, 1.0, ROTATE_SECS, Easing::QuadInOut),
        );
        let new_label_start = ctx.stage.material(new_slot.label).map(|m| m.opacity).unwrap_or(0.0);
        ctx.stage.begin_tween(
            new_slot.label,
            NodeTween::new().tagged(tag).fade_delayed(
                new_label_start,
                1.0,
                LABEL_FADE_SECS,
                Easing::QuadOut,
                LABEL_FADE_DELAY,
            ),
        );
        self.phase = Phase::Transitioning(InFlight {
            kind: TransitionKind::Rotate,
            from: UiState::MenuActive,
            to: UiState::MenuActive,
            stage_index: 1,
            pending: 5,
            tag,
        });
    }

    /// MenuActive -> PopupOpen: the menu shrinks away, then the panel pops
    /// in while the background dims.
    pub fn request_open_popup(&mut self, ctx: &mut MachineCtx<'_>, popup: PopupId) {
        if self.is_animating() || self.state() != UiState::MenuActive {
            return;
        }
        if !ctx.popups.contains(popup) {
            return;
        }
        self.timers.cancel(TimerKind::Inactivity);
        self.drive_exposure(ctx, EXPOSURE_DIM, EXPOSURE_DIM_SECS, Easing::QuadOut);

        let tag = self.fresh_tag();
        let scale = ctx
            .stage
            .transform(ctx.menu.carousel_group)
            .map(|t| t.scale)
            .unwrap_or(Vec3::ONE);
        ctx.stage.begin_tween(
            ctx.menu.carousel_group,
            NodeTween::new().tagged(tag).rescale(
                scale,
                Vec3::splat(MENU_SHRINK_SCALE),
                PANEL_SECS,
                Easing::QuadIn,
            ),
        );
        self.phase = Phase::Transitioning(InFlight {
            kind: TransitionKind::OpenPopup { popup },
            from: UiState::MenuActive,
            to: UiState::PopupOpen(popup),
            stage_index: 0,
            pending: 1,
            tag,
        });
    }

    /// PopupOpen -> MenuActive. The close callback runs before the panel
    /// starts moving, mirroring open which fires after it has settled.
    pub fn request_close_popup(&mut self, ctx: &mut MachineCtx<'_>) {
        if self.is_animating() {
            return;
        }
        let UiState::PopupOpen(popup) = self.state() else {
            return;
        };
        ctx.popups.fire_on_close();

        let tag = self.fresh_tag();
        let opacity = ctx.stage.material(ctx.menu.panel).map(|m| m.opacity).unwrap_or(1.0);
        ctx.stage.begin_tween(
            ctx.menu.panel,
            NodeTween::new()
                .tagged(tag)
                .rescale(panel_scale(ctx), Vec3::splat(0.5), PANEL_SECS, Easing::QuadIn)
                .fade(opacity, 0.0, PANEL_SECS, Easing::QuadIn),
        );
        self.phase = Phase::Transitioning(InFlight {
            kind: TransitionKind::ClosePopup { popup },
            from: UiState::PopupOpen(popup),
            to: UiState::MenuActive,
            stage_index: 0,
            pending: 1,
            tag,
        });
    }

    /// Crossfade the panel content to another popup without going through
    /// the menu.
    pub fn request_switch_popup(&mut self, ctx: &mut MachineCtx<'_>, to: PopupId) {
        if self.is_animating() {
            return;
        }
        let UiState::PopupOpen(from) = self.state() else {
            return;
        };
        if from == to || !ctx.popups.contains(to) {
            return;
        }
        ctx.popups.fire_on_close();

        let tag = self.fresh_tag();
        let opacity = ctx.stage.material(ctx.menu.panel).map(|m| m.opacity).unwrap_or(1.0);
        ctx.stage.begin_tween(
            ctx.menu.panel,
            NodeTween::new().tagged(tag).fade(opacity, 0.0, SWITCH_FADE_SECS, Easing::QuadIn),
        );
        self.phase = Phase::Transitioning(InFlight {
            kind: TransitionKind::SwitchPopup { from, to },
            from: UiState::PopupOpen(from),
            to: UiState::PopupOpen(to),
            stage_index: 0,
            pending: 1,
            tag,
        });
    }

    // ---- per-tick plumbing ----

    /// Any pointer activity. Revives a hidden idle button and pushes the
    /// relevant timer out.
    pub fn note_interaction(&mut self, ctx: &mut MachineCtx<'_>) {
        match self.phase {
            Phase::Settled(UiState::Idle) => {
                if !self.idle_button_visible {
                    let scale = ctx
                        .stage
                        .transform(ctx.menu.idle_group)
                        .map(|t| t.scale)
                        .unwrap_or(Vec3::ZERO);
                    ctx.stage.begin_tween(
                        ctx.menu.idle_group,
                        NodeTween::new().rescale(scale, Vec3::ONE, BUTTON_TOGGLE_SECS, Easing::QuadOut),
                    );
                    self.idle_button_visible = true;
                }
                self.timers.arm(TimerKind::AutoHide, ctx.now, self.auto_hide_secs);
            }
            Phase::Settled(UiState::MenuActive) => {
                self.timers.arm(TimerKind::Inactivity, ctx.now, self.inactivity_secs);
            }
            _ => {}
        }
    }

    /// Poll expired timers. A deactivation blocked by a running animation or
    /// an open popup is dropped; only fresh interaction re-arms it.
    pub fn tick(&mut self, ctx: &mut MachineCtx<'_>) {
        for kind in self.timers.poll(ctx.now) {
            ctx.stage.push_event(UiEvent::TimerFired { kind });
            match kind {
                TimerKind::Inactivity => self.request_deactivate(ctx),
                TimerKind::AutoHide => {
                    if matches!(self.phase, Phase::Settled(UiState::Idle)) && self.idle_button_visible {
                        let scale = ctx
                            .stage
                            .transform(ctx.menu.idle_group)
                            .map(|t| t.scale)
                            .unwrap_or(Vec3::ONE);
                        ctx.stage.begin_tween(
                            ctx.menu.idle_group,
                            NodeTween::new().rescale(scale, Vec3::ZERO, BUTTON_TOGGLE_SECS, Easing::QuadIn),
                        );
                        self.idle_button_visible = false;
                    }
                }
            }
        }
    }

    /// Match a tween completion against the in-flight batch. Stale tags from
    /// replaced tweens fall through harmlessly.
    pub fn on_tween_finished(&mut self, tag: SequenceTag, ctx: &mut MachineCtx<'_>) {
        let Phase::Transitioning(flight) = &mut self.phase else {
            return;
        };
        if flight.tag != tag || flight.pending == 0 {
            return;
        }
        flight.pending -= 1;
        if flight.pending == 0 {
            self.advance_stage(ctx);
        }
    }

    // ---- stage bodies ----

    fn advance_stage(&mut self, ctx: &mut MachineCtx<'_>) {
        let Phase::Transitioning(flight) = &mut self.phase else {
            return;
        };
        let kind = flight.kind;
        let stage_index = flight.stage_index;
        match (kind, stage_index) {
            (TransitionKind::Activate, 0) => self.activate_reveal(ctx),
            (TransitionKind::Deactivate, 0) => self.deactivate_reveal(ctx),
            (TransitionKind::OpenPopup { popup }, 0) => self.open_popup_reveal(ctx, popup),
            (TransitionKind::ClosePopup { .. }, 0) => self.close_popup_reveal(ctx),
            (TransitionKind::SwitchPopup { to, .. }, 0) => self.switch_popup_reveal(ctx, to),
            _ => self.commit(ctx),
        }
    }

    fn begin_stage(&mut self, stage_index: u8, pending: usize, tag: SequenceTag) {
        if let Phase::Transitioning(flight) = &mut self.phase {
            flight.stage_index = stage_index;
            flight.pending = pending;
            flight.tag = tag;
        }
    }

    fn activate_reveal(&mut self, ctx: &mut MachineCtx<'_>) {
        for proxy in ctx.menu.proxies {
            ctx.stage.set_visible(proxy, false);
        }
        ctx.stage.set_visible(ctx.menu.carousel_group, true);
        ctx.stage.set_visible(ctx.menu.ring, true);

        let tag = self.fresh_tag();
        let mut pending = 0;
        for arrow in [ctx.menu.arrow_left, ctx.menu.arrow_right] {
            if let Some(mut transform) = ctx.stage.transform(arrow) {
                transform.scale = Vec3::ZERO;
                ctx.stage.set_transform(arrow, transform);
            }
            ctx.stage.begin_tween(
                arrow,
                NodeTween::new()
                    .tagged(tag)
                    .rescale(Vec3::ZERO, Vec3::ONE, ARROW_POP_SECS, Easing::ElasticOut),
            );
            pending += 1;
        }
        for (index, (rect_target, label_target)) in
            ctx.carousel.opacity_targets().into_iter().enumerate()
        {
            let slot = &ctx.menu.slots[index];
            let rect_start = ctx.stage.material(slot.rect).map(|m| m.opacity).unwrap_or(0.0);
            ctx.stage.begin_tween(
                slot.rect,
                NodeTween::new().tagged(tag).fade(rect_start, rect_target, SLOT_FADE_SECS, Easing::Linear),
            );
            let label_start = ctx.stage.material(slot.label).map(|m| m.opacity).unwrap_or(0.0);
            ctx.stage.begin_tween(
                slot.label,
                NodeTween::new().tagged(tag).fade(label_start, label_target, SLOT_FADE_SECS, Easing::Linear),
            );
            pending += 2;
        }
        self.begin_stage(1, pending, tag);
    }

    fn deactivate_reveal(&mut self, ctx: &mut MachineCtx<'_>) {
        for proxy in ctx.menu.proxies {
            ctx.stage.set_visible(proxy, false);
        }
        ctx.stage.set_visible(ctx.menu.idle_group, true);
        if let Some(mut transform) = ctx.stage.transform(ctx.menu.idle_group) {
            transform.scale = Vec3::ONE;
            ctx.stage.set_transform(ctx.menu.idle_group, transform);
        }
        if let Some(mut material) = ctx.stage.material(ctx.menu.idle_label) {
            material.opacity = 0.0;
            ctx.stage.set_material(ctx.menu.idle_label, material);
        }
        let tag = self.fresh_tag();
        ctx.stage.begin_tween(
            ctx.menu.idle_label,
            NodeTween::new().tagged(tag).fade(0.0, 1.0, LABEL_FADE_SECS, Easing::Linear),
        );
        self.idle_button_visible = true;
        self.begin_stage(1, 1, tag);
    }

    fn open_popup_reveal(&mut self, ctx: &mut MachineCtx<'_>, popup: PopupId) {
        ctx.stage.set_visible(ctx.menu.carousel_group, false);
        if ctx.popups.mount(popup).is_err() {
            // Mount can only fail on a stale handle; fall back to the menu.
            eprintln!("[machine] popup mount failed, aborting open");
            ctx.stage.set_visible(ctx.menu.carousel_group, true);
            self.restore_menu_scale(ctx);
            self.phase = Phase::Settled(UiState::MenuActive);
            self.timers.arm(TimerKind::Inactivity, ctx.now, self.inactivity_secs);
            return;
        }
        ctx.stage.set_transform(
            ctx.menu.panel,
            Transform3D { scale: Vec3::splat(0.5), ..Transform3D::default() },
        );
        if let Some(mut material) = ctx.stage.material(ctx.menu.panel) {
            material.opacity = 0.0;
            ctx.stage.set_material(ctx.menu.panel, material);
        }
        ctx.stage.set_visible(ctx.menu.panel, true);
        let tag = self.fresh_tag();
        ctx.stage.begin_tween(
            ctx.menu.panel,
            NodeTween::new()
                .tagged(tag)
                .rescale(Vec3::splat(0.5), Vec3::ONE, PANEL_SECS, Easing::QuadOut)
                .fade(0.0, 1.0, PANEL_SECS, Easing::QuadOut),
        );
        self.begin_stage(1, 1, tag);
    }

    fn close_popup_reveal(&mut self, ctx: &mut MachineCtx<'_>) {
        ctx.stage.set_visible(ctx.menu.panel, false);
        ctx.popups.unmount();
        ctx.stage.set_visible(ctx.menu.carousel_group, true);
        self.drive_exposure(ctx, EXPOSURE_FULL, EXPOSURE_RESTORE_SECS, Easing::QuadInOut);

        let tag = self.fresh_tag();
        let scale = ctx
            .stage
            .transform(ctx.menu.carousel_group)
            .map(|t| t.scale)
            .unwrap_or(Vec3::splat(MENU_SHRINK_SCALE));
        ctx.stage.begin_tween(
            ctx.menu.carousel_group,
            NodeTween::new().tagged(tag).rescale(scale, Vec3::ONE, PANEL_SECS, Easing::QuadOut),
        );
        self.begin_stage(1, 1, tag);
    }

    fn switch_popup_reveal(&mut self, ctx: &mut MachineCtx<'_>, to: PopupId) {
        ctx.popups.unmount();
        if ctx.popups.mount(to).is_err() {
            eprintln!("[machine] popup mount failed, closing panel");
            ctx.stage.set_visible(ctx.menu.panel, false);
            ctx.stage.set_visible(ctx.menu.carousel_group, true);
            self.restore_menu_scale(ctx);
            self.drive_exposure(ctx, EXPOSURE_FULL, EXPOSURE_RESTORE_SECS, Easing::QuadInOut);
            self.phase = Phase::Settled(UiState::MenuActive);
            self.timers.arm(TimerKind::Inactivity, ctx.now, self.inactivity_secs);
            return;
        }
        // The incoming popup's content goes live before its fade-in.
        ctx.popups.fire_on_open();
        let tag = self.fresh_tag();
        ctx.stage.begin_tween(
            ctx.menu.panel,
            NodeTween::new().tagged(tag).fade(0.0, 1.0, SWITCH_FADE_SECS, Easing::QuadOut),
        );
        self.begin_stage(1, 1, tag);
    }

    fn commit(&mut self, ctx: &mut MachineCtx<'_>) {
        let Phase::Transitioning(flight) = &self.phase else {
            return;
        };
        let kind = flight.kind;
        let from = flight.from;
        let to = flight.to;
        self.phase = Phase::Settled(to);
        match kind {
            TransitionKind::Activate => {
                self.timers.arm(TimerKind::Inactivity, ctx.now, self.inactivity_secs);
            }
            TransitionKind::Deactivate => {
                self.timers.arm(TimerKind::AutoHide, ctx.now, self.auto_hide_secs);
            }
            TransitionKind::Rotate => {}
            TransitionKind::OpenPopup { popup } => {
                ctx.popups.fire_on_open();
                ctx.stage.push_event(UiEvent::PopupOpened { popup });
            }
            TransitionKind::ClosePopup { popup } => {
                self.timers.arm(TimerKind::Inactivity, ctx.now, self.inactivity_secs);
                ctx.stage.push_event(UiEvent::PopupClosed { popup });
            }
            TransitionKind::SwitchPopup { from, to } => {
                ctx.stage.push_event(UiEvent::PopupSwitched { from, to });
            }
        }
        if from != to {
            ctx.stage.push_event(UiEvent::StateChanged { from, to });
        }
    }

    // ---- helpers ----

    fn snap_slot_opacities(&mut self, ctx: &mut MachineCtx<'_>) {
        for (index, (rect_target, label_target)) in
            ctx.carousel.opacity_targets().into_iter().enumerate()
        {
            let slot = &ctx.menu.slots[index];
            if let Some(mut material) = ctx.stage.material(slot.rect) {
                material.opacity = rect_target;
                ctx.stage.set_material(slot.rect, material);
            }
            if let Some(mut material) = ctx.stage.material(slot.label) {
                material.opacity = label_target;
                ctx.stage.set_material(slot.label, material);
            }
        }
    }

    fn restore_menu_scale(&mut self, ctx: &mut MachineCtx<'_>) {
        if let Some(mut transform) = ctx.stage.transform(ctx.menu.carousel_group) {
            transform.scale = Vec3::ONE;
            ctx.stage.set_transform(ctx.menu.carousel_group, transform);
        }
    }

    /// Tone-mapping exposure rides on the panel backdrop's material so the
    /// tween driver can animate it like any other channel.
    fn drive_exposure(&mut self, ctx: &mut MachineCtx<'_>, target: f32, secs: f32, easing: Easing) {
        let start = ctx
            .stage
            .material(ctx.menu.exposure)
            .map(|m| m.opacity)
            .unwrap_or(EXPOSURE_FULL);
        ctx.stage.begin_tween(
            ctx.menu.exposure,
            NodeTween::new().fade(start, target, secs, easing),
        );
    }
}

fn panel_scale(ctx: &MachineCtx<'_>) -> Vec3 {
    ctx.stage
        .transform(ctx.menu.panel)
        .map(|t| t.scale)
        .unwrap_or(Vec3::ONE)
}

use crate::events::{EventBus, UiEvent};
use crate::tween::{Easing, Tween};
use glam::{Mat4, Vec2, Vec3, Vec4};

const DEFAULT_UP: Vec3 = Vec3::Y;

/// Perspective camera for the background vignette and the foreground menu.
/// `roll` is the dutch angle: a static offset applied once when a shot starts,
/// never tweened.
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
    pub roll: f32,
}

impl Camera3D {
    pub fn new(position: Vec3, target: Vec3, fov_y_radians: f32, near: f32, far: f32) -> Self {
        Self { position, target, up: DEFAULT_UP, fov_y_radians, near, far, roll: 0.0 }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_z(self.roll) * Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_radians, aspect.max(0.0001), self.near, self.far)
    }

    pub fn view_projection(&self, viewport: (u32, u32)) -> Mat4 {
        self.projection_matrix(aspect_of(viewport)) * self.view_matrix()
    }

    /// World-space ray from the camera through a normalized-device-coordinate
    /// position (x right, y up, both in [-1, 1]).
    pub fn ray_from_ndc(&self, ndc: Vec2, viewport: (u32, u32)) -> Option<(Vec3, Vec3)> {
        if viewport.0 == 0 || viewport.1 == 0 {
            return None;
        }
        let clip = Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let inv_view_proj = self.view_projection(viewport).inverse();
        let world = inv_view_proj * clip;
        if world.w.abs() < f32::EPSILON {
            return None;
        }
        let toward = (world.truncate() / world.w) - self.position;
        if toward.length_squared() <= f32::EPSILON {
            return None;
        }
        Some((self.position, toward.normalize()))
    }
}

fn aspect_of(viewport: (u32, u32)) -> f32 {
    if viewport.1 > 0 {
        viewport.0 as f32 / viewport.1 as f32
    } else {
        1.0
    }
}

/// One camera movement segment: fixed start/end pose, fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct CameraShot {
    pub start_pos: Vec3,
    pub end_pos: Vec3,
    pub start_target: Vec3,
    pub end_target: Vec3,
    pub duration: f32,
    pub dutch_angle: f32,
}

impl CameraShot {
    pub fn new(start_pos: Vec3, end_pos: Vec3, start_target: Vec3, end_target: Vec3, duration: f32) -> Self {
        Self { start_pos, end_pos, start_target, end_target, duration, dutch_angle: 0.0 }
    }

    pub fn with_dutch_angle(mut self, angle: f32) -> Self {
        self.dutch_angle = angle;
        self
    }
}

/// The shipped cinematography: a cycle of nine shots orbiting the character
/// and the microphone stand.
pub fn default_shots(travel_secs: f32) -> Vec<CameraShot> {
    let head = Vec3::new(-1.5, 2.5, 0.0);
    let body = Vec3::new(-1.5, 1.8, 0.0);
    let mic = Vec3::new(0.0, 2.5, 0.0);
    let d = travel_secs;
    vec![
        CameraShot::new(Vec3::new(12.0, 4.0, 0.0), Vec3::new(5.0, 3.0, 0.0), body, body, d),
        CameraShot::new(Vec3::new(-8.0, 7.0, -8.0), Vec3::new(-5.0, 5.0, -5.0), head, head, d),
        CameraShot::new(Vec3::new(-1.5, 2.2, 3.0), Vec3::new(0.5, 2.2, 3.0), head, head, d),
        CameraShot::new(Vec3::new(-5.0, 2.2, -6.0), Vec3::new(2.0, 2.2, -6.0), body, body, d),
        CameraShot::new(Vec3::new(0.0, 1.0, -8.0), Vec3::new(0.0, 1.5, -4.0), body, body, d),
        CameraShot::new(Vec3::new(3.0, 2.5, 3.0), Vec3::new(3.0, 2.5, 3.0), mic, head, d),
        CameraShot::new(Vec3::new(5.0, 2.5, -5.0), Vec3::new(-5.0, 2.5, -5.0), body, body, d)
            .with_dutch_angle(0.2),
        CameraShot::new(Vec3::new(-0.5, 2.0, 2.5), Vec3::new(-8.0, 4.0, 8.0), head, body, d),
        CameraShot::new(Vec3::new(0.0, 12.0, 0.0), Vec3::new(0.0, 7.0, 0.0), body, body, d),
    ]
}

#[derive(Debug, Clone, Copy)]
enum OverlayFade {
    Clear,
    Out(Tween<f32>),
    In(Tween<f32>),
}

/// Perpetual, self-re-arming shot cycle. Each shot travels position and
/// look-at target in parallel; on arrival the overlay fades to opaque, the
/// next shot is cued round-robin, and the overlay fades back while the new
/// travel is already underway. Runs independently of the foreground state
/// machine: the two animate disjoint scene subtrees.
pub struct ShotSequencer {
    shots: Vec<CameraShot>,
    index: usize,
    travel_pos: Tween<Vec3>,
    travel_target: Tween<Vec3>,
    fade: OverlayFade,
    overlay: f32,
    fade_secs: f32,
}

impl ShotSequencer {
    pub fn new(shots: Vec<CameraShot>, fade_secs: f32) -> Self {
        Self {
            shots,
            index: 0,
            travel_pos: Tween::new(Vec3::ZERO, Vec3::ZERO, 0.0, Easing::QuadInOut),
            travel_target: Tween::new(Vec3::ZERO, Vec3::ZERO, 0.0, Easing::QuadInOut),
            fade: OverlayFade::Clear,
            overlay: 0.0,
            fade_secs: fade_secs.max(0.0),
        }
    }

    pub fn current_shot(&self) -> usize {
        self.index
    }

    pub fn shot_count(&self) -> usize {
        self.shots.len()
    }

    /// Fraction of the full-screen overlay currently opaque, in [0, 1].
    pub fn overlay_opacity(&self) -> f32 {
        self.overlay
    }

    pub fn start(&mut self, camera: &mut Camera3D, bus: &mut EventBus) {
        if self.shots.is_empty() {
            return;
        }
        self.index = 0;
        self.play_shot(camera, bus);
    }

    fn play_shot(&mut self, camera: &mut Camera3D, bus: &mut EventBus) {
        let shot = self.shots[self.index];
        camera.position = shot.start_pos;
        camera.target = shot.start_target;
        camera.roll = shot.dutch_angle;
        self.travel_pos = Tween::new(shot.start_pos, shot.end_pos, shot.duration, Easing::QuadInOut);
        self.travel_target =
            Tween::new(shot.start_target, shot.end_target, shot.duration, Easing::QuadInOut);
        bus.push(UiEvent::ShotStarted { index: self.index });
    }

    pub fn tick(&mut self, dt: f32, camera: &mut Camera3D, bus: &mut EventBus) {
        if self.shots.is_empty() {
            return;
        }
        camera.position = self.travel_pos.advance(dt);
        camera.target = self.travel_target.advance(dt);

        if self.travel_target.finished() && matches!(self.fade, OverlayFade::Clear) {
            self.fade = OverlayFade::Out(Tween::new(0.0, 1.0, self.fade_secs, Easing::QuadOut));
        }

        match &mut self.fade {
            OverlayFade::Clear => {}
            OverlayFade::Out(tween) => {
                self.overlay = tween.advance(dt);
                if tween.finished() {
                    self.index = (self.index + 1) % self.shots.len();
                    self.play_shot(camera, bus);
                    self.fade = OverlayFade::In(Tween::new(1.0, 0.0, self.fade_secs, Easing::QuadIn));
                }
            }
            OverlayFade::In(tween) => {
                self.overlay = tween.advance(dt);
                if tween.finished() {
                    self.fade = OverlayFade::Clear;
                }
            }
        }
    }
}

use glam::{Quat, Vec3};

/// Easing curves used by the presentation. The set matches what the shipped
/// choreography actually reaches for; anything else would be dead weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    QuartInOut,
    BackOut,
    ElasticOut,
}

impl Easing {
    /// Maps normalized progress to an eased value. Input is clamped to [0, 1];
    /// `BackOut` and `ElasticOut` intentionally overshoot past 1 in between.
    pub fn eval(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::QuartInOut => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Easing::BackOut => {
                const C1: f32 = 1.70158;
                const C3: f32 = C1 + 1.0;
                1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
            }
            Easing::ElasticOut => {
                const PERIOD: f32 = 0.75;
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    let omega = std::f32::consts::TAU / PERIOD;
                    2.0f32.powf(-10.0 * t) * ((t - PERIOD / 4.0) * omega).sin() + 1.0
                }
            }
        }
    }
}

/// Value types a tween can interpolate.
pub trait Animated: Copy {
    fn mix(start: Self, end: Self, t: f32) -> Self;
}

impl Animated for f32 {
    fn mix(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }
}

impl Animated for Vec3 {
    fn mix(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

impl Animated for Quat {
    fn mix(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t).normalize()
    }
}

/// A time-bounded interpolation polled by the tick loop. There is no blocking
/// wait anywhere: the tween records how much time it has consumed and is
/// sampled whenever the loop advances it. A zero-duration tween completes on
/// its first advance. An optional delay is consumed before progress starts,
/// which is how staggered timeline offsets are expressed.
#[derive(Debug, Clone, Copy)]
pub struct Tween<T: Animated> {
    pub start: T,
    pub end: T,
    pub duration: f32,
    pub easing: Easing,
    delay: f32,
    elapsed: f32,
}

impl<T: Animated> Tween<T> {
    pub fn new(start: T, end: T, duration: f32, easing: Easing) -> Self {
        Self { start, end, duration: duration.max(0.0), easing, delay: 0.0, elapsed: 0.0 }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    /// Consumes `dt` and returns the current value. Delay is eaten first;
    /// leftover time in the same tick rolls into progress.
    pub fn advance(&mut self, dt: f32) -> T {
        let mut dt = dt.max(0.0);
        if self.delay > 0.0 {
            if dt < self.delay {
                self.delay -= dt;
                return self.sample();
            }
            dt -= self.delay;
            self.delay = 0.0;
        }
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.sample()
    }

    pub fn sample(&self) -> T {
        if self.delay > 0.0 && self.elapsed == 0.0 {
            return self.start;
        }
        if self.duration <= 0.0 {
            return self.end;
        }
        let t = self.easing.eval(self.elapsed / self.duration);
        T::mix(self.start, self.end, t)
    }

    pub fn finished(&self) -> bool {
        self.delay <= 0.0 && self.elapsed >= self.duration
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }
}

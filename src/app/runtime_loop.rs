use crate::time::Time;

/// Variable-step frame pacing with a backlog clamp: after a stall the scene
/// resumes smoothly instead of replaying the missed time in one jump.
pub(crate) struct RuntimeLoop {
    time: Time,
    max_dt: f32,
}

impl RuntimeLoop {
    pub(crate) fn new(time: Time, max_dt: f32) -> Self {
        Self { time, max_dt }
    }

    /// Returns (frame dt, dropped backlog if the clamp engaged).
    pub(crate) fn tick(&mut self) -> (f32, Option<f32>) {
        self.time.tick();
        let dt = self.time.delta_seconds();
        if dt > self.max_dt {
            (self.max_dt, Some(dt - self.max_dt))
        } else {
            (dt, None)
        }
    }
}

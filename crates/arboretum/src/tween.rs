use crate::easing::Easing;
use arboretum_layout::{Point, Tile, ViewFrame, point, tile};

/// Geometry that can be interpolated between two states.
pub trait Tween: Copy {
    fn lerp(self, to: Self, t: f64) -> Self;
}

fn mix(a: f64, b: f64, t: f64) -> f64 {
    (b - a).mul_add(t, a)
}

impl Tween for f64 {
    fn lerp(self, to: Self, t: f64) -> Self {
        mix(self, to, t)
    }
}

impl Tween for Point {
    fn lerp(self, to: Self, t: f64) -> Self {
        point(mix(self.x, to.x, t), mix(self.y, to.y, t))
    }
}

impl Tween for Tile {
    fn lerp(self, to: Self, t: f64) -> Self {
        let min = self.min.lerp(to.min, t);
        let max = self.max.lerp(to.max, t);
        tile(min.x, min.y, max.x, max.y)
    }
}

impl Tween for ViewFrame {
    fn lerp(self, to: Self, t: f64) -> Self {
        ViewFrame::new(
            mix(self.x, to.x, t),
            mix(self.y, to.y, t),
            mix(self.width, to.width, t),
            mix(self.height, to.height, t),
        )
    }
}

/// A timed move from one geometry to another. Time is in milliseconds on the caller's clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition<G> {
    from: G,
    to: G,
    start: f64,
    duration: f64,
    easing: Easing,
}

impl<G: Tween> Transition<G> {
    pub fn new(from: G, to: G, start: f64, duration: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            easing,
        }
    }

    /// Already at rest on `value`.
    pub fn settled(value: G) -> Self {
        Self::new(value, value, 0.0, 0.0, Easing::Linear)
    }

    pub fn sample(&self, now: f64) -> G {
        if self.duration <= 0.0 || now >= self.start + self.duration {
            return self.to;
        }
        if now <= self.start {
            return self.from;
        }
        let t = self.easing.apply((now - self.start) / self.duration);
        self.from.lerp(self.to, t)
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.duration <= 0.0 || now >= self.start + self.duration
    }

    pub fn origin(&self) -> G {
        self.from
    }

    /// Restarts toward `to` from wherever the transition is at `now`.
    pub fn retarget(&mut self, to: G, now: f64, duration: f64, easing: Easing) {
        self.from = self.sample(now);
        self.to = to;
        self.start = now;
        self.duration = duration;
        self.easing = easing;
    }
}

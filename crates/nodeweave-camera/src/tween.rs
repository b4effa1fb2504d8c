//! Minimal easing and tween primitive advanced once per frame.

use nodeweave_core::Vec3;

/// Easing curve mapping linear progress to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Fast start, gentle arrival.
    #[default]
    EaseOutCubic,
    EaseInOutQuad,
}

impl Easing {
    /// Apply the curve to `t` in [0, 1].
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Values a tween can interpolate.
pub trait Lerp: Copy {
    fn lerp_to(self, end: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp_to(self, end: Self, t: f64) -> Self {
        self + (end - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp_to(self, end: Self, t: f64) -> Self {
        self.lerp(end, t)
    }
}

/// Explicit interpolation state from `start` to `end` over `duration` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T: Lerp> {
    start: T,
    end: T,
    elapsed: f64,
    duration: f64,
    easing: Easing,
}

impl<T: Lerp> Tween<T> {
    pub fn new(start: T, end: T, duration: f64, easing: Easing) -> Self {
        Self {
            start,
            end,
            elapsed: 0.0,
            duration: duration.max(0.0),
            easing,
        }
    }

    /// Advance by `dt` seconds and return the new value.
    pub fn advance(&mut self, dt: f64) -> T {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.value()
    }

    /// Current value; exactly `end` once finished.
    pub fn value(&self) -> T {
        if self.is_finished() {
            self.end
        } else {
            self.start.lerp_to(self.end, self.easing.apply(self.elapsed / self.duration))
        }
    }

    /// Linear progress in [0, 1].
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn end(&self) -> T {
        self.end
    }
}

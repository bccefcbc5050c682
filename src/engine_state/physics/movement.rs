//! Direction input to displacement.

use std::f32::consts::FRAC_1_SQRT_2;

use cgmath::{Vector2, Zero};

/// Raw direction input for one frame. Each axis is `-1`, `0` or `1`; screen space, so
/// positive `y` is down.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MovementIntent {
    pub x: i8,
    pub y: i8,
}

impl MovementIntent {
    /// Builds an intent from held direction keys. Opposite keys cancel out.
    pub fn from_keys(left: bool, right: bool, up: bool, down: bool) -> Self {
        MovementIntent {
            x: right as i8 - left as i8,
            y: down as i8 - up as i8,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Unit-speed direction. Diagonals are scaled by `1/√2` on each axis so moving
    /// diagonally is no faster than moving along one axis.
    pub fn direction(&self) -> Vector2<f32> {
        let x = self.x.signum() as f32;
        let y = self.y.signum() as f32;
        if x != 0.0 && y != 0.0 {
            Vector2::new(x * FRAC_1_SQRT_2, y * FRAC_1_SQRT_2)
        } else {
            Vector2::new(x, y)
        }
    }

    /// Displacement for one frame.
    ///
    /// # Arguments
    /// * `speed` - World units per second
    /// * `dt` - Frame time in seconds; negative or non-finite values move nothing
    pub fn displacement(&self, speed: f32, dt: f32) -> Vector2<f32> {
        if !dt.is_finite() || dt <= 0.0 || !speed.is_finite() {
            return Vector2::zero();
        }
        self.direction() * speed * dt
    }
}

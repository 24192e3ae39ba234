//! Column resize drag session.
//!
//! A drag on a column's resize handle is `begin` on pointer-down, one sample
//! per pointer-move, and `end` on pointer-up. Only one drag is active at a
//! time. Pointer coordinates are viewport pixels.

use crate::config::GridConfig;

/// State captured when a resize drag starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSession {
    pub col: usize,
    /// Column width when the drag began
    pub start_width: u32,
    /// Pointer x when the drag began
    pub start_x: f32,
}

impl ResizeSession {
    pub fn new(col: usize, start_width: u32, start_x: f32) -> Self {
        Self {
            col,
            start_width,
            start_x,
        }
    }

    /// Width for a pointer at `pointer_x`: the start width plus the distance
    /// moved, never below the configured minimum.
    pub fn width_at(&self, pointer_x: f32, config: &GridConfig) -> u32 {
        let target = f64::from(self.start_width) + f64::from(pointer_x - self.start_x);
        config.clamp_width(f64_to_u32_clamped(target.round()))
    }
}

/// Safely convert f64 to u32 with clamping.
/// NaN maps to 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn f64_to_u32_clamped(v: f64) -> u32 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, f64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_follows_pointer() {
        let session = ResizeSession::new(0, 100, 200.0);
        let config = GridConfig::default();
        assert_eq!(session.width_at(250.0, &config), 150);
        assert_eq!(session.width_at(180.4, &config), 80);
    }

    #[test]
    fn test_width_floor() {
        let session = ResizeSession::new(2, 100, 200.0);
        let config = GridConfig::default();
        assert_eq!(session.width_at(110.0, &config), 30);
        assert_eq!(session.width_at(-5000.0, &config), 30);
        assert_eq!(session.width_at(f32::NAN, &config), 30);
    }
}

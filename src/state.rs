use druid::im::Vector;
use druid::Data;

use crate::physics;

/// Gravitational acceleration in m/s^2.
pub const GRAVITY: f64 = 9.81;

/// One pendulum as configured by the caller. Immutable within a frame;
/// the whole set may be swapped between frames.
#[derive(Clone, Data)]
pub struct PendulumConfig {
    /// Unique identifier
    pub id: u32,
    /// String length in meters
    pub length: f64,
    /// Bob mass in kilograms
    pub mass: f64,
    /// Hex color string, e.g. "#3b82f6"
    pub color: String,
    /// Display label
    pub label: String,
}

/// Application state
#[derive(Clone, Data)]
pub struct AppState {
    /// Suspension drop in meters; kept inside 0 < height < min(length)
    pub height: f64,
    /// Whether the simulation clock advances
    pub is_playing: bool,
    /// sqrt(g/height), recomputed whenever height changes
    pub angular_velocity: f64,
    /// Active pendulums (1 to 3)
    pub pendulums: Vector<PendulumConfig>,
    /// Enable debug overlay
    pub debug: bool,
}

impl AppState {
    pub fn new(height: f64, pendulums: Vector<PendulumConfig>, is_playing: bool) -> Self {
        AppState {
            height,
            is_playing,
            angular_velocity: physics::angular_velocity(GRAVITY, height),
            pendulums,
            debug: false,
        }
    }

    /// Shortest configured string length, or None when no pendulums are active.
    pub fn min_length(&self) -> Option<f64> {
        self.pendulums
            .iter()
            .map(|p| p.length)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Set a new suspension height, keeping it inside the caller contract
    /// and recomputing the angular velocity.
    pub fn set_height(&mut self, height: f64) {
        let upper = self.min_length().unwrap_or(f64::MAX) - 0.05;
        self.height = height.clamp(0.05, upper.max(0.05));
        self.angular_velocity = physics::angular_velocity(GRAVITY, self.height);
    }
}

/// The three built-in pendulum presets.
pub fn presets() -> Vector<PendulumConfig> {
    Vector::from(vec![
        PendulumConfig {
            id: 1,
            length: 2.0,
            mass: 1.0,
            color: "#3b82f6".into(),
            label: "Blue".into(),
        },
        PendulumConfig {
            id: 2,
            length: 1.5,
            mass: 2.0,
            color: "#ef4444".into(),
            label: "Red".into(),
        },
        PendulumConfig {
            id: 3,
            length: 1.8,
            mass: 0.5,
            color: "#22c55e".into(),
            label: "Green".into(),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn set_height_recomputes_angular_velocity() {
        let mut state = AppState::new(1.2, presets(), true);
        state.set_height(1.0);
        assert_abs_diff_eq!(state.angular_velocity, (GRAVITY / 1.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn set_height_stays_below_shortest_string() {
        let mut state = AppState::new(1.2, presets(), true);
        state.set_height(10.0);
        assert!(state.height < 1.5);
    }
}

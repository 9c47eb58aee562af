//! Conical pendulum relations. All functions are pure; the render path
//! calls them fresh each frame from the latest shared inputs.

/// Radius of the horizontal circle traced by the bob.
///
/// A pendulum whose string is no longer than the suspension drop has no
/// circle to trace; the radicand is clamped so the bob collapses onto the
/// axis instead of producing NaN.
pub fn cone_radius(length: f64, height: f64) -> f64 {
    (length * length - height * height).max(0.0).sqrt()
}

/// Phase angle after `time` seconds at `angular_velocity` rad/s.
///
/// No modulo reduction: the trig consumers wrap correctly, and the raw
/// angle is useful for display.
pub fn phase_angle(angular_velocity: f64, time: f64) -> f64 {
    angular_velocity * time
}

/// Angular velocity of a conical pendulum, sqrt(g/h). Independent of mass
/// and string length. Used by the callers that own `height`; the render
/// path always takes the precomputed value as given.
pub fn angular_velocity(gravity: f64, height: f64) -> f64 {
    (gravity / height).sqrt()
}

/// Bob position in the right-handed world frame: Y is the drop axis and
/// the support point is the origin.
pub fn bob_position(radius: f64, height: f64, angle: f64) -> [f64; 3] {
    [radius * angle.cos(), height, radius * angle.sin()]
}

/// Centripetal force magnitude, m * omega^2 * r.
pub fn centripetal_force(mass: f64, angular_velocity: f64, radius: f64) -> f64 {
    mass * angular_velocity * angular_velocity * radius
}

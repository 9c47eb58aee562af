//! Per-frame scene composition: world-space physics state in, a
//! depth-sorted list of projected renderable objects out.

use druid::kurbo::{Point, Size};
use druid::Color;

use crate::camera::{Camera, Projected};
use crate::physics;
use crate::state::{AppState, GRAVITY};

/// Angular step for sampling orbit trails, in radians.
const ORBIT_STEP: f64 = 0.1;
/// Bob visual radius is BOB_BASE_SIZE + mass * BOB_MASS_SIZE pixels,
/// before the perspective scale factor.
const BOB_BASE_SIZE: f64 = 12.0;
const BOB_MASS_SIZE: f64 = 4.0;
/// Newtons to world meters for the force overlay, keeping arrow lengths
/// legible regardless of physical magnitudes.
const FORCE_SCALE: f64 = 0.05;
/// Below this horizontal distance to the axis the force overlay is
/// skipped rather than normalizing a near-zero direction.
const AXIS_EPSILON: f64 = 1e-3;

pub const BACKGROUND: Color = Color::rgb8(0x02, 0x06, 0x17);
pub const AXIS_COLOR: Color = Color::rgb8(0x33, 0x41, 0x55);
pub const SUPPORT_COLOR: Color = Color::rgb8(0x94, 0xa3, 0xb8);
pub const STRING_COLOR: Color = Color::rgb8(0xcb, 0xd5, 0xe1);
const GRAVITY_COLOR: Color = Color::rgb8(0x3b, 0x82, 0xf6);
const VERTICAL_COLOR: Color = Color::rgb8(0xa7, 0x8b, 0xfa);
const CENTRIPETAL_COLOR: Color = Color::rgb8(0xea, 0xb3, 0x08);
const TENSION_COLOR: Color = Color::rgb8(0xef, 0x44, 0x44);
pub const GUIDE_COLOR: Color = SUPPORT_COLOR;

/// A projected force arrow.
pub struct Arrow {
    pub from: Projected,
    pub to: Projected,
    pub color: Color,
    pub dashed: bool,
    pub label: &'static str,
}

/// Force decomposition overlay for the reference pendulum: four arrows
/// plus the two dashed segments completing the parallelogram.
pub struct ForceDiagram {
    pub arrows: Vec<Arrow>,
    pub guides: Vec<(Projected, Projected)>,
}

/// One pendulum, fully projected and styled.
pub struct Body {
    pub color: Color,
    pub bob: Projected,
    pub bob_radius: f64,
    pub orbit: Vec<Projected>,
    pub forces: Option<ForceDiagram>,
    pub label: String,
}

/// Everything the renderer needs for one frame. `bodies` is sorted by
/// depth key descending, so drawing it in order is the painter's
/// algorithm.
pub struct Scene {
    pub viewport: Size,
    pub support: Projected,
    pub axis_foot: Projected,
    pub bodies: Vec<Body>,
}

/// The world-space force vectors acting on a bob, in newtons. Down is +Y.
/// Returns None when the bob sits (nearly) on the axis and the inward
/// direction is undefined.
pub struct ForceVectors {
    pub gravity: [f64; 3],
    pub vertical_tension: [f64; 3],
    pub centripetal: [f64; 3],
    pub tension: [f64; 3],
}

pub fn force_vectors(mass: f64, angular_velocity: f64, position: [f64; 3]) -> Option<ForceVectors> {
    let distance = (position[0] * position[0] + position[2] * position[2]).sqrt();
    if distance < AXIS_EPSILON {
        return None;
    }
    let weight = mass * GRAVITY;
    let inward = [-position[0] / distance, 0.0, -position[2] / distance];
    let magnitude = physics::centripetal_force(mass, angular_velocity, distance);
    let centripetal = [inward[0] * magnitude, 0.0, inward[2] * magnitude];
    let vertical_tension = [0.0, -weight, 0.0];
    Some(ForceVectors {
        gravity: [0.0, weight, 0.0],
        vertical_tension,
        centripetal,
        tension: [
            vertical_tension[0] + centripetal[0],
            vertical_tension[1] + centripetal[1],
            vertical_tension[2] + centripetal[2],
        ],
    })
}

/// Build the frame's scene from the latest shared inputs. Rebuilt from
/// scratch every frame, so the pendulum set and height may change freely
/// between frames.
pub fn compose(state: &AppState, camera: &Camera, viewport: Size, time: f64) -> Scene {
    // Support hangs near the top of the surface.
    let center = Point::new(viewport.width / 2.0, viewport.height / 6.0);
    let view = camera.view_matrix();
    let angle = physics::phase_angle(state.angular_velocity, time);

    let support = camera.project_with(&view, center, [0.0, 0.0, 0.0]);
    let axis_foot = camera.project_with(&view, center, [0.0, state.height, 0.0]);

    let mut bodies: Vec<Body> = state
        .pendulums
        .iter()
        .enumerate()
        .map(|(index, config)| {
            let radius = physics::cone_radius(config.length, state.height);
            let position = physics::bob_position(radius, state.height, angle);
            let bob = camera.project_with(&view, center, position);

            let mut orbit = Vec::new();
            let mut a = 0.0;
            while a <= std::f64::consts::TAU {
                orbit.push(camera.project_with(
                    &view,
                    center,
                    [radius * a.cos(), state.height, radius * a.sin()],
                ));
                a += ORBIT_STEP;
            }

            // Only the first pendulum carries the force decomposition.
            let forces = if index == 0 {
                force_diagram(camera, &view, center, config.mass, state.angular_velocity, position)
            } else {
                None
            };

            Body {
                color: Color::from_hex_str(&config.color).unwrap_or(Color::WHITE),
                bob_radius: (BOB_BASE_SIZE + config.mass * BOB_MASS_SIZE) * bob.scale,
                bob,
                orbit,
                forces,
                label: format!("m={}kg", config.mass),
            }
        })
        .collect();

    // Painter's algorithm: farthest bobs first.
    bodies.sort_by(|a, b| b.bob.depth.partial_cmp(&a.bob.depth).unwrap_or(std::cmp::Ordering::Equal));

    Scene {
        viewport,
        support,
        axis_foot,
        bodies,
    }
}

fn force_diagram(
    camera: &Camera,
    view: &[[f64; 3]; 3],
    center: Point,
    mass: f64,
    angular_velocity: f64,
    position: [f64; 3],
) -> Option<ForceDiagram> {
    let forces = force_vectors(mass, angular_velocity, position)?;

    let tip = |v: [f64; 3]| {
        camera.project_with(
            view,
            center,
            [
                position[0] + v[0] * FORCE_SCALE,
                position[1] + v[1] * FORCE_SCALE,
                position[2] + v[2] * FORCE_SCALE,
            ],
        )
    };
    let origin = camera.project_with(view, center, position);

    let gravity_tip = tip(forces.gravity);
    let vertical_tip = tip(forces.vertical_tension);
    let centripetal_tip = tip(forces.centripetal);
    let tension_tip = tip(forces.tension);

    Some(ForceDiagram {
        arrows: vec![
            Arrow {
                from: origin,
                to: gravity_tip,
                color: GRAVITY_COLOR,
                dashed: false,
                label: "mg",
            },
            Arrow {
                from: origin,
                to: vertical_tip,
                color: VERTICAL_COLOR,
                dashed: true,
                label: "",
            },
            Arrow {
                from: origin,
                to: centripetal_tip,
                color: CENTRIPETAL_COLOR,
                dashed: true,
                label: "Fn",
            },
            Arrow {
                from: origin,
                to: tension_tip,
                color: TENSION_COLOR,
                dashed: false,
                label: "FT",
            },
        ],
        guides: vec![
            (vertical_tip, tension_tip),
            (centripetal_tip, tension_tip),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::state::{presets, AppState};
    use approx::assert_abs_diff_eq;

    fn viewport() -> Size {
        Size::new(800.0, 600.0)
    }

    #[test]
    fn vertical_equilibrium_and_parallelogram_closure() {
        let forces = force_vectors(1.0, 2.8592, [1.6, 1.2, 0.0]).unwrap();
        for i in 0..3 {
            assert_abs_diff_eq!(
                forces.gravity[i] + forces.vertical_tension[i],
                0.0,
                epsilon = 1e-9
            );
            assert_abs_diff_eq!(
                forces.tension[i],
                forces.vertical_tension[i] + forces.centripetal[i],
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn centripetal_component_points_at_the_axis() {
        let forces = force_vectors(2.0, 3.0, [0.6, 1.0, 0.8]).unwrap();
        // Horizontal only, anti-parallel to the bob's horizontal offset.
        assert_eq!(forces.centripetal[1], 0.0);
        assert!(forces.centripetal[0] < 0.0);
        assert!(forces.centripetal[2] < 0.0);
        let expected = physics::centripetal_force(2.0, 3.0, 1.0);
        let magnitude = (forces.centripetal[0].powi(2) + forces.centripetal[2].powi(2)).sqrt();
        assert_abs_diff_eq!(magnitude, expected, epsilon = 1e-9);
    }

    #[test]
    fn force_vectors_skip_near_the_axis() {
        assert!(force_vectors(1.0, 2.0, [0.0, 1.2, 0.0]).is_none());
        assert!(force_vectors(1.0, 2.0, [5e-4, 1.2, 5e-4]).is_none());
    }

    #[test]
    fn bodies_are_sorted_far_to_near() {
        let state = AppState::new(1.2, presets(), true);
        let camera = Camera::default();
        // A handful of phases; the invariant must hold at any time.
        for time in [0.0, 0.31, 1.7, 2.9, 5.3] {
            let scene = compose(&state, &camera, viewport(), time);
            for pair in scene.bodies.windows(2) {
                assert!(pair[0].bob.depth >= pair[1].bob.depth);
            }
        }
    }

    #[test]
    fn only_the_first_pendulum_gets_the_force_overlay() {
        let state = AppState::new(1.2, presets(), true);
        let scene = compose(&state, &Camera::default(), viewport(), 0.4);
        let with_forces: Vec<&Body> =
            scene.bodies.iter().filter(|b| b.forces.is_some()).collect();
        assert_eq!(with_forces.len(), 1);
        // The overlay follows pendulum id 1 regardless of draw order.
        assert_abs_diff_eq!(
            with_forces[0].bob_radius / with_forces[0].bob.scale,
            BOB_BASE_SIZE + 1.0 * BOB_MASS_SIZE,
            epsilon = 1e-9
        );
    }

    #[test]
    fn degenerate_pendulum_collapses_onto_the_axis() {
        let mut state = AppState::new(1.2, presets(), true);
        state.pendulums = crate::state::presets().into_iter().take(1).collect();
        state.height = 2.5; // deliberately past the caller contract
        let camera = Camera::default();
        for time in [0.0, 1.0, 9.9] {
            let scene = compose(&state, &camera, viewport(), time);
            let body = &scene.bodies[0];
            assert_abs_diff_eq!(body.bob.x, scene.axis_foot.x, epsilon = 1e-9);
            assert_abs_diff_eq!(body.bob.y, scene.axis_foot.y, epsilon = 1e-9);
            assert!(body.forces.is_none());
        }
    }

    #[test]
    fn orbit_is_sampled_at_the_fixed_step() {
        let state = AppState::new(1.2, presets(), true);
        let scene = compose(&state, &Camera::default(), viewport(), 0.0);
        let expected = (std::f64::consts::TAU / ORBIT_STEP) as usize + 1;
        assert_eq!(scene.bodies[0].orbit.len(), expected);
    }

    #[test]
    fn diagram_arrows_share_the_bob_as_origin() {
        let state = AppState::new(1.2, presets(), true);
        let scene = compose(&state, &Camera::default(), viewport(), 0.0);
        let body = scene.bodies.iter().find(|b| b.forces.is_some()).unwrap();
        let diagram = body.forces.as_ref().unwrap();
        assert_eq!(diagram.arrows.len(), 4);
        assert_eq!(diagram.guides.len(), 2);
        for arrow in &diagram.arrows {
            assert_abs_diff_eq!(arrow.from.x, body.bob.x, epsilon = 1e-9);
            assert_abs_diff_eq!(arrow.from.y, body.bob.y, epsilon = 1e-9);
        }
    }
}

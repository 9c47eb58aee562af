//! Drawing layer: a small backend-independent [`Renderer`] capability
//! trait, the scene walk that issues draw calls in painter's order, and
//! the piet implementation used by the widget.

use druid::kurbo::{BezPath, Circle, Line, Point, Rect, Size, Vec2};
use druid::piet::{
    FixedRadialGradient, FontFamily, FontWeight, GradientStop, RenderContext, StrokeStyle, Text,
    TextLayout, TextLayoutBuilder,
};
use druid::Color;

use crate::scene::{Scene, AXIS_COLOR, BACKGROUND, GUIDE_COLOR, STRING_COLOR, SUPPORT_COLOR};

const ORBIT_ALPHA: f64 = 0.27;
const SUPPORT_RADIUS: f64 = 8.0;
const ARROW_HEAD_LENGTH: f64 = 15.0;

/// The drawing primitives the engine needs. Everything here is 2D and
/// stateless; the scene walk decides order and styling.
pub trait Renderer {
    fn clear(&mut self, size: Size, color: Color);
    fn line(&mut self, from: Point, to: Point, color: Color, width: f64, dashed: bool);
    /// Closed polyline through `points`.
    fn polyline(&mut self, points: &[Point], color: Color, width: f64);
    /// Radially shaded disc conveying a 3D sphere.
    fn disc(&mut self, center: Point, radius: f64, color: Color);
    /// Flat filled circle.
    fn circle(&mut self, center: Point, radius: f64, color: Color);
    /// Line with a triangular head at `to`, optionally labeled past the tip.
    fn arrow(
        &mut self,
        from: Point,
        to: Point,
        color: Color,
        width: f64,
        head_length: f64,
        dashed: bool,
        label: &str,
    );
    /// Axis-aligned text centered at `pos`, optionally on a dark plate.
    fn label(&mut self, text: &str, pos: Point, font_size: f64, color: Color, plate: bool);
}

/// Draw a composed scene. `scene.bodies` is already depth-sorted, so a
/// straight walk is the painter's algorithm.
pub fn draw_scene<B: Renderer>(backend: &mut B, scene: &Scene) {
    backend.clear(scene.viewport, BACKGROUND);

    // Cone axis from the support down to the orbit plane.
    backend.line(
        scene.support.point(),
        scene.axis_foot.point(),
        AXIS_COLOR,
        2.0,
        true,
    );
    backend.circle(
        scene.support.point(),
        SUPPORT_RADIUS * scene.support.scale,
        SUPPORT_COLOR,
    );

    for body in &scene.bodies {
        if body.orbit.len() > 1 {
            let points: Vec<Point> = body.orbit.iter().map(|p| p.point()).collect();
            backend.polyline(
                &points,
                body.color.clone().with_alpha(ORBIT_ALPHA),
                3.0 * body.bob.scale,
            );
        }

        backend.line(
            scene.support.point(),
            body.bob.point(),
            STRING_COLOR,
            2.0 * body.bob.scale,
            false,
        );

        backend.disc(body.bob.point(), body.bob_radius, body.color.clone());

        if let Some(diagram) = &body.forces {
            for arrow in &diagram.arrows {
                backend.arrow(
                    arrow.from.point(),
                    arrow.to.point(),
                    arrow.color.clone(),
                    5.0 * arrow.from.scale,
                    ARROW_HEAD_LENGTH * arrow.to.scale,
                    arrow.dashed,
                    arrow.label,
                );
            }
            for (from, to) in &diagram.guides {
                backend.line(from.point(), to.point(), GUIDE_COLOR, 1.5 * from.scale, true);
            }
        }

        backend.label(
            &body.label,
            Point::new(body.bob.x, body.bob.y + body.bob_radius + 15.0),
            (16.0 * body.bob.scale).max(20.0),
            Color::WHITE,
            true,
        );
    }
}

/// Piet-backed renderer, generic over the concrete render context so it
/// works against any piet backend.
pub struct PietBackend<'a, R: RenderContext> {
    ctx: &'a mut R,
}

impl<'a, R: RenderContext> PietBackend<'a, R> {
    pub fn new(ctx: &'a mut R) -> Self {
        PietBackend { ctx }
    }

    fn dash_style() -> StrokeStyle {
        StrokeStyle::new().dash_pattern(&[5.0, 5.0])
    }

    fn stroke_line(&mut self, line: Line, color: Color, width: f64, dashed: bool) {
        if dashed {
            self.ctx.stroke_styled(line, &color, width, &Self::dash_style());
        } else {
            self.ctx.stroke(line, &color, width);
        }
    }

    fn layout(&mut self, text: &str, font_size: f64, color: Color) -> Option<<R::Text as Text>::TextLayout> {
        self.ctx
            .text()
            .new_text_layout(text.to_string())
            .font(FontFamily::SYSTEM_UI, font_size)
            .default_attribute(FontWeight::BOLD)
            .text_color(color)
            .build()
            .ok()
    }
}

impl<'a, R: RenderContext> Renderer for PietBackend<'a, R> {
    fn clear(&mut self, size: Size, color: Color) {
        self.ctx.fill(size.to_rect(), &color);
    }

    fn line(&mut self, from: Point, to: Point, color: Color, width: f64, dashed: bool) {
        self.stroke_line(Line::new(from, to), color, width, dashed);
    }

    fn polyline(&mut self, points: &[Point], color: Color, width: f64) {
        let mut path = BezPath::new();
        for (i, point) in points.iter().enumerate() {
            if i == 0 {
                path.move_to(*point);
            } else {
                path.line_to(*point);
            }
        }
        path.close_path();
        self.ctx.stroke(path, &color, width);
    }

    fn disc(&mut self, center: Point, radius: f64, color: Color) {
        let shape = Circle::new(center, radius);
        // White highlight offset up-left, shading to black at the rim.
        let gradient = FixedRadialGradient {
            center,
            origin_offset: Vec2::new(-radius / 3.0, -radius / 3.0),
            radius,
            stops: vec![
                GradientStop {
                    pos: 0.0,
                    color: Color::WHITE,
                },
                GradientStop {
                    pos: 0.5,
                    color: color.clone(),
                },
                GradientStop {
                    pos: 1.0,
                    color: Color::BLACK,
                },
            ],
        };
        match self.ctx.gradient(gradient) {
            Ok(brush) => self.ctx.fill(shape, &brush),
            // Gradient construction failed; a flat disc is better than a hole.
            Err(_) => self.ctx.fill(shape, &color),
        }
    }

    fn circle(&mut self, center: Point, radius: f64, color: Color) {
        self.ctx.fill(Circle::new(center, radius), &color);
    }

    fn arrow(
        &mut self,
        from: Point,
        to: Point,
        color: Color,
        width: f64,
        head_length: f64,
        dashed: bool,
        label: &str,
    ) {
        self.stroke_line(Line::new(from, to), color.clone(), width, dashed);

        let angle = (to.y - from.y).atan2(to.x - from.x);
        let wing = std::f64::consts::FRAC_PI_6;
        let mut head = BezPath::new();
        head.move_to(to);
        head.line_to(Point::new(
            to.x - head_length * (angle - wing).cos(),
            to.y - head_length * (angle - wing).sin(),
        ));
        head.line_to(Point::new(
            to.x - head_length * (angle + wing).cos(),
            to.y - head_length * (angle + wing).sin(),
        ));
        head.close_path();
        self.ctx.fill(head, &color);

        if !label.is_empty() {
            let pos = Point::new(
                to.x + (head_length + 15.0) * angle.cos(),
                to.y + (head_length + 15.0) * angle.sin(),
            );
            self.label(label, pos, 24.0 * (head_length / ARROW_HEAD_LENGTH), color, false);
        }
    }

    fn label(&mut self, text: &str, pos: Point, font_size: f64, color: Color, plate: bool) {
        // A frame that cannot lay out text simply skips it.
        let Some(layout) = self.layout(text, font_size, color) else {
            return;
        };
        let size = layout.size();
        let origin = Point::new(pos.x - size.width / 2.0, pos.y - size.height / 2.0);
        if plate {
            let pad = 4.0;
            let rect = Rect::from_origin_size(
                Point::new(origin.x - pad, origin.y - pad),
                Size::new(size.width + pad * 2.0, size.height + pad * 2.0),
            );
            self.ctx.fill(rect, &Color::rgba8(0, 0, 0, 179));
        }
        self.ctx.draw_text(&layout, origin);
    }
}

use std::time::{Duration, Instant};

use druid::kurbo::Point;
use druid::piet::{FontFamily, Text, TextLayout, TextLayoutBuilder};
use druid::widget::prelude::*;
use druid::{commands, Color, KbKey};

use crate::camera::Camera;
use crate::render::{draw_scene, PietBackend};
use crate::scene;
use crate::state::{presets, AppState};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const HEIGHT_STEP: f64 = 0.05;

/// Simulation clock. Advances by wall-clock deltas only while playing;
/// the first tick establishes the baseline without advancing time.
pub struct SimulationClock {
    accumulated: f64,
    last_tick: Option<Instant>,
}

impl SimulationClock {
    pub fn new() -> Self {
        SimulationClock {
            accumulated: 0.0,
            last_tick: None,
        }
    }

    /// Accumulated simulation time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.accumulated
    }

    pub fn tick(&mut self, now: Instant, playing: bool) {
        let delta = match self.last_tick {
            Some(last) => now.saturating_duration_since(last).as_secs_f64(),
            None => 0.0,
        };
        self.last_tick = Some(now);
        if playing {
            self.accumulated += delta;
        }
    }
}

/// 3D pendulum widget: owns the frame loop, the clock, the camera and the
/// pointer drag state. Shared inputs live in [`AppState`] and are read
/// fresh each frame.
pub struct PendulumWidget {
    camera: Camera,
    clock: SimulationClock,
    /// Is the user currently dragging to orbit the camera?
    dragging: bool,
    /// Last pointer position
    last_mouse_pos: Point,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl PendulumWidget {
    pub fn new() -> Self {
        PendulumWidget {
            camera: Camera::default(),
            clock: SimulationClock::new(),
            dragging: false,
            last_mouse_pos: Point::ZERO,
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        }
    }

    fn handle_key(&mut self, ctx: &mut EventCtx, key: &KbKey, data: &mut AppState) {
        match key {
            KbKey::Character(s) => match s.as_str() {
                "p" | "P" => {
                    data.is_playing = !data.is_playing;
                    log::debug!("playing: {}", data.is_playing);
                }
                "r" | "R" => {
                    self.camera = Camera::default();
                    ctx.request_paint();
                }
                "d" | "D" => {
                    data.debug = !data.debug;
                    ctx.request_paint();
                }
                "q" | "Q" => {
                    ctx.submit_command(commands::QUIT_APP);
                }
                "1" | "2" | "3" => {
                    let count = s.parse::<usize>().unwrap_or(1);
                    data.pendulums = presets().into_iter().take(count).collect();
                    // Re-clamp height against the new shortest string.
                    data.set_height(data.height);
                    log::info!("active pendulums: {}", count);
                    ctx.request_paint();
                }
                _ => {}
            },
            KbKey::ArrowUp => {
                data.set_height(data.height + HEIGHT_STEP);
                log::debug!("height: {:.2} m, omega: {:.3} rad/s", data.height, data.angular_velocity);
                ctx.request_paint();
            }
            KbKey::ArrowDown => {
                data.set_height(data.height - HEIGHT_STEP);
                log::debug!("height: {:.2} m, omega: {:.3} rad/s", data.height, data.angular_velocity);
                ctx.request_paint();
            }
            _ => {}
        }
    }
}

impl Widget<AppState> for PendulumWidget {
    fn event(&mut self, ctx: &mut EventCtx, event: &Event, data: &mut AppState, _env: &Env) {
        match event {
            Event::WindowConnected => {
                ctx.request_timer(FRAME_INTERVAL);
                // Request focus to receive keyboard events
                ctx.request_focus();
            }
            Event::Timer(_) => {
                self.clock.tick(Instant::now(), data.is_playing);
                // Repaint even while paused so camera drags stay live.
                ctx.request_paint();
                ctx.request_timer(FRAME_INTERVAL);
            }
            Event::KeyDown(key_event) => {
                self.handle_key(ctx, &key_event.key, data);
            }
            Event::MouseDown(mouse_event) => {
                if mouse_event.button == druid::MouseButton::Left {
                    self.dragging = true;
                    self.last_mouse_pos = mouse_event.pos;
                    ctx.set_active(true); // Capture mouse events
                }
            }
            Event::MouseMove(mouse_event) => {
                if self.dragging {
                    let delta = mouse_event.pos - self.last_mouse_pos;
                    self.camera.drag(delta.x, delta.y);
                    self.last_mouse_pos = mouse_event.pos;
                    ctx.request_paint();
                }
            }
            Event::MouseUp(_) => {
                self.dragging = false;
                ctx.set_active(false);
            }
            _ => {}
        }
    }

    fn lifecycle(&mut self, _ctx: &mut LifeCycleCtx, event: &LifeCycle, _data: &AppState, _env: &Env) {
        // Pointer leaving the surface ends the drag unconditionally.
        if let LifeCycle::HotChanged(false) = event {
            self.dragging = false;
        }
    }

    fn update(&mut self, _ctx: &mut UpdateCtx, _old_data: &AppState, _data: &AppState, _env: &Env) {}

    fn layout(
        &mut self,
        _layout_ctx: &mut LayoutCtx,
        bc: &BoxConstraints,
        _data: &AppState,
        _env: &Env,
    ) -> Size {
        bc.max()
    }

    fn paint(&mut self, ctx: &mut PaintCtx, data: &AppState, _env: &Env) {
        // Update FPS calculation
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }

        let size = ctx.size();
        let frame = scene::compose(data, &self.camera, size, self.clock.elapsed());
        {
            let mut backend = PietBackend::new(ctx.render_ctx);
            draw_scene(&mut backend, &frame);
        }

        if data.debug {
            let lines = [
                format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
                format!("Yaw: {:.2}, Pitch: {:.2}", self.camera.yaw, self.camera.pitch),
                format!(
                    "t: {:.2} s, omega: {:.3} rad/s, height: {:.2} m",
                    self.clock.elapsed(),
                    data.angular_velocity,
                    data.height
                ),
                format!("FPS: {:.2}", self.fps),
            ];
            for (i, line) in lines.iter().enumerate() {
                if let Ok(layout) = ctx
                    .text()
                    .new_text_layout(line.clone())
                    .font(FontFamily::SYSTEM_UI, 12.0)
                    .text_color(Color::WHITE)
                    .build()
                {
                    ctx.draw_text(&layout, (10.0, 10.0 + 20.0 * i as f64));
                }
            }
        }

        // Display 'Paused' if the simulation is paused
        if !data.is_playing {
            if let Ok(layout) = ctx
                .text()
                .new_text_layout("Paused")
                .font(FontFamily::SYSTEM_UI, 24.0)
                .text_color(Color::WHITE)
                .build()
            {
                let text_size = layout.size();
                ctx.draw_text(&layout, ((size.width - text_size.width) / 2.0, 10.0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn first_tick_establishes_baseline_without_advancing() {
        let mut clock = SimulationClock::new();
        clock.tick(Instant::now(), true);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn clock_advances_only_while_playing() {
        let mut clock = SimulationClock::new();
        let t0 = Instant::now();
        clock.tick(t0, true);
        clock.tick(t0 + Duration::from_secs(1), true);
        assert_abs_diff_eq!(clock.elapsed(), 1.0, epsilon = 1e-9);

        // Two seconds pass while paused; accumulated time must not move.
        clock.tick(t0 + Duration::from_secs(3), false);
        assert_abs_diff_eq!(clock.elapsed(), 1.0, epsilon = 1e-9);

        // Resume: only the post-resume delta counts, no jump or rewind.
        clock.tick(t0 + Duration::from_millis(3500), true);
        assert_abs_diff_eq!(clock.elapsed(), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn clock_is_monotonic() {
        let mut clock = SimulationClock::new();
        let t0 = Instant::now();
        let mut previous = 0.0;
        for ms in [0u64, 16, 32, 32, 100, 1000] {
            clock.tick(t0 + Duration::from_millis(ms), true);
            assert!(clock.elapsed() >= previous);
            previous = clock.elapsed();
        }
    }
}

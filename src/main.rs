use clap::Parser;
use druid::{AppLauncher, LocalizedString, PlatformError, WindowDesc};

mod camera;
mod math;
mod physics;
mod render;
mod scene;
mod state;
mod widget;

use state::{presets, AppState};
use widget::PendulumWidget;

/// Interactive 3D conical pendulum visualization
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Suspension height in meters
    #[arg(long, default_value_t = 1.2)]
    height: f64,

    /// Number of pendulums to show
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=3))]
    pendulums: u8,

    /// Start with the simulation paused
    #[arg(long)]
    paused: bool,
}

fn main() -> Result<(), PlatformError> {
    env_logger::init();
    let args = Args::parse();

    let configs = presets().into_iter().take(args.pendulums as usize).collect();
    let mut initial_state = AppState::new(args.height, configs, !args.paused);
    // Keep the height inside the caller contract (below the shortest string).
    initial_state.set_height(args.height);
    if (initial_state.height - args.height).abs() > 1e-9 {
        log::warn!(
            "height {:.2} m is out of range, clamped to {:.2} m",
            args.height,
            initial_state.height
        );
    }
    log::info!(
        "starting with {} pendulum(s), height {:.2} m, omega {:.3} rad/s",
        initial_state.pendulums.len(),
        initial_state.height,
        initial_state.angular_velocity
    );

    let main_window = WindowDesc::new(PendulumWidget::new())
        .title(LocalizedString::new("Conical Pendulum"))
        .window_size((900.0, 700.0));

    AppLauncher::with_window(main_window).launch(initial_state)?;

    Ok(())
}

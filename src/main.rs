//! Headless demo: lays out an oval in the editor, saves it, then drives the
//! pilot car around it at 60 Hz until the tick budget runs out or the
//! simulator is stopped.
//!
//! Usage: `track_sandbox [config.json]`

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::{LogPlugin, error, info};
use bevy::prelude::*;
use std::f32::consts::{PI, TAU};
use std::time::Duration;
use track_sandbox::game_logic::{FIXED_TIMESTEP, midpoint};
use track_sandbox::input::{InputEvent, InputState};
use track_sandbox::simulation::{publish_frame, sample_input};
use track_sandbox::{AppContext, FrameSnapshot, SandboxConfig, SimulationPlugin, Simulator};

const DEMO_TICKS: u64 = 600;
const OVAL_ANCHORS: usize = 8;
const WAYPOINT_REACHED: f32 = 60.0;
const STEER_DEADBAND: f32 = 0.05;
const REPORT_EVERY: u64 = 60;

/// Scripted pilot: throttle always on, steering for the next waypoint.
#[derive(Resource)]
struct DemoDriver {
    waypoints: Vec<Vec2>,
    target: usize,
    off_track_ticks: u32,
}

/// Anchors around an ellipse inscribed in the canvas, clockwise on screen,
/// opening with the middle of the top straight so the start pose sits clear
/// of a corner.
fn oval_waypoints(config: &SandboxConfig) -> Vec<Vec2> {
    let center = Vec2::new(config.canvas_width / 2.0, config.canvas_height / 2.0);
    let radii = Vec2::new(
        config.canvas_width / 2.0 - config.base_width,
        config.canvas_height / 2.0 - config.base_width,
    );
    let step = TAU / OVAL_ANCHORS as f32;
    let corners: Vec<Vec2> = (0..OVAL_ANCHORS)
        .map(|k| {
            let theta = -PI / 2.0 + (k as f32 + 0.5) * step;
            center + Vec2::new(theta.cos(), theta.sin()) * radii
        })
        .collect();

    let top = midpoint(corners[OVAL_ANCHORS - 1], corners[0]);
    std::iter::once(top).chain(corners).collect()
}

fn build_oval(context: &mut AppContext, waypoints: &[Vec2]) -> track_sandbox::Result<String> {
    context.new_track();
    for (i, start) in waypoints.iter().enumerate() {
        let end = waypoints[(i + 1) % waypoints.len()];
        context.editor.add_segment(*start, end)?;
    }
    context.editor.track.name = "Demo Oval".to_string();
    context.save_track()
}

fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Presses and releases keys on `InputState` the way a player would, from
/// the previous tick's published frame.
fn drive_pilot(frame: Res<FrameSnapshot>, mut driver: ResMut<DemoDriver>, mut input: ResMut<InputState>) {
    let Some(car) = frame.cars.first() else {
        return;
    };
    let position = car.telemetry.position;
    if position.distance(driver.waypoints[driver.target]) < WAYPOINT_REACHED {
        driver.target = (driver.target + 1) % driver.waypoints.len();
    }
    let to_target = driver.waypoints[driver.target] - position;
    let heading_error = wrap_angle(to_target.y.atan2(to_target.x) - car.angle);

    let wanted = [
        ("ArrowUp", true),
        ("a", heading_error < -STEER_DEADBAND),
        ("d", heading_error > STEER_DEADBAND),
    ];
    for (key, down) in wanted {
        if down != input.is_pressed(key) {
            let event = if down {
                InputEvent::key_down(key)
            } else {
                InputEvent::key_up(key)
            };
            input.apply(&event);
        }
    }
}

/// Reports telemetry and ends the app once the budget is spent. Stopping the
/// simulator from anywhere else ends it on the next frame.
fn report_and_exit(
    frame: Res<FrameSnapshot>,
    mut driver: ResMut<DemoDriver>,
    mut simulator: ResMut<Simulator>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(car) = frame.cars.first() else {
        exit.write(AppExit::Success);
        return;
    };
    if car.colliding {
        driver.off_track_ticks += 1;
    }
    if frame.tick % REPORT_EVERY == 0 {
        info!(
            tick = frame.tick,
            speed = car.telemetry.speed,
            angle = car.telemetry.angle_degrees,
            x = car.telemetry.position.x,
            y = car.telemetry.position.y,
            "pilot"
        );
    }

    if !frame.running || frame.tick >= DEMO_TICKS {
        if simulator.is_running() {
            let _ = simulator.stop();
        }
        info!(ticks = frame.tick, off_track_ticks = driver.off_track_ticks, "demo finished");
        exit.write(AppExit::Success);
    }
}

/// Builds the oval through the editor, starts it, and hands the running
/// simulator to `app` along with the scripted driver.
fn setup_demo(app: &mut App, config: SandboxConfig) -> track_sandbox::Result<()> {
    app.insert_resource(config.clone()).add_plugins(SimulationPlugin);

    let waypoints = oval_waypoints(&config);
    let mut context = AppContext::new(config);
    let id = build_oval(&mut context, &waypoints)?;
    context.start_simulation()?;
    if let Some(track) = context.simulator.track() {
        info!(id = %id, segments = track.segments.len(), closed = track.is_closed(), "demo track ready");
    }

    // the context built and started the simulator; the app drives it from here
    app.insert_resource(std::mem::take(&mut context.simulator))
        .insert_resource(DemoDriver {
            waypoints,
            target: 1,
            off_track_ticks: 0,
        })
        .add_systems(Update, drive_pilot.before(sample_input))
        .add_systems(Update, report_and_exit.after(publish_frame));
    Ok(())
}

fn run() -> track_sandbox::Result<AppExit> {
    let config = match std::env::args().nth(1) {
        Some(path) => SandboxConfig::load(path)?,
        None => SandboxConfig::default(),
    };

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f32(
            FIXED_TIMESTEP,
        ))),
        LogPlugin::default(),
    ));
    setup_demo(&mut app, config)?;
    Ok(app.run())
}

fn main() {
    match run() {
        Ok(AppExit::Success) => {}
        Ok(AppExit::Error(code)) => std::process::exit(i32::from(code.get())),
        Err(e) => {
            error!(error = %e, "demo failed");
            eprintln!("track_sandbox: {e}");
            std::process::exit(1);
        }
    }
}

//! Frame-driven simulation of every managed car against the loaded track.
//!
//! One `App::update` is one tick: input is sampled once, every car is
//! advanced, then the settled state is published for rendering.

use crate::car::{Car, Telemetry};
use crate::config::SandboxConfig;
use crate::error::{Result, SandboxError};
use crate::game_logic::{Pose, PhysicsInput};
use crate::input::{InputSnapshot, InputState};
use crate::track::Track;
use bevy::log::{debug, info, warn};
use bevy::prelude::*;

#[derive(Resource, Debug, Default)]
pub struct Simulator {
    cars: Vec<Car>,
    track: Option<Track>,
    running: bool,
    ticks: u64,
}

impl Simulator {
    /// One pilot car built from the config.
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            cars: vec![Car::from_config(&config.car)],
            ..Default::default()
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn cars_mut(&mut self) -> &mut [Car] {
        &mut self.cars
    }

    pub fn add_car(&mut self, mut car: Car) -> usize {
        let pose = self.start_pose_for(&car);
        car.reset(pose);
        self.cars.push(car);
        self.cars.len() - 1
    }

    /// The first car takes keyboard input.
    pub fn pilot(&self) -> Option<&Car> {
        self.cars.first()
    }

    pub fn pilot_mut(&mut self) -> Option<&mut Car> {
        self.cars.first_mut()
    }

    pub fn set_pilot_controls(&mut self, controls: PhysicsInput) {
        if let Some(pilot) = self.pilot_mut() {
            pilot.controls = controls;
        }
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    /// Swap in a finalized track. Cars move to its start pose.
    pub fn load_track(&mut self, track: Track) {
        info!(id = %track.id, segments = track.segments.len(), "simulator track loaded");
        self.track = Some(track);
        self.reset_cars();
    }

    pub fn unload_track(&mut self) -> Option<Track> {
        self.track.take()
    }

    fn start_pose_for(&self, car: &Car) -> Pose {
        self.track
            .as_ref()
            .and_then(Track::start_pose)
            .unwrap_or(car.spawn)
    }

    fn reset_cars(&mut self) {
        let start = self.track.as_ref().and_then(Track::start_pose);
        for car in &mut self.cars {
            car.reset(start.unwrap_or(car.spawn));
        }
    }

    pub fn start(&mut self) -> Result<()> {
        if self.running {
            let err = SandboxError::SimulationAlreadyRunning;
            warn!(error = %err, "start ignored");
            return Err(err);
        }
        self.running = true;
        self.reset_cars();
        info!(has_track = self.track.is_some(), "simulator starting");
        Ok(())
    }

    /// Halts ticking and returns every car to the start pose.
    pub fn stop(&mut self) -> Result<()> {
        if !self.running {
            let err = SandboxError::SimulationNotRunning;
            warn!(error = %err, "stop ignored");
            return Err(err);
        }
        self.running = false;
        self.reset_cars();
        info!(ticks = self.ticks, "simulator stopped");
        Ok(())
    }

    /// Advance every car one step. Returns whether anything moved.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        let Some(track) = self.track.as_ref() else {
            debug!("no track loaded, skipping tick");
            return false;
        };
        for car in &mut self.cars {
            car.update(&track.collision_map);
        }
        self.ticks += 1;
        true
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CarFrame {
    pub telemetry: Telemetry,
    pub angle: f32,
    pub colliding: bool,
    pub drifting: bool,
}

impl From<&Car> for CarFrame {
    fn from(car: &Car) -> Self {
        Self {
            telemetry: car.telemetry(),
            angle: car.orientation.angle,
            colliding: car.is_colliding(),
            drifting: car.is_drifting(),
        }
    }
}

/// Settled state after the last tick.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub running: bool,
    pub cars: Vec<CarFrame>,
}

pub fn sample_input(state: Res<InputState>, mut snapshot: ResMut<InputSnapshot>) {
    *snapshot = state.snapshot();
}

pub fn advance_simulation(snapshot: Res<InputSnapshot>, mut simulator: ResMut<Simulator>) {
    simulator.set_pilot_controls(snapshot.pilot);
    simulator.tick();
}

pub fn publish_frame(simulator: Res<Simulator>, mut frame: ResMut<FrameSnapshot>) {
    frame.tick = simulator.ticks();
    frame.running = simulator.is_running();
    frame.cars = simulator.cars().iter().map(CarFrame::from).collect();
}

/// Registers the simulation resources and the per-frame system chain.
/// Uses an already-inserted `SandboxConfig` if there is one.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SandboxConfig>()
            .cloned()
            .unwrap_or_default();

        app.insert_resource(Simulator::new(&config))
            .insert_resource(config)
            .init_resource::<InputState>()
            .init_resource::<InputSnapshot>()
            .init_resource::<FrameSnapshot>()
            .add_systems(
                Update,
                (sample_input, advance_simulation, publish_frame).chain(),
            );
    }
}

use bevy::prelude::*;

/// Heading in radians. Screen space is y-down, so a positive turn is
/// clockwise on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Orientation {
    pub angle: f32,
}

impl Orientation {
    pub fn new(angle: f32) -> Self {
        Self { angle }
    }

    pub fn turn(&mut self, delta: f32) {
        self.angle += delta;
    }

    pub fn forward_vector(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }

    /// Points to the car's right on screen.
    pub fn lateral_vector(&self) -> Vec2 {
        self.forward_vector().perp()
    }

    /// Heading in degrees, folded into (-360, 360) without normalizing sign.
    pub fn degrees(&self) -> f32 {
        self.angle.to_degrees() % 360.0
    }
}

/// Per-tick displacement of a car.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deref, DerefMut)]
pub struct Velocity(pub Vec2);

impl Velocity {
    pub const ZERO: Self = Self(Vec2::ZERO);

    /// Signed slip along `orientation`'s lateral axis.
    pub fn lateral_speed(&self, orientation: &Orientation) -> f32 {
        self.0.dot(orientation.lateral_vector())
    }

    /// Keep only `kept` of the sideways slip; the forward part is untouched.
    pub fn bleed_lateral(&mut self, orientation: &Orientation, kept: f32) {
        let lateral = orientation.lateral_vector();
        let slip = self.0.dot(lateral);
        self.0 -= lateral * (slip * (1.0 - kept));
    }
}

impl From<Vec2> for Velocity {
    fn from(velocity: Vec2) -> Self {
        Self(velocity)
    }
}

/// Position plus heading, as recorded in drift trails and start poses.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub position: Vec2,
    pub angle: f32,
}

impl Pose {
    pub fn new(position: Vec2, angle: f32) -> Self {
        Self { position, angle }
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::new(self.angle)
    }
}

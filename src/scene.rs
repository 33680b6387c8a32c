//! Scene definitions for the donut renderer

use crate::math::{Vec3, Vec3Ext};

/// Fixed tilt applied about the x-axis so the ring is seen at an angle
pub const TILT: f64 = crate::TAU * 0.125;

/// Step used by the forward-difference normal estimate
pub const NORMAL_DELTA: f64 = 0.001;

/// Anything that can report a signed distance to its nearest surface
pub trait DistanceField {
    fn distance(&self, p: &Vec3) -> f64;
}

/// Torus lying in the xz-plane, centred at the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Torus {
    /// Distance from the centre to the middle of the tube
    pub major_radius: f64,
    /// Tube radius
    pub minor_radius: f64,
}

impl Default for Torus {
    fn default() -> Self {
        Self {
            major_radius: 0.4,
            minor_radius: 0.2,
        }
    }
}

impl DistanceField for Torus {
    fn distance(&self, p: &Vec3) -> f64 {
        let radial = (p.x * p.x + p.z * p.z).sqrt() - self.major_radius;
        (radial * radial + p.y * p.y).sqrt() - self.minor_radius
    }
}

/// The animated scene: a tilted torus spinning about the vertical axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scene {
    pub torus: Torus,
    /// Current rotation about the y-axis, in radians
    pub angle: f64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::donut()
    }
}

impl Scene {
    pub fn donut() -> Self {
        Self {
            torus: Torus::default(),
            angle: 0.0,
        }
    }

    pub fn with_angle(angle: f64) -> Self {
        Self {
            angle,
            ..Self::donut()
        }
    }

    /// Advance the rotation by one animation step
    pub fn advance(&mut self) {
        self.angle += crate::ANGLE_STEP;
    }
}

impl DistanceField for Scene {
    fn distance(&self, p: &Vec3) -> f64 {
        let local = p.rotate_y(self.angle * 1.0).rotate_x(TILT);
        self.torus.distance(&local)
    }
}

/// Surface normal from a forward-difference gradient of the field.
///
/// One-sided (`f(p + d) - f(p)`), so the result is biased
/// by half a step compared to a central difference.
pub fn estimate_normal<F: DistanceField + ?Sized>(field: &F, p: &Vec3) -> Vec3 {
    let here = field.distance(p);
    let dx = Vec3::new(NORMAL_DELTA, 0.0, 0.0);
    let dy = Vec3::new(0.0, NORMAL_DELTA, 0.0);
    let dz = Vec3::new(0.0, 0.0, NORMAL_DELTA);
    Vec3::new(
        field.distance(&(p + dx)) - here,
        field.distance(&(p + dy)) - here,
        field.distance(&(p + dz)) - here,
    )
    .normalize()
}

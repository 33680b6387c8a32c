//! Vector helpers on top of nalgebra
//!
//! nalgebra already covers the arithmetic (add, sub, scale, `component_mul`,
//! `inf`/`sup`, dot, cross, norms, `normalize`, `lerp`). The extras needed by
//! the scene live on [`Vec3Ext`].

use nalgebra::Vector3;
use rand::Rng;

pub type Vec3 = Vector3<f64>;

/// Linear interpolation between two scalars
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Unit vector from spherical angles (`theta` around z, `phi` elevation)
pub fn from_angles(theta: f64, phi: f64) -> Vec3 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    Vec3::new(cos_phi * cos_theta, cos_phi * sin_theta, sin_phi)
}

/// Random unit vector, uniform in angle (not in area)
pub fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = crate::TAU * rng.random::<f64>();
    let phi = 0.5 * crate::TAU * rng.random::<f64>();
    from_angles(theta, phi)
}

pub trait Vec3Ext {
    /// Component-wise clamp into `[lo, hi]`
    fn clamp_components(&self, lo: &Vec3, hi: &Vec3) -> Vec3;
    fn distance_squared(&self, other: &Vec3) -> f64;
    fn distance(&self, other: &Vec3) -> f64;
    fn rotate_x(&self, t: f64) -> Vec3;
    fn rotate_y(&self, t: f64) -> Vec3;
    /// Reflect around a unit normal
    fn reflect(&self, n: &Vec3) -> Vec3;
}

impl Vec3Ext for Vec3 {
    fn clamp_components(&self, lo: &Vec3, hi: &Vec3) -> Vec3 {
        self.sup(lo).inf(hi)
    }

    fn distance_squared(&self, other: &Vec3) -> f64 {
        (other - self).norm_squared()
    }

    fn distance(&self, other: &Vec3) -> f64 {
        self.distance_squared(other).sqrt()
    }

    fn rotate_x(&self, t: f64) -> Vec3 {
        let (sin_t, cos_t) = t.sin_cos();
        Vec3::new(
            self.x,
            self.y * cos_t - self.z * sin_t,
            self.y * sin_t + self.z * cos_t,
        )
    }

    fn rotate_y(&self, t: f64) -> Vec3 {
        let (sin_t, cos_t) = t.sin_cos();
        Vec3::new(
            self.x * cos_t + self.z * sin_t,
            self.y,
            self.z * cos_t - self.x * sin_t,
        )
    }

    fn reflect(&self, n: &Vec3) -> Vec3 {
        self - n * (2.0 * self.dot(n))
    }
}

//! CPU sphere tracer
//!
//! Marches one primary ray per pixel against a [`DistanceField`], shades hits
//! with a fixed sun and turns the result into a character grid.

use crate::math::Vec3;
use crate::scene::{estimate_normal, DistanceField, Scene};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Step budget per ray
pub const MAX_STEPS: usize = 32;

/// Rays that travel further than this are background
pub const MAX_DIST: f64 = 32.0;

/// Distance below which a ray counts as touching the surface
pub const MIN_DIST: f64 = 0.001;

/// Camera position; every primary ray starts here
pub const EYE: Vec3 = Vec3::new(0.0, 0.0, -1.0);

const SUN_R: f64 = 0.577350269;
const SOFT: f64 = 0.1;
const SHININESS: f64 = 32.0;

/// Direction the sunlight travels, normalize(-1, -1, 1)
pub fn sun_direction() -> Vec3 {
    Vec3::new(-SUN_R, -SUN_R, SUN_R)
}

/// How the specular lobe treats normals facing away from the half vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecularMode {
    /// `dot(n, h)^32` without clamping. The exponent is even, so back-facing
    /// normals still get a (mirrored) highlight.
    #[default]
    Raw,
    /// `max(0, dot(n, h))^32`
    Clamped,
}

/// What a hit is shaded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadingMode {
    /// Diffuse + Blinn-Phong specular from the sun
    #[default]
    Phong,
    /// Brightness falls off with the number of marching steps
    Steps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Shading {
    #[serde(default)]
    pub mode: ShadingMode,
    #[serde(default)]
    pub specular: SpecularMode,
}

/// Where a marched ray ended up
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarchOutcome {
    /// Touched the surface at `point` on loop iteration `iteration`
    Hit { point: Vec3, iteration: usize },
    /// Left the scene or ran out of steps after `evaluations` field lookups
    Miss { evaluations: usize, travelled: f64 },
}

impl MarchOutcome {
    /// Number of distance evaluations spent stepping along the ray
    pub fn evaluations(&self) -> usize {
        match *self {
            MarchOutcome::Hit { iteration, .. } => iteration + 1,
            MarchOutcome::Miss { evaluations, .. } => evaluations,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, MarchOutcome::Hit { .. })
    }
}

/// Sphere-trace a ray from `ro` along unit direction `rd`
pub fn trace<F: DistanceField + ?Sized>(field: &F, ro: &Vec3, rd: &Vec3) -> MarchOutcome {
    let mut t = 0.0;
    for i in 0..MAX_STEPS {
        if t > MAX_DIST {
            return MarchOutcome::Miss {
                evaluations: i,
                travelled: t,
            };
        }
        let p = ro + rd * t;
        let d = field.distance(&p);
        if d < MIN_DIST {
            return MarchOutcome::Hit {
                point: p,
                iteration: i,
            };
        }
        t += d;
    }
    MarchOutcome::Miss {
        evaluations: MAX_STEPS,
        travelled: t,
    }
}

/// Brightness of a surface with normal `n` seen along `rd`. Not clamped to 1.
pub fn shade(rd: &Vec3, n: &Vec3, specular: SpecularMode) -> f64 {
    let sun = sun_direction();
    let h = (-rd - sun).normalize();
    let diffuse = 0.5 * SOFT.max(-n.dot(&sun));
    let n_dot_h = match specular {
        SpecularMode::Raw => n.dot(&h),
        SpecularMode::Clamped => n.dot(&h).max(0.0),
    };
    diffuse + 2.0 * n_dot_h.powf(SHININESS)
}

/// March a ray and shade whatever it hits; background is 0.0
pub fn march<F: DistanceField + ?Sized>(field: &F, ro: &Vec3, rd: &Vec3, shading: Shading) -> f64 {
    match trace(field, ro, rd) {
        MarchOutcome::Hit { point, iteration } => match shading.mode {
            ShadingMode::Phong => shade(rd, &estimate_normal(field, &point), shading.specular),
            ShadingMode::Steps => 1.0 - iteration as f64 / MAX_STEPS as f64,
        },
        MarchOutcome::Miss { .. } => 0.0,
    }
}

/// Map a brightness to the character ramp.
///
/// NaN compares false against every threshold and lands on the brightest
/// character.
pub fn quantize(v: f64) -> char {
    let ramp = crate::ASCII_GRADIENT;
    if v <= 0.0 {
        ramp[0]
    } else if v <= 0.1 {
        ramp[1]
    } else if v <= 0.2 {
        ramp[2]
    } else if v <= 0.4 {
        ramp[3]
    } else if v <= 0.8 {
        ramp[4]
    } else {
        ramp[5]
    }
}

/// Fixed-size ASCII renderer
#[derive(Debug, Clone)]
pub struct Renderer {
    width: usize,
    height: usize,
    shading: Shading,
    parallel: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Shading::default())
    }
}

impl Renderer {
    pub fn new(shading: Shading) -> Self {
        Self {
            width: crate::IMG_WIDTH,
            height: crate::IMG_HEIGHT,
            shading,
            parallel: true,
        }
    }

    /// Render rows on the rayon pool (output is identical either way)
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn shading(&self) -> Shading {
        self.shading
    }

    /// Unit direction of the primary ray through pixel (x, y); y grows downward
    pub fn primary_ray(&self, x: usize, y: usize) -> Vec3 {
        let nx = 2.0 * x as f64 / (self.width - 1) as f64 - 1.0;
        let ny = -(2.0 * y as f64 / (self.height - 1) as f64 - 1.0);
        Vec3::new(nx, ny, 1.0).normalize()
    }

    pub fn shade_pixel(&self, scene: &Scene, x: usize, y: usize) -> f64 {
        march(scene, &EYE, &self.primary_ray(x, y), self.shading)
    }

    /// One text row: each pixel followed by a space, then a newline
    pub fn render_row(&self, scene: &Scene, y: usize) -> String {
        let mut row = String::with_capacity(self.width * 2 + 1);
        for x in 0..self.width {
            row.push(quantize(self.shade_pixel(scene, x, y)));
            row.push(' ');
        }
        row.push('\n');
        row
    }

    /// Render the whole frame as text, without any terminal control codes
    pub fn render(&self, scene: &Scene) -> String {
        let rows: Vec<String> = if self.parallel {
            (0..self.height)
                .into_par_iter()
                .map(|y| self.render_row(scene, y))
                .collect()
        } else {
            (0..self.height).map(|y| self.render_row(scene, y)).collect()
        };
        tracing::trace!(angle = scene.angle, parallel = self.parallel, "frame rendered");
        rows.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::cell::Cell;

    /// Plane `z = depth` facing the camera that records every lookup
    struct RecordingPlane {
        depth: f64,
        calls: Cell<usize>,
        furthest: Cell<f64>,
    }

    impl RecordingPlane {
        fn new(depth: f64) -> Self {
            Self {
                depth,
                calls: Cell::new(0),
                furthest: Cell::new(0.0),
            }
        }
    }

    impl DistanceField for RecordingPlane {
        fn distance(&self, p: &Vec3) -> f64 {
            self.calls.set(self.calls.get() + 1);
            let travelled = (p - EYE).norm();
            if travelled > self.furthest.get() {
                self.furthest.set(travelled);
            }
            (self.depth - p.z).abs()
        }
    }

    /// Field that never lets a ray make progress
    struct Fog;

    impl DistanceField for Fog {
        fn distance(&self, _p: &Vec3) -> f64 {
            0.01
        }
    }

    #[test]
    fn test_quantize_boundaries() {
        assert_eq!(quantize(0.0), ' ');
        assert_eq!(quantize(-5.0), ' ');
        assert_eq!(quantize(0.05), '.');
        assert_eq!(quantize(0.1), '.');
        assert_eq!(quantize(0.1000001), '+');
        assert_eq!(quantize(0.2), '+');
        assert_eq!(quantize(0.3), '*');
        assert_eq!(quantize(0.4), '*');
        assert_eq!(quantize(0.8), '#');
        assert_eq!(quantize(0.8000001), '@');
        assert_eq!(quantize(2.5), '@');
    }

    #[test]
    fn test_quantize_nan_is_brightest() {
        assert_eq!(quantize(f64::NAN), '@');
        assert_eq!(quantize(f64::INFINITY), '@');
        assert_eq!(quantize(f64::NEG_INFINITY), ' ');
    }

    #[test]
    fn test_shade_facing_camera() {
        let v = shade(&Vec3::z(), &-Vec3::z(), SpecularMode::Raw);
        assert!(v > 0.3 && v < 0.36, "got {}", v);
        assert_eq!(quantize(v), '*');
    }

    #[test]
    fn test_shade_ambient_floor() {
        // Normal parallel to the sun's travel: no direct light, no highlight
        let n = sun_direction();
        let v = shade(&Vec3::z(), &n, SpecularMode::Clamped);
        assert_abs_diff_eq!(v, 0.5 * SOFT, epsilon = 1e-9);
    }

    #[test]
    fn test_specular_modes_differ_on_back_faces() {
        let rd = Vec3::z();
        let h = (-rd - sun_direction()).normalize();
        let n = -h;
        let raw = shade(&rd, &n, SpecularMode::Raw);
        let clamped = shade(&rd, &n, SpecularMode::Clamped);
        assert!(raw > 2.0);
        assert_abs_diff_eq!(clamped, 0.05, epsilon = 1e-9);
    }

    #[test]
    fn test_trace_hits_plane() {
        let plane = RecordingPlane::new(1.0);
        match trace(&plane, &EYE, &Vec3::z()) {
            MarchOutcome::Hit { point, iteration } => {
                assert_abs_diff_eq!(point.z, 1.0, epsilon = MIN_DIST);
                assert!(iteration < MAX_STEPS);
            }
            other => panic!("expected hit, got {:?}", other),
        }
    }

    #[test]
    fn test_trace_stops_past_max_dist() {
        let plane = RecordingPlane::new(1000.0);
        let outcome = trace(&plane, &EYE, &Vec3::z());
        assert!(!outcome.is_hit());
        assert!(outcome.evaluations() <= MAX_STEPS);
        assert_eq!(outcome.evaluations(), plane.calls.get());
        assert!(plane.furthest.get() <= MAX_DIST);
        match outcome {
            MarchOutcome::Miss { travelled, .. } => assert!(travelled > MAX_DIST),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_trace_runs_out_of_steps() {
        match trace(&Fog, &EYE, &Vec3::z()) {
            MarchOutcome::Miss {
                evaluations,
                travelled,
            } => {
                assert_eq!(evaluations, MAX_STEPS);
                assert_abs_diff_eq!(travelled, 0.01 * MAX_STEPS as f64, epsilon = 1e-9);
            }
            other => panic!("expected miss, got {:?}", other),
        }
        assert_eq!(march(&Fog, &EYE, &Vec3::z(), Shading::default()), 0.0);
    }

    #[test]
    fn test_trace_budget_over_frame() {
        let renderer = Renderer::default();
        let scene = Scene::with_angle(0.7);
        for y in 0..renderer.height() {
            for x in 0..renderer.width() {
                let outcome = trace(&scene, &EYE, &renderer.primary_ray(x, y));
                assert!(outcome.evaluations() <= MAX_STEPS);
            }
        }
    }

    #[test]
    fn test_center_ray_passes_through_hole() {
        let scene = Scene::donut();
        let v = march(&scene, &EYE, &Vec3::z(), Shading::default());
        assert_eq!(v, 0.0);
        assert_eq!(quantize(v), ' ');
    }

    #[test]
    fn test_regression_pixels_at_rest() {
        let renderer = Renderer::default();
        let scene = Scene::donut();

        let bright = renderer.shade_pixel(&scene, 24, 16);
        assert_abs_diff_eq!(bright, 0.9044, epsilon = 1e-3);
        assert_eq!(quantize(bright), '@');

        let lower = renderer.shade_pixel(&scene, 16, 24);
        assert_abs_diff_eq!(lower, 0.2952, epsilon = 1e-3);
        assert_eq!(quantize(lower), '*');

        assert_eq!(renderer.shade_pixel(&scene, 16, 16), 0.0);
    }

    #[test]
    fn test_steps_shading() {
        let shading = Shading {
            mode: ShadingMode::Steps,
            ..Shading::default()
        };
        let renderer = Renderer::new(shading);
        let v = renderer.shade_pixel(&Scene::donut(), 24, 16);
        assert!(v > 0.0 && v <= 1.0);
        let steps = (1.0 - v) * MAX_STEPS as f64;
        assert_abs_diff_eq!(steps, steps.round(), epsilon = 1e-9);
    }

    #[test]
    fn test_primary_ray_corners() {
        let renderer = Renderer::default();
        let top_left = renderer.primary_ray(0, 0);
        assert!(top_left.x < 0.0 && top_left.y > 0.0);
        let bottom_right = renderer.primary_ray(31, 31);
        assert!(bottom_right.x > 0.0 && bottom_right.y < 0.0);
        assert_abs_diff_eq!(top_left.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_frame_shape() {
        let frame = Renderer::default().render(&Scene::donut());
        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines.len(), crate::IMG_HEIGHT);
        for line in &lines {
            assert_eq!(line.chars().count(), crate::IMG_WIDTH * 2);
        }
        assert!(frame.ends_with('\n'));

        let lit = frame.chars().filter(|c| !c.is_whitespace()).count();
        assert!(lit > 250 && lit < 320, "lit pixels: {}", lit);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let scene = Scene::with_angle(2.1);
        let parallel = Renderer::default().with_parallel(true).render(&scene);
        let sequential = Renderer::default().with_parallel(false).render(&scene);
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_rotation_changes_frame() {
        let renderer = Renderer::default();
        let mut scene = Scene::donut();
        let first = renderer.render(&scene);
        for _ in 0..25 {
            scene.advance();
        }
        assert_ne!(first, renderer.render(&scene));
    }
}

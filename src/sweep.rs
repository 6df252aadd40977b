//! Mass-radius curves from a sequence of central pressures.
//!
//! Each star is solved independently, but the radial domain of the next
//! solve is sized from the radius of the previous one, so the sweep is a
//! strictly serial loop.

use ndarray::Array2;
use tracing::{info, warn};

use crate::consts::{MAX_RETRIES, RMAX_FLOOR, RMAX_GROWTH};
use crate::error::{require_positive, TovError};
use crate::tov::{Integrator, Surface};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassRadiusPoint {
    pub central_pressure: f64,
    pub mass: f64,
    pub radius: f64,
}

/// (M, R) pairs in the order of the central pressures that produced them.
#[derive(Debug, Clone, Default)]
pub struct MassRadiusCurve {
    points: Vec<MassRadiusPoint>,
}

impl MassRadiusCurve {
    pub fn points(&self) -> &[MassRadiusPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MassRadiusPoint> {
        self.points.iter()
    }

    /// The maximum-mass configuration, where the curve turns over.
    pub fn max_mass(&self) -> Option<&MassRadiusPoint> {
        self.points
            .iter()
            .max_by(|a, b| a.mass.total_cmp(&b.mass))
    }

    /// Rows of (Pc, M, R).
    pub fn to_array2(&self) -> Array2<f64> {
        let mut out = Array2::<f64>::zeros((self.points.len(), 3));
        for (i, pt) in self.points.iter().enumerate() {
            out[[i, 0]] = pt.central_pressure;
            out[[i, 1]] = pt.mass;
            out[[i, 2]] = pt.radius;
        }
        out
    }
}

impl<'a> IntoIterator for &'a MassRadiusCurve {
    type Item = &'a MassRadiusPoint;
    type IntoIter = std::slice::Iter<'a, MassRadiusPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Drives an [`Integrator`] across central pressures, owning the adaptive
/// outer radius r_max.
#[derive(Debug, Clone)]
pub struct SweepDriver {
    integrator: Integrator,
    r_max_floor: f64,
    r_max_growth: f64,
    max_retries: usize,
}

impl SweepDriver {
    pub fn new(integrator: Integrator) -> Self {
        SweepDriver {
            integrator,
            r_max_floor: RMAX_FLOOR,
            r_max_growth: RMAX_GROWTH,
            max_retries: MAX_RETRIES,
        }
    }

    /// r_max used for the first star and as a lower bound afterwards.
    pub fn with_r_max_floor(mut self, floor: f64) -> Result<Self, TovError> {
        self.r_max_floor = require_positive("r_max_floor", floor)?;
        Ok(self)
    }

    /// Next r_max = growth * previous radius; growth below 1 would start
    /// every solve inside the previous star.
    pub fn with_r_max_growth(mut self, growth: f64) -> Result<Self, TovError> {
        if !growth.is_finite() || growth < 1.0 {
            return Err(TovError::invalid("r_max_growth", growth, "must be finite and >= 1"));
        }
        self.r_max_growth = growth;
        Ok(self)
    }

    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    /// Solve one star per central pressure. A missed surface is retried with
    /// a doubled r_max; any other error aborts the sweep.
    pub fn run(&self, pressures: &[f64]) -> Result<MassRadiusCurve, TovError> {
        let mut points = Vec::with_capacity(pressures.len());
        let mut r_max = self.r_max_floor;

        for (i, &pc) in pressures.iter().enumerate() {
            let surface = self.solve_with_retries(pc, r_max)?;
            info!(
                i,
                pc,
                mass = surface.mass,
                radius = surface.radius,
                compactness = surface.compactness(),
                "star"
            );
            r_max = (self.r_max_growth * surface.radius).max(self.r_max_floor);
            points.push(MassRadiusPoint {
                central_pressure: pc,
                mass: surface.mass,
                radius: surface.radius,
            });
        }

        Ok(MassRadiusCurve { points })
    }

    /// Doubling r_max at fixed N also doubles dr, so a star without a finite
    /// surface eventually fails the seed check; that is still a missed
    /// surface and is reported as one.
    fn solve_with_retries(&self, pc: f64, mut r_max: f64) -> Result<Surface, TovError> {
        let mut attempt = 0;
        let mut missed: Option<TovError> = None;
        loop {
            match self.integrator.mass_radius(pc, r_max) {
                Ok(surface) => return Ok(surface),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    warn!(pc, r_max, attempt, "surface not found, doubling r_max");
                    r_max *= 2.0;
                    attempt += 1;
                    missed = Some(err);
                }
                Err(TovError::UnresolvedStar { dr, pressure }) => {
                    return Err(missed.unwrap_or(TovError::UnresolvedStar { dr, pressure }));
                }
                Err(err) => return Err(err),
            }
        }
    }
}

use ndarray::Array1;

use crate::error::{require_positive, TovError};

/// Equally spaced radii over [0, r_max], fixed once per integration.
#[derive(Debug, Clone)]
pub struct RadialGrid {
    r: Array1<f64>,
    dr: f64,
}

impl RadialGrid {
    /// `nsteps` intervals, so `nsteps + 1` points and dr = r_max / nsteps.
    pub fn new(r_max: f64, nsteps: usize) -> Result<Self, TovError> {
        require_positive("r_max", r_max)?;
        if nsteps == 0 {
            return Err(TovError::invalid("N", 0.0, "need at least one radial step"));
        }
        let r = Array1::linspace(0.0, r_max, nsteps + 1);
        Ok(RadialGrid {
            r,
            dr: r_max / nsteps as f64,
        })
    }

    pub fn step(&self) -> f64 {
        self.dr
    }

    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    pub fn r(&self, i: usize) -> f64 {
        self.r[i]
    }

    pub fn r_max(&self) -> f64 {
        self.r[self.r.len() - 1]
    }
}

/// Log-spaced central pressures from `p_min` to `p_max` inclusive.
pub fn pressure_grid(p_min: f64, p_max: f64, n: usize) -> Result<Array1<f64>, TovError> {
    require_positive("p_min", p_min)?;
    require_positive("p_max", p_max)?;
    if n == 0 {
        return Err(TovError::invalid("samples", 0.0, "need at least one central pressure"));
    }
    if n == 1 {
        return Ok(Array1::from_elem(1, p_min));
    }
    Ok(Array1::logspace(10.0, p_min.log10(), p_max.log10(), n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_make_grid() {
        let grid = RadialGrid::new(100.0, 1000).unwrap();
        assert_eq!(grid.len(), 1001);
        assert_approx_eq!(grid.r(0), 0.0, f64::EPSILON);
        assert_approx_eq!(grid.r(1), 0.1, 1e-12);
        assert_approx_eq!(grid.r_max(), 100.0, 1e-12);
        assert_approx_eq!(grid.step(), 0.1, f64::EPSILON);
    }

    #[test]
    fn test_grid_rejects_bad_input() {
        assert!(RadialGrid::new(0.0, 10).is_err());
        assert!(RadialGrid::new(-1.0, 10).is_err());
        assert!(RadialGrid::new(10.0, 0).is_err());
    }

    #[test]
    fn test_pressure_grid_is_log_spaced() {
        let p = pressure_grid(1e-6, 1e-2, 5).unwrap();
        assert_eq!(p.len(), 5);
        assert_approx_eq!(p[0], 1e-6, 1e-18);
        assert_approx_eq!(p[4], 1e-2, 1e-14);
        for w in p.windows(2) {
            assert_approx_eq!(w[1] / w[0], 10.0, 1e-9);
        }
    }

    #[test]
    fn test_pressure_grid_single_sample() {
        let p = pressure_grid(1e-4, 1e-1, 1).unwrap();
        assert_eq!(p.to_vec(), vec![1e-4]);
    }
}

//! Sweep configuration, read from TOML. Every field has a default so an
//! empty file describes the degenerate neutron gas sweep.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::consts::*;
use crate::eos::Polytrope;
use crate::error::TovError;
use crate::grid::pressure_grid;
use crate::stepper::Tolerances;
use crate::sweep::SweepDriver;
use crate::tov::{Integrator, SurfaceLocation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    /// Polytropic constant K
    #[serde(default = "k_nonrelativistic")]
    pub k: f64,

    /// Adiabatic index Gamma
    #[serde(default = "default_gamma")]
    pub gamma: f64,

    /// Lowest central pressure of the sweep
    #[serde(default = "default_p_min")]
    pub p_min: f64,

    /// Highest central pressure of the sweep
    #[serde(default = "default_p_max")]
    pub p_max: f64,

    /// Number of log-spaced central pressures
    #[serde(default = "default_samples")]
    pub samples: usize,

    /// Radial grid intervals per star
    #[serde(default = "default_n_steps")]
    pub n_steps: usize,

    #[serde(default = "default_r_max_floor")]
    pub r_max_floor: f64,

    #[serde(default = "default_r_max_growth")]
    pub r_max_growth: f64,

    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default)]
    pub surface: SurfaceLocation,

    #[serde(default = "default_rtol")]
    pub rtol: f64,

    #[serde(default = "default_atol")]
    pub atol: f64,
}

fn default_gamma() -> f64 {
    GAMMA_NR
}

fn default_p_min() -> f64 {
    P_MIN
}

fn default_p_max() -> f64 {
    P_MAX
}

fn default_samples() -> usize {
    NSAMPLES
}

fn default_n_steps() -> usize {
    NSTEPS
}

fn default_r_max_floor() -> f64 {
    RMAX_FLOOR
}

fn default_r_max_growth() -> f64 {
    RMAX_GROWTH
}

fn default_max_retries() -> usize {
    MAX_RETRIES
}

fn default_rtol() -> f64 {
    RTOL
}

fn default_atol() -> f64 {
    ATOL
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            k: k_nonrelativistic(),
            gamma: GAMMA_NR,
            p_min: P_MIN,
            p_max: P_MAX,
            samples: NSAMPLES,
            n_steps: NSTEPS,
            r_max_floor: RMAX_FLOOR,
            r_max_growth: RMAX_GROWTH,
            max_retries: MAX_RETRIES,
            surface: SurfaceLocation::default(),
            rtol: RTOL,
            atol: ATOL,
        }
    }
}

impl SweepConfig {
    pub fn from_file(path: &Path) -> Result<Self, TovError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| TovError::Io(path.to_owned(), e))?;
        toml::from_str(&content).map_err(|e| TovError::ConfigParse(path.to_owned(), e))
    }

    pub fn eos(&self) -> Result<Polytrope, TovError> {
        Polytrope::new(self.k, self.gamma)
    }

    pub fn integrator(&self) -> Result<Integrator, TovError> {
        Ok(Integrator::new(self.eos()?, self.n_steps)?
            .with_surface_location(self.surface)
            .with_tolerances(Tolerances::new(self.rtol, self.atol)?))
    }

    pub fn driver(&self) -> Result<SweepDriver, TovError> {
        Ok(SweepDriver::new(self.integrator()?)
            .with_r_max_floor(self.r_max_floor)?
            .with_r_max_growth(self.r_max_growth)?
            .with_max_retries(self.max_retries))
    }

    /// Central pressures in increasing order.
    pub fn pressures(&self) -> Result<Array1<f64>, TovError> {
        if self.p_max < self.p_min {
            return Err(TovError::invalid("p_max", self.p_max, "must not be below p_min"));
        }
        pressure_grid(self.p_min, self.p_max, self.samples)
    }

    /// Build everything once so configuration errors surface before the
    /// first star is integrated.
    pub fn validate(&self) -> Result<(), TovError> {
        self.driver()?;
        self.pressures()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_gives_defaults() {
        let cfg: SweepConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, SweepConfig::default());
        cfg.validate().unwrap();
    }

    #[test]
    fn test_partial_override() {
        let cfg: SweepConfig = toml::from_str(
            r#"
            gamma = 2.0
            k = 100.0
            samples = 10
            surface = "interpolated"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.gamma, 2.0);
        assert_eq!(cfg.k, 100.0);
        assert_eq!(cfg.samples, 10);
        assert_eq!(cfg.surface, SurfaceLocation::Interpolated);
        assert_eq!(cfg.n_steps, NSTEPS);
        assert_eq!(cfg.pressures().unwrap().len(), 10);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(toml::from_str::<SweepConfig>("gama = 2.0").is_err());
    }

    #[test]
    fn test_validate_catches_bad_values() {
        let bad = [
            SweepConfig { gamma: 1.0, ..Default::default() },
            SweepConfig { k: -1.0, ..Default::default() },
            SweepConfig { n_steps: 0, ..Default::default() },
            SweepConfig { p_min: 0.0, ..Default::default() },
            SweepConfig { p_min: 1.0, p_max: 0.1, ..Default::default() },
            SweepConfig { r_max_floor: 0.0, ..Default::default() },
            SweepConfig { rtol: 0.0, ..Default::default() },
        ];
        for cfg in bad {
            let err = cfg.validate().unwrap_err();
            assert!(matches!(err, TovError::InvalidParameter { .. }), "{:?}", cfg);
        }
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "p_min = 1e-5\np_max = 1e-3").unwrap();
        let cfg = SweepConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.p_min, 1e-5);
        assert_eq!(cfg.p_max, 1e-3);

        let missing = SweepConfig::from_file(Path::new("/nonexistent/tov.toml"));
        assert!(matches!(missing, Err(TovError::Io(..))));
    }

    #[test]
    fn test_parse_error_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "k = \"not a number\"").unwrap();
        let err = SweepConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, TovError::ConfigParse(..)));
    }
}

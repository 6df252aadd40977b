use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a stellar model or a mass-radius curve
#[derive(Error, Debug)]
pub enum TovError {
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("surface not found within r_max = {r_max} (pressure there is still {pressure:e}); increase r_max")]
    SurfaceNotFound { r_max: f64, pressure: f64 },
    #[error("apparent horizon encountered at r = {r} (m = {m}, r <= 2m)")]
    ApparentHorizon { r: f64, m: f64 },
    #[error("non-finite state produced at r = {r}")]
    NonFinite { r: f64 },
    #[error("step size underflow at r = {r} (h = {h:e})")]
    StepSizeUnderflow { r: f64, h: f64 },
    #[error("radial step dr = {dr} is too coarse: seeded pressure {pressure:e} is already non-positive")]
    UnresolvedStar { dr: f64, pressure: f64 },
    #[error("I/O error on {}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to parse config file {}", .0.display())]
    ConfigParse(PathBuf, #[source] toml::de::Error),
    #[error("CSV error")]
    Csv(#[from] csv::Error),
}

impl TovError {
    /// Only a missed surface can be cured by the caller, by enlarging r_max.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TovError::SurfaceNotFound { .. })
    }

    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        TovError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

/// Ok when `value` is finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, TovError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(TovError::invalid(name, value, "must be finite and > 0"))
    }
}

//! Mass-radius relations of relativistic polytropic stars from the
//! Tolman-Oppenheimer-Volkoff equations.

pub mod config;
pub mod consts;
pub mod eos;
pub mod error;
pub mod grid;
pub mod output;
pub mod stepper;
pub mod sweep;
pub mod tov;

pub use config::SweepConfig;
pub use eos::Polytrope;
pub use error::TovError;
pub use sweep::{MassRadiusCurve, MassRadiusPoint, SweepDriver};
pub use tov::{Integrator, SolutionCurve, StarSolution, StellarState, Surface, SurfaceLocation};

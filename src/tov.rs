//! Static, spherically symmetric stars from the Tolman-Oppenheimer-Volkoff
//! equations (G = c = 1):
//!
//! dm/dr = 4 pi r^2 eps(P)
//! dP/dr = -(eps + P)(m + 4 pi r^3 P) / (r (r - 2m))
//!
//! The right-hand side is singular at r = 0, so the first grid interval is
//! bridged with the near-centre series expansion (`bootstrap`) and the
//! adaptive stepper only ever starts from r = dr.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{FOUR_PI, FOUR_THIRDS_PI};
use crate::eos::Polytrope;
use crate::error::{require_positive, TovError};
use crate::grid::RadialGrid;
use crate::stepper::{Advance, DormandPrince, State, Tolerances};

// bracket width for the located surface, as a fraction of dr
const SURFACE_WIDTH: f64 = 1e-10;

/// One point of a radial profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StellarState {
    pub r: f64,
    pub m: f64,
    pub p: f64,
}

/// Interior solution from the centre outwards.
#[derive(Debug, Clone, Default)]
pub struct SolutionCurve {
    states: Vec<StellarState>,
}

impl SolutionCurve {
    fn with_capacity(n: usize) -> Self {
        SolutionCurve {
            states: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, state: StellarState) {
        self.states.push(state);
    }

    pub fn states(&self) -> &[StellarState] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn last(&self) -> Option<&StellarState> {
        self.states.last()
    }

    /// Rows of (r, m, P, eps).
    pub fn to_array2(&self, eos: &Polytrope) -> Array2<f64> {
        let mut out = Array2::<f64>::zeros((self.states.len(), 4));
        for (i, s) in self.states.iter().enumerate() {
            out[[i, 0]] = s.r;
            out[[i, 1]] = s.m;
            out[[i, 2]] = s.p;
            out[[i, 3]] = eos.energy_density(s.p);
        }
        out
    }
}

/// Gravitational mass and areal radius at the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub mass: f64,
    pub radius: f64,
}

impl Surface {
    pub fn compactness(&self) -> f64 {
        self.mass / self.radius
    }
}

/// Where the reported surface sits relative to the zero-pressure crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceLocation {
    /// Last grid point with positive pressure. Biased inwards by up to dr.
    #[default]
    GridPoint,
    /// The zero-pressure crossing located by bisection inside the last
    /// substep, then linear interpolation of (r, m) across the final bracket.
    Interpolated,
}

#[derive(Debug, Clone)]
pub struct StarSolution {
    pub central_pressure: f64,
    pub surface: Surface,
    pub profile: SolutionCurve,
}

/// Right-hand side of the TOV system for y = (m, P). Pressure that overshot
/// below zero is clamped so the equation of state never sees it.
pub fn tov_rhs(eos: &Polytrope, r: f64, y: &State) -> Result<State, TovError> {
    let m = y[0];
    let p = y[1].max(0.0);
    if !(r - 2.0 * m > 0.0) {
        return Err(TovError::ApparentHorizon { r, m });
    }
    let eps = eos.energy_density(p);
    let dm = FOUR_PI * r * r * eps;
    let dp = -(eps + p) * (m + FOUR_PI * r * r * r * p) / (r * (r - 2.0 * m));
    Ok([dm, dp])
}

/// Series expansion about the centre, giving the states at r = 0 and r = dr:
///
/// m(dr) = 4/3 pi eps_c dr^3
/// P(dr) = Pc - 2 pi (eps_c + Pc)(Pc + eps_c / 3) dr^2
pub fn bootstrap(eos: &Polytrope, pc: f64, dr: f64) -> [StellarState; 2] {
    let eps_c = eos.energy_density(pc);
    let centre = StellarState {
        r: 0.0,
        m: 0.0,
        p: pc,
    };
    let first = StellarState {
        r: dr,
        m: FOUR_THIRDS_PI * eps_c * dr.powi(3),
        p: pc - 2.0 * std::f64::consts::PI * (eps_c + pc) * (pc + eps_c / 3.0) * dr * dr,
    };
    [centre, first]
}

/// Integrates one star at a time. Holds only configuration, so every call
/// is an independent function of its arguments.
#[derive(Debug, Clone)]
pub struct Integrator {
    eos: Polytrope,
    nsteps: usize,
    surface: SurfaceLocation,
    stepper: DormandPrince,
}

impl Integrator {
    pub fn new(eos: Polytrope, nsteps: usize) -> Result<Self, TovError> {
        if nsteps == 0 {
            return Err(TovError::invalid("N", 0.0, "need at least one radial step"));
        }
        Ok(Integrator {
            eos,
            nsteps,
            surface: SurfaceLocation::default(),
            stepper: DormandPrince::default(),
        })
    }

    pub fn with_surface_location(mut self, surface: SurfaceLocation) -> Self {
        self.surface = surface;
        self
    }

    pub fn with_tolerances(mut self, tol: Tolerances) -> Self {
        self.stepper = DormandPrince::new(tol);
        self
    }

    pub fn eos(&self) -> &Polytrope {
        &self.eos
    }

    pub fn nsteps(&self) -> usize {
        self.nsteps
    }

    /// (M, R) for central pressure `pc` on [0, r_max].
    pub fn mass_radius(&self, pc: f64, r_max: f64) -> Result<Surface, TovError> {
        self.solve(pc, r_max).map(|s| s.surface)
    }

    /// Full interior profile plus surface for central pressure `pc`.
    pub fn solve(&self, pc: f64, r_max: f64) -> Result<StarSolution, TovError> {
        require_positive("Pc", pc)?;
        let grid = RadialGrid::new(r_max, self.nsteps)?;
        let dr = grid.step();

        let seed = bootstrap(&self.eos, pc, dr);
        if !(seed[1].p > 0.0) {
            return Err(TovError::UnresolvedStar {
                dr,
                pressure: seed[1].p,
            });
        }
        if !(seed[1].r > 2.0 * seed[1].m) {
            return Err(TovError::ApparentHorizon {
                r: seed[1].r,
                m: seed[1].m,
            });
        }

        let mut profile = SolutionCurve::with_capacity(grid.len());
        profile.push(seed[0]);
        profile.push(seed[1]);

        let rhs = |r: f64, y: &State| tov_rhs(&self.eos, r, y);
        let pressure = |y: &State| y[1];
        let mut prev = seed[1];

        for j in 2..grid.len() {
            let r_next = grid.r(j);
            match self
                .stepper
                .advance(&rhs, prev.r, [prev.m, prev.p], r_next, &pressure)?
            {
                Advance::Reached(y) => {
                    if !y.iter().all(|v| v.is_finite()) {
                        return Err(TovError::NonFinite { r: r_next });
                    }
                    prev = StellarState {
                        r: r_next,
                        m: y[0],
                        p: y[1],
                    };
                    profile.push(prev);
                }
                Advance::Crossed { before, after } => {
                    let surface = match self.surface {
                        SurfaceLocation::GridPoint => Surface {
                            mass: prev.m,
                            radius: prev.r,
                        },
                        SurfaceLocation::Interpolated => {
                            let (lo, hi) = self.stepper.refine_crossing(
                                &rhs,
                                before,
                                after,
                                &pressure,
                                SURFACE_WIDTH * dr,
                            )?;
                            let s = interpolate_surface(lo, hi);
                            profile.push(StellarState {
                                r: s.radius,
                                m: s.mass,
                                p: 0.0,
                            });
                            s
                        }
                    };
                    debug!(
                        pc,
                        r_max,
                        mass = surface.mass,
                        radius = surface.radius,
                        "surface found"
                    );
                    return Ok(StarSolution {
                        central_pressure: pc,
                        surface,
                        profile,
                    });
                }
            }
        }

        Err(TovError::SurfaceNotFound {
            r_max: grid.r_max(),
            pressure: prev.p,
        })
    }
}

/// Zero of P on the chord between a positive and a non-positive state.
fn interpolate_surface(before: (f64, State), after: (f64, State)) -> Surface {
    let (r0, y0) = before;
    let (r1, y1) = after;
    let t = y0[1] / (y0[1] - y1[1]);
    Surface {
        mass: y0[0] + t * (y1[0] - y0[0]),
        radius: r0 + t * (r1 - r0),
    }
}

//! Embedded Dormand-Prince 5(4) stepper for the two-component (m, P) system.
//!
//! One call advances the state across a single radial grid interval,
//! subdividing it adaptively. An event function is checked after every
//! accepted substep so the caller learns about the surface as soon as the
//! pressure stops being positive, without integrating past it.
//!
//! The method is explicit. The TOV system for a polytrope is not stiff on
//! the grids used here; the step controller shrinks h near the surface,
//! where the pressure gradient steepens relative to P.

use crate::consts::{ATOL, HMIN_FRAC, MAX_SUBSTEPS, RTOL};
use crate::error::{require_positive, TovError};

pub type State = [f64; 2];

const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th order weights, also the last row of the tableau (FSAL)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// difference between 5th and 4th order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MAX_BISECTIONS: usize = 60;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub rtol: f64,
    pub atol: f64,
}

impl Tolerances {
    pub fn new(rtol: f64, atol: f64) -> Result<Self, TovError> {
        Ok(Tolerances {
            rtol: require_positive("rtol", rtol)?,
            atol: require_positive("atol", atol)?,
        })
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances {
            rtol: RTOL,
            atol: ATOL,
        }
    }
}

/// Outcome of advancing across one interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    /// The end of the interval was reached with the event function positive.
    Reached(State),
    /// The event function became non-positive. `before` is the last accepted
    /// (r, y) where it was positive, `after` the first where it was not.
    Crossed {
        before: (f64, State),
        after: (f64, State),
    },
}

#[derive(Debug, Clone, Copy)]
pub struct DormandPrince {
    tol: Tolerances,
    max_substeps: usize,
}

impl Default for DormandPrince {
    fn default() -> Self {
        DormandPrince::new(Tolerances::default())
    }
}

impl DormandPrince {
    pub fn new(tol: Tolerances) -> Self {
        DormandPrince {
            tol,
            max_substeps: MAX_SUBSTEPS,
        }
    }

    pub fn tolerances(&self) -> Tolerances {
        self.tol
    }

    /// Integrate `rhs` from (r0, y0) to r1, stopping early if `event(y)`
    /// drops to zero or below after an accepted substep.
    pub fn advance<F, E>(
        &self,
        rhs: &F,
        r0: f64,
        y0: State,
        r1: f64,
        event: &E,
    ) -> Result<Advance, TovError>
    where
        F: Fn(f64, &State) -> Result<State, TovError>,
        E: Fn(&State) -> f64,
    {
        let span = r1 - r0;
        let h_min = HMIN_FRAC * span;
        let mut r = r0;
        let mut y = y0;
        let mut h = span;

        for _ in 0..self.max_substeps {
            let mut last = false;
            if r + h >= r1 {
                h = r1 - r;
                last = true;
            }

            // a stage of an oversized step may land past r = 2m; reject it
            // and only report the horizon once h cannot shrink further
            let (y_new, err) = match self.trial(rhs, r, &y, h) {
                Ok(out) => out,
                Err(horizon @ TovError::ApparentHorizon { .. }) => {
                    h *= MIN_FACTOR;
                    if h < h_min {
                        return Err(horizon);
                    }
                    continue;
                }
                Err(err) => return Err(err),
            };
            let finite = y_new.iter().all(|v| v.is_finite()) && err.is_finite();

            if finite && err <= 1.0 {
                let r_new = if last { r1 } else { r + h };
                if event(&y_new) <= 0.0 {
                    return Ok(Advance::Crossed {
                        before: (r, y),
                        after: (r_new, y_new),
                    });
                }
                r = r_new;
                y = y_new;
                if last {
                    return Ok(Advance::Reached(y));
                }
                h *= growth(err);
            } else {
                h *= if finite { growth(err) } else { MIN_FACTOR };
                if h < h_min {
                    return Err(if finite {
                        TovError::StepSizeUnderflow { r, h }
                    } else {
                        TovError::NonFinite { r }
                    });
                }
            }
        }
        Err(TovError::StepSizeUnderflow { r, h })
    }

    /// Narrow a crossing reported by [`advance`](Self::advance) by bisecting
    /// the length of a single step taken from `before`, until the bracket is
    /// no wider than `width`. Returns the new (before, after) pair.
    pub fn refine_crossing<F, E>(
        &self,
        rhs: &F,
        before: (f64, State),
        after: (f64, State),
        event: &E,
        width: f64,
    ) -> Result<((f64, State), (f64, State)), TovError>
    where
        F: Fn(f64, &State) -> Result<State, TovError>,
        E: Fn(&State) -> f64,
    {
        let (r0, y0) = before;
        let mut lo = (0.0, y0);
        let mut hi = (after.0 - r0, after.1);

        for _ in 0..MAX_BISECTIONS {
            if hi.0 - lo.0 <= width {
                break;
            }
            let h = 0.5 * (lo.0 + hi.0);
            let (y, _) = self.trial(rhs, r0, &y0, h)?;
            if !y.iter().all(|v| v.is_finite()) {
                return Err(TovError::NonFinite { r: r0 + h });
            }
            if event(&y) > 0.0 {
                lo = (h, y);
            } else {
                hi = (h, y);
            }
        }
        Ok(((r0 + lo.0, lo.1), (r0 + hi.0, hi.1)))
    }

    /// One Dormand-Prince step of size h. Returns the 5th order solution and
    /// the scaled error norm (accept when <= 1).
    fn trial<F>(&self, rhs: &F, r: f64, y: &State, h: f64) -> Result<(State, f64), TovError>
    where
        F: Fn(f64, &State) -> Result<State, TovError>,
    {
        let k1 = rhs(r, y)?;
        let k2 = rhs(r + C2 * h, &combine(y, h, &[(A21, &k1)]))?;
        let k3 = rhs(r + C3 * h, &combine(y, h, &[(A31, &k1), (A32, &k2)]))?;
        let k4 = rhs(
            r + C4 * h,
            &combine(y, h, &[(A41, &k1), (A42, &k2), (A43, &k3)]),
        )?;
        let k5 = rhs(
            r + C5 * h,
            &combine(y, h, &[(A51, &k1), (A52, &k2), (A53, &k3), (A54, &k4)]),
        )?;
        let k6 = rhs(
            r + h,
            &combine(
                y,
                h,
                &[(A61, &k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)],
            ),
        )?;
        let y_new = combine(
            y,
            h,
            &[(B1, &k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)],
        );
        let k7 = rhs(r + h, &y_new)?;

        let mut err: f64 = 0.0;
        for i in 0..2 {
            let e = h
                * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i] + E7 * k7[i]);
            let scale = self.tol.atol + self.tol.rtol * y[i].abs().max(y_new[i].abs());
            err = err.max(e.abs() / scale);
        }
        Ok((y_new, err))
    }
}

fn combine(y: &State, h: f64, terms: &[(f64, &State)]) -> State {
    let mut out = *y;
    for (a, k) in terms {
        out[0] += h * a * k[0];
        out[1] += h * a * k[1];
    }
    out
}

fn growth(err: f64) -> f64 {
    if err == 0.0 {
        return MAX_FACTOR;
    }
    (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
}

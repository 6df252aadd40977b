use std::f64::consts::PI;

pub const FOUR_PI: f64 = 4.0 * PI;
pub const FOUR_THIRDS_PI: f64 = 4.0 * PI / 3.0;

/* Non-relativistic degenerate neutron gas, natural units (G = c = 1) */
pub const GAMMA_NR: f64 = 5.0 / 3.0;
// (3 pi^2)^(5/3) / (15 pi^2), a function because powf is not const
pub fn k_nonrelativistic() -> f64 {
    (3.0 * PI * PI).powf(5.0 / 3.0) / (15.0 * PI * PI)
}

pub const NSTEPS: usize = 1000;          /* radial grid intervals */
pub const RMAX_FLOOR: f64 = 3.0;         /* r_max for the first star of a sweep */
pub const RMAX_GROWTH: f64 = 1.5;        /* r_max = growth * previous radius */
pub const MAX_RETRIES: usize = 12;       /* r_max doublings on a missed surface */

pub const P_MIN: f64 = 1e-6;
pub const P_MAX: f64 = 1e-1;
pub const NSAMPLES: usize = 60;

pub const RTOL: f64 = 1e-8;
pub const ATOL: f64 = 1e-14;
pub const MAX_SUBSTEPS: usize = 100_000; /* per grid interval */
pub const HMIN_FRAC: f64 = 1e-12;        /* smallest substep as fraction of dr */

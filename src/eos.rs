//! Polytropic equation of state, P = K rho^Gamma.
//!
//! The total energy density is the rest-mass density plus the internal
//! energy of an ideal gas with adiabatic index Gamma:
//!
//! eps = rho + P / (Gamma - 1),   rho = (P / K)^(1 / Gamma)

use crate::error::{require_positive, TovError};

/// Parameters of the polytropic closure. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polytrope {
    k: f64,
    gamma: f64,
}

impl Polytrope {
    /// Rejects K <= 0 and Gamma <= 1 (Gamma = 1 divides by zero in eps).
    pub fn new(k: f64, gamma: f64) -> Result<Self, TovError> {
        require_positive("K", k)?;
        if !gamma.is_finite() || gamma <= 1.0 {
            return Err(TovError::invalid("Gamma", gamma, "must be finite and > 1"));
        }
        Ok(Polytrope { k, gamma })
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Rest-mass density. Zero at and below the surface, so a pressure that
    /// overshot to a tiny negative value never reaches `powf`.
    pub fn rest_mass_density(&self, p: f64) -> f64 {
        if p <= 0.0 {
            return 0.0;
        }
        (p / self.k).powf(1.0 / self.gamma)
    }

    pub fn energy_density(&self, p: f64) -> f64 {
        if p <= 0.0 {
            return 0.0;
        }
        self.rest_mass_density(p) + p / (self.gamma - 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{k_nonrelativistic, GAMMA_NR};
    use assert_approx_eq::assert_approx_eq;

    fn neutron_gas() -> Polytrope {
        Polytrope::new(k_nonrelativistic(), GAMMA_NR).unwrap()
    }

    #[test]
    fn test_energy_density_vanishes_at_zero_pressure() {
        let eos = neutron_gas();
        assert_eq!(eos.energy_density(0.0), 0.0);
        assert_eq!(eos.rest_mass_density(0.0), 0.0);
    }

    #[test]
    fn test_negative_pressure_is_treated_as_surface() {
        let eos = neutron_gas();
        let eps = eos.energy_density(-1e-18);
        assert_eq!(eps, 0.0);
        assert!(!eps.is_nan());
    }

    #[test]
    fn test_energy_density_strictly_increasing() {
        for &(k, gamma) in &[(k_nonrelativistic(), GAMMA_NR), (100.0, 2.0), (0.05, 1.1)] {
            let eos = Polytrope::new(k, gamma).unwrap();
            let mut last = eos.energy_density(0.0);
            for i in 1..200 {
                let p = 10f64.powf(-12.0 + 0.06 * i as f64);
                let eps = eos.energy_density(p);
                assert!(eps > last, "eps({p}) = {eps} <= {last} for K={k}, Gamma={gamma}");
                last = eps;
            }
        }
    }

    #[test]
    fn test_energy_density_value() {
        let eos = Polytrope::new(2.0, 2.0).unwrap();
        // rho = sqrt(8 / 2) = 2, eps = 2 + 8 / 1
        assert_approx_eq!(eos.energy_density(8.0), 10.0, 1e-12);
    }

    #[test]
    fn test_rest_mass_density_satisfies_closure() {
        let eos = neutron_gas();
        let p = 3.7e-4;
        let rho = eos.rest_mass_density(p);
        assert_approx_eq!(eos.k() * rho.powf(eos.gamma()), p, 1e-16);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(matches!(
            Polytrope::new(1.0, 1.0),
            Err(TovError::InvalidParameter { name: "Gamma", .. })
        ));
        assert!(Polytrope::new(1.0, 0.5).is_err());
        assert!(Polytrope::new(0.0, 2.0).is_err());
        assert!(Polytrope::new(-1.0, 2.0).is_err());
        assert!(Polytrope::new(f64::NAN, 2.0).is_err());
    }
}

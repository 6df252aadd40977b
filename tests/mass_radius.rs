use approx::assert_relative_eq;
use tov_rs::consts::{k_nonrelativistic, GAMMA_NR, NSTEPS};
use tov_rs::grid::pressure_grid;
use tov_rs::{Integrator, Polytrope, SurfaceLocation, SweepConfig, SweepDriver, TovError};

fn neutron_gas() -> Polytrope {
    Polytrope::new(k_nonrelativistic(), GAMMA_NR).unwrap()
}

#[test]
fn test_degenerate_gas_surface_inside_domain() {
    let integrator = Integrator::new(neutron_gas(), 1000).unwrap();
    let surface = integrator.mass_radius(1e-4, 100.0).unwrap();
    assert!(surface.mass > 0.0);
    assert!(surface.radius.is_finite());
    assert!(surface.radius < 100.0);
    assert!(surface.radius > 2.0 * surface.mass);
    // a Newtonian n = 1.5 polytrope with this central pressure has R ~ 6
    assert!(surface.radius > 3.0 && surface.radius < 8.0, "R = {}", surface.radius);
}

#[test]
fn test_gamma_one_rejected() {
    let err = Polytrope::new(k_nonrelativistic(), 1.0).unwrap_err();
    assert!(matches!(err, TovError::InvalidParameter { .. }));
}

#[test]
fn test_small_domain_reports_missing_surface() {
    let integrator = Integrator::new(neutron_gas(), NSTEPS).unwrap();
    let err = integrator.mass_radius(1e-4, 2.0).unwrap_err();
    assert!(matches!(err, TovError::SurfaceNotFound { .. }));
}

#[test]
fn test_repeat_solve_is_bit_identical() {
    let integrator = Integrator::new(neutron_gas(), NSTEPS).unwrap();
    let a = integrator.mass_radius(3e-4, 50.0).unwrap();
    let b = integrator.mass_radius(3e-4, 50.0).unwrap();
    assert_eq!(a.mass.to_bits(), b.mass.to_bits());
    assert_eq!(a.radius.to_bits(), b.radius.to_bits());
}

#[test]
fn test_no_horizon_along_curve() {
    let pressures = pressure_grid(1e-5, 1e-1, 12).unwrap();
    let curve = SweepDriver::new(Integrator::new(neutron_gas(), NSTEPS).unwrap())
        .run(pressures.as_slice().unwrap())
        .unwrap();
    assert_eq!(curve.len(), 12);
    for pt in &curve {
        assert!(pt.mass >= 0.0);
        assert!(pt.radius > 2.0 * pt.mass, "{:?}", pt);
    }
}

#[test]
fn test_small_perturbation_gives_small_change() {
    let integrator = Integrator::new(neutron_gas(), NSTEPS)
        .unwrap()
        .with_surface_location(SurfaceLocation::Interpolated);
    for &pc in &[1e-5, 1e-4, 1e-3] {
        let a = integrator.mass_radius(pc, 30.0).unwrap();
        let b = integrator.mass_radius(pc * (1.0 + 1e-6), 30.0).unwrap();
        assert_relative_eq!(a.mass, b.mass, max_relative = 1e-4);
        assert_relative_eq!(a.radius, b.radius, max_relative = 1e-3);
    }
}

#[test]
fn test_curve_is_smooth() {
    let cfg = SweepConfig {
        p_min: 1e-5,
        p_max: 3e-4,
        samples: 20,
        surface: SurfaceLocation::Interpolated,
        ..Default::default()
    };
    let pressures = cfg.pressures().unwrap();
    let curve = cfg.driver().unwrap().run(&pressures.to_vec()).unwrap();
    let points = curve.points();
    for w in points.windows(2) {
        assert!(w[1].mass > w[0].mass, "mass should still grow below the maximum");
        assert!(w[1].radius < w[0].radius);
        assert_relative_eq!(w[1].mass, w[0].mass, max_relative = 0.2);
        assert_relative_eq!(w[1].radius, w[0].radius, max_relative = 0.1);
    }
}

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use tov_rs::output::{write_array2, write_mass_radius, write_profile, MASS_RADIUS_HEADER};
use tov_rs::{SurfaceLocation, SweepConfig};

#[derive(Parser)]
#[command(name = "tov_rs")]
#[command(version)]
#[command(about = "Mass-radius curves of polytropic stars from the TOV equations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML sweep configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Polytropic constant K
    #[arg(long, global = true)]
    k: Option<f64>,

    /// Adiabatic index Gamma
    #[arg(long, global = true)]
    gamma: Option<f64>,

    /// Radial grid intervals per star
    #[arg(short = 'n', long, global = true)]
    n_steps: Option<usize>,

    /// Interpolate the surface to P = 0 instead of reporting the last grid point
    #[arg(long, global = true)]
    interpolate: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace the mass-radius curve over log-spaced central pressures
    Sweep {
        #[arg(long)]
        p_min: Option<f64>,

        #[arg(long)]
        p_max: Option<f64>,

        /// Number of central pressures
        #[arg(short, long)]
        samples: Option<usize>,

        /// CSV output (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Integrate a single star
    Star {
        /// Central pressure
        #[arg(long)]
        pc: f64,

        /// Outer radius of the integration domain
        #[arg(long, default_value = "100")]
        r_max: f64,

        /// Write the interior profile (r, m, P, eps) to this CSV file
        #[arg(short, long)]
        profile: Option<PathBuf>,
    },
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

fn load_config(cli: &Cli) -> Result<SweepConfig> {
    let mut cfg = match &cli.config {
        Some(path) => SweepConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SweepConfig::default(),
    };
    if let Some(k) = cli.k {
        cfg.k = k;
    }
    if let Some(gamma) = cli.gamma {
        cfg.gamma = gamma;
    }
    if let Some(n) = cli.n_steps {
        cfg.n_steps = n;
    }
    if cli.interpolate {
        cfg.surface = SurfaceLocation::Interpolated;
    }
    Ok(cfg)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    let start = Instant::now();
    let mut cfg = load_config(&cli)?;

    match &cli.command {
        Commands::Sweep {
            p_min,
            p_max,
            samples,
            output,
        } => {
            if let Some(p) = p_min {
                cfg.p_min = *p;
            }
            if let Some(p) = p_max {
                cfg.p_max = *p;
            }
            if let Some(n) = samples {
                cfg.samples = *n;
            }
            cfg.validate().context("invalid sweep configuration")?;

            let pressures = cfg.pressures()?;
            let curve = cfg.driver()?.run(&pressures.to_vec())?;

            if let Some(pt) = curve.max_mass() {
                info!(
                    pc = pt.central_pressure,
                    mass = pt.mass,
                    radius = pt.radius,
                    "maximum mass"
                );
            }
            match output {
                Some(path) => write_mass_radius(&curve, path)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => write_array2(
                    &curve.to_array2(),
                    Some(&MASS_RADIUS_HEADER[..]),
                    std::io::stdout().lock(),
                )?,
            }
        }
        Commands::Star { pc, r_max, profile } => {
            let integrator = cfg.integrator()?;
            let star = integrator.solve(*pc, *r_max)?;
            println!(
                "Pc = {:e}  M = {:.6}  R = {:.6}  M/R = {:.6}",
                star.central_pressure,
                star.surface.mass,
                star.surface.radius,
                star.surface.compactness()
            );
            if let Some(path) = profile {
                write_profile(&star.profile, integrator.eos(), path)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
        }
    }

    info!(elapsed = start.elapsed().as_secs_f64(), "done");
    Ok(())
}

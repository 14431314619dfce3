use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{info, warn};
use nalgebra::Matrix3;
use pwbasis::{GvecSet, Result};

#[derive(Parser)]
#[command(name = "pwbasis")]
#[command(about = "Plane-wave G-vector basis inspection tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Number of threads to use (default: all available cores)
    #[arg(short, long)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate the G-vector set of a lattice and print its totals
    Count {
        /// Lattice type
        #[arg(short, long, default_value = "cubic")]
        lattice: String,

        /// Lattice parameter a
        #[arg(short, long, default_value = "1.0")]
        a: f64,

        /// Plane-wave cutoff
        #[arg(short, long, default_value = "4.0")]
        cutoff: f64,

        /// Reduce the set by inversion symmetry
        #[arg(short, long)]
        reduce: bool,
    },
    /// Print the shell radii and multiplicities of a G-vector set
    Shells {
        /// Lattice type
        #[arg(short, long, default_value = "cubic")]
        lattice: String,

        /// Lattice parameter a
        #[arg(short, long, default_value = "1.0")]
        a: f64,

        /// Plane-wave cutoff
        #[arg(short, long, default_value = "4.0")]
        cutoff: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Set thread pool size if specified
    if let Some(threads) = cli.threads {
        #[cfg(feature = "parallel")]
        {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .map_err(|e| format!("Failed to set thread pool size: {}", e))?;
            info!("Using {} threads", threads);
        }
        #[cfg(not(feature = "parallel"))]
        {
            warn!("Thread count specified but parallel feature not enabled. Ignoring.");
        }
    }

    info!("Starting pwbasis v{}", pwbasis::VERSION);

    match cli.command {
        Commands::Count {
            lattice,
            a,
            cutoff,
            reduce,
        } => {
            let basis = reciprocal_lattice(&lattice, a)?;
            let set = GvecSet::solo(basis, cutoff, reduce)?;
            println!(
                "{} G-vectors in {} z-columns, {} shells",
                set.num_gvec(),
                set.num_zcols(),
                set.num_shells()
            );
            Ok(())
        }
        Commands::Shells { lattice, a, cutoff } => {
            let basis = reciprocal_lattice(&lattice, a)?;
            let set = GvecSet::solo(basis, cutoff, false)?;
            let mut multiplicity = vec![0usize; set.num_shells()];
            for ig in 0..set.num_gvec() {
                multiplicity[set.shell(ig)] += 1;
            }
            println!("{:>6} {:>16} {:>8}", "shell", "|G|", "count");
            for shell in 0..set.num_shells() {
                println!(
                    "{:>6} {:>16.10} {:>8}",
                    shell,
                    set.shell_len(shell),
                    multiplicity[shell]
                );
            }
            Ok(())
        }
    }
}

/// Reciprocal lattice vectors of a few reference cells, columns scaled by
/// 2*pi/a.
fn reciprocal_lattice(name: &str, a: f64) -> Result<Matrix3<f64>> {
    let tau = 2.0 * std::f64::consts::PI / a;
    match name {
        "cubic" => Ok(Matrix3::identity() * tau),
        // Reciprocal of FCC is BCC-shaped and vice versa.
        "fcc" => Ok(Matrix3::new(
            -1.0, 1.0, 1.0,
            1.0, -1.0, 1.0,
            1.0, 1.0, -1.0,
        ) * tau),
        "bcc" => Ok(Matrix3::new(
            0.0, 1.0, 1.0,
            1.0, 0.0, 1.0,
            1.0, 1.0, 0.0,
        ) * tau),
        other => Err(format!("unknown lattice type: {}", other).into()),
    }
}

use std::{
    fs::File,
    io::BufReader,
    num::NonZeroU32,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use scf_core::{
    basis::BasisSet,
    config::{ConfigGeometry, ConfigIntegrals, ScfConfig},
    geometry::Geometry,
    hf::{
        restricted_hartree_fock, unrestricted_hartree_fock, HartreeFockInput, HartreeFockOutput,
        RestrictedScfOutput, UnrestrictedScfOutput,
    },
    integrals::{GaussianEngine, IntegralEngine, IntegralSet, TabulatedEngine},
};
use serde::de::DeserializeOwned;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: ScfCommand,

    /// Log every SCF iteration
    #[arg(long, short, global = true, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum ScfCommand {
    /// Restricted closed-shell hartree fock
    #[command(name = "rhf")]
    RestrictedHartreeFock(RunArgs),
    /// Unrestricted hartree fock
    #[command(name = "uhf")]
    UnrestrictedHartreeFock(RunArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// A path to the molecule to perform the calculation on
    #[arg(long, short)]
    molecule: PathBuf,
    /// What basis set to use for the hartree fock calculation
    #[arg(long, short, default_value = "sto-3g")]
    basis_set: String,
    /// Use the precomputed integrals in this file instead of computing them
    #[arg(long)]
    integrals: Option<PathBuf>,
    /// A path to SCF settings. Flags given on the command line take precedence.
    #[arg(long)]
    config: Option<PathBuf>,
    /// The charge of the molecule
    #[arg(long, short, allow_negative_numbers = true)]
    charge: Option<i32>,
    /// The spin multiplicity of the molecule
    #[arg(long)]
    multiplicity: Option<NonZeroU32>,
    /// The maximum number of iterations the SCF loop should attempt before giving up
    #[arg(long)]
    max_iterations: Option<usize>,
    /// if the total energy changes by less than this between two iterations, the system
    /// is considered converged
    #[arg(long)]
    energy_tolerance: Option<f64>,
    /// Don't extrapolate Fock matrices with DIIS
    #[arg(long)]
    no_diis: bool,
    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

fn load<T: DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let file = File::open(path).with_context(|| format!("failed to open {what} {path:?}"))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {what} {path:?}"))
}

/// Everything a run needs, resolved from the command line and the files it names
struct Setup {
    geometry: Geometry,
    basis_set: BasisSet,
    config: ScfConfig,
    engine: Box<dyn IntegralEngine>,
}

impl Setup {
    fn from_args(args: &RunArgs, verbose: bool) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => load::<ScfConfig>(path, "SCF config")?,
            None => ScfConfig::default(),
        };
        if let Some(max_iterations) = args.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(energy_tolerance) = args.energy_tolerance {
            config.energy_tolerance = energy_tolerance;
        }
        config.use_diis &= !args.no_diis;
        config.verbose |= verbose;
        config.validate()?;

        let mut molecule = load::<ConfigGeometry>(&args.molecule, "molecule")?;
        if let Some(charge) = args.charge {
            molecule.override_charge(charge);
        }
        if let Some(multiplicity) = args.multiplicity {
            molecule.override_multiplicity(multiplicity);
        }
        let geometry = Geometry::try_from(molecule).context("invalid molecule")?;

        let basis_set = BasisSet::named(&args.basis_set)?;

        let engine: Box<dyn IntegralEngine> = match &args.integrals {
            Some(path) => {
                let integrals = load::<ConfigIntegrals>(path, "integrals")?;
                let integrals = IntegralSet::try_from(integrals).context("invalid integrals")?;
                Box::new(TabulatedEngine::new(integrals))
            }
            None => Box::new(GaussianEngine),
        };

        Ok(Self {
            geometry,
            basis_set,
            config,
            engine,
        })
    }

    fn input(&self) -> HartreeFockInput<'_> {
        HartreeFockInput {
            geometry: &self.geometry,
            basis_set: &self.basis_set,
            config: &self.config,
        }
    }
}

fn print_restricted(output: &HartreeFockOutput<RestrictedScfOutput>) {
    let scf = &output.scf;
    println!("electronic energy: {:.10}", scf.electronic_energy);
    println!("  one electron: {:.10}", scf.one_electron_energy);
    println!("  two electron: {:.10}", scf.two_electron_energy);
    println!("nuclear repulsion energy: {:.10}", scf.nuclear_repulsion);
    println!("hartree fock energy: {:.10}", scf.total_energy);
    println!("orbital energies: {:.6?}", scf.orbital_energies.as_slice());
    println!("dipole moment: {:.6?}", output.dipole_moment.as_slice());
}

fn print_unrestricted(output: &HartreeFockOutput<UnrestrictedScfOutput>) {
    let scf = &output.scf;
    println!("electronic energy: {:.10}", scf.electronic_energy);
    println!("  one electron: {:.10}", scf.one_electron_energy);
    println!("  two electron: {:.10}", scf.two_electron_energy);
    println!("nuclear repulsion energy: {:.10}", scf.nuclear_repulsion);
    println!("hartree fock energy: {:.10}", scf.total_energy);
    println!(
        "orbital energies alpha spin: {:.6?}",
        scf.orbital_energies_alpha.as_slice()
    );
    println!(
        "orbital energies beta spin:  {:.6?}",
        scf.orbital_energies_beta.as_slice()
    );
    println!("dipole moment: {:.6?}", output.dipole_moment.as_slice());
}

fn report_convergence(converged: bool, iterations: usize, start: Instant) -> anyhow::Result<()> {
    if converged {
        println!(
            "hartree fock converged after {iterations} iterations and {:0.2?}",
            start.elapsed()
        );
        Ok(())
    } else {
        bail!("hartree fock did not converge within {iterations} iterations, the values above are not a solution")
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    pretty_env_logger::formatted_builder()
        .filter_level(level)
        .parse_default_env()
        .init();

    match &cli.command {
        ScfCommand::RestrictedHartreeFock(args) => {
            let setup = Setup::from_args(args, cli.verbose)?;

            let start = Instant::now();
            let output = restricted_hartree_fock(&setup.input(), setup.engine.as_ref())?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_restricted(&output);
            }
            report_convergence(output.scf.converged, output.scf.iterations, start)
        }
        ScfCommand::UnrestrictedHartreeFock(args) => {
            let setup = Setup::from_args(args, cli.verbose)?;

            let start = Instant::now();
            let output = unrestricted_hartree_fock(&setup.input(), setup.engine.as_ref())?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_unrestricted(&output);
            }
            report_convergence(output.scf.converged, output.scf.iterations, start)
        }
    }
}

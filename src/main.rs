//! framepack CLI - pack files into a framed archive, or unpack one

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use framepack::ops::{count_tree, list_file, pack_paths, unpack_file, Listener, Silent, Visit};
use framepack::Config;

#[derive(Parser)]
#[command(name = "framepack")]
#[command(about = "pack FILE... into OUTFILE, or unpack a single INFILE")]
#[command(version)]
struct Cli {
    /// FILE... OUTFILE to pack, or INFILE to unpack
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// directory to unpack into
    #[arg(short = 'C', long, value_name = "DIR", default_value = ".")]
    directory: PathBuf,

    /// list the archive instead of unpacking it
    #[arg(short, long)]
    list: bool,

    /// configuration file (toml)
    #[arg(long, env = "FRAMEPACK_CONFIG")]
    config: Option<PathBuf>,

    /// do not print the entry listing
    #[arg(short, long)]
    quiet: bool,

    /// more log output (repeat for debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list && cli.paths.len() != 1 {
        Cli::command()
            .error(ErrorKind::ArgumentConflict, "--list takes exactly one archive")
            .exit();
    }

    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> framepack::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let mut silent = Silent;
    let mut print = |v: &Visit<'_>| println!("  {}", v);
    let listener: &mut dyn Listener = if cli.quiet { &mut silent } else { &mut print };

    match cli.paths.split_last() {
        Some((output, inputs)) if !inputs.is_empty() => {
            if tracing::enabled!(tracing::Level::INFO) {
                for input in inputs {
                    let expected = count_tree(input);
                    tracing::info!(input = %input.display(), expected = %expected, "scanned input");
                }
            }

            if !cli.quiet {
                println!("Contents of Archive:");
            }
            let stats = pack_paths(inputs, output, config.limits, listener)?;
            if !cli.quiet {
                println!("{}", stats);
            }
        }

        Some((archive, _)) if cli.list => {
            let stats = list_file(archive, &config, listener)?;
            if !cli.quiet {
                println!("{}", stats);
            }
        }

        Some((archive, _)) => {
            if !cli.quiet {
                println!("Contents of Extracted Archive:");
            }
            let stats = unpack_file(archive, &cli.directory, &config, listener)?;
            if !cli.quiet {
                println!("{}", stats);
            }
        }

        // clap requires at least one path
        None => {}
    }

    Ok(())
}

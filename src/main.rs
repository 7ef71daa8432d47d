//! Punto de entrada ("driver").
//!
//! Este módulo lee el archivo fuente, invoca al compilador y escribe el
//! ensamblador resultante. El archivo de salida solo se crea si la
//! compilación tuvo éxito.

use anyhow::{self, bail, Context};
use clap::{crate_version, Arg, ArgAction, Command};
use tracing::Level;

use std::{
    fs::File,
    io::{self, BufWriter},
};

fn main() -> anyhow::Result<()> {
    // Parsing de CLI
    let args = Command::new("slc")
        .version(crate_version!())
        .about("SL compiler for the accumulator machine")
        .arg(
            Arg::new("input")
                .required(true)
                .value_name("INPUT")
                .help("Source file"),
        )
        .arg(
            Arg::new("output")
                .required(true)
                .value_name("OUTPUT")
                .help("Assembly output file ('-' for stdout)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Log compiler stages to stderr (repeat for more detail)"),
        )
        .get_matches();

    let level = match args.get_count("verbose") {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    // Ambos son obligatorios, clap ya rechazó su ausencia
    let input = args
        .get_one::<String>("input")
        .context("Missing input path")?;
    let output = args
        .get_one::<String>("output")
        .context("Missing output path")?;

    let file = File::open(input).with_context(|| format!("Failed to open for reading: {}", input))?;

    let program = match slc::compile(file, input) {
        Ok(program) => program,
        Err(diagnostics) => {
            eprint!("{}", diagnostics);
            bail!("Failed to compile: {}", input);
        }
    };

    match output.as_str() {
        "-" => {
            let stdout = io::stdout();
            program
                .write(&mut stdout.lock())
                .context("Failed to emit to stdout")?;
        }

        path => {
            let file = File::create(path)
                .with_context(|| format!("Failed to open for writing: {}", path))?;

            program
                .write(&mut BufWriter::new(file))
                .with_context(|| format!("Failed to emit to file: {}", path))?;

            println!(
                "Compilation successful. Generated {} assembly lines in {}",
                program.len(),
                path
            );
        }
    }

    Ok(())
}

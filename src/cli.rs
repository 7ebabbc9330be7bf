use crate::{
    adapters::csv::{self, Table},
    config::{Config, Input, OnFormatError},
    gateways,
    progress::ProgressReporter,
};
use addrgeo_core::{
    entities::*,
    gateways::{geocode::GeoCodingGateway, progress::ProgressObserver},
    resolve::{Pause, Resolver},
    usecases::{self, BatchOutcome},
};
use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::{
    fs::File,
    io::{self, BufReader, BufWriter},
    path::{Path, PathBuf},
    sync::atomic::AtomicBool,
};

#[derive(Debug, Parser)]
#[command(
    name = "addrgeo",
    version,
    about = "Normalize German postal addresses and resolve their coordinates"
)]
struct Args {
    /// Configuration file (default: addrgeo.toml if present)
    #[arg(long, short, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge the address columns and resolve the coordinates of every row
    Geocode {
        #[arg(long, short, value_name = "CSV")]
        input: PathBuf,
        #[arg(long, short, value_name = "CSV")]
        output: PathBuf,
        /// Where to write addresses that could not be resolved
        /// (default: <OUTPUT>_missed.csv)
        #[arg(long, value_name = "CSV")]
        missed: Option<PathBuf>,
    },
    /// Merge the address columns without resolving coordinates
    Normalize {
        #[arg(long, short, value_name = "CSV")]
        input: PathBuf,
        #[arg(long, short, value_name = "CSV")]
        output: PathBuf,
    },
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let cfg = Config::try_load_from_file_or_default(args.config.as_deref())?;
    match args.command {
        Command::Geocode {
            input,
            output,
            missed,
        } => {
            let missed = missed.unwrap_or_else(|| csv::missed_path(&output));
            geocode(&cfg, &input, &output, &missed)
        }
        Command::Normalize { input, output } => normalize(&cfg, &input, &output),
    }
}

fn open_input(path: &Path) -> Result<BufReader<File>> {
    log::info!("Reading {}", path.display());
    let file = File::open(path).with_context(|| format!("Unable to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    log::info!("Writing {}", path.display());
    let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn load_addresses<R: io::Read>(
    cfg: &Input,
    rdr: R,
) -> Result<(Table, Vec<Option<CanonicalAddress>>)> {
    let table = csv::read_table(rdr, cfg.delimiter)?;
    let inputs = table.address_inputs()?;

    log::info!("Standardizing {} addresses", inputs.len());
    let mut addresses = Vec::with_capacity(inputs.len());
    for (index, merged) in usecases::merge_addresses(&inputs).into_iter().enumerate() {
        let row = index + 1;
        match merged {
            Ok(addr) => addresses.push(Some(addr)),
            Err(err) => match cfg.on_format_error {
                OnFormatError::Skip => {
                    log::warn!("Skipping row {row}: {err}");
                    addresses.push(None);
                }
                OnFormatError::Abort => {
                    return Err(err).with_context(|| format!("Invalid address in row {row}"));
                }
            },
        }
    }
    Ok((table, addresses))
}

fn normalize(cfg: &Config, input: &Path, output: &Path) -> Result<()> {
    let (mut table, addresses) = load_addresses(&cfg.input, open_input(input)?)?;
    table.set_column(
        csv::ADDRESS_COLUMN,
        addresses
            .iter()
            .map(|x| x.as_ref().map(ToString::to_string).unwrap_or_default())
            .collect(),
    );
    csv::write_table(create_output(output)?, cfg.input.delimiter, &table)?;
    Ok(())
}

fn geocode(cfg: &Config, input: &Path, output: &Path, missed: &Path) -> Result<()> {
    let gateway = gateways::geocoding_gateway(&cfg.geocoding)?;
    let resolver = Resolver::new(gateway, cfg.resolver.clone());
    log::debug!("{:?}", resolver.policy());
    let reporter = ProgressReporter::new(0);
    let outcome = geocode_table(
        &cfg.input,
        &resolver,
        open_input(input)?,
        || create_output(output),
        || create_output(missed),
        &reporter,
    );
    reporter.finish();
    let outcome = outcome?;
    if outcome.unresolved.is_empty() {
        log::info!("All addresses resolved");
    } else {
        log::info!(
            "Wrote {} missed addresses to {}",
            outcome.unresolved.len(),
            missed.display()
        );
    }
    Ok(())
}

/// Reads the address table, resolves every valid row and writes the
/// annotated table.
///
/// The output is only opened once all rows could be read, and the missed
/// addresses only if there are any.
fn geocode_table<G, P, R, W, M, FW, FM, O>(
    cfg: &Input,
    resolver: &Resolver<G, P>,
    rdr: R,
    open_output: FW,
    open_missed: FM,
    observer: &O,
) -> Result<BatchOutcome>
where
    G: GeoCodingGateway,
    P: Pause,
    R: io::Read,
    W: io::Write,
    M: io::Write,
    FW: FnOnce() -> Result<W>,
    FM: FnOnce() -> Result<M>,
    O: ProgressObserver + ?Sized,
{
    let (mut table, addresses) = load_addresses(cfg, rdr)?;
    let valid: Vec<CanonicalAddress> = addresses.iter().flatten().cloned().collect();
    let cancel = AtomicBool::new(false);
    let outcome = usecases::geocode_addresses(resolver, &valid, observer, &cancel);
    log::info!(
        "Resolved {} of {} addresses",
        outcome.resolved_count(),
        valid.len()
    );

    let positions = assign_positions(&addresses, &outcome.results);
    table.annotate(&addresses, &positions);
    csv::write_table(open_output()?, cfg.delimiter, &table)?;
    if !outcome.unresolved.is_empty() {
        csv::write_unresolved(open_missed()?, cfg.delimiter, &outcome.unresolved)?;
    }
    Ok(outcome)
}

/// Maps the results of the geocoded addresses back onto all rows,
/// including the ones that were skipped.
fn assign_positions(
    addresses: &[Option<CanonicalAddress>],
    results: &[Option<Coordinate>],
) -> Vec<Option<Coordinate>> {
    let mut results = results.iter().copied();
    addresses
        .iter()
        .map(|addr| addr.as_ref().and_then(|_| results.next().flatten()))
        .collect()
}

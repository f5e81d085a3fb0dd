// SPDX-License-Identifier: AGPL-3.0-only

//! `atheep`: EEPROM inspector for Atheros AR9287 wireless chips.
//!
//! ```text
//! USAGE:
//!   atheep list                          List Atheros PCI functions
//!   atheep dump --pci <addr> [-s sect]   Read, validate and print the EEPROM
//!   atheep dump --file <dump> [-s sect]  Same, from a raw dump file
//!   atheep save --pci <addr> <output>    Validate and save a raw dump
//! ```

mod report;

use anyhow::{Context, Result};
use atheep_driver::{
    discover, open_backend, read_eeprom, BackendSelection, EepromSession, PollConfig, SwapState,
};
use clap::{Args, Parser, Subcommand};
use report::Section;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "atheep", about = "Atheros EEPROM inspector", version)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List Atheros PCI devices.
    List,
    /// Read, validate and print the EEPROM.
    Dump {
        #[command(flatten)]
        source: SourceArgs,
        /// Report section to print.
        #[arg(short, long, value_enum, default_value_t = Section::All)]
        section: Section,
    },
    /// Read, validate and save the raw EEPROM words.
    Save {
        #[command(flatten)]
        source: SourceArgs,
        /// Output file (little-endian words).
        output: PathBuf,
    },
}

#[derive(Args)]
struct SourceArgs {
    #[command(flatten)]
    target: Target,

    /// Start with byte-swapped word transfers.
    #[arg(long)]
    swap: bool,

    /// EEPROM busy-wait timeout in microseconds.
    #[arg(long, value_name = "US")]
    timeout_us: Option<u64>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct Target {
    /// PCIe address (e.g. 0000:02:00.0).
    #[arg(long, value_name = "ADDR")]
    pci: Option<String>,

    /// Raw EEPROM dump file.
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
}

impl SourceArgs {
    fn selection(&self) -> Result<BackendSelection> {
        let poll = self
            .timeout_us
            .map_or_else(PollConfig::default, |us| {
                PollConfig::with_timeout(Duration::from_micros(us))
            });

        match (&self.target.pci, &self.target.file) {
            (Some(address), None) => Ok(BackendSelection::Pci {
                address: address.clone(),
                poll,
            }),
            (None, Some(path)) => Ok(BackendSelection::Dump(path.clone())),
            _ => anyhow::bail!("exactly one of --pci or --file is required"),
        }
    }

    fn read(&self) -> Result<atheep_driver::Eeprom> {
        let selection = self.selection()?;
        tracing::debug!("Opening {selection:?} (swap={})", self.swap);
        let backend = open_backend(&selection).context("opening EEPROM backend")?;
        let mut session = EepromSession::with_swap(backend, SwapState::new(self.swap));
        read_eeprom(&mut session).context("reading EEPROM")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .init();

    match cli.command {
        Cmd::List => cmd_list()?,
        Cmd::Dump { source, section } => cmd_dump(&source, section)?,
        Cmd::Save { source, output } => cmd_save(&source, &output)?,
    }

    Ok(())
}

fn cmd_list() -> Result<()> {
    let devices = discover()?;

    println!("Atheros devices: {}", devices.len());
    for dev in &devices {
        let note = if dev.family.uses_ar9287_map() {
            ""
        } else {
            "  (EEPROM map not supported)"
        };
        println!(
            "  {}  {:04x}:{:04x}  {}{note}",
            dev.pcie_address,
            atheep_chip::pcie::ATHEROS_VENDOR_ID,
            dev.device_id,
            dev.family
        );
    }

    Ok(())
}

fn cmd_dump(source: &SourceArgs, section: Section) -> Result<()> {
    let eeprom = source.read()?;

    let mut out = String::new();
    report::render(&mut out, &eeprom, section)?;
    print!("{out}");
    Ok(())
}

fn cmd_save(source: &SourceArgs, output: &Path) -> Result<()> {
    let eeprom = source.read()?;
    atheep_driver::backends::save_dump(output, eeprom.raw.words())
        .with_context(|| format!("saving {}", output.display()))?;
    println!("Saved {} words to {}", eeprom.raw.len(), output.display());
    Ok(())
}

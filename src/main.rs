mod abi;
mod abi_source;
mod config;
mod standard;
mod types;

use std::{
    io::{self, Write},
    process::ExitCode,
    str::FromStr,
};

use clap::Parser;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use web3::types::Address;

use abi_source::{etherscan::Etherscan, AbiSource};
use config::{Cli, Config, OutputFormat};
use types::Classification;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let source = match Etherscan::new(&config.api_url, &config.api_key) {
        Ok(source) => source,
        Err(e) => {
            error!("could not set up HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = io::stdout().lock();
    match run(&source, &config.addresses, config.format, &mut stdout).await {
        Ok(summary) => {
            info!(
                classified = summary.classified,
                failed = summary.failed,
                "batch finished"
            );
            if summary.failed == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("could not write results: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so that stdout only carries results. `RUST_LOG`
/// overrides the default filter.
fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,tokenkind=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    classified: usize,
    failed: usize,
}

/// Classify every address in order, writing one result per classified
/// contract. A contract that can't be looked up is logged and skipped, the
/// rest of the batch still runs.
async fn run<S: AbiSource, W: Write>(
    source: &S,
    addresses: &[String],
    format: OutputFormat,
    out: &mut W,
) -> io::Result<Summary> {
    let mut summary = Summary::default();
    for address in addresses {
        match classify_contract(source, address).await {
            Some(classification) => {
                report(out, address, &classification, format)?;
                summary.classified += 1;
            }
            None => summary.failed += 1,
        }
    }
    Ok(summary)
}

async fn classify_contract<S: AbiSource>(source: &S, address: &str) -> Option<Classification> {
    if let Err(e) = Address::from_str(address.strip_prefix("0x").unwrap_or(address)) {
        warn!(address, error = %e, "not a contract address, skipping");
        return None;
    }

    let abi = match source.fetch_abi(address).await {
        Ok(abi) => abi,
        Err(e) => {
            warn!(address, error = %e, "could not fetch ABI, skipping");
            return None;
        }
    };

    let classification = Classification::of(&abi);
    debug!(
        address,
        members = abi.members().len(),
        erc721 = ?classification.erc721.points,
        erc1155 = ?classification.erc1155.points,
        "checked interface"
    );
    Some(classification)
}

#[derive(Serialize)]
struct Report<'a> {
    contract: &'a str,
    #[serde(flatten)]
    classification: &'a Classification,
}

fn report<W: Write>(
    out: &mut W,
    address: &str,
    classification: &Classification,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Line => writeln!(
            out,
            "contract: {} standard: {}",
            address, classification.contract_type
        ),
        OutputFormat::Json => {
            let line = serde_json::to_string(&Report {
                contract: address,
                classification,
            })?;
            writeln!(out, "{}", line)
        }
    }
}

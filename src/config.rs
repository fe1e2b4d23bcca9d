use clap::Parser;
use std::{fs, io, path::PathBuf};

use crate::abi_source::etherscan::DEFAULT_API_URL;

#[derive(Parser, Debug)]
#[command(
    name = "tokenkind",
    version,
    about = "Classify contracts as ERC-721 or ERC-1155 from their verified ABI"
)]
pub struct Cli {
    /// Contract addresses to classify
    pub addresses: Vec<String>,

    /// Read more addresses from a file, one per line (`#` starts a comment)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Etherscan API key
    #[arg(long, env = "ETHERSCAN_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Etherscan compatible API endpoint
    #[arg(long, env = "ETHERSCAN_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Print one JSON object per contract, including every check result
    #[arg(long)]
    pub json: bool,

    /// Log per contract check details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not read address file {}: {source}", .path.display())]
    AddressFile { path: PathBuf, source: io::Error },
    #[error("no contract addresses given")]
    NoAddresses,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Line,
    Json,
}

#[derive(Debug)]
pub struct Config {
    pub api_url: String,
    pub api_key: String,
    /// In processing order: command line first, then the file.
    pub addresses: Vec<String>,
    pub format: OutputFormat,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, Error> {
        let mut addresses = cli.addresses;
        if let Some(path) = cli.file {
            let text = fs::read_to_string(&path)
                .map_err(|source| Error::AddressFile { path, source })?;
            addresses.extend(parse_address_list(&text));
        }

        if addresses.is_empty() {
            return Err(Error::NoAddresses);
        }

        Ok(Self {
            api_url: cli.api_url,
            api_key: cli.api_key,
            addresses,
            format: if cli.json {
                OutputFormat::Json
            } else {
                OutputFormat::Line
            },
        })
    }
}

fn parse_address_list(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(["tokenkind", "--api-key", "KEY"].iter().chain(args)).unwrap()
    }

    #[test]
    fn addresses_from_arguments() {
        let config = Config::from_cli(cli(&["0xaa", "0xbb"])).unwrap();
        assert_eq!(config.addresses, vec!["0xaa", "0xbb"]);
        assert_eq!(config.api_key, "KEY");
        assert_eq!(config.format, OutputFormat::Line);
    }

    #[test]
    fn json_flag() {
        let config = Config::from_cli(cli(&["--json", "0xaa"])).unwrap();
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn api_url_flag() {
        let config =
            Config::from_cli(cli(&["--api-url", "https://api.polygonscan.com/api", "0xaa"]))
                .unwrap();
        assert_eq!(config.api_url, "https://api.polygonscan.com/api");
    }

    #[test]
    fn no_addresses() {
        assert!(matches!(Config::from_cli(cli(&[])), Err(Error::NoAddresses)));
    }

    #[test]
    fn missing_address_file() {
        let err = Config::from_cli(cli(&["--file", "/nonexistent/tokenkind/addresses.txt"]))
            .unwrap_err();
        assert!(matches!(err, Error::AddressFile { .. }));
        assert!(err.to_string().contains("/nonexistent/tokenkind/addresses.txt"));
    }

    #[test]
    fn address_file_and_arguments() {
        let path = std::env::temp_dir().join(format!("tokenkind-{}.txt", std::process::id()));
        fs::write(
            &path,
            "# marketplace contracts\n0xcc\n\n  0xdd  # trailing comment\n#0xee\n",
        )
        .unwrap();

        let config = Config::from_cli(cli(&["0xaa", "--file", path.to_str().unwrap()])).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.addresses, vec!["0xaa", "0xcc", "0xdd"]);
    }

    #[test]
    fn address_list_parsing() {
        let parsed: Vec<_> = parse_address_list("a\r\n # b\n c # d\n\n").collect();
        assert_eq!(parsed, vec!["a", "c"]);
    }
}

//! `ibctest`: offline helpers for IBC test networks. Patches reference genesis documents,
//! reports their quorum, computes IBC denominations and verifies network configurations.
#![allow(clippy::print_stdout)]
use anyhow::Context as _;
use clap::{Parser, Subcommand};
use ibc_testnet_crypto::{denom, sha256::Sha256};
use ibc_testnet_relay::TestCase;
use ibc_testnet_tools::{encode_json, patch_genesis, ConfigPaths, QuorumReport};
use std::{fs, io::IsTerminal as _, path::PathBuf};
use tracing::metadata::LevelFilter;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};

/// Command-line application for IBC test networks.
#[derive(Debug, Parser)]
struct Args {
    /// Also write DEBUG logs to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Hands the quorum of a reference genesis over to the given consensus keys.
    PatchGenesis {
        /// Reference genesis document.
        #[arg(long)]
        genesis: PathBuf,
        /// Consensus key files of the new validators, in the order of descending power.
        #[arg(long = "key-file", required = true)]
        key_files: Vec<PathBuf>,
        /// Bech32 prefix of account addresses of the chain.
        #[arg(long, default_value = "cosmos")]
        prefix: String,
        /// Where to write the patched document.
        #[arg(long)]
        out: PathBuf,
    },
    /// Prints the validators controlling more than two thirds of the voting power.
    Quorum {
        /// Genesis document.
        #[arg(long)]
        genesis: PathBuf,
    },
    /// Prints the IBC denomination of a token received over a channel.
    IbcDenom {
        /// Port on the receiving chain.
        #[arg(long, default_value = "transfer")]
        port: String,
        /// Channel on the receiving chain.
        #[arg(long)]
        channel: String,
        /// Denomination on the sending chain.
        #[arg(long)]
        denom: String,
    },
    /// Verifies a network configuration.
    VerifyConfig {
        /// Path to a JSON file with the configuration.
        #[arg(long, default_value = "config.json")]
        config_file: PathBuf,
    },
    /// Lists the relay test cases.
    ListTests,
}

fn init_logging(log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::env::var("NO_COLOR").is_err() && std::io::stderr().is_terminal())
        .with_file(false)
        .with_line_number(false)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        );
    let file_log = log_file
        .map(|path| -> anyhow::Result<_> {
            let file = fs::File::create(path).with_context(|| format!("File::create({path:?})"))?;
            Ok(tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file)
                .with_filter(LevelFilter::DEBUG))
        })
        .transpose()?;
    let subscriber = Registry::default().with(stderr_log).with(file_log);
    tracing::subscriber::set_global_default(subscriber).context("set_global_default()")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;
    tracing::trace!(?args, "starting");

    match args.command {
        Command::PatchGenesis {
            genesis,
            key_files,
            prefix,
            out,
        } => {
            let reference = fs::read(&genesis).with_context(|| format!("fs::read({genesis:?})"))?;
            let patched = patch_genesis(reference, &key_files, &prefix)?;
            fs::write(&out, &patched).with_context(|| format!("fs::write({out:?})"))?;
            println!("{}", Sha256::new(&patched));
        }
        Command::Quorum { genesis } => {
            let raw = fs::read(&genesis).with_context(|| format!("fs::read({genesis:?})"))?;
            println!("{}", encode_json(&QuorumReport::new(&raw)?)?);
        }
        Command::IbcDenom {
            port,
            channel,
            denom,
        } => println!("{}", denom::ibc_denom(&port, &channel, &denom)),
        Command::VerifyConfig { config_file } => {
            let cfg = ConfigPaths {
                config: &config_file,
            }
            .read()?;
            tracing::info!(
                src = %cfg.src.chain_id,
                dst = %cfg.dst.chain_id,
                "configuration verified"
            );
        }
        Command::ListTests => {
            for test_case in TestCase::ALL {
                println!("{test_case}");
            }
        }
    }
    Ok(())
}

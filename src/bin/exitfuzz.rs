extern crate exitfuzz;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use exitfuzz::chain_status::{ChainStatus, StatusConfig};
use exitfuzz::constants::{
    DEFAULT_BEACON_NODE, DEFAULT_TIMEOUT_SECS, EXIT_OPERATION_FILENAME,
    OFFLINE_PREPARATION_FILENAME,
};
use exitfuzz::exit::fuzz::FuzzConfig;
use exitfuzz::exit::input::KeyInputs;
use exitfuzz::exit::{ExitCommand, ExitConfig, Outcome};
use exitfuzz::logging::{init_logger, level_from_flags};

/// Build, fuzz, verify and submit voluntary exits for beacon chain validators
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print additional information
    #[arg(long, global = true)]
    verbose: bool,

    /// Print debug information
    #[arg(long, global = true)]
    debug: bool,

    /// Print nothing; the exit code reports success
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validator operations
    #[command(subcommand)]
    Validator(ValidatorCommand),
    /// Chain information
    #[command(subcommand)]
    Chain(ChainCommand),
}

#[derive(Subcommand, Debug)]
enum ValidatorCommand {
    /// Create and broadcast a (possibly fuzzed) voluntary exit
    Exit(ExitArgs),
}

#[derive(Subcommand, Debug)]
enum ChainCommand {
    /// Obtain the current epoch and finality of the chain
    Status(ConnectionArgs),
}

#[derive(Args, Debug)]
struct ConnectionArgs {
    /// URL of the beacon node
    #[arg(long, env = "EXITFUZZ_CONNECTION", default_value = DEFAULT_BEACON_NODE)]
    connection: String,

    /// Timeout for beacon node requests, in seconds
    #[arg(long, env = "EXITFUZZ_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
}

#[derive(Args, Debug)]
struct ExitArgs {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Do not connect to a beacon node; use the offline preparation file
    #[arg(long)]
    offline: bool,

    /// Write chain information for a later offline run [requires a beacon node]
    #[arg(long)]
    prepare_offline: bool,

    /// Mnemonic from which the validator key is derived [requires --path or --validator]
    #[arg(long, env = "EXITFUZZ_MNEMONIC", hide_env_values = true)]
    mnemonic: Option<String>,

    /// EIP-2334 path of the validator key, m/12381/3600/<i>/0/0
    #[arg(long)]
    path: Option<String>,

    /// Validator index or 0x-prefixed public key
    #[arg(long)]
    validator: Option<String>,

    /// Hex private key of the validator
    #[arg(long, env = "EXITFUZZ_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Path to an EIP-2335 keystore for the validator [requires --passphrase]
    #[arg(long)]
    account: Option<PathBuf>,

    /// Passphrase unlocking the keystore
    #[arg(long, env = "EXITFUZZ_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    /// Signed exit operation, as JSON or the path to a JSON file
    #[arg(long)]
    signed_operation: Option<String>,

    /// Fork version to sign with, overriding the chain's current version
    #[arg(long)]
    fork_version: Option<String>,

    /// Genesis validators root, overriding the chain's value
    #[arg(long)]
    genesis_validators_root: Option<String>,

    /// Write the operation as JSON instead of broadcasting it
    #[arg(long)]
    json: bool,

    /// Percentage chance of corrupting each field of the operation, 0 to 100
    #[arg(long, env = "EXITFUZZ_FUZZINESS", default_value_t = 0)]
    fuzziness: u8,

    /// Seed for the fuzzer; 0 picks a random seed
    #[arg(long, env = "EXITFUZZ_SEED", default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value = OFFLINE_PREPARATION_FILENAME)]
    offline_preparation_file: PathBuf,

    #[arg(long, default_value = EXIT_OPERATION_FILENAME)]
    exit_operation_file: PathBuf,
}

impl ExitArgs {
    fn into_config(self) -> exitfuzz::Result<ExitConfig> {
        Ok(ExitConfig {
            connection: self.connection.connection,
            timeout: Duration::from_secs(self.connection.timeout),
            offline: self.offline,
            prepare_offline: self.prepare_offline,
            inputs: KeyInputs {
                mnemonic: self.mnemonic,
                path: self.path,
                validator: self.validator,
                private_key: self.private_key,
                account: self.account,
                passphrase: self.passphrase,
                signed_operation: self.signed_operation,
            },
            fork_version: self.fork_version,
            genesis_validators_root: self.genesis_validators_root,
            json: self.json,
            fuzz: FuzzConfig::new(self.fuzziness, self.seed)?,
            offline_preparation_file: self.offline_preparation_file,
            exit_operation_file: self.exit_operation_file,
        })
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Validator(ValidatorCommand::Exit(args)) => {
            let config = args.into_config()?;
            let mut command = ExitCommand::new(config);
            let outcome = command.process().await.with_context(|| {
                format!("validator exit failed in state {:?}", command.state())
            })?;
            match outcome {
                Outcome::OfflinePrepared(path) => {
                    if !cli.quiet {
                        println!("{} generated", path.display());
                    }
                }
                Outcome::JsonOutput(operation) => {
                    println!("{}", serde_json::to_string(&operation)?);
                }
                Outcome::Broadcast(operation) => {
                    if cli.verbose {
                        println!(
                            "Exit for validator {} broadcast",
                            operation.message.validator_index
                        );
                    }
                }
            }
        }
        Command::Chain(ChainCommand::Status(args)) => {
            let config = StatusConfig {
                connection: args.connection,
                timeout: Duration::from_secs(args.timeout),
                verbose: cli.verbose,
            };
            let status = ChainStatus::fetch(&config)
                .await
                .context("failed to obtain chain status")?;
            if !cli.quiet {
                print!("{}", status.report(config.verbose));
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logger(level_from_flags(cli.quiet, cli.verbose, cli.debug));

    if let Err(e) = run(cli).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

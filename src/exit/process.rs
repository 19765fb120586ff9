use super::builder::build_signed_exit;
use super::fuzz::{FuzzConfig, FuzzInjector};
use super::input::{load_operation, InputSource, KeyInputs};
use super::key_resolver::{
    resolve_account, resolve_mnemonic_and_path, resolve_mnemonic_and_validator,
    resolve_private_key, ResolvedKey,
};
use super::verifier::verify_signed_exit;
use crate::beacon::chain_info::CHAIN_INFO_CAPABILITIES;
use crate::beacon::{
    ensure_capabilities, BeaconNodeClient, Capability, ChainInfo, ChainInfoProvider,
    OfflineProvider,
};
use crate::constants::{
    DEFAULT_BEACON_NODE, DEFAULT_TIMEOUT_SECS, EXIT_OPERATION_FILENAME,
    OFFLINE_PREPARATION_FILENAME,
};
use crate::errors::{ExitError, Result};
use crate::eth2::eth_signing::{compute_domain, obtain_fork_version, obtain_genesis_validators_root};
use crate::eth2::eth_types::{Domain, SignedVoluntaryExit};
use crate::io::files::{read_json, write_json_atomically};

use log::{debug, info};
use std::path::PathBuf;
use std::time::Duration;

/// Everything `validator exit` needs to run.
#[derive(Debug, Clone)]
pub struct ExitConfig {
    pub connection: String,
    pub timeout: Duration,
    pub offline: bool,
    pub prepare_offline: bool,
    pub inputs: KeyInputs,
    pub fork_version: Option<String>,
    pub genesis_validators_root: Option<String>,
    pub json: bool,
    pub fuzz: FuzzConfig,
    pub offline_preparation_file: PathBuf,
    pub exit_operation_file: PathBuf,
}

impl Default for ExitConfig {
    fn default() -> Self {
        ExitConfig {
            connection: DEFAULT_BEACON_NODE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            offline: false,
            prepare_offline: false,
            inputs: KeyInputs::default(),
            fork_version: None,
            genesis_validators_root: None,
            json: false,
            fuzz: FuzzConfig::default(),
            offline_preparation_file: PathBuf::from(OFFLINE_PREPARATION_FILENAME),
            exit_operation_file: PathBuf::from(EXIT_OPERATION_FILENAME),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    Setup,
    ChainInfoObtained,
    OfflinePrepared,
    DomainGenerated,
    OperationObtained,
    Validated,
    JsonOutput,
    Broadcast,
    Done,
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Chain information was written for a later offline run.
    OfflinePrepared(PathBuf),
    /// The operation was written out instead of being broadcast.
    JsonOutput(SignedVoluntaryExit),
    Broadcast(SignedVoluntaryExit),
}

pub struct ExitCommand {
    config: ExitConfig,
    state: ExitState,
    provider: Option<Box<dyn ChainInfoProvider>>,
    chain_info: Option<ChainInfo>,
    fuzz_seed: Option<u64>,
}

impl ExitCommand {
    pub fn new(config: ExitConfig) -> Self {
        ExitCommand {
            config,
            state: ExitState::Setup,
            provider: None,
            chain_info: None,
            fuzz_seed: None,
        }
    }

    /// Use ``provider`` in place of connecting to the configured beacon node. Offline runs
    /// refuse a provider.
    pub fn with_provider(config: ExitConfig, provider: Box<dyn ChainInfoProvider>) -> Self {
        ExitCommand {
            provider: Some(provider),
            ..Self::new(config)
        }
    }

    pub fn state(&self) -> ExitState {
        self.state
    }

    /// Seed the fuzzer ran with, once an operation has been built. Passing it back as the
    /// configured seed reproduces the same operation.
    pub fn fuzz_seed(&self) -> Option<u64> {
        self.fuzz_seed
    }

    fn advance(&mut self, state: ExitState) {
        debug!("{:?} -> {:?}", self.state, state);
        self.state = state;
    }

    pub async fn process(&mut self) -> Result<Outcome> {
        // Rejected before anything touches the network.
        let source = InputSource::select(&self.config.inputs)?;
        if self.config.offline && self.config.prepare_offline {
            return Err(ExitError::AmbiguousInputCombination(
                "cannot prepare offline data while offline".to_string(),
            ));
        }
        if self.config.offline && self.provider.is_some() {
            return Err(ExitError::AmbiguousInputCombination(
                "offline runs take chain information from the preparation file only"
                    .to_string(),
            ));
        }

        let provider = self.setup().await?;

        let chain_info = match self.chain_info.take() {
            Some(chain_info) => chain_info,
            None => ChainInfo::fetch(provider.as_ref(), self.config.prepare_offline).await?,
        };
        self.advance(ExitState::ChainInfoObtained);

        if self.config.prepare_offline {
            write_json_atomically(&self.config.offline_preparation_file, &chain_info)?;
            info!(
                "{} generated",
                self.config.offline_preparation_file.display()
            );
            self.advance(ExitState::OfflinePrepared);
            return Ok(Outcome::OfflinePrepared(
                self.config.offline_preparation_file.clone(),
            ));
        }

        let domain = self.generate_domain(&chain_info)?;
        self.advance(ExitState::DomainGenerated);

        let operation = self
            .obtain_operation(&source, &chain_info, domain, provider.as_ref())
            .await?;
        self.advance(ExitState::OperationObtained);

        if source.is_loaded() {
            verify_signed_exit(&operation, domain, provider.as_ref())
                .await
                .map_err(ExitError::OperationFailedValidation)?;
        }
        self.advance(ExitState::Validated);

        let outcome = if self.config.json || self.config.offline {
            debug!("Not broadcasting exit operation");
            write_json_atomically(&self.config.exit_operation_file, &operation)?;
            self.advance(ExitState::JsonOutput);
            Outcome::JsonOutput(operation)
        } else {
            provider.submit_voluntary_exit(&operation).await?;
            self.advance(ExitState::Broadcast);
            Outcome::Broadcast(operation)
        };
        self.advance(ExitState::Done);
        Ok(outcome)
    }

    async fn setup(&mut self) -> Result<Box<dyn ChainInfoProvider>> {
        if self.config.offline {
            let chain_info: ChainInfo = read_json(&self.config.offline_preparation_file)?;
            debug!(
                "Loaded chain info for epoch {} from {}",
                chain_info.epoch,
                self.config.offline_preparation_file.display()
            );
            self.chain_info = Some(chain_info.clone());
            return Ok(Box::new(OfflineProvider::new(chain_info)));
        }

        let provider: Box<dyn ChainInfoProvider> = match self.provider.take() {
            Some(provider) => provider,
            None => Box::new(
                BeaconNodeClient::connect(&self.config.connection, self.config.timeout).await?,
            ),
        };

        let mut required = CHAIN_INFO_CAPABILITIES.to_vec();
        required.push(Capability::Validators);
        if !self.config.prepare_offline && !self.config.json {
            required.push(Capability::SubmitVoluntaryExit);
        }
        ensure_capabilities(provider.as_ref(), &required)?;
        Ok(provider)
    }

    fn generate_domain(&self, chain_info: &ChainInfo) -> Result<Domain> {
        let genesis_validators_root = obtain_genesis_validators_root(
            self.config.genesis_validators_root.as_deref(),
            chain_info.genesis_validators_root,
        )?;
        // Exits are signed with the fork version current at the time of signing.
        let fork_version = obtain_fork_version(
            self.config.fork_version.as_deref(),
            chain_info.current_fork_version,
        )?;
        let domain = compute_domain(
            chain_info.voluntary_exit_domain_type,
            fork_version,
            genesis_validators_root,
        );
        debug!("Domain is 0x{}", hex::encode(domain));
        Ok(domain)
    }

    async fn obtain_operation(
        &mut self,
        source: &InputSource,
        chain_info: &ChainInfo,
        domain: Domain,
        provider: &dyn ChainInfoProvider,
    ) -> Result<SignedVoluntaryExit> {
        let resolved: ResolvedKey = match source {
            InputSource::File(supplied) => {
                return load_operation(supplied.as_deref(), &self.config.exit_operation_file)
            }
            InputSource::MnemonicPath { mnemonic, path } => {
                resolve_mnemonic_and_path(mnemonic, path, provider).await?
            }
            InputSource::MnemonicValidator {
                mnemonic,
                validator,
            } => resolve_mnemonic_and_validator(mnemonic, validator, provider).await?,
            InputSource::PrivateKey(private_key) => {
                resolve_private_key(private_key, provider).await?
            }
            InputSource::Account {
                keystore,
                passphrase,
            } => resolve_account(keystore, passphrase, provider).await?,
        };

        let mut fuzzer = FuzzInjector::new(self.config.fuzz);
        self.fuzz_seed = Some(fuzzer.seed());
        build_signed_exit(
            &resolved.validator,
            &resolved.signer,
            chain_info.epoch,
            domain,
            &mut fuzzer,
        )
    }
}

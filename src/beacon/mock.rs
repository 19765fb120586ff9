use async_trait::async_trait;
use std::sync::Mutex;

use super::{Capability, ChainInfoProvider, ValidatorId, ALL_CAPABILITIES};
use crate::errors::{ExitError, Result};
use crate::eth2::eth_types::{
    BLSPubkey, Checkpoint, Finality, Fork, Genesis, SignedVoluntaryExit, SpecConstants,
    ValidatorInfo,
};

/// Mainnet genesis time.
pub const MOCK_GENESIS_TIME: u64 = 1606824023;

/// In-memory chain for tests. Records every submission it receives.
#[derive(Debug)]
pub struct MockChainInfoProvider {
    pub capabilities: Vec<Capability>,
    pub spec: SpecConstants,
    pub genesis: Genesis,
    pub fork: Fork,
    pub finality: Finality,
    pub validators: Vec<ValidatorInfo>,
    pub submit_rejection: Option<String>,
    pub panic_on_submit: bool,
    submitted: Mutex<Vec<SignedVoluntaryExit>>,
}

impl Default for MockChainInfoProvider {
    fn default() -> Self {
        MockChainInfoProvider {
            capabilities: ALL_CAPABILITIES.to_vec(),
            spec: SpecConstants::default(),
            genesis: Genesis {
                genesis_time: MOCK_GENESIS_TIME,
                genesis_validators_root: [0x4b; 32],
                genesis_fork_version: [0, 0, 0, 0],
            },
            fork: Fork {
                previous_version: [2, 0, 0, 0],
                current_version: [3, 0, 0, 0],
                epoch: 194048,
            },
            finality: Finality {
                previous_justified: checkpoint(200_000, 0x01),
                current_justified: checkpoint(200_001, 0x02),
                finalized: checkpoint(200_000, 0x01),
            },
            validators: Vec::new(),
            submit_rejection: None,
            panic_on_submit: false,
            submitted: Mutex::new(Vec::new()),
        }
    }
}

fn checkpoint(epoch: u64, fill: u8) -> Checkpoint {
    Checkpoint {
        epoch,
        root: [fill; 32],
    }
}

impl MockChainInfoProvider {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_capabilities(&mut self, capabilities: Vec<Capability>) {
        self.capabilities = capabilities;
    }
    pub fn add_validator(&mut self, validator: ValidatorInfo) {
        self.validators.push(validator);
    }
    pub fn set_submit_rejection(&mut self, message: Option<String>) {
        self.submit_rejection = message;
    }
    /// Any submission attempt panics; used to prove a code path never broadcasts.
    pub fn set_panic_on_submit(&mut self, panic_on_submit: bool) {
        self.panic_on_submit = panic_on_submit;
    }
    pub fn submitted(&self) -> Vec<SignedVoluntaryExit> {
        match self.submitted.lock() {
            Ok(submitted) => submitted.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// An active validator with the given index and public key.
pub fn mock_validator(index: u64, pubkey: [u8; 48]) -> ValidatorInfo {
    ValidatorInfo {
        index,
        pubkey: BLSPubkey::from(pubkey.to_vec()),
        state: "active_ongoing".to_string(),
        withdrawal_credentials: [0; 32],
    }
}

#[async_trait]
impl ChainInfoProvider for MockChainInfoProvider {
    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    async fn spec(&self) -> Result<SpecConstants> {
        Ok(self.spec.clone())
    }

    async fn genesis(&self) -> Result<Genesis> {
        Ok(self.genesis.clone())
    }

    async fn fork(&self, _state: &str) -> Result<Fork> {
        Ok(self.fork.clone())
    }

    async fn finality(&self, _state: &str) -> Result<Finality> {
        Ok(self.finality.clone())
    }

    async fn validator(&self, id: &ValidatorId) -> Result<ValidatorInfo> {
        self.validators
            .iter()
            .find(|v| id.matches(v))
            .cloned()
            .ok_or_else(|| ExitError::UnknownValidator(id.to_string()))
    }

    async fn validators(&self) -> Result<Vec<ValidatorInfo>> {
        Ok(self.validators.clone())
    }

    async fn submit_voluntary_exit(&self, operation: &SignedVoluntaryExit) -> Result<()> {
        if self.panic_on_submit {
            panic!("submit_voluntary_exit called on a provider that must never broadcast");
        }
        if let Some(message) = &self.submit_rejection {
            return Err(ExitError::SubmissionRejected(message.clone()));
        }
        match self.submitted.lock() {
            Ok(mut submitted) => submitted.push(operation.clone()),
            Err(poisoned) => poisoned.into_inner().push(operation.clone()),
        }
        Ok(())
    }
}

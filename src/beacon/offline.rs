use async_trait::async_trait;

use super::{Capability, ChainInfo, ChainInfoProvider, ValidatorId};
use crate::errors::{ExitError, Result};
use crate::eth2::eth_types::{
    Finality, Fork, Genesis, SignedVoluntaryExit, SpecConstants, ValidatorInfo,
};

const OFFLINE_CAPABILITIES: &[Capability] = &[
    Capability::Spec,
    Capability::Genesis,
    Capability::Fork,
    Capability::Validators,
];

/// Serves chain information from an offline preparation snapshot. Has no finality data
/// and can never broadcast.
pub struct OfflineProvider {
    chain_info: ChainInfo,
}

impl OfflineProvider {
    pub fn new(chain_info: ChainInfo) -> Self {
        OfflineProvider { chain_info }
    }
}

#[async_trait]
impl ChainInfoProvider for OfflineProvider {
    fn capabilities(&self) -> &[Capability] {
        OFFLINE_CAPABILITIES
    }

    async fn spec(&self) -> Result<SpecConstants> {
        Ok(SpecConstants {
            seconds_per_slot: self.chain_info.seconds_per_slot,
            slots_per_epoch: self.chain_info.slots_per_epoch,
            domain_voluntary_exit: self.chain_info.voluntary_exit_domain_type,
        })
    }

    async fn genesis(&self) -> Result<Genesis> {
        Ok(Genesis {
            genesis_time: self.chain_info.genesis_time,
            genesis_validators_root: self.chain_info.genesis_validators_root,
            genesis_fork_version: self.chain_info.genesis_fork_version,
        })
    }

    /// The snapshot only records the fork in effect when it was taken.
    async fn fork(&self, _state: &str) -> Result<Fork> {
        Ok(Fork {
            previous_version: self.chain_info.current_fork_version,
            current_version: self.chain_info.current_fork_version,
            epoch: self.chain_info.epoch,
        })
    }

    async fn finality(&self, _state: &str) -> Result<Finality> {
        Err(ExitError::UnsupportedCapability(Capability::Finality))
    }

    async fn validator(&self, id: &ValidatorId) -> Result<ValidatorInfo> {
        self.chain_info.fetch_validator_info(id).cloned()
    }

    async fn validators(&self) -> Result<Vec<ValidatorInfo>> {
        Ok(self.chain_info.validators.clone())
    }

    async fn submit_voluntary_exit(&self, _operation: &SignedVoluntaryExit) -> Result<()> {
        Err(ExitError::UnsupportedCapability(Capability::SubmitVoluntaryExit))
    }
}

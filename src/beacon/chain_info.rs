use super::{ensure_capabilities, Capability, ChainInfoProvider, ValidatorId};
use crate::errors::{ExitError, Result};
use crate::eth2::eth_signing::compute_epoch_at_slot;
use crate::eth2::eth_types::{DomainType, Epoch, Root, Slot, ValidatorInfo, Version};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_hex::{SerHex, StrictPfx};
use serde_utils::quoted_u64;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current version of the offline preparation format.
pub const CHAIN_INFO_VERSION: u64 = 2;

/// Everything the exit workflow needs to know about the chain; persisted as the
/// offline preparation file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChainInfo {
    pub version: u64,
    pub validators: Vec<ValidatorInfo>,
    #[serde(with = "SerHex::<StrictPfx>")]
    pub genesis_validators_root: Root,
    #[serde(with = "quoted_u64")]
    pub genesis_time: u64,
    #[serde(with = "quoted_u64")]
    pub epoch: Epoch,
    #[serde(with = "SerHex::<StrictPfx>")]
    pub genesis_fork_version: Version,
    #[serde(with = "SerHex::<StrictPfx>")]
    pub current_fork_version: Version,
    #[serde(with = "SerHex::<StrictPfx>")]
    pub voluntary_exit_domain_type: DomainType,
    #[serde(with = "quoted_u64")]
    pub seconds_per_slot: u64,
    #[serde(with = "quoted_u64")]
    pub slots_per_epoch: u64,
}

/// Capabilities needed to build a `ChainInfo` from a live provider.
pub const CHAIN_INFO_CAPABILITIES: &[Capability] =
    &[Capability::Spec, Capability::Genesis, Capability::Fork];

impl ChainInfo {
    /// Fetch the chain information from a provider.  The validator registry is only
    /// downloaded when ``include_validators`` is set, as it is large on mainnet.
    pub async fn fetch(
        provider: &dyn ChainInfoProvider,
        include_validators: bool,
    ) -> Result<ChainInfo> {
        ensure_capabilities(provider, CHAIN_INFO_CAPABILITIES)?;
        if include_validators {
            ensure_capabilities(provider, &[Capability::Validators])?;
        }

        let spec = provider.spec().await?;
        let genesis = provider.genesis().await?;
        let fork = provider.fork("head").await?;
        let epoch = compute_epoch_at_slot(
            current_slot(genesis.genesis_time, now_secs(), spec.seconds_per_slot),
            spec.slots_per_epoch,
        );

        let validators = if include_validators {
            let validators = provider.validators().await?;
            info!("Obtained {} validators from the beacon node", validators.len());
            validators
        } else {
            Vec::new()
        };

        let chain_info = ChainInfo {
            version: CHAIN_INFO_VERSION,
            validators,
            genesis_validators_root: genesis.genesis_validators_root,
            genesis_time: genesis.genesis_time,
            epoch,
            genesis_fork_version: genesis.genesis_fork_version,
            current_fork_version: fork.current_version,
            voluntary_exit_domain_type: spec.domain_voluntary_exit,
            seconds_per_slot: spec.seconds_per_slot,
            slots_per_epoch: spec.slots_per_epoch,
        };
        debug!("Obtained chain info at epoch {}", chain_info.epoch);
        Ok(chain_info)
    }

    /// Look up a validator in the registry snapshot.
    pub fn fetch_validator_info(&self, id: &ValidatorId) -> Result<&ValidatorInfo> {
        self.validators
            .iter()
            .find(|v| id.matches(v))
            .ok_or_else(|| ExitError::UnknownValidator(id.to_string()))
    }
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Slot at ``now``; zero before genesis.
pub fn current_slot(genesis_time: u64, now: u64, seconds_per_slot: u64) -> Slot {
    if seconds_per_slot == 0 {
        return 0;
    }
    now.saturating_sub(genesis_time) / seconds_per_slot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon::mock::{mock_validator, MockChainInfoProvider};

    #[tokio::test]
    async fn test_fetch_without_validators() {
        let provider = MockChainInfoProvider::new();
        let chain_info = ChainInfo::fetch(&provider, false).await.unwrap();
        assert_eq!(chain_info.version, CHAIN_INFO_VERSION);
        assert!(chain_info.validators.is_empty());
        assert_eq!(chain_info.current_fork_version, provider.fork.current_version);
        assert_eq!(
            chain_info.genesis_validators_root,
            provider.genesis.genesis_validators_root
        );
        assert_eq!(chain_info.voluntary_exit_domain_type, [4, 0, 0, 0]);
        assert!(chain_info.epoch > 0);
        assert!(provider.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_with_validators() {
        let mut provider = MockChainInfoProvider::new();
        provider.add_validator(mock_validator(3, [0xaa; 48]));
        provider.add_validator(mock_validator(9, [0xbb; 48]));
        let chain_info = ChainInfo::fetch(&provider, true).await.unwrap();
        assert_eq!(chain_info.validators.len(), 2);

        let v = chain_info
            .fetch_validator_info(&ValidatorId::Index(9))
            .unwrap();
        assert_eq!(&v.pubkey[..], &[0xbb; 48][..]);
        let pk: ValidatorId = format!("0x{}", "aa".repeat(48)).parse().unwrap();
        assert_eq!(chain_info.fetch_validator_info(&pk).unwrap().index, 3);
        assert!(matches!(
            chain_info.fetch_validator_info(&ValidatorId::Index(4)),
            Err(ExitError::UnknownValidator(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_requires_capabilities() {
        let mut provider = MockChainInfoProvider::new();
        provider.set_capabilities(vec![Capability::Spec, Capability::Genesis]);
        assert!(matches!(
            ChainInfo::fetch(&provider, false).await,
            Err(ExitError::UnsupportedCapability(Capability::Fork))
        ));
    }

    #[test]
    fn test_current_slot() {
        assert_eq!(current_slot(1000, 999, 12), 0);
        assert_eq!(current_slot(1000, 1000, 12), 0);
        assert_eq!(current_slot(1000, 1011, 12), 0);
        assert_eq!(current_slot(1000, 1012, 12), 1);
        assert_eq!(current_slot(1000, 1000 + 12 * 64, 12), 64);
    }
}

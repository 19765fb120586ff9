pub mod chain_info;
pub mod http;
pub mod mock;
pub mod offline;

use crate::errors::{ExitError, InputFormatError, Result};
use crate::eth2::eth_types::{
    pubkey_from_hex, pubkey_to_hex, BLSPubkey, Finality, Fork, Genesis, SignedVoluntaryExit,
    SpecConstants, ValidatorIndex, ValidatorInfo,
};

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use chain_info::ChainInfo;
pub use http::BeaconNodeClient;
pub use offline::OfflineProvider;

/// A service a chain information provider may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Spec,
    Genesis,
    Fork,
    Finality,
    Validators,
    SubmitVoluntaryExit,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Spec => "spec",
            Capability::Genesis => "genesis",
            Capability::Fork => "fork",
            Capability::Finality => "finality",
            Capability::Validators => "validators",
            Capability::SubmitVoluntaryExit => "voluntary exit submission",
        };
        f.write_str(name)
    }
}

pub const ALL_CAPABILITIES: &[Capability] = &[
    Capability::Spec,
    Capability::Genesis,
    Capability::Fork,
    Capability::Finality,
    Capability::Validators,
    Capability::SubmitVoluntaryExit,
];

/// Identifies a validator by registry index or public key.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatorId {
    Index(ValidatorIndex),
    Pubkey(BLSPubkey),
}

impl FromStr for ValidatorId {
    type Err = ExitError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.starts_with("0x") {
            return Ok(ValidatorId::Pubkey(pubkey_from_hex(s)?));
        }
        s.parse::<ValidatorIndex>()
            .map(ValidatorId::Index)
            .map_err(|_| InputFormatError::ValidatorId(s.to_string()).into())
    }
}

impl fmt::Display for ValidatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidatorId::Index(index) => write!(f, "{}", index),
            ValidatorId::Pubkey(pubkey) => f.write_str(&pubkey_to_hex(pubkey)),
        }
    }
}

impl ValidatorId {
    pub fn matches(&self, validator: &ValidatorInfo) -> bool {
        match self {
            ValidatorId::Index(index) => validator.index == *index,
            ValidatorId::Pubkey(pubkey) => validator.pubkey == *pubkey,
        }
    }
}

/// The beacon chain as seen by the exit workflow.
///
/// Implementations declare the services they offer through [`capabilities`](Self::capabilities);
/// callers check them once with [`ensure_capabilities`] instead of discovering a missing service
/// halfway through a run.
#[async_trait]
pub trait ChainInfoProvider: Send + Sync {
    fn capabilities(&self) -> &[Capability];

    async fn spec(&self) -> Result<SpecConstants>;

    async fn genesis(&self) -> Result<Genesis>;

    async fn fork(&self, state: &str) -> Result<Fork>;

    async fn finality(&self, state: &str) -> Result<Finality>;

    async fn validator(&self, id: &ValidatorId) -> Result<ValidatorInfo>;

    async fn validators(&self) -> Result<Vec<ValidatorInfo>>;

    async fn submit_voluntary_exit(&self, operation: &SignedVoluntaryExit) -> Result<()>;
}

#[async_trait]
impl<T: ChainInfoProvider + ?Sized> ChainInfoProvider for Arc<T> {
    fn capabilities(&self) -> &[Capability] {
        (**self).capabilities()
    }

    async fn spec(&self) -> Result<SpecConstants> {
        (**self).spec().await
    }

    async fn genesis(&self) -> Result<Genesis> {
        (**self).genesis().await
    }

    async fn fork(&self, state: &str) -> Result<Fork> {
        (**self).fork(state).await
    }

    async fn finality(&self, state: &str) -> Result<Finality> {
        (**self).finality(state).await
    }

    async fn validator(&self, id: &ValidatorId) -> Result<ValidatorInfo> {
        (**self).validator(id).await
    }

    async fn validators(&self) -> Result<Vec<ValidatorInfo>> {
        (**self).validators().await
    }

    async fn submit_voluntary_exit(&self, operation: &SignedVoluntaryExit) -> Result<()> {
        (**self).submit_voluntary_exit(operation).await
    }
}

/// Fail with `UnsupportedCapability` for the first required capability the provider lacks.
pub fn ensure_capabilities(
    provider: &dyn ChainInfoProvider,
    required: &[Capability],
) -> Result<()> {
    let offered = provider.capabilities();
    match required.iter().find(|c| !offered.contains(*c)) {
        Some(missing) => Err(ExitError::UnsupportedCapability(*missing)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockChainInfoProvider;
    use super::*;

    #[test]
    fn test_parse_validator_id() {
        assert_eq!("42".parse::<ValidatorId>().unwrap(), ValidatorId::Index(42));
        let pk = format!("0x{}", "ab".repeat(48));
        match pk.parse::<ValidatorId>().unwrap() {
            ValidatorId::Pubkey(p) => assert_eq!(&p[..], &[0xab; 48][..]),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            "validator".parse::<ValidatorId>(),
            Err(ExitError::InvalidInputFormat(InputFormatError::ValidatorId(_)))
        ));
        assert!(matches!(
            "0xabcd".parse::<ValidatorId>(),
            Err(ExitError::InvalidInputFormat(InputFormatError::FieldLength { .. }))
        ));
    }

    #[test]
    fn test_ensure_capabilities() {
        let mut provider = MockChainInfoProvider::new();
        assert!(ensure_capabilities(&provider, ALL_CAPABILITIES).is_ok());

        provider.set_capabilities(vec![Capability::Spec, Capability::Genesis]);
        assert!(ensure_capabilities(&provider, &[Capability::Spec]).is_ok());
        match ensure_capabilities(&provider, &[Capability::Spec, Capability::Finality]) {
            Err(ExitError::UnsupportedCapability(Capability::Finality)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}

use crate::beacon::{ChainInfoProvider, ValidatorId};
use crate::crypto::bls_keys::{decode_public_key, decode_signature, verify_signature};
use crate::errors::RejectionReason;
use crate::eth2::eth_signing::compute_signing_root;
use crate::eth2::eth_types::{Domain, SignedVoluntaryExit};

use log::{debug, warn};

/// Check an untrusted signed exit against the claimed validator's registry public key.
///
/// Any decode, lookup or verification failure rejects the operation outright.
pub async fn verify_signed_exit(
    operation: &SignedVoluntaryExit,
    domain: Domain,
    provider: &dyn ChainInfoProvider,
) -> Result<(), RejectionReason> {
    let signature = decode_signature(&operation.signature).ok_or_else(|| {
        warn!("Invalid signature 0x{}", hex::encode(&operation.signature[..]));
        RejectionReason::InvalidSignature("not a valid BLS signature".to_string())
    })?;

    let signing_root = compute_signing_root(&operation.message, domain);
    debug!("Verifying against signing root 0x{}", hex::encode(signing_root));

    let index = operation.message.validator_index;
    let validator = provider
        .validator(&ValidatorId::Index(index))
        .await
        .map_err(|e| {
            debug!("Lookup of validator {} failed: {}", index, e);
            RejectionReason::UnknownValidator(index)
        })?;

    let pubkey = decode_public_key(&validator.pubkey)
        .map_err(|e| RejectionReason::MalformedInput(e.to_string()))?;

    if !verify_signature(&pubkey, &signature, signing_root) {
        return Err(RejectionReason::InvalidSignature(
            "signature does not verify".to_string(),
        ));
    }
    debug!("Signature verified for validator {}", index);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon::mock::{mock_validator, MockChainInfoProvider};
    use crate::crypto::bls_keys::{BlsAccount, KeySigner};
    use crate::eth2::eth_signing::compute_domain;
    use crate::eth2::eth_types::{BLSSignature, VoluntaryExit, DOMAIN_VOLUNTARY_EXIT};
    use crate::exit::builder::build_signed_exit;
    use crate::exit::fuzz::FuzzInjector;

    const DUMMY_SK_HEX: &str = "5528f51154c1ea9b18eab53aabc1d1a478930aaebde47730b51375df02f0076c";

    fn setup() -> (BlsAccount, MockChainInfoProvider, Domain, SignedVoluntaryExit) {
        let account = BlsAccount::from_hex(DUMMY_SK_HEX).unwrap();
        let mut provider = MockChainInfoProvider::new();
        let mut validator = mock_validator(21, [0; 48]);
        validator.pubkey = account.public_key();
        provider.add_validator(validator.clone());
        let domain = compute_domain(DOMAIN_VOLUNTARY_EXIT, [3, 0, 0, 0], [0x4b; 32]);
        let op =
            build_signed_exit(&validator, &account, 100, domain, &mut FuzzInjector::disabled())
                .unwrap();
        (account, provider, domain, op)
    }

    #[tokio::test]
    async fn test_accepts_freshly_built_exit() {
        let (_, provider, domain, op) = setup();
        assert_eq!(verify_signed_exit(&op, domain, &provider).await, Ok(()));
    }

    #[tokio::test]
    async fn test_rejects_wrong_domain() {
        let (_, provider, _, op) = setup();
        let other = compute_domain(DOMAIN_VOLUNTARY_EXIT, [4, 0, 0, 0], [0x4b; 32]);
        assert!(matches!(
            verify_signed_exit(&op, other, &provider).await,
            Err(RejectionReason::InvalidSignature(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_tampered_message() {
        let (_, provider, domain, mut op) = setup();
        op.message.epoch += 1;
        assert!(matches!(
            verify_signed_exit(&op, domain, &provider).await,
            Err(RejectionReason::InvalidSignature(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_unknown_validator() {
        let (_, provider, domain, mut op) = setup();
        op.message.validator_index = 22;
        assert_eq!(
            verify_signed_exit(&op, domain, &provider).await,
            Err(RejectionReason::UnknownValidator(22))
        );
    }

    #[tokio::test]
    async fn test_rejects_garbage_signature() {
        let (_, provider, domain, mut op) = setup();
        op.signature = BLSSignature::from(vec![0x11; 96]);
        assert!(matches!(
            verify_signed_exit(&op, domain, &provider).await,
            Err(RejectionReason::InvalidSignature(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_malformed_registry_key() {
        let (account, mut provider, domain, _) = setup();
        // Compression flag unset, so not a valid G1 point.
        provider.add_validator(mock_validator(30, [0x11; 48]));
        let op = SignedVoluntaryExit {
            message: VoluntaryExit {
                epoch: 1,
                validator_index: 30,
            },
            signature: account.sign([0; 32], domain).unwrap(),
        };
        assert!(matches!(
            verify_signed_exit(&op, domain, &provider).await,
            Err(RejectionReason::MalformedInput(_))
        ));
    }
}

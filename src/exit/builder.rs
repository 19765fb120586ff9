use super::fuzz::FuzzInjector;
use crate::crypto::bls_keys::KeySigner;
use crate::errors::{ExitError, Result};
use crate::eth2::eth_types::{Domain, Epoch, SignedVoluntaryExit, ValidatorInfo, VoluntaryExit};

use log::debug;
use tree_hash::TreeHash;

/// Build and sign a voluntary exit for ``validator`` at ``epoch``.
///
/// The fuzzer gets three chances to corrupt the operation: before the message root is
/// computed (the corrupted message is signed), between hashing and signing (a stale root is
/// signed), and after signing (the signature no longer verifies).
pub fn build_signed_exit(
    validator: &ValidatorInfo,
    signer: &dyn KeySigner,
    epoch: Epoch,
    domain: Domain,
    fuzzer: &mut FuzzInjector,
) -> Result<SignedVoluntaryExit> {
    let mut message = VoluntaryExit {
        epoch,
        validator_index: validator.index,
    };

    fuzzer.fuzz_message(&mut message);

    let mut root = message.tree_hash_root().to_fixed_bytes();
    debug!(
        "Signing 0x{} with domain 0x{} by public key 0x{}",
        hex::encode(root),
        hex::encode(domain),
        hex::encode(&signer.public_key()[..])
    );

    fuzzer.fuzz_message_with_root(&mut message, &mut root);

    let mut signature = signer.sign(root, domain).map_err(|e| match e {
        ExitError::SigningFailure(_) => e,
        other => ExitError::SigningFailure(other.to_string()),
    })?;

    fuzzer.fuzz_message_with_signature(&mut message, &mut signature);

    Ok(SignedVoluntaryExit { message, signature })
}

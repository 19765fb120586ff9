//! Turns user supplied key material into a signer and the validator it signs for.

use crate::beacon::{ChainInfoProvider, ValidatorId};
use crate::constants::{EIP2334_COIN_TYPE, EIP2334_PURPOSE, MAX_KEY_SCAN_DISTANCE};
use crate::crypto::bls_keys::{BlsAccount, KeySigner};
use crate::crypto::key_derivation::{
    private_key_from_seed_and_path, seed_from_mnemonic, validator_path, DerivedKey,
};
use crate::crypto::keystore::account_from_keystore;
use crate::errors::{ExitError, Result};
use crate::eth2::eth_types::{pubkey_to_hex, BLSPubkey, ValidatorInfo};

use log::{debug, info};
use std::path::Path;

/// A signer paired with the registry entry of the validator it controls.
pub struct ResolvedKey {
    pub validator: ValidatorInfo,
    pub signer: BlsAccount,
}

async fn validator_for_signer(
    signer: BlsAccount,
    provider: &dyn ChainInfoProvider,
) -> Result<ResolvedKey> {
    let validator = provider
        .validator(&ValidatorId::Pubkey(signer.public_key()))
        .await?;
    info!(
        "Validator {} found with public key {}",
        validator.index,
        pubkey_to_hex(&validator.pubkey)
    );
    Ok(ResolvedKey { validator, signer })
}

/// Mnemonic plus an explicit `m/12381/3600/<i>/0/0` path.
pub async fn resolve_mnemonic_and_path(
    mnemonic: &str,
    path: &str,
    provider: &dyn ChainInfoProvider,
) -> Result<ResolvedKey> {
    let seed = seed_from_mnemonic(mnemonic)?;
    let key = private_key_from_seed_and_path(&seed, path)?;
    let signer = BlsAccount::from_bytes(path, key.secret())?;
    validator_for_signer(signer, provider).await
}

/// Mnemonic plus a validator identifier; the account index is found by scanning.
pub async fn resolve_mnemonic_and_validator(
    mnemonic: &str,
    validator: &ValidatorId,
    provider: &dyn ChainInfoProvider,
) -> Result<ResolvedKey> {
    let seed = seed_from_mnemonic(mnemonic)?;
    let validator = provider.validator(validator).await?;
    let (index, key) = scan_for_validator_key(&seed, &validator.pubkey, MAX_KEY_SCAN_DISTANCE)?;
    let signer = BlsAccount::from_bytes(validator_path(index), key.secret())?;
    Ok(ResolvedKey { validator, signer })
}

/// Explicit hex private key.
pub async fn resolve_private_key(
    private_key: &str,
    provider: &dyn ChainInfoProvider,
) -> Result<ResolvedKey> {
    let signer = BlsAccount::from_hex(private_key)?;
    validator_for_signer(signer, provider).await
}

/// EIP-2335 keystore unlocked with ``passphrase``.
pub async fn resolve_account(
    keystore: &Path,
    passphrase: &str,
    provider: &dyn ChainInfoProvider,
) -> Result<ResolvedKey> {
    let signer = account_from_keystore(keystore, passphrase)?;
    validator_for_signer(signer, provider).await
}

/// Derive `m/12381/3600/i/0/0` for `i` in `0..max_distance` until one matches ``pubkey``.
pub fn scan_for_validator_key(
    seed: &[u8],
    pubkey: &BLSPubkey,
    max_distance: u32,
) -> Result<(u32, DerivedKey)> {
    let prefix = DerivedKey::from_seed(seed)?.derive_path(&[EIP2334_PURPOSE, EIP2334_COIN_TYPE]);
    for i in 0..max_distance {
        let key = prefix.child(i).derive_path(&[0, 0]);
        let candidate = BlsAccount::from_bytes(validator_path(i), key.secret())?;
        if candidate.public_key() == *pubkey {
            debug!("Validator key found at {}", validator_path(i));
            return Ok((i, key));
        }
    }
    debug!(
        "Gone {} indices without finding the validator, not scanning any further",
        max_distance
    );
    Err(ExitError::KeyDerivationFailure(format!(
        "no key for {} within the first {} indices",
        pubkey_to_hex(pubkey),
        max_distance
    )))
}

use super::bls_keys::{BlsAccount, KeySigner};
use crate::errors::{ExitError, Result};

use eth_keystore::decrypt_keystore;
use log::debug;
use std::path::Path;

/// Unlock an EIP-2335 keystore file, returning an account able to sign with its BLS key.
pub fn account_from_keystore(path: &Path, passphrase: &str) -> Result<BlsAccount> {
    let keystore = std::fs::read_to_string(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "keystore".to_string());
    let sk_bytes = decrypt_keystore(&keystore, passphrase.to_string())
        .map_err(|e| ExitError::SigningFailure(format!("failed to unlock {}: {:?}", name, e)))?;
    let account = BlsAccount::from_bytes(name, &sk_bytes)?;
    debug!(
        "Unlocked {} with public key 0x{}",
        account.name(),
        hex::encode(&account.public_key()[..])
    );
    Ok(account)
}

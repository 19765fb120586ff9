use crate::constants::{BLS_PRIV_KEY_BYTES, BLS_PUB_KEY_BYTES, BLS_SIGNATURE_BYTES};
use crate::errors::{ExitError, Result};
use crate::eth2::eth_signing::signing_root_from_object_root;
use crate::eth2::eth_types::{bytes_from_hex, BLSPubkey, BLSSignature, Domain, Root};

use blsttc::{PublicKey, SecretKey, Signature};
use log::debug;

/// Something able to produce BLS signatures for a validator.
pub trait KeySigner {
    /// Human readable name used in logs.
    fn name(&self) -> &str;

    fn public_key(&self) -> BLSPubkey;

    /// Signs ``root`` under ``domain``; the message signed is the SigningData root.
    fn sign(&self, root: Root, domain: Domain) -> Result<BLSSignature>;
}

/// A validator account backed by an in-memory BLS secret key.
pub struct BlsAccount {
    name: String,
    sk: SecretKey,
}

impl BlsAccount {
    pub fn new(name: impl Into<String>, sk: SecretKey) -> Self {
        BlsAccount {
            name: name.into(),
            sk,
        }
    }

    /// Build an account from big-endian secret key bytes.
    pub fn from_bytes(name: impl Into<String>, sk_bytes: &[u8]) -> Result<Self> {
        let sk_bytes: [u8; BLS_PRIV_KEY_BYTES] = sk_bytes
            .try_into()
            .map_err(|_| ExitError::length("private key", BLS_PRIV_KEY_BYTES, sk_bytes.len()))?;
        let sk = SecretKey::from_bytes(sk_bytes)
            .map_err(|e| ExitError::KeyDerivationFailure(format!("invalid secret key: {:?}", e)))?;
        Ok(Self::new(name, sk))
    }

    /// Build an account from a hex-encoded secret key, with or without `0x` prefix.
    pub fn from_hex(sk_hex: &str) -> Result<Self> {
        let sk_bytes: [u8; BLS_PRIV_KEY_BYTES] = bytes_from_hex("private key", sk_hex)?;
        Self::from_bytes("private key", &sk_bytes)
    }
}

impl KeySigner for BlsAccount {
    fn name(&self) -> &str {
        &self.name
    }

    fn public_key(&self) -> BLSPubkey {
        BLSPubkey::from(self.sk.public_key().to_bytes().to_vec())
    }

    fn sign(&self, root: Root, domain: Domain) -> Result<BLSSignature> {
        let signing_root = signing_root_from_object_root(root, domain);
        debug!("Computed signingRoot: {:?}", hex::encode(signing_root));
        let sig = self.sk.sign(signing_root);
        Ok(BLSSignature::from(sig.to_bytes().to_vec()))
    }
}

/// Decode a BLS public key from its compressed encoding.
pub fn decode_public_key(pubkey: &BLSPubkey) -> Result<PublicKey> {
    let bytes: [u8; BLS_PUB_KEY_BYTES] = pubkey[..]
        .try_into()
        .map_err(|_| ExitError::length("public key", BLS_PUB_KEY_BYTES, pubkey.len()))?;
    PublicKey::from_bytes(bytes).map_err(|e| {
        ExitError::KeyDerivationFailure(format!("invalid BLS public key: {:?}", e))
    })
}

/// Decode a BLS signature, returning `None` if the bytes are not a valid curve point.
pub fn decode_signature(signature: &BLSSignature) -> Option<Signature> {
    let bytes: [u8; BLS_SIGNATURE_BYTES] = signature[..].try_into().ok()?;
    Signature::from_bytes(bytes).ok()
}

/// Verify `signature` over `signing_root` against `pk`.
pub fn verify_signature(pk: &PublicKey, signature: &Signature, signing_root: Root) -> bool {
    pk.verify(signature, signing_root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eth2::eth_signing::compute_domain;
    use crate::eth2::eth_types::DOMAIN_VOLUNTARY_EXIT;

    // hardcoded bls sk from Lighthouse Web3Signer tests
    const DUMMY_SK_HEX: &str = "5528f51154c1ea9b18eab53aabc1d1a478930aaebde47730b51375df02f0076c";

    #[test]
    fn test_from_hex_accepts_prefix() {
        let a = BlsAccount::from_hex(DUMMY_SK_HEX).unwrap();
        let b = BlsAccount::from_hex(&format!("0x{}", DUMMY_SK_HEX)).unwrap();
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_from_hex_rejects_bad_length() {
        assert!(matches!(
            BlsAccount::from_hex("0xdeadbeef"),
            Err(ExitError::InvalidInputFormat(_))
        ));
    }

    #[test]
    fn test_sign_and_verify() {
        let account = BlsAccount::from_hex(DUMMY_SK_HEX).unwrap();
        let domain = compute_domain(DOMAIN_VOLUNTARY_EXIT, [0; 4], [0x2a; 32]);
        let root = [7_u8; 32];
        let sig = account.sign(root, domain).unwrap();

        let pk = decode_public_key(&account.public_key()).unwrap();
        let sig = decode_signature(&sig).expect("valid signature");
        let signing_root = signing_root_from_object_root(root, domain);
        assert!(verify_signature(&pk, &sig, signing_root));
        assert!(!verify_signature(&pk, &sig, [8_u8; 32]));
    }

    #[test]
    fn test_random_bytes_are_not_a_signature() {
        let garbage = BLSSignature::from(vec![0x11; 96]);
        assert!(decode_signature(&garbage).is_none());
    }
}

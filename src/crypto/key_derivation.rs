//! EIP-2333 hierarchical BLS key derivation and EIP-2334 validator paths.
//!
//! https://eips.ethereum.org/EIPS/eip-2333
//! https://eips.ethereum.org/EIPS/eip-2334

use crate::constants::{BLS_PRIV_KEY_BYTES, EIP2334_COIN_TYPE, EIP2334_PURPOSE};
use crate::errors::{ExitError, InputFormatError, Result};

use bip39::{Language, Mnemonic, Seed};
use hkdf::Hkdf;
use num_bigint::BigUint;
use sha2::{Digest, Sha256};

/// The byte size of a SHA256 hash.
const HASH_SIZE: usize = 32;
/// The size of the lamport array.
const LAMPORT_ARRAY_SIZE: usize = 255;
/// The HKDF output size (in octets) when generating a lamport key.
const LAMPORT_OKM_SIZE: usize = HASH_SIZE * LAMPORT_ARRAY_SIZE;
/// Output size of HKDF_mod_r, ceil((3 * ceil(log2(r))) / 16).
const MOD_R_L: usize = 48;
const SALT: &[u8] = b"BLS-SIG-KEYGEN-SALT-";
const MIN_SEED_BYTES: usize = 32;
/// Order of the BLS12-381 scalar field.
const R: &str = "52435875175126190479447740508185965837690552500527637822603658699938581184513";

/// A secret key at some node of the derivation tree, big-endian.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKey([u8; BLS_PRIV_KEY_BYTES]);

impl DerivedKey {
    /// derive_master_SK
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        if seed.len() < MIN_SEED_BYTES {
            return Err(ExitError::KeyDerivationFailure(format!(
                "seed must be at least {} bytes",
                MIN_SEED_BYTES
            )));
        }
        Ok(DerivedKey(hkdf_mod_r(seed)))
    }

    /// derive_child_SK
    pub fn child(&self, index: u32) -> Self {
        let compressed_lamport_pk = parent_sk_to_lamport_pk(&self.0, index);
        DerivedKey(hkdf_mod_r(&compressed_lamport_pk))
    }

    /// Walk the given child indices starting from this key.
    pub fn derive_path(&self, indices: &[u32]) -> Self {
        indices.iter().fold(self.clone(), |key, i| key.child(*i))
    }

    pub fn secret(&self) -> &[u8] {
        &self.0
    }
}

fn hkdf_mod_r(ikm: &[u8]) -> [u8; BLS_PRIV_KEY_BYTES] {
    let r = BigUint::parse_bytes(R.as_bytes(), 10).expect("constant group order");
    let mut ikm_ext = ikm.to_vec();
    ikm_ext.push(0);
    // key_info is empty, followed by I2OSP(L, 2)
    let info = (MOD_R_L as u16).to_be_bytes();

    let mut salt = SALT.to_vec();
    loop {
        salt = Sha256::digest(&salt).to_vec();
        let mut okm = [0_u8; MOD_R_L];
        Hkdf::<Sha256>::new(Some(&salt), &ikm_ext)
            .expand(&info, &mut okm)
            .expect("48 bytes is a valid HKDF-SHA256 output length");
        let sk = BigUint::from_bytes_be(&okm) % &r;
        if sk != BigUint::default() {
            return to_fixed_be(&sk);
        }
    }
}

fn to_fixed_be(n: &BigUint) -> [u8; BLS_PRIV_KEY_BYTES] {
    let bytes = n.to_bytes_be();
    let mut out = [0_u8; BLS_PRIV_KEY_BYTES];
    out[BLS_PRIV_KEY_BYTES - bytes.len()..].copy_from_slice(&bytes);
    out
}

fn ikm_to_lamport_sk(salt: &[u8], ikm: &[u8]) -> Vec<[u8; HASH_SIZE]> {
    let mut okm = vec![0_u8; LAMPORT_OKM_SIZE];
    Hkdf::<Sha256>::new(Some(salt), ikm)
        .expand(&[], &mut okm)
        .expect("8160 bytes is the maximum HKDF-SHA256 output length");
    okm.chunks_exact(HASH_SIZE)
        .map(|chunk| {
            let mut c = [0_u8; HASH_SIZE];
            c.copy_from_slice(chunk);
            c
        })
        .collect()
}

fn parent_sk_to_lamport_pk(parent_sk: &[u8; BLS_PRIV_KEY_BYTES], index: u32) -> [u8; HASH_SIZE] {
    let salt = index.to_be_bytes();
    let not_ikm: Vec<u8> = parent_sk.iter().map(|b| !b).collect();

    let lamport_0 = ikm_to_lamport_sk(&salt, parent_sk);
    let lamport_1 = ikm_to_lamport_sk(&salt, &not_ikm);

    let mut hasher = Sha256::new();
    for chunk in lamport_0.iter().chain(lamport_1.iter()) {
        hasher.update(Sha256::digest(chunk));
    }
    hasher.finalize().into()
}

/// Parse a validator signing key path, `m/12381/3600/<account>/0/0`, into its indices.
pub fn parse_validator_path(path: &str) -> Result<[u32; 5]> {
    let bad_path = || ExitError::from(InputFormatError::PathFormat(path.to_string()));
    let mut nodes = path.split('/');
    if nodes.next() != Some("m") {
        return Err(bad_path());
    }
    let indices = nodes
        .map(|node| {
            if node.is_empty() || !node.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad_path());
            }
            node.parse::<u32>().map_err(|_| bad_path())
        })
        .collect::<Result<Vec<u32>>>()?;

    match indices.as_slice() {
        [EIP2334_PURPOSE, EIP2334_COIN_TYPE, account, 0, 0] => {
            Ok([EIP2334_PURPOSE, EIP2334_COIN_TYPE, *account, 0, 0])
        }
        _ => Err(bad_path()),
    }
}

/// The EIP-2334 signing key path for validator ``account``.
pub fn validator_path(account: u32) -> String {
    format!("m/{}/{}/{}/0/0", EIP2334_PURPOSE, EIP2334_COIN_TYPE, account)
}

/// Convert a BIP-39 mnemonic into its 64 byte seed (empty passphrase).
pub fn seed_from_mnemonic(phrase: &str) -> Result<Vec<u8>> {
    let phrase = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
    let mnemonic = Mnemonic::from_phrase(&phrase, Language::English)
        .map_err(|e| InputFormatError::Mnemonic(e.to_string()))?;
    Ok(Seed::new(&mnemonic, "").as_bytes().to_vec())
}

/// Derive the secret key at a validator path from a seed.
pub fn private_key_from_seed_and_path(seed: &[u8], path: &str) -> Result<DerivedKey> {
    let indices = parse_validator_path(path)?;
    Ok(DerivedKey::from_seed(seed)?.derive_path(&indices))
}

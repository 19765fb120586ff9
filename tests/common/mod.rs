#![allow(dead_code)]

use exitfuzz::beacon::mock::{mock_validator, MockChainInfoProvider};
use exitfuzz::crypto::bls_keys::{BlsAccount, KeySigner};
use exitfuzz::crypto::key_derivation::{private_key_from_seed_and_path, validator_path};
use exitfuzz::eth2::eth_types::{BLSPubkey, ValidatorIndex};
use exitfuzz::exit::ExitConfig;
use std::path::Path;

/// hardcoded bls sk from Lighthouse Web3Signer tests
pub const DUMMY_SK_HEX: &str = "5528f51154c1ea9b18eab53aabc1d1a478930aaebde47730b51375df02f0076c";

/// BIP-39 test mnemonic.
pub const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

pub const DUMMY_VALIDATOR_INDEX: ValidatorIndex = 1559;

pub fn dummy_account() -> BlsAccount {
    BlsAccount::from_hex(DUMMY_SK_HEX).unwrap()
}

/// Public key at `m/12381/3600/<index>/0/0` for ``seed``.
pub fn pubkey_at(seed: &[u8], index: u32) -> BLSPubkey {
    let key = private_key_from_seed_and_path(seed, &validator_path(index)).unwrap();
    BlsAccount::from_bytes(validator_path(index), key.secret())
        .unwrap()
        .public_key()
}

/// Mock chain holding ``pubkey`` as validator ``index``.
pub fn mock_chain_with(index: ValidatorIndex, pubkey: BLSPubkey) -> MockChainInfoProvider {
    let mut provider = MockChainInfoProvider::new();
    let mut validator = mock_validator(index, [0; 48]);
    validator.pubkey = pubkey;
    provider.add_validator(validator);
    provider
}

/// Mock chain holding the dummy account as validator 1559.
pub fn mock_chain() -> MockChainInfoProvider {
    mock_chain_with(DUMMY_VALIDATOR_INDEX, dummy_account().public_key())
}

/// Config with every output file inside ``dir``.
pub fn config_in(dir: &Path) -> ExitConfig {
    ExitConfig {
        offline_preparation_file: dir.join("offline-preparation.json"),
        exit_operation_file: dir.join("exit-operation.json"),
        ..Default::default()
    }
}

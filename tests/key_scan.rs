mod common;

use std::sync::Arc;

use common::*;
use exitfuzz::constants::MAX_KEY_SCAN_DISTANCE;
use exitfuzz::crypto::bls_keys::KeySigner;
use exitfuzz::crypto::key_derivation::{seed_from_mnemonic, validator_path};
use exitfuzz::errors::ExitError;
use exitfuzz::exit::input::KeyInputs;
use exitfuzz::exit::key_resolver::scan_for_validator_key;
use exitfuzz::exit::{ExitCommand, ExitConfig, Outcome};

fn mnemonic_config(dir: &std::path::Path, validator: &str) -> ExitConfig {
    ExitConfig {
        inputs: KeyInputs {
            mnemonic: Some(MNEMONIC.to_string()),
            validator: Some(validator.to_string()),
            ..Default::default()
        },
        ..config_in(dir)
    }
}

#[test]
fn test_scan_finds_last_index_in_range() {
    let seed = seed_from_mnemonic(MNEMONIC).unwrap();
    let last = MAX_KEY_SCAN_DISTANCE - 1;
    let target = pubkey_at(&seed, last);
    let (index, _) = scan_for_validator_key(&seed, &target, MAX_KEY_SCAN_DISTANCE).unwrap();
    assert_eq!(index, last);
}

#[tokio::test]
async fn test_scan_exhaustion_produces_no_operation() {
    let dir = tempfile::tempdir().unwrap();
    let seed = seed_from_mnemonic(MNEMONIC).unwrap();
    let mut chain = mock_chain_with(42, pubkey_at(&seed, MAX_KEY_SCAN_DISTANCE));
    chain.set_panic_on_submit(true);

    let res = ExitCommand::with_provider(mnemonic_config(dir.path(), "42"), Box::new(chain))
        .process()
        .await;
    assert!(matches!(res, Err(ExitError::KeyDerivationFailure(_))));
    assert!(!dir.path().join("exit-operation.json").exists());
}

#[tokio::test]
async fn test_mnemonic_and_validator_by_pubkey() {
    let dir = tempfile::tempdir().unwrap();
    let seed = seed_from_mnemonic(MNEMONIC).unwrap();
    let pubkey = pubkey_at(&seed, 6);
    let chain = Arc::new(mock_chain_with(600, pubkey.clone()));
    let validator = format!("0x{}", hex::encode(&pubkey[..]));

    let config = mnemonic_config(dir.path(), &validator);
    let outcome = ExitCommand::with_provider(config, Box::new(chain.clone()))
        .process()
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Broadcast(_)));
    assert_eq!(chain.submitted()[0].message.validator_index, 600);
}

#[tokio::test]
async fn test_mnemonic_and_path() {
    let dir = tempfile::tempdir().unwrap();
    let seed = seed_from_mnemonic(MNEMONIC).unwrap();
    let chain = Arc::new(mock_chain_with(3, pubkey_at(&seed, 3)));
    let config = ExitConfig {
        inputs: KeyInputs {
            mnemonic: Some(MNEMONIC.to_string()),
            path: Some(validator_path(3)),
            ..Default::default()
        },
        ..config_in(dir.path())
    };
    ExitCommand::with_provider(config, Box::new(chain.clone()))
        .process()
        .await
        .unwrap();
    assert_eq!(chain.submitted()[0].message.validator_index, 3);

    let config = ExitConfig {
        inputs: KeyInputs {
            mnemonic: Some(MNEMONIC.to_string()),
            path: Some("m/12381/3600/3/0".to_string()),
            ..Default::default()
        },
        ..config_in(dir.path())
    };
    assert!(matches!(
        ExitCommand::with_provider(config, Box::new(chain.clone()))
            .process()
            .await,
        Err(ExitError::InvalidInputFormat(_))
    ));
    // The dummy account was never part of this chain.
    assert_ne!(dummy_account().public_key(), pubkey_at(&seed, 3));
}

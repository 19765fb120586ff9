use crate::beacon::ValidatorId;
use crate::errors::{ExitError, Result};
use crate::eth2::eth_types::SignedVoluntaryExit;
use crate::io::files::{parse_json, read_json};

use log::debug;
use std::path::{Path, PathBuf};

/// Key material and operation input as supplied by the user, before any validation.
#[derive(Debug, Clone, Default)]
pub struct KeyInputs {
    pub mnemonic: Option<String>,
    pub path: Option<String>,
    pub validator: Option<String>,
    pub private_key: Option<String>,
    pub account: Option<PathBuf>,
    pub passphrase: Option<String>,
    /// Inline JSON, or the path to a file holding it.
    pub signed_operation: Option<String>,
}

/// Where the exit operation comes from. Exactly one applies per run.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    File(Option<String>),
    MnemonicPath {
        mnemonic: String,
        path: String,
    },
    MnemonicValidator {
        mnemonic: String,
        validator: ValidatorId,
    },
    PrivateKey(String),
    Account {
        keystore: PathBuf,
        passphrase: String,
    },
}

fn ambiguous(reason: &str) -> ExitError {
    ExitError::AmbiguousInputCombination(reason.to_string())
}

impl InputSource {
    pub fn select(inputs: &KeyInputs) -> Result<Self> {
        let key_sources = [
            inputs.mnemonic.is_some(),
            inputs.private_key.is_some(),
            inputs.account.is_some(),
        ]
        .iter()
        .filter(|s| **s)
        .count();
        let has_key_material = key_sources > 0
            || inputs.path.is_some()
            || inputs.validator.is_some()
            || inputs.passphrase.is_some();

        if key_sources > 1 {
            return Err(ambiguous(
                "only one of mnemonic, private key or account may be supplied",
            ));
        }
        if inputs.signed_operation.is_some() && has_key_material {
            return Err(ambiguous(
                "a signed operation cannot be combined with key material",
            ));
        }
        if inputs.passphrase.is_some() && inputs.account.is_none() {
            return Err(ambiguous("passphrase supplied without an account"));
        }

        let source = match (
            &inputs.mnemonic,
            &inputs.private_key,
            &inputs.account,
            &inputs.path,
            &inputs.validator,
        ) {
            (Some(mnemonic), None, None, Some(path), None) => InputSource::MnemonicPath {
                mnemonic: mnemonic.clone(),
                path: path.clone(),
            },
            (Some(mnemonic), None, None, None, Some(validator)) => {
                InputSource::MnemonicValidator {
                    mnemonic: mnemonic.clone(),
                    validator: validator.parse()?,
                }
            }
            (Some(_), ..) => {
                return Err(ambiguous(
                    "mnemonic must be supplied with either a path or validator",
                ))
            }
            (None, Some(private_key), None, None, None) => {
                InputSource::PrivateKey(private_key.clone())
            }
            (None, None, Some(keystore), None, None) => match &inputs.passphrase {
                Some(passphrase) => InputSource::Account {
                    keystore: keystore.clone(),
                    passphrase: passphrase.clone(),
                },
                None => return Err(ambiguous("account requires a passphrase")),
            },
            (None, None, None, None, None) => {
                InputSource::File(inputs.signed_operation.clone())
            }
            _ => {
                return Err(ambiguous(
                    "unsupported combination of inputs; see help for details of supported combinations",
                ))
            }
        };
        debug!("Operation input: {}", source.describe());
        Ok(source)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, InputSource::File(_))
    }

    fn describe(&self) -> &'static str {
        match self {
            InputSource::File(None) => "exit operation file",
            InputSource::File(Some(_)) => "supplied signed operation",
            InputSource::MnemonicPath { .. } => "mnemonic and path",
            InputSource::MnemonicValidator { .. } => "mnemonic and validator",
            InputSource::PrivateKey(_) => "private key",
            InputSource::Account { .. } => "account",
        }
    }
}

/// Load a signed exit from inline JSON, a named file, or the default exit operation file.
pub fn load_operation(
    supplied: Option<&str>,
    default_file: &Path,
) -> Result<SignedVoluntaryExit> {
    match supplied {
        Some(input) if input.trim_start().starts_with('{') => {
            parse_json("exit operation input", input)
        }
        Some(file) => read_json(Path::new(file)),
        None => {
            if !default_file.exists() {
                return Err(ExitError::AmbiguousInputCombination(format!(
                    "no account, mnemonic or private key specified, and no {} file loaded",
                    default_file.display()
                )));
            }
            debug!("{} found; loading operation", default_file.display());
            read_json(default_file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::InputFormatError;

    const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn mnemonic_inputs() -> KeyInputs {
        KeyInputs {
            mnemonic: Some(MNEMONIC.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_select_each_source() {
        assert_eq!(
            InputSource::select(&KeyInputs::default()).unwrap(),
            InputSource::File(None)
        );

        let inputs = KeyInputs {
            path: Some("m/12381/3600/0/0/0".to_string()),
            ..mnemonic_inputs()
        };
        assert!(matches!(
            InputSource::select(&inputs).unwrap(),
            InputSource::MnemonicPath { .. }
        ));

        let inputs = KeyInputs {
            validator: Some("12".to_string()),
            ..mnemonic_inputs()
        };
        match InputSource::select(&inputs).unwrap() {
            InputSource::MnemonicValidator { validator, .. } => {
                assert_eq!(validator, ValidatorId::Index(12))
            }
            other => panic!("unexpected {:?}", other),
        }

        let inputs = KeyInputs {
            private_key: Some("0x01".to_string()),
            ..Default::default()
        };
        assert_eq!(
            InputSource::select(&inputs).unwrap(),
            InputSource::PrivateKey("0x01".to_string())
        );

        let inputs = KeyInputs {
            account: Some(PathBuf::from("keystore.json")),
            passphrase: Some("pw".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            InputSource::select(&inputs).unwrap(),
            InputSource::Account { .. }
        ));
    }

    #[test]
    fn test_conflicting_sources() {
        let conflicting = [
            KeyInputs {
                private_key: Some("0x01".to_string()),
                ..mnemonic_inputs()
            },
            KeyInputs {
                path: Some("m/12381/3600/0/0/0".to_string()),
                validator: Some("1".to_string()),
                ..mnemonic_inputs()
            },
            mnemonic_inputs(),
            KeyInputs {
                validator: Some("1".to_string()),
                ..Default::default()
            },
            KeyInputs {
                private_key: Some("0x01".to_string()),
                path: Some("m/12381/3600/0/0/0".to_string()),
                ..Default::default()
            },
            KeyInputs {
                account: Some(PathBuf::from("keystore.json")),
                ..Default::default()
            },
            KeyInputs {
                signed_operation: Some("{}".to_string()),
                private_key: Some("0x01".to_string()),
                ..Default::default()
            },
        ];
        for inputs in conflicting {
            assert!(
                matches!(
                    InputSource::select(&inputs),
                    Err(ExitError::AmbiguousInputCombination(_))
                ),
                "{:?} should be ambiguous",
                inputs
            );
        }
    }

    #[test]
    fn test_bad_validator_identifier() {
        let inputs = KeyInputs {
            validator: Some("not-a-validator".to_string()),
            ..mnemonic_inputs()
        };
        assert!(matches!(
            InputSource::select(&inputs),
            Err(ExitError::InvalidInputFormat(InputFormatError::ValidatorId(_)))
        ));
    }

    #[test]
    fn test_load_operation() {
        let dir = tempfile::tempdir().unwrap();
        let default_file = dir.path().join("exit-operation.json");
        assert!(matches!(
            load_operation(None, &default_file),
            Err(ExitError::AmbiguousInputCombination(_))
        ));

        let json = format!(
            r#"{{"message":{{"epoch":"3","validator_index":"4"}},"signature":"0x{}"}}"#,
            "00".repeat(96)
        );
        let op = load_operation(Some(&json), &default_file).unwrap();
        assert_eq!(op.message.validator_index, 4);

        std::fs::write(&default_file, &json).unwrap();
        assert_eq!(load_operation(None, &default_file).unwrap(), op);
        let named = default_file.to_str().unwrap();
        assert_eq!(load_operation(Some(named), &default_file).unwrap(), op);

        assert!(matches!(
            load_operation(Some(r#"{"message": 7}"#), &default_file),
            Err(ExitError::InvalidInputFormat(InputFormatError::Json { .. }))
        ));
    }
}

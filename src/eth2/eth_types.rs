use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_hex::{SerHex, StrictPfx};
use serde_utils::quoted_u64;
use ssz::Encode;
use ssz_derive::{Decode, Encode};
use ssz_types::{typenum, FixedVector};
use tree_hash_derive::TreeHash;

use crate::strip_0x_prefix;

/// Types
pub type Bytes4 = [u8; 4];
pub type Bytes32 = [u8; 32];
pub type Bytes48 = FixedVector<u8, typenum::U48>;
pub type Bytes96 = FixedVector<u8, typenum::U96>;
pub type Slot = u64;
pub type Epoch = u64;
pub type ValidatorIndex = u64;
pub type Root = Bytes32;
pub type BLSSignature = Bytes96;
pub type BLSPubkey = Bytes48;
pub type Version = Bytes4;
pub type DomainType = Bytes4;
pub type Domain = Bytes32;

// Domains
pub const DOMAIN_VOLUNTARY_EXIT: DomainType = [4_u8, 0_u8, 0_u8, 0_u8]; // '0x04000000'

// Custom (de)serializers

/// Deserializes a hex string into a fixed length SSZ vector, rejecting any length mismatch.
pub fn from_hex_to_ssz_type<'de, D, N>(deserializer: D) -> Result<FixedVector<u8, N>, D::Error>
where
    D: Deserializer<'de>,
    N: typenum::Unsigned,
{
    let hex_str: String = Deserialize::deserialize(deserializer)?;
    let hex_str: &str = strip_0x_prefix!(hex_str);
    let bytes = match hex::decode(hex_str) {
        Ok(bs) => bs,
        Err(e) => return Err(de::Error::custom(format!("Not valid hex: {:?}", e))),
    };
    let len = bytes.len();
    FixedVector::new(bytes).map_err(|_| {
        de::Error::custom(format!("expected {} bytes, got {}", N::to_usize(), len))
    })
}

pub fn to_hex_from_ssz_type<S, T>(data: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Encode,
{
    let hex_string = "0x".to_string() + &hex::encode(data.as_ssz_bytes());
    serializer.serialize_str(&hex_string)
}

/// Parse a fixed-size byte array from a hex string, with or without a `0x` prefix.
pub fn bytes_from_hex<const N: usize>(field: &str, hex_str: &str) -> crate::Result<[u8; N]> {
    let hex_str: &str = strip_0x_prefix!(hex_str);
    let bytes = hex::decode(hex_str).map_err(|e| crate::ExitError::hex(field, e))?;
    <[u8; N]>::try_from(bytes.as_slice())
        .map_err(|_| crate::ExitError::length(field, N, bytes.len()))
}

/// Parse a BLS public key from hex.
pub fn pubkey_from_hex(hex_str: &str) -> crate::Result<BLSPubkey> {
    let bytes: [u8; crate::constants::BLS_PUB_KEY_BYTES] = bytes_from_hex("public key", hex_str)?;
    Ok(BLSPubkey::from(bytes.to_vec()))
}

pub fn pubkey_to_hex(pubkey: &BLSPubkey) -> String {
    format!("0x{}", hex::encode(&pubkey[..]))
}

#[derive(Debug, Deserialize, Serialize, Encode, Decode, TreeHash, Clone)]
pub struct SigningData {
    #[serde(with = "SerHex::<StrictPfx>")]
    pub object_root: Root,
    #[serde(with = "SerHex::<StrictPfx>")]
    pub domain: Domain,
}

#[derive(Debug, Deserialize, Serialize, Encode, Decode, TreeHash, Clone, Default, PartialEq, Eq)]
pub struct Fork {
    #[serde(with = "SerHex::<StrictPfx>")]
    pub previous_version: Version,
    #[serde(with = "SerHex::<StrictPfx>")]
    pub current_version: Version,
    #[serde(with = "quoted_u64")]
    pub epoch: Epoch,
}

#[derive(Debug, Deserialize, Serialize, Encode, Decode, TreeHash, Clone)]
pub struct ForkData {
    #[serde(with = "SerHex::<StrictPfx>")]
    pub current_version: Version,
    #[serde(with = "SerHex::<StrictPfx>")]
    pub genesis_validators_root: Root,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Checkpoint {
    #[serde(with = "quoted_u64")]
    pub epoch: Epoch,
    #[serde(with = "SerHex::<StrictPfx>")]
    pub root: Root,
}

/// Finality checkpoints of a beacon state.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Finality {
    pub previous_justified: Checkpoint,
    pub current_justified: Checkpoint,
    pub finalized: Checkpoint,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Genesis {
    #[serde(with = "quoted_u64")]
    pub genesis_time: u64,
    #[serde(with = "SerHex::<StrictPfx>")]
    pub genesis_validators_root: Root,
    #[serde(with = "SerHex::<StrictPfx>")]
    pub genesis_fork_version: Version,
}

/// The subset of the chain configuration needed for exits and status reporting.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SpecConstants {
    #[serde(with = "quoted_u64", alias = "SECONDS_PER_SLOT")]
    pub seconds_per_slot: u64,
    #[serde(with = "quoted_u64", alias = "SLOTS_PER_EPOCH")]
    pub slots_per_epoch: u64,
    #[serde(with = "SerHex::<StrictPfx>", alias = "DOMAIN_VOLUNTARY_EXIT")]
    pub domain_voluntary_exit: DomainType,
}

impl Default for SpecConstants {
    fn default() -> Self {
        SpecConstants {
            seconds_per_slot: 12,
            slots_per_epoch: 32,
            domain_voluntary_exit: DOMAIN_VOLUNTARY_EXIT,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Encode, Decode, TreeHash, Clone, Default, PartialEq, Eq)]
pub struct VoluntaryExit {
    #[serde(with = "quoted_u64")]
    pub epoch: Epoch, // Earliest epoch when voluntary exit can be processed
    #[serde(with = "quoted_u64")]
    pub validator_index: ValidatorIndex,
}

#[derive(Debug, Deserialize, Serialize, Encode, Decode, TreeHash, Clone, PartialEq)]
pub struct SignedVoluntaryExit {
    pub message: VoluntaryExit,
    #[serde(
        deserialize_with = "from_hex_to_ssz_type",
        serialize_with = "to_hex_from_ssz_type"
    )]
    pub signature: BLSSignature,
}

/// A validator as recorded in the beacon state registry.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ValidatorInfo {
    #[serde(with = "quoted_u64")]
    pub index: ValidatorIndex,
    #[serde(
        deserialize_with = "from_hex_to_ssz_type",
        serialize_with = "to_hex_from_ssz_type"
    )]
    pub pubkey: BLSPubkey,
    #[serde(default)]
    pub state: String,
    #[serde(with = "SerHex::<StrictPfx>", default)]
    pub withdrawal_credentials: Bytes32,
}

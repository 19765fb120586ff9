pub const OFFLINE_PREPARATION_FILENAME: &str = "offline-preparation.json";
pub const EXIT_OPERATION_FILENAME: &str = "exit-operation.json";

pub const BLS_PUB_KEY_BYTES: usize = 48;
pub const BLS_PRIV_KEY_BYTES: usize = 32;
pub const BLS_SIGNATURE_BYTES: usize = 96;
pub const ROOT_BYTES: usize = 32;
pub const FORK_VERSION_BYTES: usize = 4;

/// EIP-2334 purpose and coin type for validator keys.
pub const EIP2334_PURPOSE: u32 = 12381;
pub const EIP2334_COIN_TYPE: u32 = 3600;

/// Number of account indices scanned when matching a mnemonic to a validator.
pub const MAX_KEY_SCAN_DISTANCE: u32 = 1024;

/// Upper bound (exclusive) for fuzzed validator indices and epochs.
pub const FUZZ_VALUE_RANGE: u64 = 1_000_000;
pub const MAX_FUZZ_INTENSITY: u8 = 100;

pub const DEFAULT_BEACON_NODE: &str = "http://localhost:5052";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

//! Probability-controlled corruption of exit operations.
//!
//! At each checkpoint of the build every eligible field is considered independently: a
//! percentage is drawn from `[0, 100)` and the field is replaced with random data when the
//! draw falls below the configured intensity.

use crate::constants::{BLS_SIGNATURE_BYTES, FUZZ_VALUE_RANGE, MAX_FUZZ_INTENSITY};
use crate::errors::{InputFormatError, Result};
use crate::eth2::eth_types::{BLSSignature, Root, VoluntaryExit};

use log::{debug, warn};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FuzzConfig {
    /// Percentage chance of corrupting each eligible field, 0 to 100.
    pub intensity: u8,
    /// Zero draws a fresh seed from the OS.
    pub seed: u64,
}

impl FuzzConfig {
    pub fn new(intensity: u8, seed: u64) -> Result<Self> {
        if intensity > MAX_FUZZ_INTENSITY {
            return Err(InputFormatError::Intensity(intensity).into());
        }
        Ok(FuzzConfig { intensity, seed })
    }
}

pub struct FuzzInjector {
    intensity: u8,
    seed: u64,
    rng: ChaCha8Rng,
}

impl FuzzInjector {
    pub fn new(config: FuzzConfig) -> Self {
        let seed = match config.seed {
            0 => rand::thread_rng().gen_range(1..=u64::MAX),
            seed => seed,
        };
        // Visible at the default log level.
        if config.intensity > 0 {
            warn!(
                "Fuzzing with intensity {} and seed {}",
                config.intensity, seed
            );
        } else {
            debug!("Fuzzing disabled (seed {})", seed);
        }
        FuzzInjector {
            intensity: config.intensity,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// An injector that never changes anything.
    pub fn disabled() -> Self {
        FuzzInjector {
            intensity: 0,
            seed: 0,
            rng: ChaCha8Rng::seed_from_u64(0),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn acts(&mut self) -> bool {
        self.rng.gen_range(0..100_u8) < self.intensity
    }

    /// Checkpoint before the message root is computed.
    pub fn fuzz_message(&mut self, message: &mut VoluntaryExit) {
        if self.intensity > 0 {
            debug!("Before fuzzing: {:?}", message);
        }
        if self.acts() {
            message.validator_index = self.rng.gen_range(0..FUZZ_VALUE_RANGE);
        }
        if self.acts() {
            message.epoch = self.rng.gen_range(0..FUZZ_VALUE_RANGE);
        }
        if self.intensity > 0 {
            debug!("After fuzzing: {:?}", message);
        }
    }

    /// Checkpoint between computing the root and signing it.
    pub fn fuzz_message_with_root(&mut self, message: &mut VoluntaryExit, root: &mut Root) {
        self.fuzz_message(message);
        if self.acts() {
            self.rng.fill_bytes(root);
            debug!("Fuzzed root: 0x{}", hex::encode(root));
        }
    }

    /// Checkpoint after signing.
    pub fn fuzz_message_with_signature(
        &mut self,
        message: &mut VoluntaryExit,
        signature: &mut BLSSignature,
    ) {
        self.fuzz_message(message);
        if self.acts() {
            let mut bytes = [0_u8; BLS_SIGNATURE_BYTES];
            self.rng.fill_bytes(&mut bytes);
            *signature = BLSSignature::from(bytes.to_vec());
            debug!("Fuzzed signature: 0x{}", hex::encode(bytes));
        }
    }
}

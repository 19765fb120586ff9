use crate::beacon::chain_info::current_slot;
use crate::beacon::{ensure_capabilities, BeaconNodeClient, Capability, ChainInfoProvider};
use crate::errors::Result;
use crate::eth2::eth_signing::compute_epoch_at_slot;
use crate::eth2::eth_types::{Epoch, Slot};

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Connection settings for `chain status`.
#[derive(Debug, Clone)]
pub struct StatusConfig {
    pub connection: String,
    pub timeout: Duration,
    pub verbose: bool,
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

const STATUS_CAPABILITIES: &[Capability] =
    &[Capability::Spec, Capability::Genesis, Capability::Finality];

/// Snapshot of the chain clock and finality at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainStatus {
    pub slot: Slot,
    pub epoch: Epoch,
    pub justified_epoch: Epoch,
    pub finalized_epoch: Epoch,
    pub prior_justified_epoch: Epoch,
    pub slots_per_epoch: u64,
    /// Time until the next slot starts.
    pub until_next_slot: Duration,
    /// Time until the next epoch starts.
    pub until_next_epoch: Duration,
}

impl ChainStatus {
    /// Connect to the configured beacon node and report its status as of now.
    pub async fn fetch(config: &StatusConfig) -> Result<Self> {
        let client = BeaconNodeClient::connect(&config.connection, config.timeout).await?;
        Self::obtain(&client, now_millis()).await
    }

    /// Query ``provider`` and compute the status as of ``now`` (unix time, milliseconds).
    pub async fn obtain(provider: &dyn ChainInfoProvider, now_ms: u64) -> Result<Self> {
        ensure_capabilities(provider, STATUS_CAPABILITIES)?;
        let spec = provider.spec().await?;
        let finality = provider.finality("head").await?;
        let genesis = provider.genesis().await?;

        let slot = current_slot(genesis.genesis_time, now_ms / 1000, spec.seconds_per_slot);
        let epoch = compute_epoch_at_slot(slot, spec.slots_per_epoch);

        let slot_ms = spec.seconds_per_slot * 1000;
        let genesis_ms = genesis.genesis_time * 1000;
        let next_slot_ms = genesis_ms + (slot + 1) * slot_ms;
        let next_epoch_ms = genesis_ms + (epoch + 1) * spec.slots_per_epoch * slot_ms;

        Ok(ChainStatus {
            slot,
            epoch,
            justified_epoch: finality.current_justified.epoch,
            finalized_epoch: finality.finalized.epoch,
            prior_justified_epoch: finality.previous_justified.epoch,
            slots_per_epoch: spec.slots_per_epoch,
            until_next_slot: Duration::from_millis(next_slot_ms.saturating_sub(now_ms)),
            until_next_epoch: Duration::from_millis(next_epoch_ms.saturating_sub(now_ms)),
        })
    }

    pub fn epoch_start_slot(&self) -> Slot {
        self.epoch * self.slots_per_epoch
    }

    pub fn epoch_end_slot(&self) -> Slot {
        (self.epoch_start_slot() + self.slots_per_epoch).saturating_sub(1)
    }

    pub fn slots_until_next_epoch(&self) -> u64 {
        (self.epoch_start_slot() + self.slots_per_epoch).saturating_sub(self.slot)
    }

    /// The status report; ``verbose`` adds slot level detail and distances.
    pub fn report(&self, verbose: bool) -> String {
        let mut out = format!("Current epoch: {}\n", self.epoch);
        if verbose {
            out += &format!("Current slot: {}\n", self.slot);
        }
        out += &format!("Justified epoch: {}\n", self.justified_epoch);
        if verbose {
            out += &format!(
                "Justified epoch distance: {}\n",
                self.epoch.saturating_sub(self.justified_epoch)
            );
        }
        out += &format!("Finalized epoch: {}\n", self.finalized_epoch);
        if verbose {
            out += &format!(
                "Finalized epoch distance: {}\n",
                self.epoch.saturating_sub(self.finalized_epoch)
            );
            out += &format!("Prior justified epoch: {}\n", self.prior_justified_epoch);
            out += &format!(
                "Prior justified epoch distance: {}\n",
                self.epoch.saturating_sub(self.prior_justified_epoch)
            );
            out += &format!(
                "Epoch slots: {}-{}\n",
                self.epoch_start_slot(),
                self.epoch_end_slot()
            );
            out += &format!(
                "Time until next slot: {:.1}s\n",
                self.until_next_slot.as_secs_f64()
            );
            out += &format!("Slots until next epoch: {}\n", self.slots_until_next_epoch());
            out += &format!(
                "Time until next epoch: {:.1}s\n",
                self.until_next_epoch.as_secs_f64()
            );
        }
        out
    }
}

impl fmt::Display for ChainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon::mock::{MockChainInfoProvider, MOCK_GENESIS_TIME};
    use crate::errors::ExitError;

    // 3.5 seconds into slot 70, the seventh slot of epoch 2.
    fn now_ms() -> u64 {
        (MOCK_GENESIS_TIME + 70 * 12) * 1000 + 3500
    }

    #[tokio::test]
    async fn test_status_arithmetic() {
        let provider = MockChainInfoProvider::new();
        let status = ChainStatus::obtain(&provider, now_ms()).await.unwrap();
        assert_eq!(status.slot, 70);
        assert_eq!(status.epoch, 2);
        assert_eq!(status.epoch_start_slot(), 64);
        assert_eq!(status.epoch_end_slot(), 95);
        assert_eq!(status.slots_until_next_epoch(), 26);
        assert_eq!(status.until_next_slot, Duration::from_millis(8500));
        assert_eq!(
            status.until_next_epoch,
            Duration::from_millis(25 * 12_000 + 8500)
        );
        assert_eq!(status.justified_epoch, 200_001);
        assert_eq!(status.finalized_epoch, 200_000);
    }

    #[tokio::test]
    async fn test_before_genesis() {
        let provider = MockChainInfoProvider::new();
        let status = ChainStatus::obtain(&provider, (MOCK_GENESIS_TIME - 30) * 1000)
            .await
            .unwrap();
        assert_eq!(status.slot, 0);
        assert_eq!(status.epoch, 0);
    }

    #[tokio::test]
    async fn test_report() {
        let provider = MockChainInfoProvider::new();
        let status = ChainStatus::obtain(&provider, now_ms()).await.unwrap();
        assert_eq!(
            status.to_string(),
            "Current epoch: 2\nJustified epoch: 200001\nFinalized epoch: 200000\n"
        );
        let verbose = status.report(true);
        assert!(verbose.contains("Current slot: 70\n"));
        assert!(verbose.contains("Epoch slots: 64-95\n"));
        assert!(verbose.contains("Time until next slot: 8.5s\n"));
        assert!(verbose.contains("Slots until next epoch: 26\n"));
    }

    #[tokio::test]
    async fn test_requires_finality() {
        let mut provider = MockChainInfoProvider::new();
        provider.set_capabilities(vec![Capability::Spec, Capability::Genesis]);
        assert!(matches!(
            ChainStatus::obtain(&provider, now_ms()).await,
            Err(ExitError::UnsupportedCapability(Capability::Finality))
        ));
    }
}

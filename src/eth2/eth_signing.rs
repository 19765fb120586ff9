use super::eth_types::*;
use crate::constants::{FORK_VERSION_BYTES, ROOT_BYTES};

use log::debug;
use tree_hash::TreeHash;

/// Return the signing root for the corresponding signing data.
pub fn compute_signing_root<T: TreeHash>(ssz_object: &T, domain: Domain) -> Root {
    signing_root_from_object_root(ssz_object.tree_hash_root().to_fixed_bytes(), domain)
}

/// Return the signing root for an already computed object root.
pub fn signing_root_from_object_root(object_root: Root, domain: Domain) -> Root {
    let sign_data = SigningData {
        object_root,
        domain,
    };
    sign_data.tree_hash_root().to_fixed_bytes()
}

/// Return the 32-byte fork data root for the ``current_version`` and ``genesis_validators_root``.
/// This is used primarily in signature domains to avoid collisions across forks/chains.
pub fn compute_fork_data_root(current_version: Version, genesis_validators_root: Root) -> Root {
    let f = ForkData {
        current_version,
        genesis_validators_root,
    };
    f.tree_hash_root().to_fixed_bytes()
}

/// Return the epoch number at ``slot``.
pub fn compute_epoch_at_slot(slot: Slot, slots_per_epoch: u64) -> Epoch {
    slot.checked_div(slots_per_epoch).unwrap_or_default()
}

/// Return the domain for the ``domain_type``, ``fork_version`` and ``genesis_validators_root``.
/// https://github.com/ethereum/consensus-specs/blob/dev/specs/phase0/beacon-chain.md#compute_domain
pub fn compute_domain(
    domain_type: DomainType,
    fork_version: Version,
    genesis_validators_root: Root,
) -> Domain {
    let fork_data_root = compute_fork_data_root(fork_version, genesis_validators_root);
    let mut d = [0_u8; 32]; // domain_type + fork_data_root[:28]
    d[..4].copy_from_slice(&domain_type);
    d[4..].copy_from_slice(&fork_data_root[..28]);
    d
}

/// Fork version to sign with: an explicit hex override wins over the chain's current version.
pub fn obtain_fork_version(supplied: Option<&str>, from_chain: Version) -> crate::Result<Version> {
    let fork_version = match supplied {
        Some(hex_str) => {
            debug!("Fork version supplied on the command line");
            bytes_from_hex::<FORK_VERSION_BYTES>("fork version", hex_str)?
        }
        None => {
            debug!("Fork version obtained from chain info");
            from_chain
        }
    };
    debug!("Using fork version 0x{}", hex::encode(fork_version));
    Ok(fork_version)
}

/// Genesis validators root to sign with: an explicit hex override wins over the chain's value.
pub fn obtain_genesis_validators_root(
    supplied: Option<&str>,
    from_chain: Root,
) -> crate::Result<Root> {
    let root = match supplied {
        Some(hex_str) => {
            debug!("Genesis validators root supplied on the command line");
            bytes_from_hex::<ROOT_BYTES>("genesis validators root", hex_str)?
        }
        None => {
            debug!("Genesis validators root obtained from chain info");
            from_chain
        }
    };
    debug!("Using genesis validators root 0x{}", hex::encode(root));
    Ok(root)
}

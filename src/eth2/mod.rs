pub mod eth_signing;
pub mod eth_types;

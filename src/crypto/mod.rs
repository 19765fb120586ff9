pub mod bls_keys;
pub mod key_derivation;
pub mod keystore;

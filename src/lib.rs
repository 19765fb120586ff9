extern crate env_logger;

pub mod beacon;
pub mod chain_status;
pub mod constants;
pub mod crypto;
pub mod errors;
pub mod eth2;
pub mod exit;
pub mod io;
pub mod logging;

pub use errors::{ExitError, Result};

#[macro_export]
macro_rules! strip_0x_prefix {
    ($hex:expr) => {
        $hex.strip_prefix("0x").unwrap_or(&$hex).into()
    };
}

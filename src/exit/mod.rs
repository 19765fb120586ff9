pub mod builder;
pub mod fuzz;
pub mod input;
pub mod key_resolver;
pub mod process;
pub mod verifier;

pub use process::{ExitCommand, ExitConfig, ExitState, Outcome};

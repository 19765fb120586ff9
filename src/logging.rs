use env_logger::Builder;
use log::LevelFilter;

/// Transport crates that are far too chatty below error level.
const NOISY_TARGETS: &[&str] = &["hyper", "reqwest", "rustls", "h2", "want"];

/// Log level selected by the `--quiet`, `--verbose` and `--debug` flags.
pub fn level_from_flags(quiet: bool, verbose: bool, debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else if verbose {
        LevelFilter::Info
    } else if quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Warn
    }
}

fn builder(level: LevelFilter) -> Builder {
    let mut builder = Builder::new();
    builder.filter_level(level);
    for target in NOISY_TARGETS {
        builder.filter_module(target, LevelFilter::Error);
    }
    // RUST_LOG wins over the flags.
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder
}

pub fn init_logger(level: LevelFilter) {
    if builder(level).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}

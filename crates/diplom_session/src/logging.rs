//! Session logging setup.
//!
//! File output goes to `./diplom.log` in the current working directory unless
//! another path is given.

use std::path::PathBuf;

use diplom_logging::diplom_info;
use log::LevelFilter;

pub use diplom_logging::LogDestination;

pub const DEFAULT_LOG_FILE: &str = "./diplom.log";

/// Logs to the terminal and to `./diplom.log`.
pub fn initialize_default() -> bool {
    initialize(LogDestination::Both(PathBuf::from(DEFAULT_LOG_FILE)), LevelFilter::Info)
}

/// Installs the global logger. Returns false if one was already installed.
pub fn initialize(destination: LogDestination, level: LevelFilter) -> bool {
    let described = describe(&destination);
    let installed = diplom_logging::initialize(destination, level);
    if installed {
        diplom_info!("logging to {} at {}", described, level);
    }
    installed
}

fn describe(destination: &LogDestination) -> String {
    match destination {
        LogDestination::File(path) => path.display().to_string(),
        LogDestination::Terminal => "terminal".to_string(),
        LogDestination::Both(path) => format!("terminal and {}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destinations_are_described() {
        assert_eq!(describe(&LogDestination::Terminal), "terminal");
        assert_eq!(
            describe(&LogDestination::Both(PathBuf::from("a.log"))),
            "terminal and a.log"
        );
    }
}

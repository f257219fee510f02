//! Per-account activity log.
//!
//! The dispatcher reports through an [`ActivityLog`] handed to it rather than
//! the global logger, so tests can assert on what was reported.

use colored::Colorize;
use log::{error, info, warn};

use crate::account::Account;

#[cfg_attr(test, mockall::automock)]
pub trait ActivityLog: Send + Sync {
    fn info(&self, account: &Account, message: &str);
    fn warn(&self, account: &Account, message: &str);
    fn error(&self, account: &Account, message: &str);
}

/// Forwards to the `log` facade with a colored `NN - ` account prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLog;

impl ConsoleLog {
    fn prefix(account: &Account) -> String {
        account.label().cyan().to_string()
    }
}

impl ActivityLog for ConsoleLog {
    fn info(&self, account: &Account, message: &str) {
        info!("{} - {}", Self::prefix(account), message);
    }

    fn warn(&self, account: &Account, message: &str) {
        warn!("{} - {}", Self::prefix(account), message.yellow());
    }

    fn error(&self, account: &Account, message: &str) {
        error!("{} - {}", Self::prefix(account), message.red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_console_log_does_not_panic() {
        let account = Account::new("t", None, 3);
        let log = ConsoleLog;
        log.info(&account, "hello");
        log.warn(&account, "careful");
        log.error(&account, "broken");
    }

    #[test]
    fn test_prefix_contains_label() {
        let account = Account::new("t", None, 4);
        assert!(ConsoleLog::prefix(&account).contains("04"));
    }
}

//! Notification adapters.
//!
//! [`TracingNotifier`] turns notices into log events; [`ConsoleNotifier`]
//! prints them for someone at a terminal.

use std::io::{self, Write};

use tracing::{error, info, warn};

use crate::domain::ports::{Notice, NoticeLevel, Notifier};

/// Emits each notice as a tracing event at a matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!(notice = %notice.message, "notice"),
            NoticeLevel::Warning => warn!(notice = %notice.message, "notice"),
            NoticeLevel::Error => error!(notice = %notice.message, "notice"),
        }
    }
}

/// Prints success notices to stdout and the rest to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let line = render(&notice);
        // A closed terminal is not worth failing an action over.
        drop(match notice.level {
            NoticeLevel::Success => writeln!(io::stdout().lock(), "{line}"),
            NoticeLevel::Warning | NoticeLevel::Error => writeln!(io::stderr().lock(), "{line}"),
        });
    }
}

fn render(notice: &Notice) -> String {
    format!("[{}] {}", notice.level, notice.message)
}

//! Desktop notification at the end of a daily run.
//!
//! Uses `osascript` on macOS and does nothing elsewhere. Always best-effort:
//! a failed notification is logged and never affects the run result.

use std::process::Command;
use tracing::{debug, warn};

pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

/// macOS Notification Center via AppleScript.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) {
        if !cfg!(target_os = "macos") {
            debug!("desktop notifications unsupported on this platform");
            return;
        }
        let script = notification_script(title, message);
        match Command::new("osascript").args(["-e", &script]).status() {
            Ok(status) if status.success() => {}
            Ok(status) => warn!(%status, "notification command failed"),
            Err(e) => warn!(error = %e, "failed to send notification"),
        }
    }
}

/// `display notification "…" with title "…"`, with quotes escaped.
pub fn notification_script(title: &str, message: &str) -> String {
    format!(
        "display notification \"{}\" with title \"{}\"",
        escape_applescript(message),
        escape_applescript(title)
    )
}

fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_escapes_quotes() {
        assert_eq!(
            notification_script("LeetCode Job", "say \"hi\""),
            r#"display notification "say \"hi\"" with title "LeetCode Job""#
        );
    }

    #[test]
    fn script_escapes_backslashes() {
        assert_eq!(escape_applescript(r"a\b"), r"a\\b");
    }
}

//! Alert surface for the terminal `watch` mode.
use std::io::Write;

use log::info;
use market_engine::traits::{AlertError, AlertSurface};

/// Raises alerts on the terminal's standard error, optionally ringing the bell.
///
/// A muted surface refuses every alert, the same way a user who has not granted notification permission would.
#[derive(Debug, Clone, Copy)]
pub struct TerminalAlerts {
    muted: bool,
    bell: bool,
}

impl Default for TerminalAlerts {
    fn default() -> Self {
        Self { muted: false, bell: true }
    }
}

impl TerminalAlerts {
    pub fn muted() -> Self {
        Self { muted: true, bell: false }
    }

    pub fn without_bell(mut self) -> Self {
        self.bell = false;
        self
    }

    fn render(&self, title: &str, body: &str) -> String {
        let bell = if self.bell { "\x07" } else { "" };
        format!("{bell}🔔️ {title}: {body}\n")
    }
}

impl AlertSurface for TerminalAlerts {
    fn raise_alert(&self, title: &str, body: &str) -> Result<(), AlertError> {
        if self.muted {
            return Err(AlertError::PermissionDenied);
        }
        info!("🔔️ Alert raised: {title}");
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(self.render(title, body).as_bytes()).map_err(|e| AlertError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn muted_alerts_are_refused() {
        assert_eq!(TerminalAlerts::muted().raise_alert("New match", "..."), Err(AlertError::PermissionDenied));
        assert!(TerminalAlerts::default().without_bell().raise_alert("New match", "Your listing has a match").is_ok());
    }

    #[test]
    fn rendering() {
        assert_eq!(TerminalAlerts::default().without_bell().render("A", "b"), "🔔️ A: b\n");
        assert!(TerminalAlerts::default().render("A", "b").starts_with('\x07'));
    }
}

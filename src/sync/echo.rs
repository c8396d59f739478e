//! One-shot echo suppression for programmatic editor writes.

use tracing::warn;

/// Suppresses exactly one settle reaction.
///
/// Armed right before the controller writes into the editor so the write is
/// not bounced back into the store as a user edit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EchoSuppressor {
    armed: bool,
}

impl EchoSuppressor {
    /// Suppress the next settle. Returns `false` if it was already armed.
    pub fn arm(&mut self) -> bool {
        if self.armed {
            warn!("echo suppression armed twice before a settle");
            return false;
        }
        self.armed = true;
        true
    }

    /// Whether suppression was armed. Always disarms.
    pub const fn consume_and_check(&mut self) -> bool {
        let armed = self.armed;
        self.armed = false;
        armed
    }

    pub const fn is_armed(&self) -> bool {
        self.armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_reports_and_clears() {
        let mut echo = EchoSuppressor::default();
        assert!(echo.arm());
        assert!(echo.consume_and_check());
        assert!(!echo.consume_and_check());
        assert!(!echo.is_armed());
    }

    #[test]
    fn test_consume_without_arm_is_false() {
        let mut echo = EchoSuppressor::default();
        assert!(!echo.consume_and_check());
    }

    #[test]
    fn test_double_arm_stays_armed_once() {
        let mut echo = EchoSuppressor::default();
        assert!(echo.arm());
        assert!(!echo.arm());
        assert!(echo.consume_and_check());
        assert!(!echo.consume_and_check());
    }
}

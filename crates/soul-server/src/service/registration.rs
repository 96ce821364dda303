use crate::handler::{ErrorKind, Result};

/// Whether new accounts may be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationPolicy {
    enabled: bool,
}

impl RegistrationPolicy {
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    #[inline]
    pub const fn is_enabled(self) -> bool {
        self.enabled
    }

    /// Fails with 400 when registration is closed.
    pub fn ensure_enabled(self) -> Result<()> {
        if self.enabled {
            return Ok(());
        }

        Err(ErrorKind::RegistrationDisabled.with_resource("account"))
    }
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        Self::new(true)
    }
}

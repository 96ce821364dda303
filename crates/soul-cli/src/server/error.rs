//! Server lifecycle errors.

use std::io;

use thiserror::Error;

pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Failures while binding or running the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address.
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("Runtime error: {0}")]
    Runtime(#[source] io::Error),
}

impl ServerError {
    pub fn bind(address: impl ToString, source: io::Error) -> Self {
        Self::Bind {
            address: address.to_string(),
            source,
        }
    }

    /// Returns the process exit code for this error.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Bind { .. } => 4,
            Self::Runtime(_) => 5,
        }
    }

    /// Provides a human-readable suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        let kind = match self {
            Self::Bind { source, .. } | Self::Runtime(source) => source.kind(),
        };

        match kind {
            io::ErrorKind::PermissionDenied => {
                Some("Try using a port above 1024 or run with appropriate privileges")
            }
            io::ErrorKind::AddrInUse => Some(
                "The port is already in use. Try a different port or stop the conflicting service",
            ),
            io::ErrorKind::AddrNotAvailable => {
                Some("The address is not available. Check network interface configuration")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let bind = ServerError::bind("127.0.0.1:8001", io::Error::other("test"));
        let runtime = ServerError::Runtime(io::Error::other("test"));

        assert_ne!(bind.exit_code(), runtime.exit_code());
    }

    #[test]
    fn address_in_use_has_suggestion() {
        let error = ServerError::bind(
            "127.0.0.1:8001",
            io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        );

        assert!(error.suggestion().is_some_and(|s| s.contains("already in use")));
        assert!(error.to_string().contains("127.0.0.1:8001"));
    }
}

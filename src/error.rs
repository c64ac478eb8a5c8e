//! Contains the `Error` and `Result` types used throughout the topology core.

use thiserror::Error;

/// The result type returned by fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur while operating on a topology.
///
/// Errors reported here are deliberately narrow: the transition table and the selection engine
/// are both infallible by construction (they always mutate toward a valid state, or return an
/// empty result). The only operations that can fail are the ones at the edges of the core: parsing
/// an address supplied by a caller, and recording a handshake failure reported by a caller.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An address string could not be parsed into a [`crate::ServerAddress`].
    #[error("invalid server address {address:?}: {message}")]
    InvalidAddress {
        /// The address string that failed to parse.
        address: String,
        /// A human-readable description of why it was rejected.
        message: String,
    },

    /// A handshake failed on the caller's side (network error, timeout, auth failure, etc.).
    ///
    /// The core does not interpret the cause; it treats any such error as equivalent to the
    /// server becoming [`crate::ServerType::Unknown`].
    #[error("handshake with {address} failed: {message}")]
    HandshakeFailed {
        /// The address of the server the handshake was attempted against.
        address: String,
        /// A human-readable description of the failure, supplied by the caller.
        message: String,
    },
}

impl Error {
    pub(crate) fn invalid_address(address: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidAddress {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Constructs a handshake-failure error with the given address and reason.
    ///
    /// Callers pass this into [`crate::ServerDescription::apply_handshake`] (as the `error`
    /// argument) to report a failed network round trip; the core records it on the description
    /// without inspecting it further.
    pub fn handshake_failed(address: impl Into<String>, message: impl Into<String>) -> Self {
        Error::HandshakeFailed {
            address: address.into(),
            message: message.into(),
        }
    }
}

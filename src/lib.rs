#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::cast_possible_truncation)]
#![warn(clippy::cast_possible_wrap)]

//! A Server Discovery and Monitoring (SDAM) topology core: the state machine and
//! server-selection engine at the heart of a distributed database client library.
//!
//! This crate tracks the live shape of a deployment (standalone node, replica set, or sharded
//! cluster) as handshake results arrive, and exposes [`TopologyDescription::select`] to pick a
//! server suitable for a given operation and read preference. It does not perform any network
//! I/O itself: a caller feeds it handshake results via [`TopologyDescription::handle_handshake`]
//! and serializes all access behind its own mutex. See the crate's `SPEC_FULL.md` in the
//! repository root for the full contract.

pub mod address;
pub mod error;
pub mod event;
pub mod handshake;
mod sdam;
pub mod selection_criteria;

pub use address::ServerAddress;
pub use error::{Error, Result};
pub use event::{NoopObserver, TopologyObserver};
pub use handshake::{HandshakeReply, HandshakeResponse, TagSet};
pub use sdam::{
    OperationType, ServerDescription, ServerId, ServerType, TopologyDescription, TopologyOptions,
    TopologyType,
};
pub use selection_criteria::ReadPreference;

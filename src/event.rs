//! The observer interface through which a topology reports membership changes.
//!
//! Modeled on the teacher's `SdamEventHandler`: a `Send + Sync` trait with no-op default methods,
//! so callers only override the notifications they care about. Unlike the teacher's full SDAM
//! event stream (description-changed, heartbeat started/succeeded/failed, topology opened/closed,
//! …), this core only fires the two events `SPEC_FULL.md` §5 names: a server joining or leaving the
//! tracked set. Invocations happen synchronously, inline with the transition that triggered them;
//! implementations must not block or call back into the topology.

use crate::{address::ServerAddress, sdam::id::ServerId};

/// Observes server membership changes in a [`crate::TopologyDescription`].
///
/// Methods are called synchronously from inside the transition that triggers them. Implementations
/// must return promptly and must not call back into the topology that invoked them.
pub trait TopologyObserver: Send + Sync {
    /// Called when a server is added to the topology for the first time.
    fn on_add(&self, _id: ServerId, _address: &ServerAddress) {}

    /// Called when a server is permanently removed from the topology.
    fn on_remove(&self, _id: ServerId, _address: &ServerAddress) {}
}

/// The observer used when no caller-supplied one is given: observes nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl TopologyObserver for NoopObserver {}

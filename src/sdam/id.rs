//! The opaque server id and the ordered collection keyed by it.
//!
//! Unlike the teacher's generation-tagged `IdSet` (which recycles freed slots so ids can repeat),
//! ids here are handed out from a strictly monotone counter and never reused — `SPEC_FULL.md` §3
//! invariant 6 requires it, since a stale id from a removed server must never be mistaken for a
//! server added later.

use std::collections::BTreeMap;

use crate::sdam::server::ServerDescription;

/// A server id, unique and stable for the lifetime of the [`crate::TopologyDescription`] that
/// issued it.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ServerId(u32);

/// An ordered collection of [`ServerDescription`]s keyed by [`ServerId`].
///
/// Backed by a `BTreeMap` so that iteration order follows id order (and therefore insertion
/// order), and so that removing the element currently being visited during a `retain`/`for`-style
/// pass is safe, which several transition functions rely on (e.g. demoting every other primary
/// while processing a new one).
#[derive(Clone, Debug, Default)]
pub struct ServerSet {
    servers: BTreeMap<ServerId, ServerDescription>,
    next_id: u32,
}

impl ServerSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh id and inserts `description` under it.
    pub(crate) fn insert(&mut self, description: ServerDescription) -> ServerId {
        let id = ServerId(self.next_id);
        self.next_id += 1;
        self.servers.insert(id, description);
        id
    }

    pub(crate) fn remove(&mut self, id: ServerId) -> Option<ServerDescription> {
        self.servers.remove(&id)
    }

    /// Finds the id of the server with the given address, if any is currently tracked.
    pub(crate) fn id_of(&self, address: &crate::address::ServerAddress) -> Option<ServerId> {
        self.servers
            .iter()
            .find(|(_, sd)| &sd.address == address)
            .map(|(id, _)| *id)
    }

    pub(crate) fn get(&self, id: ServerId) -> Option<&ServerDescription> {
        self.servers.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ServerId) -> Option<&mut ServerDescription> {
        self.servers.get_mut(&id)
    }

    pub(crate) fn contains_address(&self, address: &crate::address::ServerAddress) -> bool {
        self.servers.values().any(|sd| &sd.address == address)
    }

    pub(crate) fn len(&self) -> usize {
        self.servers.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (ServerId, &ServerDescription)> {
        self.servers.iter().map(|(id, sd)| (*id, sd))
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &ServerDescription> {
        self.servers.values()
    }

    /// Returns the ids of every server currently tracked, as a standalone snapshot.
    ///
    /// Transitions that mutate the set while conceptually "iterating over every member" (e.g.
    /// `upd_rs_p`'s primary-demotion and roster-pruning passes) collect this snapshot first so the
    /// mutation doesn't invalidate the iteration, the same pattern the teacher uses when it
    /// collects `self.servers.keys().cloned().collect()` before looping.
    pub(crate) fn ids(&self) -> Vec<ServerId> {
        self.servers.keys().copied().collect()
    }
}

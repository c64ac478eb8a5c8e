//! [`TopologyType`], [`TopologyDescription`], and the transition table that drives them.

use std::sync::Arc;

use derive_more::Display;
use tracing::{debug, trace};

use crate::{
    address::ServerAddress,
    event::{NoopObserver, TopologyObserver},
    sdam::{
        id::{ServerId, ServerSet},
        options::TopologyOptions,
        server::{ServerDescription, ServerType},
    },
};

/// The overall shape a topology can be in.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[non_exhaustive]
pub enum TopologyType {
    /// A single, non-replica-set node. Terminal: a topology never transitions away from it.
    Single,
    /// A sharded cluster, fronted by one or more routers.
    Sharded,
    /// A replica set with no member currently known to be primary.
    RsNoPrimary,
    /// A replica set with a known primary.
    RsWithPrimary,
    /// Not yet classified; the starting state unless the caller pins one up front.
    Unknown,
}

/// The live, in-memory model of a deployment, derived from handshake results.
///
/// All public operations require the caller to hold an external mutex; see `SPEC_FULL.md` §5 for
/// the full concurrency contract. The core performs no locking of its own.
pub struct TopologyDescription {
    topology_type: TopologyType,
    set_name: Option<String>,
    compatible: bool,
    compatibility_error: Option<String>,
    servers: ServerSet,
    local_threshold_ms: u64,
    observer: Arc<dyn TopologyObserver>,
}

impl std::fmt::Debug for TopologyDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopologyDescription")
            .field("topology_type", &self.topology_type)
            .field("set_name", &self.set_name)
            .field("compatible", &self.compatible)
            .field("compatibility_error", &self.compatibility_error)
            .field("servers", &self.servers)
            .field("local_threshold_ms", &self.local_threshold_ms)
            .finish()
    }
}

impl TopologyDescription {
    /// Creates a topology per `options`, seeding it with `Unknown` descriptions for every address
    /// in `options.seeds` (`topology_init` in `SPEC_FULL.md` §6, with no observer attached).
    pub fn new(options: TopologyOptions) -> Self {
        Self::with_observer(options, Arc::new(NoopObserver))
    }

    /// Like [`TopologyDescription::new`], but registers `observer` to be notified of membership
    /// changes as they happen.
    pub fn with_observer(options: TopologyOptions, observer: Arc<dyn TopologyObserver>) -> Self {
        let mut topology = Self {
            topology_type: options.initial_type,
            set_name: options.set_name,
            compatible: true,
            compatibility_error: None,
            servers: ServerSet::new(),
            local_threshold_ms: options.local_threshold_ms,
            observer,
        };

        for address in options.seeds {
            topology.add_server(address);
        }

        debug!(topology_type = %topology.topology_type, "topology initialized");
        topology
    }

    /// The topology's current shape.
    pub fn topology_type(&self) -> TopologyType {
        self.topology_type
    }

    /// The replica-set name this topology has adopted, if any.
    pub fn set_name(&self) -> Option<&str> {
        self.set_name.as_deref()
    }

    /// Whether every currently tracked server is wire-version compatible with this crate.
    pub fn compatible(&self) -> bool {
        self.compatible
    }

    /// The reason `compatible()` is false, if it is.
    pub fn compatibility_error(&self) -> Option<&str> {
        self.compatibility_error.as_deref()
    }

    /// The latency window, in milliseconds, used by server selection.
    pub fn local_threshold_ms(&self) -> u64 {
        self.local_threshold_ms
    }

    pub(crate) fn servers(&self) -> &ServerSet {
        &self.servers
    }

    /// Returns the description for `id`, if it is still tracked.
    pub fn server_by_id(&self, id: ServerId) -> Option<&ServerDescription> {
        self.servers.get(id)
    }

    /// Ensures `address` is tracked, returning its id.
    ///
    /// Idempotent: calling this again for an address already present returns the existing id
    /// without creating a new description or notifying the observer (`SPEC_FULL.md` §8 property
    /// 2).
    pub fn add_server(&mut self, address: ServerAddress) -> ServerId {
        if let Some(id) = self.servers.id_of(&address) {
            return id;
        }

        let id = self.servers.insert(ServerDescription::new(address.clone()));
        trace!(%address, "server added");
        self.observer.on_add(id, &address);
        id
    }

    fn remove_server(&mut self, id: ServerId) {
        if let Some(sd) = self.servers.remove(id) {
            trace!(address = %sd.address, "server removed");
            self.observer.on_remove(id, &sd.address);
        }
    }

    fn recompute_compatibility(&mut self) {
        for sd in self.servers.values() {
            if let Some(message) = sd.compatibility_error() {
                self.compatible = false;
                self.compatibility_error = Some(message);
                return;
            }
        }
        self.compatible = true;
        self.compatibility_error = None;
    }

    fn set_topology_type(&mut self, topology_type: TopologyType) {
        if self.topology_type != topology_type {
            debug!(from = %self.topology_type, to = %topology_type, "topology type changed");
        }
        self.topology_type = topology_type;
    }

    fn has_primary(&self) -> bool {
        self.servers.values().any(|sd| sd.server_type.is_primary())
    }

    /// Runs the handshake pipeline of `SPEC_FULL.md` §4.4: applies the observed result to the
    /// server's description, then dispatches the transition table entry for its new
    /// `(server_type, topology_type)` pair. Returns `false` (a no-op) if `address` is not tracked.
    pub fn handle_handshake(
        &mut self,
        address: &ServerAddress,
        response: Option<crate::handshake::HandshakeResponse>,
        rtt_ms: Option<u64>,
        error: Option<crate::error::Error>,
    ) -> bool {
        let id = match self.servers.id_of(address) {
            Some(id) => id,
            None => return false,
        };

        if let Some(sd) = self.servers.get_mut(id) {
            sd.apply_handshake(response, rtt_ms, error);
        }
        self.recompute_compatibility();

        self.dispatch_transition(id);
        true
    }

    /// Marks the server at `id` `Unknown`, as if its most recent handshake attempt had failed with
    /// no response (`SPEC_FULL.md` §6, `topology_invalidate_server`).
    pub fn invalidate_server(&mut self, id: ServerId) {
        let address = match self.servers.get(id) {
            Some(sd) => sd.address.clone(),
            None => return,
        };
        self.handle_handshake(&address, None, None, None);
    }

    fn dispatch_transition(&mut self, id: ServerId) {
        let server_type = match self.servers.get(id) {
            Some(sd) => sd.server_type,
            None => return,
        };

        use ServerType::*;
        use TopologyType::*;

        match (server_type, self.topology_type) {
            (Unknown, RsWithPrimary) => self.check_if_primary(),
            (Unknown, _) => {}

            (Standalone, Unknown) => self.upd_std(id),
            (Standalone, Sharded) | (Standalone, RsNoPrimary) => self.remove(id),
            (Standalone, RsWithPrimary) => self.remove_and_check(id),
            (Standalone, Single) => {}

            (Mongos, Unknown) => self.set_sharded(),
            (Mongos, RsNoPrimary) => self.remove(id),
            (Mongos, RsWithPrimary) => self.remove_and_check(id),
            (Mongos, Sharded) | (Mongos, Single) => {}

            (PossiblePrimary, _) => {}

            (RsPrimary, Unknown) | (RsPrimary, RsNoPrimary) | (RsPrimary, RsWithPrimary) => {
                self.upd_rs_p(id)
            }
            (RsPrimary, Sharded) => self.remove(id),
            (RsPrimary, Single) => {}

            (RsSecondary, Unknown) => self.to_rs_np(id),
            (RsSecondary, Sharded) => self.remove(id),
            (RsSecondary, RsNoPrimary) => self.upd_rs_wop(id),
            (RsSecondary, RsWithPrimary) => self.upd_rs_from_member(id),
            (RsSecondary, Single) => {}

            (RsArbiter, Unknown) => self.to_rs_np(id),
            (RsArbiter, Sharded) => self.remove(id),
            (RsArbiter, RsNoPrimary) => self.upd_rs_wop(id),
            (RsArbiter, RsWithPrimary) => self.upd_rs_from_member(id),
            (RsArbiter, Single) => {}

            (RsOther, Unknown) => self.to_rs_np(id),
            (RsOther, Sharded) => self.remove(id),
            (RsOther, RsNoPrimary) => self.upd_rs_wop(id),
            (RsOther, RsWithPrimary) => self.upd_rs_from_member(id),
            (RsOther, Single) => {}

            (RsGhost, Sharded) => self.remove(id),
            (RsGhost, RsWithPrimary) => self.check_if_primary(),
            (RsGhost, Unknown) | (RsGhost, RsNoPrimary) | (RsGhost, Single) => {}
        }
    }

    /// If this is the only server the topology knows about, collapses to `Single` around it.
    /// Otherwise a standalone has no business in a multi-seed deployment, so it alone is removed
    /// and monitoring of it stops; see `DESIGN.md` for why this (and not the scenario text
    /// shipped alongside it) is the contract this follows.
    fn upd_std(&mut self, id: ServerId) {
        if self.servers.len() > 1 {
            self.remove_server(id);
        } else {
            self.set_topology_type(TopologyType::Single);
        }
    }

    fn remove(&mut self, id: ServerId) {
        self.remove_server(id);
    }

    fn remove_and_check(&mut self, id: ServerId) {
        self.remove_server(id);
        self.check_if_primary();
    }

    fn check_if_primary(&mut self) {
        if self.has_primary() {
            self.set_topology_type(TopologyType::RsWithPrimary);
        } else {
            self.set_topology_type(TopologyType::RsNoPrimary);
        }
    }

    fn set_sharded(&mut self) {
        self.set_topology_type(TopologyType::Sharded);
    }

    fn to_rs_np(&mut self, id: ServerId) {
        self.set_topology_type(TopologyType::RsNoPrimary);
        self.upd_rs_wop(id);
    }

    /// Adds every address in `sd`'s rosters that isn't already tracked, as a new `Unknown` server.
    fn add_new_servers(&mut self, sd_id: ServerId) {
        let addresses: Vec<String> = match self.servers.get(sd_id) {
            Some(sd) => sd.known_hosts().map(str::to_owned).collect(),
            None => return,
        };

        for address in addresses {
            if let Ok(address) = ServerAddress::parse(&address) {
                if !self.servers.contains_address(&address) {
                    self.add_server(address);
                }
            }
        }
    }

    fn mark_possible_primary(&mut self, address: &str) {
        let address = match ServerAddress::parse(address) {
            Ok(address) => address,
            Err(_) => return,
        };
        if let Some(id) = self.servers.id_of(&address) {
            if let Some(sd) = self.servers.get_mut(id) {
                if sd.server_type == ServerType::Unknown {
                    sd.set_server_type(ServerType::PossiblePrimary);
                }
            }
        }
    }

    fn upd_rs_wop(&mut self, id: ServerId) {
        let (reported_set_name, current_primary) = match self.servers.get(id) {
            Some(sd) => (sd.set_name().map(str::to_owned), sd.current_primary().map(str::to_owned)),
            None => return,
        };

        if let Some(reported_set_name) = reported_set_name {
            match &self.set_name {
                None => self.set_name = Some(reported_set_name),
                Some(existing) if existing != &reported_set_name => {
                    self.remove_server(id);
                    return;
                }
                _ => {}
            }
        }

        self.add_new_servers(id);

        if let Some(primary) = current_primary {
            self.mark_possible_primary(&primary);
        }
    }

    fn upd_rs_from_member(&mut self, id: ServerId) {
        let (reported_set_name, current_primary) = match self.servers.get(id) {
            Some(sd) => (sd.set_name().map(str::to_owned), sd.current_primary().map(str::to_owned)),
            None => return,
        };

        if let Some(reported_set_name) = &reported_set_name {
            if self.set_name.as_deref() != Some(reported_set_name.as_str()) && self.set_name.is_some() {
                self.remove_server(id);
                return;
            }
        }

        if !self.has_primary() {
            if let Some(primary) = current_primary {
                self.set_topology_type(TopologyType::RsNoPrimary);
                self.mark_possible_primary(&primary);
            }
        }
    }

    fn upd_rs_p(&mut self, id: ServerId) {
        let (reported_set_name, rosters): (Option<String>, Vec<String>) = match self.servers.get(id) {
            Some(sd) => (
                sd.set_name().map(str::to_owned),
                sd.known_hosts().map(str::to_owned).collect(),
            ),
            None => return,
        };

        // Step 1: adopt or verify the set name; a rogue primary is rejected outright, before any
        // roster reconciliation runs.
        match (&self.set_name, &reported_set_name) {
            (None, Some(reported)) => self.set_name = Some(reported.clone()),
            (Some(existing), Some(reported)) if existing != reported => {
                self.remove_server(id);
                self.check_if_primary();
                return;
            }
            _ => {}
        }

        // Step 2: demote every other server currently claiming to be primary.
        for other_id in self.servers.ids() {
            if other_id == id {
                continue;
            }
            if let Some(sd) = self.servers.get_mut(other_id) {
                if sd.server_type.is_primary() {
                    sd.set_server_type(ServerType::Unknown);
                }
            }
        }

        // Step 3: add anything in the primary's rosters we don't already track.
        let roster_addresses: Vec<ServerAddress> = rosters
            .iter()
            .filter_map(|address| ServerAddress::parse(address).ok())
            .collect();
        for address in &roster_addresses {
            if !self.servers.contains_address(address) {
                self.add_server(address.clone());
            }
        }

        // Step 4: remove anything we track that isn't the primary and isn't in its rosters.
        let primary_address = self.servers.get(id).map(|sd| sd.address.clone());
        let stale_ids: Vec<ServerId> = self
            .servers
            .iter()
            .filter(|(other_id, sd)| {
                *other_id != id
                    && Some(&sd.address) != primary_address.as_ref()
                    && !roster_addresses.contains(&sd.address)
            })
            .map(|(other_id, _)| other_id)
            .collect();
        for stale_id in stale_ids {
            self.remove_server(stale_id);
        }

        // Step 5.
        self.set_topology_type(TopologyType::RsWithPrimary);
    }
}

//! The [`SelectionEngine`]: filters and picks a server suitable for an operation.

use rand::seq::IteratorRandom;

use crate::{
    sdam::{
        server::{ServerDescription, ServerType},
        topology::{TopologyDescription, TopologyType},
    },
    selection_criteria::{filter_servers_by_tag_sets, ReadPreference},
};

/// Whether an operation reads or writes; only relevant to server selection (writes always target
/// the primary, when one exists).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperationType {
    /// A read, subject to the full read-preference dispatch of `SPEC_FULL.md` §4.5.
    Read,
    /// A write; routed straight to the primary when the topology has one.
    Write,
}

impl TopologyDescription {
    /// Returns every server currently suitable for `optype`/`read_pref`, after applying the
    /// latency window. Does not consult [`TopologyDescription::compatible`]; see
    /// [`TopologyDescription::select`] for the operation that does.
    pub fn suitable_servers(
        &self,
        optype: OperationType,
        read_pref: &ReadPreference,
    ) -> Vec<&ServerDescription> {
        if let TopologyType::Single = self.topology_type() {
            return self
                .servers()
                .values()
                .filter(|sd| sd.server_type == ServerType::Standalone)
                .collect();
        }

        let mut candidates = self.suitable_servers_for(optype, read_pref);

        self.retain_within_latency_window(&mut candidates);

        candidates
    }

    fn servers_with_type(&self, types: &[ServerType]) -> Vec<&ServerDescription> {
        self.servers()
            .values()
            .filter(|sd| types.contains(&sd.server_type))
            .collect()
    }

    fn suitable_servers_for(
        &self,
        optype: OperationType,
        read_pref: &ReadPreference,
    ) -> Vec<&ServerDescription> {
        match self.topology_type() {
            TopologyType::Unknown => Vec::new(),
            TopologyType::Single => self.servers().values().collect(),
            TopologyType::Sharded => self.servers_with_type(&[ServerType::Mongos]),
            TopologyType::RsWithPrimary | TopologyType::RsNoPrimary => {
                if optype == OperationType::Write && self.topology_type() == TopologyType::RsWithPrimary {
                    return self.servers_with_type(&[ServerType::RsPrimary]);
                }
                self.suitable_servers_in_replica_set(read_pref)
            }
        }
    }

    fn suitable_servers_in_replica_set(&self, read_pref: &ReadPreference) -> Vec<&ServerDescription> {
        let candidate_types: &[ServerType] = match read_pref {
            ReadPreference::Primary => &[ServerType::RsPrimary, ServerType::PossiblePrimary],
            ReadPreference::Secondary { .. } => &[ServerType::RsSecondary],
            ReadPreference::PrimaryPreferred { .. }
            | ReadPreference::SecondaryPreferred { .. }
            | ReadPreference::Nearest { .. } => &[
                ServerType::RsPrimary,
                ServerType::PossiblePrimary,
                ServerType::RsSecondary,
            ],
        };

        let mut candidates = self.servers_with_type(candidate_types);

        if let ReadPreference::PrimaryPreferred { .. } = read_pref {
            if let Some(primary) = candidates.iter().find(|sd| sd.server_type.is_primary()) {
                return vec![*primary];
            }
        }

        filter_servers_by_tag_sets(&mut candidates, read_pref.tag_sets());

        match read_pref {
            ReadPreference::Secondary { .. } => {
                candidates.retain(|sd| !sd.server_type.is_primary());
                candidates
            }
            ReadPreference::SecondaryPreferred { .. } => {
                let has_secondary = candidates.iter().any(|sd| !sd.server_type.is_primary());
                if has_secondary {
                    candidates.retain(|sd| !sd.server_type.is_primary());
                    candidates
                } else {
                    // Fall back to the primary regardless of whether it matched the tag filter:
                    // unlike secondaries, a primary counts for SecondaryPreferred on availability
                    // alone.
                    self.servers_with_type(&[ServerType::RsPrimary])
                }
            }
            _ => candidates,
        }
    }

    fn retain_within_latency_window<'a>(&self, candidates: &mut Vec<&'a ServerDescription>) {
        let shortest_rtt = candidates
            .iter()
            .filter_map(|sd| sd.round_trip_time_ms)
            .min();

        let threshold = self.local_threshold_ms();

        candidates.retain(|sd| match (sd.round_trip_time_ms, shortest_rtt) {
            (Some(rtt), Some(shortest)) => rtt <= shortest + threshold,
            _ => false,
        });
    }

    /// Picks one server suitable for `optype`/`read_pref`, chosen uniformly at random among the
    /// candidates `suitable_servers` returns. Returns `None` if the topology is currently
    /// incompatible or no candidate survives.
    ///
    /// Never retries or sleeps: a caller that wants to wait for a suitable server to appear wraps
    /// this in its own timeout loop, re-reading the topology between attempts.
    pub fn select(
        &self,
        optype: OperationType,
        read_pref: &ReadPreference,
    ) -> Option<&ServerDescription> {
        if !self.compatible() {
            return None;
        }

        let candidates = self.suitable_servers(optype, read_pref);
        candidates.into_iter().choose(&mut rand::rng())
    }
}

#[cfg(test)]
mod test;

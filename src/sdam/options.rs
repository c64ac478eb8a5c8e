//! Configuration surface for constructing a [`crate::TopologyDescription`].

use crate::{address::ServerAddress, sdam::topology::TopologyType};

/// The options used to initialize a topology, per `SPEC_FULL.md` §4.7.
///
/// This is not a connection-string parser: it's the already-validated, already-parsed
/// configuration a caller builds up (however they obtain it) and hands to
/// [`crate::TopologyDescription::new`]. Parsing a URI into one of these is explicitly out of
/// scope for this core.
#[derive(Clone, Debug)]
pub struct TopologyOptions {
    /// The initial seed list of addresses to track.
    pub seeds: Vec<ServerAddress>,

    /// The topology type to start in.
    ///
    /// Defaults to [`TopologyType::Unknown`], the correct choice unless the caller already knows
    /// (e.g. from a previously parsed connection string) that it's looking at a single server or a
    /// replica set with a fixed membership.
    pub initial_type: TopologyType,

    /// The replica-set name, if the caller already knows it.
    ///
    /// Required when `initial_type` is [`TopologyType::RsNoPrimary`] or
    /// [`TopologyType::RsWithPrimary`]; ignored otherwise.
    pub set_name: Option<String>,

    /// The latency window used by server selection, in milliseconds.
    pub local_threshold_ms: u64,
}

impl TopologyOptions {
    /// The default latency window, in milliseconds, matching common driver defaults.
    pub const DEFAULT_LOCAL_THRESHOLD_MS: u64 = 15;

    /// Builds options for a single, unclassified seed list. `initial_type` starts `Unknown`,
    /// `set_name` is `None`, and `local_threshold_ms` is
    /// [`TopologyOptions::DEFAULT_LOCAL_THRESHOLD_MS`].
    pub fn new(seeds: Vec<ServerAddress>) -> Self {
        Self {
            seeds,
            initial_type: TopologyType::Unknown,
            set_name: None,
            local_threshold_ms: Self::DEFAULT_LOCAL_THRESHOLD_MS,
        }
    }

    /// Sets the initial topology type.
    pub fn with_initial_type(mut self, initial_type: TopologyType) -> Self {
        self.initial_type = initial_type;
        self
    }

    /// Sets the expected replica-set name.
    pub fn with_set_name(mut self, set_name: impl Into<String>) -> Self {
        self.set_name = Some(set_name.into());
        self
    }

    /// Sets the latency window used by server selection, in milliseconds.
    pub fn with_local_threshold_ms(mut self, local_threshold_ms: u64) -> Self {
        self.local_threshold_ms = local_threshold_ms;
        self
    }
}

//! [`ServerDescription`] and [`ServerType`]: the immutable-by-replacement snapshot of one server.

use derive_more::Display;

use crate::{
    address::ServerAddress,
    error::{Error, Result},
    handshake::{HandshakeReply, HandshakeResponse, TagSet},
};

const DRIVER_MIN_WIRE_VERSION: i32 = 6;
const DRIVER_MAX_WIRE_VERSION: i32 = 21;

/// The possible kinds of server a topology can observe.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Default)]
#[non_exhaustive]
pub enum ServerType {
    /// A single, non-replica-set node.
    Standalone,
    /// A router in a sharded deployment.
    Mongos,
    /// An address another replica-set member claims is primary, not yet itself contacted.
    PossiblePrimary,
    /// The primary node in a replica set.
    RsPrimary,
    /// A secondary node in a replica set.
    RsSecondary,
    /// A non-data-bearing, voting-only member of a replica set.
    RsArbiter,
    /// A replica-set member that is none of primary, secondary, or arbiter (hidden, starting up,
    /// recovering).
    RsOther,
    /// A member of an as-yet-uninitialized replica set, or one removed from its config.
    RsGhost,
    /// A server the topology hasn't yet completed a handshake with, or can't reach.
    #[default]
    Unknown,
}

impl ServerType {
    pub(crate) fn is_primary(self) -> bool {
        matches!(self, ServerType::RsPrimary)
    }
}

/// An up-to-date snapshot of a single server, as last reported by a handshake.
///
/// Replaced wholesale on every handshake rather than mutated field-by-field from the outside;
/// `apply_handshake` is the only way to update one in place, matching the "immutable-by-replacement"
/// semantics `SPEC_FULL.md` §3 describes.
#[derive(Clone, Debug)]
pub struct ServerDescription {
    /// The address of this server. Stable for the life of the description.
    pub address: ServerAddress,

    /// The type of this server, as derived from its last handshake.
    pub server_type: ServerType,

    /// The last observed round-trip time of a successful handshake, in milliseconds.
    pub round_trip_time_ms: Option<u64>,

    /// The result of the most recent handshake: `Ok(Some(reply))` on success, `Ok(None)` if no
    /// handshake has completed yet, `Err(_)` if the most recent attempt failed.
    ///
    /// Storing a `Result` directly (rather than separate `Option<HandshakeReply>` and
    /// `Option<Error>` fields) makes the "exactly one of reply-or-error, or neither yet" invariant
    /// structural instead of something every caller has to maintain by convention — the same
    /// reasoning the teacher's `ServerDescription::reply` field is built on.
    pub reply: Result<Option<HandshakeReply>>,
}

impl ServerDescription {
    /// Constructs a new, not-yet-contacted description for `address`.
    pub(crate) fn new(address: ServerAddress) -> Self {
        Self {
            address,
            server_type: ServerType::Unknown,
            round_trip_time_ms: None,
            reply: Ok(None),
        }
    }

    /// Applies the outcome of a handshake attempt, per `SPEC_FULL.md` §4.1.
    ///
    /// On success, `kind` is re-derived from the response and the rosters/rtt are updated. On
    /// failure (`error.is_some()`) or when no response was obtained, the description reverts to
    /// `Unknown` with cleared rosters and rtt, exactly as if the server had never been contacted.
    pub(crate) fn apply_handshake(
        &mut self,
        response: Option<HandshakeResponse>,
        rtt_ms: Option<u64>,
        error: Option<Error>,
    ) {
        if let Some(error) = error {
            self.server_type = ServerType::Unknown;
            self.round_trip_time_ms = None;
            self.reply = Err(error);
            return;
        }

        match response {
            Some(response) => {
                self.server_type = response.server_type();
                self.round_trip_time_ms = rtt_ms;
                self.reply = Ok(Some(HandshakeReply {
                    response,
                    rtt_ms: rtt_ms.unwrap_or(0),
                }));
            }
            None => {
                self.server_type = ServerType::Unknown;
                self.round_trip_time_ms = None;
                self.reply = Ok(None);
            }
        }
    }

    /// Low-level kind override, used by transitions that relabel a member without a new handshake
    /// (e.g. marking an address `PossiblePrimary` on another member's say-so).
    pub(crate) fn set_server_type(&mut self, server_type: ServerType) {
        self.server_type = server_type;
    }

    /// True if `address` appears in this server's `hosts ∪ passives ∪ arbiters` rosters.
    pub(crate) fn has_rs_member(&self, address: &str) -> bool {
        self.known_hosts().any(|h| h.eq_ignore_ascii_case(address))
    }

    pub(crate) fn set_name(&self) -> Option<&str> {
        self.reply
            .as_ref()
            .ok()?
            .as_ref()?
            .response
            .set_name
            .as_deref()
    }

    pub(crate) fn current_primary(&self) -> Option<&str> {
        self.reply
            .as_ref()
            .ok()?
            .as_ref()?
            .response
            .primary
            .as_deref()
    }

    pub(crate) fn known_hosts(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self.reply.as_ref() {
            Ok(Some(reply)) => Box::new(reply.response.known_hosts()),
            _ => Box::new(std::iter::empty()),
        }
    }

    pub(crate) fn tags(&self) -> Option<&TagSet> {
        self.reply.as_ref().ok()?.as_ref()?.response.tags.as_ref()
    }

    /// Whether this server's advertised wire-version range is compatible with the one this crate
    /// supports. Mirrors the teacher's `ServerDescription::compatibility_error_message`; see the
    /// Open Questions note in `SPEC_FULL.md` §9 about the core owning this check directly.
    pub(crate) fn compatibility_error(&self) -> Option<String> {
        let reply = match self.reply.as_ref() {
            Ok(Some(reply)) => reply,
            _ => return None,
        };

        let min_wire_version = reply.response.min_wire_version.unwrap_or(0);
        if min_wire_version > DRIVER_MAX_WIRE_VERSION {
            return Some(format!(
                "server at {} requires wire version {}, but this driver only supports up to {}",
                self.address, min_wire_version, DRIVER_MAX_WIRE_VERSION,
            ));
        }

        let max_wire_version = reply.response.max_wire_version.unwrap_or(0);
        if max_wire_version < DRIVER_MIN_WIRE_VERSION {
            return Some(format!(
                "server at {} reports wire version {}, but this driver requires at least {}",
                self.address, max_wire_version, DRIVER_MIN_WIRE_VERSION,
            ));
        }

        None
    }

    /// Whether a candidate's tags satisfy `tag_set` (every key in `tag_set` must be present on
    /// the server with a matching value); mirrors the teacher's `matches_tag_set`.
    pub(crate) fn matches_tag_set(&self, tag_set: &TagSet) -> bool {
        let server_tags = match self.tags() {
            Some(tags) => tags,
            None => return false,
        };

        tag_set
            .iter()
            .all(|(key, val)| server_tags.get(key) == Some(val))
    }
}

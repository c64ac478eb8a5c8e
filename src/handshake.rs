//! The shape of a parsed handshake ("ismaster"/"hello") response.
//!
//! Actually issuing the handshake and decoding it off the wire is out of scope for this core (see
//! `SPEC_FULL.md` §6); a collaborator elsewhere in the driver is responsible for producing a
//! [`HandshakeResponse`] from bytes on the network. This module only defines the data shape that
//! collaborator hands us, plus the small amount of classification logic that's part of the SDAM
//! algorithm itself (deriving a [`crate::ServerType`] from the response fields).

use std::collections::HashMap;

use crate::sdam::server::ServerType;

/// A read-preference tag set: an ordered set of key/value pairs a server can be tagged with.
pub type TagSet = HashMap<String, String>;

const ISDBGRID_MSG: &str = "isdbgrid";

/// The fields of an "ismaster"/"hello" command response that the topology core consults.
///
/// This mirrors the subset of `IsMasterCommandResponse`/`HelloCommandResponse` fields the teacher
/// driver's SDAM layer actually reads; it omits everything related to wire encoding, sessions, and
/// cluster time bookkeeping, which are out of scope here.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandshakeResponse {
    /// `ismaster`/`isWritablePrimary`: true if the server believes it is the replica-set primary.
    pub is_master: Option<bool>,
    /// `secondary`: true if the server is a replica-set secondary.
    pub secondary: Option<bool>,
    /// `arbiterOnly`: true if the server is a non-data-bearing arbiter.
    pub arbiter_only: Option<bool>,
    /// `isreplicaset`: true if the server belongs to an as-yet-uninitialized replica set.
    pub is_replica_set: Option<bool>,
    /// `msg`: set to `"isdbgrid"` by a mongos router.
    pub msg: Option<String>,
    /// `setName`: the replica-set name this server claims membership in.
    pub set_name: Option<String>,
    /// `hosts`: the data-bearing voting members this server's config lists.
    pub hosts: Vec<String>,
    /// `passives`: the non-voting, non-hidden members this server's config lists.
    pub passives: Vec<String>,
    /// `arbiters`: the arbiter members this server's config lists.
    pub arbiters: Vec<String>,
    /// `primary`: the address this server believes is currently the primary, if any.
    pub primary: Option<String>,
    /// `minWireVersion`: the lowest wire protocol version this server will speak.
    pub min_wire_version: Option<i32>,
    /// `maxWireVersion`: the highest wire protocol version this server will speak.
    pub max_wire_version: Option<i32>,
    /// `tags`: the read-preference tags this server has been configured with.
    pub tags: Option<TagSet>,
}

impl HandshakeResponse {
    /// Derives the [`ServerType`] implied by this response, per the standard SDAM classification
    /// table (`SPEC_FULL.md` §4.1).
    pub(crate) fn server_type(&self) -> ServerType {
        if self.is_replica_set == Some(true) {
            ServerType::RsGhost
        } else if self.msg.as_deref() == Some(ISDBGRID_MSG) {
            ServerType::Mongos
        } else if self.set_name.is_none() {
            ServerType::Standalone
        } else if self.is_master == Some(true) {
            ServerType::RsPrimary
        } else if self.secondary == Some(true) {
            ServerType::RsSecondary
        } else if self.arbiter_only == Some(true) {
            ServerType::RsArbiter
        } else {
            ServerType::RsOther
        }
    }

    pub(crate) fn known_hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts
            .iter()
            .chain(self.passives.iter())
            .chain(self.arbiters.iter())
            .map(String::as_str)
    }
}

/// A successfully completed handshake: the parsed response plus the measured round-trip time.
///
/// Kept as a wrapper distinct from `HandshakeResponse` (rather than folding `rtt` into the
/// response struct) the way the teacher's `HelloReply` separates the wire response from timing
/// metadata recorded by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct HandshakeReply {
    /// The parsed response fields.
    pub response: HandshakeResponse,
    /// The measured round-trip time of the handshake, in milliseconds.
    pub rtt_ms: u64,
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn classifies_standalone() {
        let response = HandshakeResponse::default();
        assert_eq!(response.server_type(), ServerType::Standalone);
    }

    #[test]
    fn classifies_mongos() {
        let response = HandshakeResponse {
            msg: Some("isdbgrid".to_string()),
            ..Default::default()
        };
        assert_eq!(response.server_type(), ServerType::Mongos);
    }

    #[test]
    fn classifies_rs_ghost() {
        let response = HandshakeResponse {
            is_replica_set: Some(true),
            ..Default::default()
        };
        assert_eq!(response.server_type(), ServerType::RsGhost);
    }

    #[test]
    fn classifies_rs_primary_secondary_and_arbiter() {
        let set_name = Some("rs0".to_string());

        let primary = HandshakeResponse {
            set_name: set_name.clone(),
            is_master: Some(true),
            ..Default::default()
        };
        assert_eq!(primary.server_type(), ServerType::RsPrimary);

        let secondary = HandshakeResponse {
            set_name: set_name.clone(),
            secondary: Some(true),
            ..Default::default()
        };
        assert_eq!(secondary.server_type(), ServerType::RsSecondary);

        let arbiter = HandshakeResponse {
            set_name: set_name.clone(),
            arbiter_only: Some(true),
            ..Default::default()
        };
        assert_eq!(arbiter.server_type(), ServerType::RsArbiter);

        let other = HandshakeResponse {
            set_name,
            ..Default::default()
        };
        assert_eq!(other.server_type(), ServerType::RsOther);
    }

    #[test]
    fn known_hosts_chains_all_three_rosters() {
        let response = HandshakeResponse {
            hosts: vec!["a:27017".to_string()],
            passives: vec!["b:27017".to_string()],
            arbiters: vec!["c:27017".to_string()],
            ..Default::default()
        };
        let hosts: Vec<&str> = response.known_hosts().collect();
        assert_eq!(hosts, vec!["a:27017", "b:27017", "c:27017"]);
    }
}

use std::collections::HashMap;

use pretty_assertions::assert_eq;

use crate::{
    address::ServerAddress,
    handshake::HandshakeResponse,
    sdam::{options::TopologyOptions, topology::TopologyDescription},
    selection_criteria::ReadPreference,
};

use super::OperationType;

fn addr(s: &str) -> ServerAddress {
    ServerAddress::parse(s).unwrap()
}

fn mongos_response() -> HandshakeResponse {
    HandshakeResponse {
        msg: Some("isdbgrid".to_string()),
        min_wire_version: Some(6),
        max_wire_version: Some(21),
        ..Default::default()
    }
}

#[test]
fn latency_window_keeps_only_nearby_servers() {
    let criteria = ReadPreference::nearest();

    let mut topology = TopologyDescription::new(
        TopologyOptions::new(vec![addr("m1:27017"), addr("m2:27017"), addr("m3:27017")])
            .with_local_threshold_ms(20),
    );
    topology.handle_handshake(&addr("m1:27017"), Some(mongos_response()), Some(15), None);
    topology.handle_handshake(&addr("m2:27017"), Some(mongos_response()), Some(30), None);
    topology.handle_handshake(&addr("m3:27017"), Some(mongos_response()), Some(90), None);

    let suitable = topology.suitable_servers(OperationType::Read, &criteria);
    let mut addresses: Vec<String> = suitable.iter().map(|sd| sd.address.to_string()).collect();
    addresses.sort();
    assert_eq!(addresses, vec!["m1:27017".to_string(), "m2:27017".to_string()]);

    let selected = topology.select(OperationType::Read, &criteria);
    assert!(selected.is_some());
    let selected_address = selected.unwrap().address.to_string();
    assert!(selected_address == "m1:27017" || selected_address == "m2:27017");
}

fn rs_secondary(set_name: &str, tags: Option<HashMap<String, String>>) -> HandshakeResponse {
    HandshakeResponse {
        set_name: Some(set_name.to_string()),
        secondary: Some(true),
        min_wire_version: Some(6),
        max_wire_version: Some(21),
        tags,
        ..Default::default()
    }
}

#[test]
fn tag_set_filtering_uses_first_matching_set() {
    let mut topology = TopologyDescription::new(
        TopologyOptions::new(vec![addr("a:27017"), addr("b:27017")])
            .with_set_name("rs0")
            .with_initial_type(crate::sdam::topology::TopologyType::RsNoPrimary),
    );

    let mut east_tags = HashMap::new();
    east_tags.insert("region".to_string(), "east".to_string());
    topology.handle_handshake(
        &addr("a:27017"),
        Some(rs_secondary("rs0", Some(east_tags))),
        Some(5),
        None,
    );

    let mut west_tags = HashMap::new();
    west_tags.insert("region".to_string(), "west".to_string());
    topology.handle_handshake(
        &addr("b:27017"),
        Some(rs_secondary("rs0", Some(west_tags))),
        Some(5),
        None,
    );

    let mut wanted = HashMap::new();
    wanted.insert("region".to_string(), "west".to_string());
    let criteria = ReadPreference::secondary().with_tags(vec![wanted]);

    let suitable = topology.suitable_servers(OperationType::Read, &criteria);
    assert_eq!(suitable.len(), 1);
    assert_eq!(suitable[0].address.to_string(), "b:27017");
}

#[test]
fn secondary_preferred_falls_back_to_primary_when_no_secondary_matches() {
    let mut topology = TopologyDescription::new(
        TopologyOptions::new(vec![addr("a:27017"), addr("b:27017")])
            .with_set_name("rs0")
            .with_initial_type(crate::sdam::topology::TopologyType::RsWithPrimary),
    );

    let mut primary_response = HandshakeResponse {
        set_name: Some("rs0".to_string()),
        is_master: Some(true),
        hosts: vec!["a:27017".to_string(), "b:27017".to_string()],
        min_wire_version: Some(6),
        max_wire_version: Some(21),
        ..Default::default()
    };
    primary_response.min_wire_version = Some(6);
    topology.handle_handshake(&addr("a:27017"), Some(primary_response), Some(5), None);
    topology.handle_handshake(&addr("b:27017"), Some(rs_secondary("rs0", None)), Some(5), None);

    let mut wanted = HashMap::new();
    wanted.insert("region".to_string(), "nonexistent".to_string());
    let criteria = ReadPreference::secondary_preferred().with_tags(vec![wanted]);

    let suitable = topology.suitable_servers(OperationType::Read, &criteria);
    assert_eq!(suitable.len(), 1);
    assert_eq!(suitable[0].address.to_string(), "a:27017");
}

#[test]
fn primary_read_excludes_an_unconfirmed_possible_primary() {
    let mut topology = TopologyDescription::new(
        TopologyOptions::new(vec![addr("a:27017")])
            .with_initial_type(crate::sdam::topology::TopologyType::RsNoPrimary),
    );

    let hinted_primary = HandshakeResponse {
        set_name: Some("rs0".to_string()),
        secondary: Some(true),
        hosts: vec!["a:27017".to_string(), "b:27017".to_string()],
        primary: Some("b:27017".to_string()),
        min_wire_version: Some(6),
        max_wire_version: Some(21),
        ..Default::default()
    };
    topology.handle_handshake(&addr("a:27017"), Some(hinted_primary), Some(5), None);

    // b:27017 is only a PossiblePrimary hint, never pinged: it must not be selectable for
    // ReadPreference::Primary even though its candidate type overlaps with RsPrimary.
    let suitable = topology.suitable_servers(OperationType::Read, &ReadPreference::Primary);
    assert!(suitable.is_empty());

    let mut confirmed_primary = HandshakeResponse {
        set_name: Some("rs0".to_string()),
        is_master: Some(true),
        hosts: vec!["a:27017".to_string(), "b:27017".to_string()],
        min_wire_version: Some(6),
        max_wire_version: Some(21),
        ..Default::default()
    };
    confirmed_primary.min_wire_version = Some(6);
    topology.handle_handshake(&addr("b:27017"), Some(confirmed_primary), Some(5), None);

    let suitable = topology.suitable_servers(OperationType::Read, &ReadPreference::Primary);
    assert_eq!(suitable.len(), 1);
    assert_eq!(suitable[0].address.to_string(), "b:27017");
}

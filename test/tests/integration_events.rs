//! Event replication across the three delivery modes, including the
//! self-echo suppression rule for LocalAndServer events.

use tether_client::{ClientError, ClientEvent};
use tether_serde::{ByteReader, ByteWriter, Serde, SerdeErr};
use tether_shared::{Authority, EventError, Opcode, ReplicationMode};
use tether_test::{startup_in_room, ChatEvent, PingEvent, AVATAR_TYPE};

fn chat_payload(text: &str) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    ChatEvent {
        text: text.to_string(),
    }
    .ser(&mut writer)
    .unwrap();
    writer.to_bytes().into_vec()
}

#[test]
fn local_only_fires_locally_and_stays_off_the_wire() {
    let (mut client, server) = startup_in_room("p1", &[(1, "p1", "alice")]);

    client
        .replicate_event(
            &ChatEvent {
                text: String::from("to myself"),
            },
            ReplicationMode::LocalOnly,
        )
        .unwrap();
    let events = client.update();

    let delivered: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            ClientEvent::Event { sender, event } => Some((*sender, event)),
            _ => None,
        })
        .collect();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, 1);
    assert_eq!(
        delivered[0].1.downcast_ref::<ChatEvent>().unwrap().text,
        "to myself"
    );

    assert!(server.take_sent().is_empty());
}

#[test]
fn server_only_goes_to_the_wire_without_local_delivery() {
    let (mut client, server) = startup_in_room("p1", &[(1, "p1", "alice")]);

    client
        .replicate_event(&PingEvent { nonce: 77 }, ReplicationMode::ServerOnly)
        .unwrap();
    let events = client.update();

    assert!(!events
        .iter()
        .any(|event| matches!(event, ClientEvent::Event { .. })));

    let sent = server.take_sent();
    assert_eq!(sent.len(), 1);
    let mut reader = ByteReader::new(&sent[0].bytes);
    assert_eq!(reader.read_op().unwrap(), Opcode::ReplicateEvent.value());
    assert_eq!(reader.read_u16().unwrap(), 1); // sender peer
    assert_eq!(reader.read_byte().unwrap(), ReplicationMode::ServerOnly.to_byte());
    let code = reader.read_u16().unwrap();
    assert_eq!(reader.read_u16().unwrap(), 77); // PingEvent body
    assert_eq!(reader.remaining(), 0);
    // PingEvent registered second
    assert_eq!(code, 1);
}

/// The sender's listener fires exactly once: at send time, never again
/// when the server's rebroadcast arrives
#[test]
fn local_and_server_suppresses_the_self_echo() {
    let (mut client, server) = startup_in_room("p1", &[(1, "p1", "alice"), (2, "p2", "bob")]);

    client
        .replicate_event(
            &ChatEvent {
                text: String::from("hello room"),
            },
            ReplicationMode::LocalAndServer,
        )
        .unwrap();
    let events = client.update();
    let local_fires = events
        .iter()
        .filter(|event| matches!(event, ClientEvent::Event { sender: 1, .. }))
        .count();
    assert_eq!(local_fires, 1);
    assert_eq!(server.take_sent().len(), 1);

    // the server rebroadcasts to the room, including the sender
    server.room_event(
        1,
        ReplicationMode::LocalAndServer,
        0,
        &chat_payload("hello room"),
    );
    let events = client.update();
    assert!(!events
        .iter()
        .any(|event| matches!(event, ClientEvent::Event { .. })));
}

#[test]
fn remote_events_are_delivered_with_their_payload() {
    let (mut client, server) = startup_in_room("p1", &[(1, "p1", "alice"), (2, "p2", "bob")]);

    server.room_event(
        2,
        ReplicationMode::LocalAndServer,
        0,
        &chat_payload("from bob"),
    );
    let events = client.update();

    let mut found = false;
    for event in events {
        if let ClientEvent::Event { sender, event } = event {
            assert_eq!(sender, 2);
            let chat = event.downcast::<ChatEvent>().unwrap();
            assert_eq!(chat.text, "from bob");
            found = true;
        }
    }
    assert!(found);
}

#[test]
fn unknown_event_codes_are_skipped() {
    let (mut client, server) = startup_in_room("p1", &[(1, "p1", "alice"), (2, "p2", "bob")]);

    server.room_event(2, ReplicationMode::ServerOnly, 999, &[1, 2, 3]);
    server.room_event(2, ReplicationMode::ServerOnly, 1, &{
        let mut writer = ByteWriter::new();
        PingEvent { nonce: 5 }.ser(&mut writer).unwrap();
        writer.to_bytes().into_vec()
    });
    let events = client.update();

    // the bad frame is discarded, the next one still lands
    let delivered: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, ClientEvent::Event { .. }))
        .collect();
    assert_eq!(delivered.len(), 1);
}

#[test]
fn unregistered_event_types_error_at_send() {
    struct Unregistered;
    impl Serde for Unregistered {
        fn ser(&self, _: &mut ByteWriter) -> Result<(), SerdeErr> {
            Ok(())
        }
        fn de(_: &mut ByteReader) -> Result<Self, SerdeErr> {
            Ok(Self)
        }
    }

    let (mut client, _server) = startup_in_room("p1", &[(1, "p1", "alice")]);
    assert!(matches!(
        client.replicate_event(&Unregistered, ReplicationMode::ServerOnly),
        Err(ClientError::Event(EventError::NotRegistered { .. }))
    ));
}

#[test]
fn entity_events_carry_the_entity_and_suppress_self_echo() {
    let (mut client, server) = startup_in_room("p1", &[(1, "p1", "alice"), (2, "p2", "bob")]);
    server.create_entity(
        AVATAR_TYPE,
        Authority::OwnerOnly,
        Authority::Everyone,
        42,
        2,
        &[],
    );
    client.update();

    // event authority is Everyone, so the non-owner may originate
    client
        .replicate_entity_event(42, &PingEvent { nonce: 3 }, ReplicationMode::LocalAndServer)
        .unwrap();
    let events = client.update();
    assert!(events.iter().any(|event| matches!(
        event,
        ClientEvent::EntityEvent { sender: 1, entity_id: 42, .. }
    )));

    let sent = server.take_sent();
    assert_eq!(sent.len(), 1);
    let mut reader = ByteReader::new(&sent[0].bytes);
    assert_eq!(reader.read_op().unwrap(), Opcode::ReplicateEntityEvent.value());
    assert_eq!(reader.read_u16().unwrap(), 1); // event code
    assert_eq!(reader.read_u16().unwrap(), 1); // sender peer
    assert_eq!(
        reader.read_byte().unwrap(),
        ReplicationMode::LocalAndServer.to_byte()
    );
    assert_eq!(reader.read_i32().unwrap(), 42);

    // rebroadcast back to the sender: suppressed
    let mut payload = ByteWriter::new();
    PingEvent { nonce: 3 }.ser(&mut payload).unwrap();
    server.entity_event(1, 1, ReplicationMode::LocalAndServer, 42, payload.as_slice());
    let events = client.update();
    assert!(!events
        .iter()
        .any(|event| matches!(event, ClientEvent::EntityEvent { .. })));
}

#[test]
fn entity_events_for_unknown_entities_are_skipped() {
    let (mut client, server) = startup_in_room("p1", &[(1, "p1", "alice"), (2, "p2", "bob")]);

    let mut payload = ByteWriter::new();
    PingEvent { nonce: 9 }.ser(&mut payload).unwrap();
    server.entity_event(1, 2, ReplicationMode::ServerOnly, 404, payload.as_slice());
    let events = client.update();

    assert!(!events
        .iter()
        .any(|event| matches!(event, ClientEvent::EntityEvent { .. })));
}

#[test]
fn owner_only_event_authority_gates_non_owners() {
    let (mut client, server) = startup_in_room("p1", &[(1, "p1", "alice"), (2, "p2", "bob")]);
    server.create_entity(
        AVATAR_TYPE,
        Authority::OwnerOnly,
        Authority::OwnerOnly,
        42,
        2,
        &[],
    );
    client.update();

    assert!(matches!(
        client.replicate_entity_event(42, &PingEvent { nonce: 1 }, ReplicationMode::ServerOnly),
        Err(ClientError::Entity(_))
    ));
}

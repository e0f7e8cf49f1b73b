use assert_matches::assert_matches;
use uuid::Uuid;

use network_core::command::Rank;
use network_core::messaging::packets::{
    AnyPacket, BroadcastPacket, KickPacket, MentionPacket, RankChangePacket, StatisticPacket,
    TargetedMessagePacket, TransferPacket,
};
use network_core::messaging::protocol::{self, MqPacket, PacketId, ProtocolError};

#[test]
fn broadcast_round_trip_preserves_fields() {
    let packet = BroadcastPacket {
        sender: "Admin".to_string(),
        message: "Hi".to_string(),
    };

    let body = protocol::encode(&packet, None).unwrap();
    let decoded = protocol::decode::<BroadcastPacket>(&body).unwrap();

    assert_eq!(decoded.packet.sender, "Admin");
    assert_eq!(decoded.packet.message, "Hi");
    assert_eq!(decoded.sending_proxy, None);
    assert_eq!(BroadcastPacket::ID, PacketId::Broadcast);
}

#[test]
fn envelope_carries_wire_id_and_proxy_attribution() {
    let packet = KickPacket {
        player: "Griefer".to_string(),
        reason: "bye".to_string(),
    };
    let proxy = Uuid::new_v4();

    let body = protocol::encode(&packet, Some(proxy)).unwrap();

    let raw: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(raw["id"], PacketId::Kick.code());
    assert_eq!(raw["proxyID"], proxy.to_string());

    let decoded = protocol::decode::<KickPacket>(&body).unwrap();
    assert_eq!(decoded.sending_proxy, Some(proxy));
    assert_eq!(decoded.packet, packet);
}

#[test]
fn id_mismatch_fails_construction() {
    let packet = TargetedMessagePacket {
        target: "Steve".to_string(),
        message: "psst".to_string(),
    };
    let body = protocol::encode(&packet, None).unwrap();

    // Decoding the targeted-message envelope as a mention must be rejected
    // even though the field names would partially line up.
    let result = protocol::decode::<MentionPacket>(&body);
    assert_matches!(
        result,
        Err(ProtocolError::IdMismatch { expected, found })
            if expected == PacketId::Mention.code() && found == PacketId::TargetedMessage.code()
    );
}

#[test]
fn decode_any_dispatches_on_wire_id() {
    let packet = RankChangePacket {
        player: "Steve".to_string(),
        rank: Rank::Moderator,
    };
    let body = protocol::encode(&packet, None).unwrap();

    let inbound = protocol::decode_any(&body).unwrap();
    assert_matches!(inbound.packet, AnyPacket::RankChange(change) => {
        assert_eq!(change.player, "Steve");
        assert_eq!(change.rank, Rank::Moderator);
    });
}

#[test]
fn decode_any_rejects_unknown_ids() {
    let body = br#"{"id": 9000, "player": "Steve"}"#;
    assert_matches!(protocol::decode_any(body), Err(ProtocolError::UnknownId(9000)));
}

#[test]
fn decode_any_requires_the_id_field() {
    let body = br#"{"player": "Steve", "reason": "bye"}"#;
    assert_matches!(protocol::decode_any(body), Err(ProtocolError::MissingId));
}

#[test]
fn malformed_bodies_are_json_errors() {
    assert_matches!(protocol::decode_any(b"not json"), Err(ProtocolError::Json(_)));
    assert_matches!(protocol::decode_any(b"[1, 2, 3]"), Err(ProtocolError::NotAnObject));
}

#[test]
fn transfer_and_statistic_round_trips() {
    let transfer = TransferPacket {
        player: "Steve".to_string(),
        server: "skyblock-2".to_string(),
    };
    let body = protocol::encode(&transfer, None).unwrap();
    assert_eq!(protocol::decode::<TransferPacket>(&body).unwrap().packet, transfer);

    let statistic = StatisticPacket {
        source: "lobby-1".to_string(),
        key: "players.join".to_string(),
        value: 42.0,
        timestamp: chrono::Utc::now(),
    };
    let body = protocol::encode(&statistic, None).unwrap();
    assert_eq!(protocol::decode::<StatisticPacket>(&body).unwrap().packet, statistic);
}

#[test]
fn every_packet_kind_has_a_distinct_wire_code() {
    let mut codes: Vec<i64> = (0..14)
        .map(|code| PacketId::from_code(code).expect("registered code").code())
        .collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), 14);
}

//! Shared strategies and configuration for the property tests.

#![allow(dead_code)]

use proptest::prelude::*;
use timeguid::{
    layout::{GREGORIAN_CALENDAR_END, GREGORIAN_CALENDAR_START, MAX_CLOCK_SEQUENCE},
    Node, TimeGuid, Timestamp,
};

/// Standard configuration for codec property tests
pub fn codec_config() -> ProptestConfig {
    ProptestConfig {
        cases: 1024,
        max_shrink_iters: 200,
        ..ProptestConfig::default()
    }
}

/// Timestamps inside the Gregorian calendar range, with extra weight on the range ends
pub fn timestamp_strategy() -> impl Strategy<Value = Timestamp> {
    let start = GREGORIAN_CALENDAR_START.ticks();
    let end = GREGORIAN_CALENDAR_END.ticks();
    prop_oneof![
        1 => Just(start),
        1 => Just(end),
        2 => (start..start + 1_000),
        2 => (end - 1_000..=end),
        10 => (start..=end),
    ]
    .prop_map(|ticks| Timestamp::from_ticks(ticks).unwrap())
}

/// Clock sequences in `0..=16383`, with extra weight on the sign-bit boundary of each octet
pub fn clock_sequence_strategy() -> impl Strategy<Value = u16> {
    prop_oneof![
        1 => Just(0u16),
        1 => Just(MAX_CLOCK_SEQUENCE),
        1 => prop::sample::select(vec![0x007fu16, 0x0080, 0x00ff, 0x0100, 0x1fff, 0x2000]),
        6 => 0..=MAX_CLOCK_SEQUENCE,
    ]
}

/// Arbitrary nodes, with extra weight on the extremes and sign-bit patterns
pub fn node_strategy() -> impl Strategy<Value = Node> {
    prop_oneof![
        1 => Just([0x00u8; 6]),
        1 => Just([0xffu8; 6]),
        2 => prop::array::uniform6(prop::sample::select(vec![0x00u8, 0x7f, 0x80, 0xff])),
        6 => any::<[u8; 6]>(),
    ]
    .prop_map(Node::from)
}

/// Field triples of valid identifiers
pub fn fields_strategy() -> impl Strategy<Value = (Timestamp, u16, Node)> {
    (timestamp_strategy(), clock_sequence_strategy(), node_strategy())
}

/// Valid identifiers
pub fn time_guid_strategy() -> impl Strategy<Value = TimeGuid> {
    fields_strategy().prop_map(|(ts, seq, node)| TimeGuid::new(ts, seq, node).unwrap())
}

/// Pairs of identifiers that often share a timestamp or a clock sequence
pub fn close_pair_strategy() -> impl Strategy<Value = (TimeGuid, TimeGuid)> {
    (fields_strategy(), clock_sequence_strategy(), node_strategy(), 0..3u8).prop_map(
        |((ts, seq, node), other_seq, other_node, sharing)| {
            let a = TimeGuid::new(ts, seq, node).unwrap();
            let b = match sharing {
                0 => TimeGuid::new(ts, seq, other_node),
                1 => TimeGuid::new(ts, other_seq, other_node),
                _ => TimeGuid::new(ts, other_seq, node),
            };
            (a, b.unwrap())
        },
    )
}

/// Returns the identifier immediately following `e` in the total order, if any
pub fn successor(e: &TimeGuid) -> Option<TimeGuid> {
    let (ts, seq, node) = (e.timestamp(), e.clock_sequence(), e.node());
    if let Ok(next) = node.increment() {
        TimeGuid::new(ts, seq, next).ok()
    } else if seq < MAX_CLOCK_SEQUENCE {
        TimeGuid::new(ts, seq + 1, Node::MIN).ok()
    } else {
        TimeGuid::min_for_timestamp(ts.add_ticks(1).ok()?).ok()
    }
}

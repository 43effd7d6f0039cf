//! End-to-end node behaviour on a simulated bus

use std::vec::Vec;

use super::*;
use crate::config::NodeConfig;
use crate::message::SentinelPolicy;
use crate::sim::{SimClock, SimDelay, SimInput, SimOutput, Transition, Waveform};

const T: u32 = 100;

/// Banner with sentinel and line feed, in frames
const BANNER_FRAMES: u64 = 22;
const FRAME_US: u64 = 11 * T as u64;
const AFTER_STARTUP: u64 = BANNER_FRAMES * FRAME_US + 1_000;

struct Bus {
    clock: SimClock,
    tx: SimOutput,
    led: SimOutput,
    node: Node<SimInput, SimOutput, SimOutput, SimDelay>,
}

impl Bus {
    fn new(config: NodeConfig, wave: Waveform) -> Self {
        let clock = SimClock::new();
        let rx = SimInput::new(&clock, wave);
        let tx = SimOutput::released(&clock);
        let led = SimOutput::new(&clock);
        let node = Node::new(config, rx, tx.clone(), led.clone(), SimDelay::new(&clock)).unwrap();
        Self { clock, tx, led, node }
    }

    fn sent(&self) -> Vec<u8> {
        self.tx.decode_frames(T)
    }

    fn sent_after_banner(&self) -> Vec<u8> {
        self.sent().split_off(BANNER_FRAMES as usize)
    }
}

#[test]
fn test_startup_banner() {
    let mut bus = Bus::new(NodeConfig::default(), Waveform::idle());
    bus.node.startup();

    assert_eq!(bus.sent(), b"hello from version 6\0\n");
    assert!(bus.led.transitions().is_empty());
    assert_eq!(bus.clock.now(), BANNER_FRAMES * FRAME_US);
}

#[test]
fn test_startup_banner_without_sentinel() {
    let config = NodeConfig::default().with_sentinel(SentinelPolicy::Omit);
    let mut bus = Bus::new(config, Waveform::idle());
    bus.node.startup();

    assert_eq!(bus.sent(), b"hello from version 6\n");
}

#[test]
fn test_matching_address() {
    let wave = Waveform::idle().frame_at(AFTER_STARTUP, b'0', T);
    let mut bus = Bus::new(NodeConfig::default(), wave);

    let dispatch = bus.node.step();
    assert_eq!(dispatch, Dispatch::Replied { address: b'0', frames: 13 });
    assert_eq!(bus.node.state(), NodeState::WaitingForAddress);
    assert_eq!(bus.sent_after_banner(), b"i am node \x000\n");

    // One long pulse, then two short ones once the reply is out
    let pulses = bus.led.pulses(true);
    assert_eq!(pulses.len(), 3);
    let (long_on, long_off) = pulses[0];
    assert_eq!(long_off - long_on, 500_000);

    let reply_start = bus.tx.frame_starts(T)[BANNER_FRAMES as usize];
    assert_eq!(reply_start, long_off + 500_000);
    let reply_end = reply_start + 13 * FRAME_US;

    assert_eq!(pulses[1], (reply_end, reply_end + 100_000));
    assert_eq!(pulses[2], (reply_end + 200_000, reply_end + 300_000));
    assert_eq!(bus.clock.now(), reply_end + 400_000);
}

#[test]
fn test_matching_address_active_high_led() {
    let wave = Waveform::idle().frame_at(AFTER_STARTUP, b'0', T);
    let config = NodeConfig::default().with_status_active_low(false);
    let mut bus = Bus::new(config, wave);

    // Driven low (off) at construction
    assert_eq!(bus.led.transitions()[0], Transition { at: 0, high: false });

    assert!(bus.node.step().replied());

    let pulses = bus.led.pulses(false);
    assert_eq!(pulses.len(), 3);
    let (long_on, long_off) = pulses[0];
    assert_eq!(long_off - long_on, 500_000);

    let reply_start = bus.tx.frame_starts(T)[BANNER_FRAMES as usize];
    let reply_end = reply_start + 13 * FRAME_US;
    assert_eq!(reply_start, long_off + 500_000);
    assert_eq!(pulses[1], (reply_end, reply_end + 100_000));
    assert_eq!(pulses[2], (reply_end + 200_000, reply_end + 300_000));
}

#[test]
fn test_matching_address_without_sentinel() {
    let wave = Waveform::idle().frame_at(AFTER_STARTUP, b'0', T);
    let config = NodeConfig::default().with_sentinel(SentinelPolicy::Omit);
    let mut bus = Bus::new(config, wave);

    let dispatch = bus.node.step();
    assert_eq!(dispatch, Dispatch::Replied { address: b'0', frames: 12 });
    assert_eq!(bus.sent(), b"hello from version 6\ni am node 0\n");
}

#[test]
fn test_mismatched_address() {
    let wave = Waveform::idle().frame_at(AFTER_STARTUP, b'5', T);
    let mut bus = Bus::new(NodeConfig::default(), wave);

    assert_eq!(bus.node.step(), Dispatch::Ignored { address: b'5' });
    assert!(bus.sent_after_banner().is_empty());

    let pulses = bus.led.pulses(true);
    assert_eq!(pulses.len(), 1);
    assert_eq!(pulses[0].1 - pulses[0].0, 500_000);
}

#[test]
fn test_address_echoed_verbatim() {
    let wave = Waveform::idle().frame_at(AFTER_STARTUP, 0xC3, T);
    let mut bus = Bus::new(NodeConfig::new(0xC3), wave);

    assert!(bus.node.step().replied());
    let reply = bus.sent_after_banner();
    assert_eq!(reply[reply.len() - 2..], [0xC3, b'\n']);
}

#[test]
fn test_sequence_of_addresses() {
    // Each cycle keeps the node busy for at least the long pulse
    let wave = Waveform::idle()
        .frame_at(AFTER_STARTUP, b'5', T)
        .frame_at(AFTER_STARTUP + 2_000_000, b'0', T)
        .frame_at(AFTER_STARTUP + 4_000_000, b'9', T);
    let mut bus = Bus::new(NodeConfig::default(), wave);

    let outcomes: Vec<Dispatch> = (0..3).filter_map(|_| bus.node.try_step(10_000_000)).collect();
    assert_eq!(
        outcomes,
        [
            Dispatch::Ignored { address: b'5' },
            Dispatch::Replied { address: b'0', frames: 13 },
            Dispatch::Ignored { address: b'9' },
        ]
    );
    assert_eq!(bus.sent_after_banner(), b"i am node \x000\n");
    assert_eq!(bus.led.pulses(true).len(), 1 + 3 + 1);
}

#[test]
fn test_frame_during_pulse_is_missed() {
    // Second frame arrives while the long pulse is still spinning
    let wave = Waveform::idle()
        .frame_at(AFTER_STARTUP, b'5', T)
        .frame_at(AFTER_STARTUP + 200_000, b'0', T);
    let mut bus = Bus::new(NodeConfig::default(), wave);

    assert_eq!(bus.node.try_step(10_000_000), Some(Dispatch::Ignored { address: b'5' }));
    assert_eq!(bus.node.try_step(10_000), None);
}

#[test]
fn test_noise_is_dispatched_like_an_address() {
    let wave = Waveform::idle()
        .level_from(AFTER_STARTUP, false)
        .level_from(AFTER_STARTUP + 5, true);
    let mut bus = Bus::new(NodeConfig::default(), wave);

    assert_eq!(bus.node.step(), Dispatch::Ignored { address: 0xFF });
}

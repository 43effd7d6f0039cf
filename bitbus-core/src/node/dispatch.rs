//! Node dispatch loop

use bitbus_hal::{BusyWait, InputPin, OutputPin, TristatePin};

use super::state::{NodeEvent, NodeState};
use crate::config::{BusRelease, ConfigError, NodeConfig};
use crate::message::LINE_FEED;
use crate::rx::FrameReceiver;
use crate::status::StatusLed;
use crate::timing::BitTimer;
use crate::tx::FrameTransmitter;

/// Outcome of one dispatch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// Address was not ours; nothing was sent
    Ignored { address: u8 },
    /// Address matched; `frames` frames were sent in reply
    Replied { address: u8, frames: usize },
}

impl Dispatch {
    /// The received address byte
    pub fn address(&self) -> u8 {
        match *self {
            Dispatch::Ignored { address } | Dispatch::Replied { address, .. } => address,
        }
    }

    pub fn replied(&self) -> bool {
        matches!(self, Dispatch::Replied { .. })
    }
}

/// A bus node
///
/// Owns the receive line, the transmit line, the status indicator and the
/// busy-wait delay. Single-threaded; every method blocks until done.
pub struct Node<RX, TX, LED, D> {
    config: NodeConfig,
    receiver: FrameReceiver<RX>,
    transmitter: FrameTransmitter<TX>,
    status: StatusLed<LED>,
    timer: BitTimer<D>,
    state: NodeState,
}

impl<RX, TX, LED, D> Node<RX, TX, LED, D>
where
    RX: InputPin,
    TX: TristatePin,
    LED: OutputPin,
    D: BusyWait,
{
    /// Create a node
    ///
    /// The transmit line is latched idle and released, the indicator is
    /// switched off. Nothing is sent until [`Node::startup`].
    pub fn new(config: NodeConfig, rx: RX, mut tx: TX, led: LED, delay: D) -> Result<Self, ConfigError> {
        config.validate()?;

        tx.set_high();
        tx.release();

        Ok(Self {
            receiver: FrameReceiver::new(rx),
            transmitter: FrameTransmitter::new(tx),
            status: StatusLed::new(led, config.status_active_low),
            timer: BitTimer::new(delay, config.bit_period),
            state: NodeState::Startup,
            config,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    fn apply(&mut self, event: NodeEvent) {
        self.state = self.state.transition(event);
    }

    /// Send the banner and a line feed, then start listening
    ///
    /// Returns the number of frames sent; 0 if already started.
    pub fn startup(&mut self) -> usize {
        if self.state != NodeState::Startup {
            return 0;
        }

        self.claim_bus();
        let mut frames =
            self.transmitter
                .send_message(&mut self.timer, self.config.banner, self.config.sentinel);
        self.transmitter.send_byte(&mut self.timer, LINE_FEED);
        frames += 1;
        self.settle_bus();

        self.apply(NodeEvent::BannerSent);
        frames
    }

    /// Run one dispatch cycle
    ///
    /// Blocks until an address frame arrives. Runs [`Node::startup`] first
    /// if it has not been run.
    pub fn step(&mut self) -> Dispatch {
        self.startup();
        let address = self.receiver.receive_byte(&mut self.timer);
        self.dispatch(address)
    }

    /// Run one dispatch cycle, giving up after `max_polls` idle reads
    pub fn try_step(&mut self, max_polls: u32) -> Option<Dispatch> {
        self.startup();
        let address = self.receiver.try_receive_byte(&mut self.timer, max_polls)?;
        Some(self.dispatch(address))
    }

    /// Start up and dispatch forever
    pub fn run(mut self) -> ! {
        loop {
            self.step();
        }
    }

    fn dispatch(&mut self, address: u8) -> Dispatch {
        self.apply(NodeEvent::AddressReceived(address));
        self.status.pulse(&mut self.timer, self.config.long_pulse);

        let matched = address == self.config.node_id;
        self.apply(NodeEvent::PulseDone { matched });
        if !matched {
            return Dispatch::Ignored { address };
        }

        let frames = self.send_reply(address);
        for _ in 0..self.config.short_pulse_count {
            self.status.pulse(&mut self.timer, self.config.short_pulse);
        }
        self.apply(NodeEvent::ReplySent);

        Dispatch::Replied { address, frames }
    }

    /// Prefix, the address byte as received, line feed
    fn send_reply(&mut self, address: u8) -> usize {
        self.claim_bus();
        let frames = self.transmitter.send_message(
            &mut self.timer,
            self.config.reply_prefix,
            self.config.sentinel,
        );
        self.transmitter.send_byte(&mut self.timer, address);
        self.transmitter.send_byte(&mut self.timer, LINE_FEED);
        self.settle_bus();
        frames + 2
    }

    fn claim_bus(&mut self) {
        let line = self.transmitter.line_mut();
        if !line.is_driving() {
            // Latch idle first so the bus sees no spurious start bit
            line.set_high();
            line.drive();
        }
    }

    fn settle_bus(&mut self) {
        if self.config.bus_release == BusRelease::AfterSend {
            self.transmitter.line_mut().release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimClock, SimDelay, SimInput, SimOutput, Waveform};

    type SimNode = Node<SimInput, SimOutput, SimOutput, SimDelay>;

    struct Harness {
        clock: SimClock,
        tx: SimOutput,
        led: SimOutput,
        node: SimNode,
    }

    fn harness(config: NodeConfig, wave: Waveform) -> Harness {
        let clock = SimClock::new();
        let rx = SimInput::new(&clock, wave);
        let tx = SimOutput::released(&clock);
        let led = SimOutput::new(&clock);
        let node = Node::new(config, rx, tx.clone(), led.clone(), SimDelay::new(&clock)).unwrap();
        Harness { clock, tx, led, node }
    }

    #[test]
    fn test_new_releases_bus_and_sends_nothing() {
        let h = harness(NodeConfig::default(), Waveform::idle());
        assert!(!h.tx.is_driving());
        assert!(h.tx.is_set_high());
        assert!(h.tx.transitions().is_empty());
        assert_eq!(h.node.state(), NodeState::Startup);
        assert_eq!(h.clock.now(), 0);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let clock = SimClock::new();
        let result = Node::new(
            NodeConfig::default().with_banner(b""),
            SimInput::idle(&clock),
            SimOutput::new(&clock),
            SimOutput::new(&clock),
            SimDelay::new(&clock),
        );
        assert!(matches!(result, Err(ConfigError::EmptyBanner)));
    }

    #[test]
    fn test_startup_runs_once() {
        let mut h = harness(NodeConfig::default(), Waveform::idle());
        let frames = h.node.startup();
        assert_eq!(frames, 20 + 1 + 1);
        assert_eq!(h.node.state(), NodeState::WaitingForAddress);
        assert!(h.tx.is_driving());

        assert_eq!(h.node.startup(), 0);
        assert_eq!(h.tx.decode_frames(100).len(), frames);
    }

    #[test]
    fn test_try_step_on_idle_bus() {
        let mut h = harness(NodeConfig::default(), Waveform::idle());
        h.node.startup();
        let sent = h.tx.transitions().len();

        assert_eq!(h.node.try_step(5_000), None);
        assert_eq!(h.node.state(), NodeState::WaitingForAddress);
        assert_eq!(h.tx.transitions().len(), sent);
        assert!(h.led.transitions().is_empty());
    }

    #[test]
    fn test_release_after_send() {
        let config = NodeConfig::default().with_bus_release(BusRelease::AfterSend);
        let mut h = harness(config, Waveform::idle());
        h.node.startup();

        let changes = h.tx.direction_changes();
        assert_eq!(changes.len(), 2);
        assert!(changes[0].high);
        assert!(!changes[1].high);
        assert!(!h.tx.is_driving());
    }

    #[test]
    fn test_dispatch_accessors() {
        let ignored = Dispatch::Ignored { address: b'5' };
        let replied = Dispatch::Replied { address: b'0', frames: 13 };
        assert_eq!(ignored.address(), b'5');
        assert!(!ignored.replied());
        assert_eq!(replied.address(), b'0');
        assert!(replied.replied());
    }
}

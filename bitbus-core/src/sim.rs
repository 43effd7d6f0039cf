//! In-memory line model for host testing
//!
//! Pins and the delay provider share one [`SimClock`]. Delays advance the
//! clock; reads and writes are stamped with it. Nothing here spins.
//!
//! Back-to-back reads of a [`SimInput`] (with no delay in between, as in a
//! start-bit spin loop) each cost `poll_cost_us`; a read that follows a delay
//! is free. This keeps edge detection latency realistic while sample instants
//! stay exactly where the bit timer put them.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use bitbus_hal::{BusyWait, InputPin, OutputPin, TristatePin};

/// Shared simulated clock, in microseconds
#[derive(Debug, Clone)]
pub struct SimClock {
    now: Rc<Cell<u64>>,
    delayed: Rc<Cell<bool>>,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClock {
    /// Create a clock at t = 0
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(0)),
            delayed: Rc::new(Cell::new(true)),
        }
    }

    /// Current time in microseconds
    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// Advance as a delay would
    pub fn advance(&self, us: u64) {
        self.now.set(self.now.get() + us);
        self.delayed.set(true);
    }

    fn charge_poll(&self, cost_us: u32) {
        if !self.delayed.replace(false) {
            self.now.set(self.now.get() + cost_us as u64);
        }
    }
}

/// Delay provider that advances a [`SimClock`]
#[derive(Debug, Clone)]
pub struct SimDelay {
    clock: SimClock,
}

impl SimDelay {
    pub fn new(clock: &SimClock) -> Self {
        Self {
            clock: clock.clone(),
        }
    }
}

impl BusyWait for SimDelay {
    fn delay_us(&mut self, us: u32) {
        self.clock.advance(us as u64);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.advance(ms as u64 * 1_000);
    }
}

/// A level change at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub at: u64,
    pub high: bool,
}

/// Scripted pin-level waveform
///
/// Starts high (idle). Edges must be added in time order.
#[derive(Debug, Clone, Default)]
pub struct Waveform {
    edges: Vec<Transition>,
}

impl Waveform {
    /// A line that stays idle
    pub fn idle() -> Self {
        Self::default()
    }

    /// Set the pin level from `at` onwards
    pub fn level_from(mut self, at: u64, high: bool) -> Self {
        if let Some(last) = self.edges.last() {
            assert!(at >= last.at, "waveform edges must be in time order");
        }
        self.edges.push(Transition { at, high });
        self
    }

    /// Append one frame (start, 8 data bits LSB first, stop) starting at `at`
    pub fn frame_at(mut self, at: u64, byte: u8, period_us: u32) -> Self {
        let period = period_us as u64;
        self = self.level_from(at, false);
        for bit in 0..8 {
            self = self.level_from(at + (bit + 1) * period, byte & (1 << bit) != 0);
        }
        self.level_from(at + 9 * period, true)
    }

    /// Replay a recorded output trace, shifted by `offset_us`
    pub fn from_transitions(transitions: &[Transition], offset_us: u64) -> Self {
        transitions.iter().fold(Self::idle(), |wave, t| {
            wave.level_from(t.at + offset_us, t.high)
        })
    }

    /// Pin level at time `at`
    pub fn level_at(&self, at: u64) -> bool {
        self.edges
            .iter()
            .take_while(|t| t.at <= at)
            .last()
            .map_or(true, |t| t.high)
    }
}

#[derive(Debug)]
struct InputState {
    waveform: Waveform,
    poll_cost_us: u32,
    reads: Vec<Transition>,
}

/// Simulated input pin
///
/// Clones share state, so a test can keep a handle after moving the pin
/// into a receiver.
#[derive(Debug, Clone)]
pub struct SimInput {
    clock: SimClock,
    state: Rc<RefCell<InputState>>,
}

impl SimInput {
    /// Default cost of one spin-loop read
    pub const DEFAULT_POLL_COST_US: u32 = 1;

    /// Input replaying `waveform`
    pub fn new(clock: &SimClock, waveform: Waveform) -> Self {
        Self {
            clock: clock.clone(),
            state: Rc::new(RefCell::new(InputState {
                waveform,
                poll_cost_us: Self::DEFAULT_POLL_COST_US,
                reads: Vec::new(),
            })),
        }
    }

    /// Input whose line never leaves idle
    pub fn idle(clock: &SimClock) -> Self {
        Self::new(clock, Waveform::idle())
    }

    /// Set the cost of a back-to-back read
    pub fn set_poll_cost(&self, us: u32) {
        self.state.borrow_mut().poll_cost_us = us;
    }

    /// Every read so far: when it happened and what it saw
    pub fn reads(&self) -> Vec<Transition> {
        self.state.borrow().reads.clone()
    }

    /// Number of reads so far
    pub fn read_count(&self) -> usize {
        self.state.borrow().reads.len()
    }
}

impl InputPin for SimInput {
    fn is_high(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        self.clock.charge_poll(state.poll_cost_us);
        let at = self.clock.now();
        let high = state.waveform.level_at(at);
        state.reads.push(Transition { at, high });
        high
    }
}

#[derive(Debug)]
struct OutputState {
    high: bool,
    driving: bool,
    transitions: Vec<Transition>,
    direction_changes: Vec<Transition>,
}

/// Simulated output pin
///
/// Records every level change of the output latch and every direction
/// change. Clones share state.
#[derive(Debug, Clone)]
pub struct SimOutput {
    clock: SimClock,
    state: Rc<RefCell<OutputState>>,
}

impl SimOutput {
    /// Output latched high and driving
    pub fn new(clock: &SimClock) -> Self {
        Self::with_direction(clock, true)
    }

    /// Output latched high but released (input)
    pub fn released(clock: &SimClock) -> Self {
        Self::with_direction(clock, false)
    }

    fn with_direction(clock: &SimClock, driving: bool) -> Self {
        Self {
            clock: clock.clone(),
            state: Rc::new(RefCell::new(OutputState {
                high: true,
                driving,
                transitions: Vec::new(),
                direction_changes: Vec::new(),
            })),
        }
    }

    /// Latch level changes so far (the pin starts high)
    pub fn transitions(&self) -> Vec<Transition> {
        self.state.borrow().transitions.clone()
    }

    /// Direction changes so far; `high` means the pin started driving
    pub fn direction_changes(&self) -> Vec<Transition> {
        self.state.borrow().direction_changes.clone()
    }

    /// Times at which the latch went from high to low
    pub fn falling_edges(&self) -> Vec<u64> {
        self.state
            .borrow()
            .transitions
            .iter()
            .filter(|t| !t.high)
            .map(|t| t.at)
            .collect()
    }

    /// Start-bit edges of the frames in the recorded trace
    ///
    /// Falling edges inside a frame's data bits are skipped.
    pub fn frame_starts(&self, period_us: u32) -> Vec<u64> {
        let frame_us = 9 * period_us as u64;
        let mut starts: Vec<u64> = Vec::new();
        for at in self.falling_edges() {
            if starts.last().map_or(true, |&start| at >= start + frame_us) {
                starts.push(at);
            }
        }
        starts
    }

    /// Decode the recorded trace as frames of `period_us` bits
    ///
    /// Samples each bit at its center, like an ideal receiver. Panics if a
    /// stop bit is not at the idle level.
    pub fn decode_frames(&self, period_us: u32) -> Vec<u8> {
        let wave = Waveform::from_transitions(&self.state.borrow().transitions, 0);
        let period = period_us as u64;

        self.frame_starts(period_us)
            .into_iter()
            .map(|start| {
                let mut byte = 0u8;
                for bit in 0..8 {
                    if wave.level_at(start + (bit + 1) * period + period / 2) {
                        byte |= 1 << bit;
                    }
                }
                assert!(
                    wave.level_at(start + 9 * period + period / 2),
                    "missing stop bit in frame starting at {}",
                    start
                );
                byte
            })
            .collect()
    }

    /// On-intervals `(on_at, off_at)` for an indicator of the given polarity
    pub fn pulses(&self, active_low: bool) -> Vec<(u64, u64)> {
        let mut pulses = Vec::new();
        let mut on_at = None;
        for t in self.state.borrow().transitions.iter() {
            let on = t.high != active_low;
            match (on, on_at) {
                (true, None) => on_at = Some(t.at),
                (false, Some(start)) => {
                    pulses.push((start, t.at));
                    on_at = None;
                }
                _ => {}
            }
        }
        pulses
    }

    fn write(&mut self, high: bool) {
        let mut state = self.state.borrow_mut();
        if state.high != high {
            state.high = high;
            let at = self.clock.now();
            state.transitions.push(Transition { at, high });
        }
    }
}

impl OutputPin for SimOutput {
    fn set_high(&mut self) {
        self.write(true);
    }

    fn set_low(&mut self) {
        self.write(false);
    }

    fn is_set_high(&self) -> bool {
        self.state.borrow().high
    }
}

impl TristatePin for SimOutput {
    fn drive(&mut self) {
        let mut state = self.state.borrow_mut();
        if !state.driving {
            state.driving = true;
            let at = self.clock.now();
            state.direction_changes.push(Transition { at, high: true });
        }
    }

    fn release(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.driving {
            state.driving = false;
            let at = self.clock.now();
            state.direction_changes.push(Transition { at, high: false });
        }
    }

    fn is_driving(&self) -> bool {
        self.state.borrow().driving
    }
}

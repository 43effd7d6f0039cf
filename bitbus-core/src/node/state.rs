//! Dispatch state machine

/// Node states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeState {
    /// Before the startup banner has been sent
    Startup,
    /// Spinning on the receive line for an address frame
    WaitingForAddress,
    /// Address received, long pulse in progress
    StatusPulseLong,
    /// Address matched, reply and short pulses in progress
    ReplySequence,
}

/// Events that move the node between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeEvent {
    /// Startup banner is on the wire
    BannerSent,
    /// An address frame was received
    AddressReceived(u8),
    /// Long pulse finished; `matched` if the address was ours
    PulseDone { matched: bool },
    /// Reply and short pulses finished
    ReplySent,
}

impl NodeState {
    /// Check if the node is idle on the bus
    pub fn is_listening(&self) -> bool {
        matches!(self, NodeState::WaitingForAddress)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: NodeEvent) -> Self {
        use NodeEvent::*;
        use NodeState::*;

        match (self, event) {
            (Startup, BannerSent) => WaitingForAddress,
            (WaitingForAddress, AddressReceived(_)) => StatusPulseLong,
            (StatusPulseLong, PulseDone { matched: true }) => ReplySequence,
            (StatusPulseLong, PulseDone { matched: false }) => WaitingForAddress,
            (ReplySequence, ReplySent) => WaitingForAddress,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_to_listening() {
        let next = NodeState::Startup.transition(NodeEvent::BannerSent);
        assert_eq!(next, NodeState::WaitingForAddress);
        assert!(next.is_listening());
    }

    #[test]
    fn test_match_cycle() {
        let state = NodeState::WaitingForAddress
            .transition(NodeEvent::AddressReceived(b'0'))
            .transition(NodeEvent::PulseDone { matched: true });
        assert_eq!(state, NodeState::ReplySequence);
        assert_eq!(
            state.transition(NodeEvent::ReplySent),
            NodeState::WaitingForAddress
        );
    }

    #[test]
    fn test_mismatch_returns_to_listening() {
        let state = NodeState::WaitingForAddress
            .transition(NodeEvent::AddressReceived(b'5'))
            .transition(NodeEvent::PulseDone { matched: false });
        assert_eq!(state, NodeState::WaitingForAddress);
    }

    #[test]
    fn test_out_of_order_events_ignored() {
        assert_eq!(
            NodeState::Startup.transition(NodeEvent::AddressReceived(1)),
            NodeState::Startup
        );
        assert_eq!(
            NodeState::WaitingForAddress.transition(NodeEvent::ReplySent),
            NodeState::WaitingForAddress
        );
        assert_eq!(
            NodeState::ReplySequence.transition(NodeEvent::BannerSent),
            NodeState::ReplySequence
        );
    }
}

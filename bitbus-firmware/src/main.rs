//! Bitbus node firmware
//!
//! Bit-banged multi-drop bus node for RP2040 boards. Announces itself with
//! a banner, then answers to its address with an identification reply.
//! Configuration comes from `node.toml` at build time.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use {defmt_rtt as _, panic_probe as _};

use bitbus_core::{Dispatch, Node};
use bitbus_hal_rp2040::delay::spin_delay;
use bitbus_hal_rp2040::pins::{BusRx, BusTx, StatusPin};

#[macro_use]
mod node_config {
    include!(concat!(env!("OUT_DIR"), "/node_config.rs"));
}

use node_config::NODE_CONFIG;

/// Main entry point
///
/// Never awaits: the node owns the core and spins for all of its timing.
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Bitbus node starting...");

    let p = embassy_rp::init(Default::default());
    let (rx_pin, tx_pin, status_pin) = bus_pins!(p);
    info!(
        "Pins: rx=GPIO{} tx=GPIO{} status=GPIO{}",
        node_config::RX_PIN,
        node_config::TX_PIN,
        node_config::STATUS_PIN
    );

    // Indicator starts at its "off" level
    let status = StatusPin::new(status_pin, NODE_CONFIG.status_active_low);

    let mut node = match Node::new(
        NODE_CONFIG,
        BusRx::new(rx_pin),
        BusTx::new(tx_pin),
        status,
        spin_delay(),
    ) {
        Ok(node) => node,
        Err(e) => {
            error!("Invalid node configuration: {}", e);
            loop {
                cortex_m::asm::wfi();
            }
        }
    };

    info!(
        "Node id={=u8:#04x} bit period={}us sentinel={} release={}",
        NODE_CONFIG.node_id,
        NODE_CONFIG.bit_period.as_us(),
        NODE_CONFIG.sentinel,
        NODE_CONFIG.bus_release
    );

    let frames = node.startup();
    info!("Banner sent ({} frames)", frames);

    // Keep logging here short: a start edge is only seen once step() spins again
    loop {
        match node.step() {
            Dispatch::Ignored { address } => {
                debug!("Address {=u8:#04x} not ours", address);
            }
            Dispatch::Replied { address, frames } => {
                info!("Address {=u8:#04x} matched, replied with {} frames", address, frames);
            }
        }
    }
}

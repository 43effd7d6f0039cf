//! Build script for bitbus-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates node.toml and compiles it into `node_config.rs`

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// RP2040 GPIO count
const GPIO_COUNT: i64 = 30;

fn main() {
    setup_linker();
    let node = validate_config();
    generate_config(&node);
}

/// Set up linker search paths and scripts
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validated contents of node.toml
struct NodeToml {
    id: u8,
    bit_period_us: u32,
    rx_pin: u8,
    tx_pin: u8,
    release_after_send: bool,
    status_pin: u8,
    status_active_low: bool,
    long_ms: u32,
    short_ms: u32,
    short_count: u8,
    banner: String,
    reply_prefix: String,
    omit_sentinel: bool,
}

/// Print a boxed build error and abort
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|line| {
                let truncated = if line.chars().count() > 62 {
                    format!("{}...", line.chars().take(59).collect::<String>())
                } else {
                    line.clone()
                };
                format!("║  • {:<62} ║", truncated)
            })
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Validate node.toml at compile time
fn validate_config() -> NodeToml {
    // Re-run if node.toml changes
    println!("cargo:rerun-if-changed=node.toml");

    let config_path = Path::new("node.toml");
    if !config_path.exists() {
        fail(
            "node.toml not found!",
            &["Create node.toml in the bitbus-firmware directory.".to_string()],
        );
    }

    let content = fs::read_to_string(config_path)
        .unwrap_or_else(|e| fail("Failed to read node.toml", &[e.to_string()]));

    let config: toml::Value = toml::from_str(&content).unwrap_or_else(|e| {
        fail(
            "Invalid TOML syntax in node.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        )
    });

    let mut errors = Vec::new();

    for section in ["node", "bus", "status", "messages"] {
        if config.get(section).and_then(|s| s.as_table()).is_none() {
            errors.push(format!("Missing [{}] section", section));
        }
    }
    if !errors.is_empty() {
        fail("Missing required sections in node.toml", &errors);
    }

    let id = match config["node"].get("id") {
        Some(toml::Value::String(s)) if s.len() == 1 && s.is_ascii() => s.as_bytes()[0],
        Some(toml::Value::Integer(n)) if (0..=255).contains(n) => *n as u8,
        Some(_) => {
            errors.push("[node] id must be one ASCII character or 0-255".to_string());
            0
        }
        None => {
            errors.push("[node] missing 'id'".to_string());
            0
        }
    };

    let bus = &config["bus"];
    let bit_period_us = match (bus.get("bit_period_us"), bus.get("baud")) {
        (Some(_), Some(_)) => {
            errors.push("[bus] set either 'bit_period_us' or 'baud', not both".to_string());
            0
        }
        (Some(toml::Value::Integer(us)), None) if *us >= 2 && *us <= 1_000_000 => *us as u32,
        (None, Some(toml::Value::Integer(baud))) if *baud > 0 && *baud <= 500_000 => {
            ((1_000_000 + *baud / 2) / *baud) as u32
        }
        (None, None) => {
            errors.push("[bus] missing 'bit_period_us' or 'baud'".to_string());
            0
        }
        _ => {
            errors.push("[bus] bit_period_us must be 2-1000000, baud 1-500000".to_string());
            0
        }
    };

    let mut pin = |table: &toml::Value, section: &str, key: &str| -> u8 {
        match table.get(key) {
            Some(toml::Value::Integer(n)) if (0..GPIO_COUNT).contains(n) => *n as u8,
            Some(_) => {
                errors.push(format!("[{}] {} must be a GPIO number 0-29", section, key));
                0
            }
            None => {
                errors.push(format!("[{}] missing '{}'", section, key));
                0
            }
        }
    };
    let rx_pin = pin(bus, "bus", "rx_pin");
    let tx_pin = pin(bus, "bus", "tx_pin");
    let status_pin = pin(&config["status"], "status", "pin");

    if rx_pin == tx_pin || rx_pin == status_pin || tx_pin == status_pin {
        errors.push("rx_pin, tx_pin and status pin must all differ".to_string());
    }

    let release_after_send = match bus.get("release").and_then(|v| v.as_str()) {
        None | Some("hold") => false,
        Some("after_send") => true,
        Some(_) => {
            errors.push("[bus] release must be 'hold' or 'after_send'".to_string());
            false
        }
    };

    let status = &config["status"];
    let status_active_low = match status.get("active_low") {
        Some(toml::Value::Boolean(b)) => *b,
        None => true,
        Some(_) => {
            errors.push("[status] active_low must be true or false".to_string());
            true
        }
    };

    let mut positive = |key: &str, default: i64, max: i64| -> i64 {
        match status.get(key) {
            None => default,
            Some(toml::Value::Integer(n)) if *n > 0 && *n <= max => *n,
            Some(_) => {
                errors.push(format!("[status] {} must be 1-{}", key, max));
                default
            }
        }
    };
    let long_ms = positive("long_ms", 500, 60_000) as u32;
    let short_ms = positive("short_ms", 100, 60_000) as u32;
    let short_count = positive("short_count", 2, 255) as u8;

    let messages = &config["messages"];
    let mut text = |key: &str| -> String {
        match messages.get(key) {
            Some(toml::Value::String(s)) if !s.is_empty() && !s.contains('\0') => s.clone(),
            Some(_) => {
                errors.push(format!("[messages] {} must be non-empty without NUL", key));
                String::new()
            }
            None => {
                errors.push(format!("[messages] missing '{}'", key));
                String::new()
            }
        }
    };
    let banner = text("banner");
    let reply_prefix = text("reply_prefix");

    let omit_sentinel = match messages.get("sentinel").and_then(|v| v.as_str()) {
        None | Some("transmit") => false,
        Some("omit") => true,
        Some(_) => {
            errors.push("[messages] sentinel must be 'transmit' or 'omit'".to_string());
            false
        }
    };

    if !errors.is_empty() {
        fail("Invalid node configuration", &errors);
    }

    println!("cargo:warning=node.toml validated successfully");

    NodeToml {
        id,
        bit_period_us,
        rx_pin,
        tx_pin,
        release_after_send,
        status_pin,
        status_active_low,
        long_ms,
        short_ms,
        short_count,
        banner,
        reply_prefix,
        omit_sentinel,
    }
}

fn byte_literal(s: &str) -> String {
    let bytes: Vec<String> = s.bytes().map(|b| b.to_string()).collect();
    format!("&[{}]", bytes.join(", "))
}

/// Write `node_config.rs` into OUT_DIR
fn generate_config(node: &NodeToml) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let sentinel = if node.omit_sentinel { "Omit" } else { "Transmit" };
    let release = if node.release_after_send { "AfterSend" } else { "Hold" };

    let code = format!(
        "// Generated by build.rs from node.toml\n\
        \n\
        pub const NODE_CONFIG: ::bitbus_core::NodeConfig = ::bitbus_core::NodeConfig::new({id})\n\
        \x20   .with_bit_period(match ::bitbus_core::BitPeriod::new({period}) {{\n\
        \x20       Ok(period) => period,\n\
        \x20       Err(_) => panic!(\"bit period rejected\"),\n\
        \x20   }})\n\
        \x20   .with_banner({banner})\n\
        \x20   .with_reply_prefix({prefix})\n\
        \x20   .with_pulses(\n\
        \x20       ::bitbus_core::PulseTiming::symmetric({long}),\n\
        \x20       ::bitbus_core::PulseTiming::symmetric({short}),\n\
        \x20       {count},\n\
        \x20   )\n\
        \x20   .with_status_active_low({active_low})\n\
        \x20   .with_sentinel(::bitbus_core::SentinelPolicy::{sentinel})\n\
        \x20   .with_bus_release(::bitbus_core::BusRelease::{release});\n\
        \n\
        pub const RX_PIN: u8 = {rx};\n\
        pub const TX_PIN: u8 = {tx};\n\
        pub const STATUS_PIN: u8 = {status};\n\
        \n\
        /// Take (rx, tx, status) pins from the peripherals\n\
        macro_rules! bus_pins {{\n\
        \x20   ($p:ident) => {{\n\
        \x20       ($p.PIN_{rx}, $p.PIN_{tx}, $p.PIN_{status})\n\
        \x20   }};\n\
        }}\n",
        id = node.id,
        period = node.bit_period_us,
        banner = byte_literal(&node.banner),
        prefix = byte_literal(&node.reply_prefix),
        long = node.long_ms,
        short = node.short_ms,
        count = node.short_count,
        active_low = node.status_active_low,
        sentinel = sentinel,
        release = release,
        rx = node.rx_pin,
        tx = node.tx_pin,
        status = node.status_pin,
    );

    fs::write(out_dir.join("node_config.rs"), code).unwrap();
}

//! Three nodes booting on a shared virtual medium.
//!
//! The first node finds no coordinator, exhausts its scan budget, and forms
//! the network; the later nodes hear its beacons, associate, and start
//! sending periodic datagrams.
//!
//! Run with:
//!
//! ```sh
//! RUST_LOG=info cargo run -p wpan-star-rs-sim --example star_demo
//! ```

use wpan_star_rs::hal::MacEngine;
use wpan_star_rs::types::ExtendedAddress;
use wpan_star_rs::NetworkConfig;
use wpan_star_rs_sim::{NodeHarness, SimClock, VirtualAir};

const STEP_US: u64 = 10_000;
const RUN_FOR_US: u64 = 20_000_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let air = VirtualAir::shared();
    let clock = SimClock::new();

    // Random IEEE addresses, as a production kit would carry in EEPROM.
    let mut nodes: Vec<NodeHarness> = (0..3)
        .map(|_| {
            NodeHarness::new(
                NetworkConfig::default(),
                &air,
                clock.clone(),
                ExtendedAddress(rand::random()),
            )
        })
        .collect::<Result<_, _>>()?;

    // Stagger the power-on moments so the nodes do not all scan into an
    // empty medium at once.
    let boot_times: Vec<u64> = (0..nodes.len() as u64)
        .map(|index| index * 2_000_000 + u64::from(rand::random::<u16>()))
        .collect();
    let mut booted = vec![false; nodes.len()];

    while clock.now_us() < RUN_FOR_US {
        for (index, node) in nodes.iter_mut().enumerate() {
            if !booted[index] && clock.now_us() >= boot_times[index] {
                node.start()?;
                booted[index] = true;
            }
            if booted[index] {
                node.run_cycle()?;
            }
        }
        clock.advance(STEP_US);
    }

    println!("--- after {} simulated seconds ---", RUN_FOR_US / 1_000_000);
    for (index, node) in nodes.iter().enumerate() {
        println!(
            "node {} ({}): {:?}",
            index,
            node.engine.extended_address(),
            node.node.state()
        );
    }
    println!(
        "datagrams delivered to the coordinator: {}",
        air.borrow().delivered.len()
    );
    Ok(())
}

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use clap::Parser;

mod control;
mod gpio;
mod service;

use control::{Controller, LineConfig};

/// Attribute server for a DS1620 thermometer bit-banged over GPIO lines
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the GPIO character device
    #[arg(long, default_value = "/dev/gpiochip0")]
    chip: PathBuf,
    /// GPIO line offset for the CLK pin
    #[arg(long, default_value_t = 48)]
    clk_pin: u32,
    /// GPIO line offset for the DQ pin
    #[arg(long, default_value_t = 49)]
    dq_pin: u32,
    /// GPIO line offset for the RST pin
    #[arg(long, default_value_t = 115)]
    rst_pin: u32,
    /// Clock half-period in milliseconds
    #[arg(long, default_value_t = 1)]
    period: u32,
    /// Listen address for the attribute service
    #[arg(long, default_value = "127.0.0.1:1620")]
    listen: String,
}

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    log::info!("Arguments: {args:#?}");
    // Synchronizer
    let running = Arc::new(AtomicBool::new(true));
    // Handle Ctrl+C to stop the server gracefully
    {
        let running = running.clone();
        ctrlc::set_handler(move || {
            log::info!("Received Ctrl+C, stopping the server...");
            running.store(false, Ordering::Relaxed);
        })
        .expect("Error setting Ctrl-C handler");
    }
    let config = LineConfig {
        chip: args.chip,
        clk: args.clk_pin,
        dq: args.dq_pin,
        rst: args.rst_pin,
        period_ms: args.period,
    };
    let controller = match Controller::new(config) {
        Ok(controller) => Arc::new(controller),
        Err(e) => {
            log::error!("Failed to bring up the DS1620: {e}");
            std::process::exit(1);
        }
    };
    log::info!("DS1620 initialized, continuous conversion running");
    let _svc_hdl = {
        let running = running.clone();
        let controller = controller.clone();
        thread::spawn(move || service::service_thread(args.listen, running, controller))
    };
    while running.load(Ordering::Relaxed) {
        thread::sleep(Duration::from_millis(100));
    }
    controller.shutdown();
    log::info!("Exiting");
}

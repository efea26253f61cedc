extern crate clap;
use crossbeam_channel::bounded;
use ctrlc;
use env_logger;
use log::{error, info};

use rmock_core::irq::IrqReturn;
use rmock_core::lifecycle::DeviceDriver;
use rmock_emu::{ChannelEmulatedSource, MmapRegisterFile, TriggerServer};

use std::time::Duration;

/// Configures the command-line interface using clap
fn get_cli_config<'a>() -> clap::ArgMatches<'a> {
    let description = "Driver side: maps the emulated registers and services link-change interrupts";
    clap::App::new("rmock-driver")
        .version("0.1")
        .about(description)
        .arg(
            clap::Arg::with_name("iomem")
                .short("i")
                .long("iomem")
                .value_name("FILE")
                .takes_value(true)
                .required(true)
                .help("Backing file of the shared register map"),
        )
        .arg(
            clap::Arg::with_name("socket")
                .short("s")
                .long("socket")
                .value_name("PATH")
                .takes_value(true)
                .required(true)
                .help("Unix datagram socket to bind the trigger channel to"),
        )
        .get_matches()
}

fn main() {
    env_logger::init();

    // Set up Ctrl-C handling with channel communication
    let (signal_sender, signal_receiver) = bounded(1);
    let handler_result = ctrlc::set_handler(move || {
        if signal_sender.is_full() {
            std::process::exit(-1);
        }
        let _send_result = signal_sender.send(());
    });

    if let Err(e) = handler_result {
        error!("Signal handler failed: {:?}", e);
        return;
    }

    let cli_matches = get_cli_config();
    let iomem_file = cli_matches.value_of("iomem").unwrap().to_string();
    let socket_file = cli_matches.value_of("socket").unwrap();

    let server = match TriggerServer::bind(socket_file) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create the interrupt trigger socket: {}", e);
            return;
        }
    };

    // Bring the lifecycle up: map, install the handler, then unmask
    let source = ChannelEmulatedSource::new(server);
    let mut driver = match DeviceDriver::bring_up(|| MmapRegisterFile::open(&iomem_file), source)
    {
        Ok(driver) => driver,
        Err(e) => {
            error!("Driver setup failed: {}", e);
            return;
        }
    };
    info!("Driver armed, waiting for link-change interrupts");

    // Service loop: one trigger per iteration until Ctrl-C
    loop {
        if !signal_receiver.is_empty() {
            break;
        }

        match driver.service(Duration::from_millis(100)) {
            Ok(Some(IrqReturn::Handled(_))) => {}
            Ok(Some(IrqReturn::None)) => {
                // shared-line delivery that was not ours; nothing to do
            }
            Ok(None) => {}
            Err(e) => {
                error!("Trigger channel receive failed: {}", e);
                break;
            }
        }
    }

    driver.tear_down();
    info!("Driver torn down");
}

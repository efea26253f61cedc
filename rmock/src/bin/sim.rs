extern crate clap;
use env_logger;
use log::error;

use rmock_core::device::{simulate_link_change, LinkChange};
use rmock_core::regs::Registers;
use rmock_emu::{MmapRegisterFile, TriggerClient};

/// Configures the command-line interface using clap
fn get_cli_config<'a>() -> clap::ArgMatches<'a> {
    let description = "Device-side mutator: toggles the emulated link and raises the interrupt";
    clap::App::new("rmock-sim")
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
                .help("Unix datagram socket the driver side listens on"),
        )
        .get_matches()
}

fn main() {
    env_logger::init();

    let cli_matches = get_cli_config();
    let iomem_file = cli_matches.value_of("iomem").unwrap();
    let socket_file = cli_matches.value_of("socket").unwrap();

    let block = match MmapRegisterFile::open(iomem_file) {
        Ok(block) => block,
        Err(e) => {
            error!("Error mapping the iomem file: {}", e);
            std::process::exit(1);
        }
    };

    let trigger = match TriggerClient::connect(socket_file) {
        Ok(trigger) => trigger,
        Err(e) => {
            error!("Could not connect to the unix domain socket: {}", e);
            std::process::exit(1);
        }
    };

    let mut regs = Registers::new(block);
    match simulate_link_change(&mut regs, &trigger) {
        Ok(LinkChange::Delivered(state)) => {
            println!("Changing link status to {}", state.as_str());
        }
        Ok(LinkChange::Suppressed) => {
            println!("The interrupt mask does not allow to trigger an interrupt, aborting");
        }
        Err(e) => {
            error!("Trigger delivery failed: {}", e);
            std::process::exit(1);
        }
    }
}

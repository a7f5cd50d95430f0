use std::process;

use clap::Parser;
use textbook_rsa::ui::app::{run, Args};

fn main() {
    env_logger::init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error running application: {:#}", e);
        process::exit(1);
    }
}

use clap::Parser;
use log::{debug, LevelFilter};
use snafu::ErrorCompat;

mod args;
mod houses;

fn main() {
    let args = args::Args::parse();

    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    debug!("args: {:?}", args);

    if let Err(e) = houses::run(&args) {
        eprintln!("An error occurred: {}", e);
        for cause in e.iter_chain().skip(1) {
            eprintln!("  caused by: {}", cause);
        }
        std::process::exit(1);
    }
}

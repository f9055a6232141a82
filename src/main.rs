//! Command-line entry point for the xtalview diagnostic viewer.

use std::path::Path;
use std::process::ExitCode;

use xtalview::ice::IceAnalysis;
use xtalview::{Options, Viewer};

const USAGE: &str = "Usage: xtalview <metrics.json> [options.toml] [ice.json]";

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(metrics) = args.next() else {
        log::error!("{USAGE}");
        return ExitCode::FAILURE;
    };

    let options = match args.next() {
        Some(path) => match Options::load(Path::new(&path)) {
            Ok(options) => options,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Options::default(),
    };

    let mut builder = Viewer::builder()
        .with_metrics_path(metrics)
        .with_options(options);
    if let Some(path) = args.next() {
        builder = builder.with_ice(IceAnalysis::from_fetch(std::fs::read_to_string(path)));
    }

    match builder.build().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

//! CLI entry point for four-fragment histology stitching

use clap::Parser;
use quadstitch::io::cli::{Cli, Stitcher};
use quadstitch::io::logging;

fn main() -> quadstitch::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);
    let mut stitcher = Stitcher::new(cli);
    stitcher.process().map(|_| ())
}

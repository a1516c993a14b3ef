//! This crate contains the source code for the binary of the grassfire visualizer.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]
#![expect(
    unused_crate_dependencies,
    reason = "The dependencies are used in the library crate."
)]

use clap::Parser as _;
use color_eyre::{eyre::Result, install};
use grassfire::{config, config::Cli, run_headless, App};

fn main() -> Result<()> {
    install()?;
    config::init_logging();

    let cli = Cli::parse();
    if cli.classic {
        cli.grid.validate_classic()?;
    }

    if cli.headless {
        print!("{}", run_headless(&cli.grid)?);
        return Ok(());
    }

    let mut app = App::new(&cli)?;
    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    result
}

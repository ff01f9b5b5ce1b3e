mod cli;
mod terminal;

use std::error::Error;

use chip8vm_core::{Chip8Interpreter, Chip8Machine};
use clap::Parser;
use log::info;

use cli::Cli;
use terminal::{TerminalBeeper, TerminalDisplay, TerminalKeyboard, TerminalSession};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = cli.config();
    info!("{config:?}");

    // load before touching the terminal so a bad ROM reports cleanly
    let mut machine = Chip8Machine::new(&config);
    machine.load_file(&cli.rom)?;

    let session = TerminalSession::enter()?;
    let mut interpreter = Chip8Interpreter::new(
        machine,
        TerminalDisplay::new(),
        TerminalKeyboard::new(session.reports_key_release()),
        TerminalBeeper::default(),
    );
    let result = interpreter.run();
    drop(session);

    result?;
    Ok(())
}

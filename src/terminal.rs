use std::io::{self, Stdout};
use std::panic;

use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

pub type PortalTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Switches to raw mode on the alternate screen. A panic restores the
/// terminal before the default hook prints.
pub fn init() -> io::Result<PortalTerminal> {
    setup_panic_hook();
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?.execute(Hide)?;
    Terminal::new(CrosstermBackend::new(io::stdout()))
}

/// Leaves raw mode and the alternate screen. Every step is attempted even if
/// an earlier one fails; the first failure is returned.
pub fn restore() -> io::Result<()> {
    let raw = disable_raw_mode();
    let screen = io::stdout()
        .execute(LeaveAlternateScreen)
        .and_then(|out| out.execute(Show))
        .map(|_| ());
    raw.and(screen)
}

/// The log file is the only place a panic message survives once the
/// alternate screen is gone.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        tracing::error!("portal panicked: {panic_info}");
        original_hook(panic_info);
    }));
}

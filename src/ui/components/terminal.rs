use anyhow::Result;
use crossterm::{event, execute, terminal};
use ratatui::{backend::CrosstermBackend, Terminal};

pub type Backend = CrosstermBackend<std::io::Stdout>;

/// RAII wrapper that keeps raw mode, the alternate screen and mouse capture
/// scoped to the client's lifetime.
pub struct TerminalGuard {
    terminal: Terminal<Backend>,
    restored: bool,
}

impl TerminalGuard {
    /// Enter raw + alternate screen modes, capture the mouse and hide the cursor.
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture
        )?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            restored: false,
        })
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<Backend> {
        &mut self.terminal
    }

    /// Restore the terminal once, regardless of how many times it is called.
    pub fn restore(&mut self) -> Result<()> {
        if !self.restored {
            self.terminal.show_cursor()?;
            execute!(
                self.terminal.backend_mut(),
                event::DisableMouseCapture,
                terminal::LeaveAlternateScreen
            )?;
            terminal::disable_raw_mode()?;
            self.restored = true;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

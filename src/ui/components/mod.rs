pub mod dialog;
pub mod navbar;
pub mod table;
pub mod terminal;
pub mod toasts;
pub mod utils;

pub use table::{build_table, highlight_row};
pub use terminal::TerminalGuard;

pub mod actions;
pub mod components;
pub mod keymap;
pub mod modal;
pub mod navbar;
pub mod navigation;
pub mod notifications;
pub mod screens;
pub mod search;
pub mod session;
pub mod styles;
pub mod theme;

pub use components::TerminalGuard;
pub use screens::render;

pub mod bootstrap;
pub mod controller;
pub mod event;
pub mod state;

pub use bootstrap::run;
pub use controller::ExitReason;

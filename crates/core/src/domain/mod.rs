pub mod board;
pub mod process;
pub mod quote;
pub mod settings;
pub mod snapshot;

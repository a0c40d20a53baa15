//! Command implementations and terminal presentation

pub mod export;
pub mod nav;
pub mod returns;
pub mod setup;
pub mod ui;

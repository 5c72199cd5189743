pub mod convert;
pub mod currencies;
pub mod interactive;
pub mod markets;
pub mod panel;
pub mod setup;
pub mod ui;

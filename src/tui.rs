//! Terminal front-end: one human against bots in a local room.

pub mod app;
pub mod controller;
mod ui;

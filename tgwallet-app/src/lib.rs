pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod host;
pub mod messages;
pub mod render;
pub mod screen;
pub mod terminal;

#[cfg(test)]
mod tests;

#[macro_use]
extern crate tracing;

pub mod cli;
pub mod layout;

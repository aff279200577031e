#[macro_use]
extern crate tracing;

pub mod animation;
pub mod cli;
pub mod input;
pub mod layout;
pub mod persistence;
pub mod replay;
pub mod utils;

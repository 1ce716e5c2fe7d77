pub mod check;
mod common;
pub mod symbols;

//! Domain rules that sit between the handlers and the store.

pub mod goal;
pub mod shelf;
pub mod statistics;

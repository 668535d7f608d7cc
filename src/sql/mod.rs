//! Safe SQL builder: identifiers from static descriptors only, values as parameters.

mod builder;
pub mod params;
pub mod tables;
pub use builder::*;
pub use params::*;

//! Client side of BookNest: typed service modules over the REST API, a keyed
//! query cache, data bindings that publish load state, and form bindings
//! that validate with the same schemas as the server.

pub mod bindings;
pub mod cache;
pub mod error;
pub mod forms;
pub mod http;
pub mod services;

pub use cache::{QueryCache, QueryKey};
pub use error::ClientError;
pub use http::{ApiClient, Lookup};
pub use services::Services;

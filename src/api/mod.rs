pub mod endpoints;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use endpoints::{Api, BASE_URL};
pub use transport::{Form, HttpTransport, Transport};

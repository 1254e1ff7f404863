//! The boundary with the authoritative server: what it pushes to us, what we
//! ask of it, and the trait that carries those requests.

pub mod events;
pub mod requests;
pub mod transport;

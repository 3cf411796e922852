/// TCP server implementation for the Curio Store daemon.
///
/// This module provides the [`Router`] which handles incoming TCP connections
/// and dispatches commands to the underlying store and asset backend.
pub mod router;

pub use router::Router;

// === PUBLIC CONTRACT ===
// Hosts and render surfaces consume the snapshot model and the client trait.
pub mod contract;

pub use contract::{client, error, model};

// === MODULE DEFINITION ===
// Wires config, infra adapters and the engine into one object built at process start.
pub mod module;
pub use module::BirthdaySync;

// === INTERNAL MODULES ===
// Exposed for tests and for hosts that assemble the engine themselves.
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;

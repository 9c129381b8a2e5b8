//! I/O helpers: session store, persistence, configuration.

pub mod config;
pub mod layout;
pub mod session;
pub mod store;

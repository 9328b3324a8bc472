// Brood Core - Spawner contract, domain types & ports
// NO process management or host-specific dependencies here

pub mod domain;
pub mod error;
pub mod output;
pub mod port;

pub use error::{Result, SpawnError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

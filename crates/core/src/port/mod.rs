// Port Layer - Interfaces for external collaborators

pub mod results;
pub mod settings;
pub mod spawner;
pub mod time_provider;

// Re-exports
pub use results::ResultsDirResolver;
pub use settings::{SettingsProvider, SettingsSnapshot};
pub use spawner::{SpawnMethod, SpawnOutcome, SpawnStatus, Spawner, SpawnerCommon};
pub use time_provider::TimeProvider;

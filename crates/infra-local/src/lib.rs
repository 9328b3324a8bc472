// Brood Infrastructure - Local-Host Adapters
// Implements: Spawner (process), ResultsDirResolver, SettingsProvider

pub mod process_spawner;
pub mod results_dir;
pub mod settings_loader;

pub use process_spawner::ProcessSpawner;
pub use results_dir::FsResultsDirs;
pub use settings_loader::FileSettings;

pub mod layers;

mod builder;
mod config;
mod manager;
mod merge;

pub use builder::ConfigBuilder;
pub use config::RootCampConfig;
pub use manager::ConfigManager;
pub use merge::merge_toml_values;

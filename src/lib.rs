pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod parser;
pub mod schema;
pub mod transform;
pub mod ui;
pub mod writer;

pub use cli::{Cli, Commands, LoadArgs};
pub use config::{LoadConfig, TableMode};
pub use error::LoadError;
pub use loader::{load_file, LoadDriver, LoadReport, LoadState, TableReport};
pub use parser::SourceFrame;
pub use ui::{LogUi, Phase, SilentUi, Ui, UiApp};

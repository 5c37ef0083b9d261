pub mod directory;
pub mod settings;

pub use directory::{Directory, DIRECTORY_ENV_KEYS};
pub use settings::BotSettings;

// Avatar Composer: incremental avatar composition for content-server wearables
// Resolve, diff, load, commit

pub mod utils;
pub mod config;
pub mod content;
pub mod catalog;
pub mod scene;
pub mod assets;
pub mod avatar;

// Re-export commonly used types for convenience
pub use avatar::{
    AvatarError, AvatarOrchestrator, AvatarRequest, AvatarResult, AvatarSlot, LoadReport,
};
pub use catalog::{BodyShape, EntityCatalog, EntityDefinition};
pub use config::{ComposerSettings, PerformanceProfile};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

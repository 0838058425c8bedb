pub mod component;
pub mod config;

pub use component::{ComponentKind, SizeToken};
pub use config::AppConfig;

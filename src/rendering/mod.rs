pub mod normalize;
pub mod static_markup;

pub use normalize::{normalize, normalize_default, DEFAULT_TARGET_SIZE};
pub use static_markup::StaticRenderer;

pub mod browser;
pub mod preview;
pub mod rate_limit;

pub use browser::BrowserSession;
pub use preview::PreviewBundle;
pub use rate_limit::{rate_limit_middleware, RateLimiter};

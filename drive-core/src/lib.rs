pub mod account;
pub mod clock;
pub mod repository;
pub mod upstream;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use repository::SessionStore;
pub use upstream::{HttpMethod, Upstream, UpstreamReply, UpstreamRequest};
pub use validation::FieldError;

/// Error type returned by the async seams (stores, upstream transport).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

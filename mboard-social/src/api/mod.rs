//! HTTP API handlers for mboard-social

pub mod boards;
pub mod health;
pub mod identity;
pub mod json;
pub mod listen_later;
pub mod lists;
pub mod profiles;
pub mod ratings;
pub mod reviews;

pub use boards::board_routes;
pub use health::health_routes;
pub use identity::{CurrentUser, MaybeUser, USER_ID_HEADER};
pub use json::ApiJson;
pub use listen_later::listen_later_routes;
pub use lists::list_routes;
pub use profiles::profile_routes;
pub use ratings::rating_routes;
pub use reviews::review_routes;

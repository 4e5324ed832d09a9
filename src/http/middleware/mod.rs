//! Request middleware.

pub mod redirects;

pub use redirects::{redirect_middleware, RedirectState};

pub(crate) mod base_url;
pub(crate) mod handler;
pub mod matchers;
pub(crate) mod state;

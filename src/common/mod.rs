pub(crate) mod data;
pub(crate) mod error;
pub mod util;

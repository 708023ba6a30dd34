pub(crate) mod navigator;
pub mod persist;

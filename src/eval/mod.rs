pub(crate) mod actions;
pub(crate) mod cache;
pub(crate) mod resolver;
pub(crate) mod state;

//! HTTP request handlers.

pub(crate) mod home;
pub(crate) mod not_found;
pub(crate) mod view;

pub(crate) mod auth;
pub(crate) mod cors;
pub(crate) mod csrf;
pub(crate) mod trace;

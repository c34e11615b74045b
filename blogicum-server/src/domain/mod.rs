pub(crate) mod category;
pub(crate) mod comment;
pub(crate) mod error;
pub(crate) mod identity;
pub(crate) mod location;
pub(crate) mod post;
pub(crate) mod publication;
pub(crate) mod rules;
pub(crate) mod user;

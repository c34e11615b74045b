pub(crate) mod auth_service;
pub(crate) mod blog_service;
pub(crate) mod catalog_service;
pub(crate) mod profile_service;

#[cfg(test)]
pub(crate) mod in_memory;

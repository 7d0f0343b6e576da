pub mod auth;
pub mod blog;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod posts;
pub mod render;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

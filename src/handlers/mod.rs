pub mod posts;
pub mod user;

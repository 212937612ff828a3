pub mod auth;
pub mod feed;
pub mod likes;
pub mod posts;
pub mod user;

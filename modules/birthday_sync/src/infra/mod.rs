pub mod auth;
pub mod clock;
pub mod http;
pub mod people;
pub mod photos;
pub mod render;
pub mod storage;

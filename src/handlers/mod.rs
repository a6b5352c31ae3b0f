pub mod helpers;
pub mod pages;
pub mod sse;
pub mod users;

pub mod file;
pub mod post;

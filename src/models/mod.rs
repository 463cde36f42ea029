pub mod category;
pub mod error;
pub mod image;
pub mod news;
pub mod response;

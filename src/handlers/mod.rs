pub mod categories;
pub mod images;
pub mod news;

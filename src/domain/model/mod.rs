pub mod book;
pub mod catalog;
pub mod form;
pub mod id;

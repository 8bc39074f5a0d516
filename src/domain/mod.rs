pub mod error;
pub mod grouping;
pub mod model;
pub mod recommend;
pub mod repository;

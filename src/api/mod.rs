pub mod ask;
pub mod catalog;
pub mod recommend;

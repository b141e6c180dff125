pub mod blocks;
pub mod catalog;
pub mod edit;
pub mod misc;
pub mod projects;
pub mod session;
pub mod transfer;

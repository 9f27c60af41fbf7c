pub mod config;
pub mod models;
pub mod utils;
pub mod storage;
pub mod search;
pub mod civil;

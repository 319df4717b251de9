#![forbid(unsafe_code)]

pub mod bundle;
pub mod repository;
pub mod sqlite;

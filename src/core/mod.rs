//! Core, platform independent networking code.

pub mod dev;
pub mod dump;
pub mod repr;
pub mod service;
pub mod source;
pub mod storage;

// src/lib.rs

//! Thread Digest Library
//!
//! Collects course discussion threads, archives their attachments and
//! classifies their content.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

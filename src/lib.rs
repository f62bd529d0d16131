// src/lib.rs

//! Meeting Workbook Crawler Library
//!
//! Walks the year index → month index → week page hierarchy of the
//! publication site and extracts the weekly meeting schedule.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

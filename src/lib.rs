#![deny(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(
    clippy::multiple_crate_versions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn
)]
#![cfg_attr(test, allow(clippy::float_cmp))]

pub mod app;
pub mod cli;
pub mod config;
pub mod form;
pub mod geo;
pub mod map;
pub mod render;
pub mod storage;
pub mod types;
pub mod utils;
pub mod validate;

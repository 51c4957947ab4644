//! Browser front end for a document, folder and file manager.
//!
//! The client logic in [`core`], [`api`] and [`stores`] is generic over a
//! [`Transport`](core::http::Transport); the browser build plugs in
//! `fetch`, tests plug in an in-memory mock.

pub mod api;
pub mod app;
pub mod components;
pub mod config;
pub mod core;
pub mod models;
pub mod stores;
pub mod utils;

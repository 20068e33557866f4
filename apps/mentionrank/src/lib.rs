//! # mentionrank
//!
//! Host process for the mentionrank ranking engine.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 apps/mentionrank (THE HOST)              │
//! │                                                          │
//! │  ┌──────────┐    ┌──────────┐    ┌──────────────────┐    │
//! │  │   CLI    │    │ HTTP API │    │  RankingService  │    │
//! │  │  (clap)  │    │  (axum)  │    │  (tokio driver)  │    │
//! │  └────┬─────┘    └────┬─────┘    └────────┬─────────┘    │
//! │       └───────────────┼───────────────────┘              │
//! │                       ▼                                  │
//! │              ┌──────────────────┐                        │
//! │              │ mentionrank-core │                        │
//! │              └──────────────────┘                        │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod service;
pub mod storage;

//! # newsdesk
//!
//! Paging, filtering and rendering for a news feed API.
//!
//! ## Architecture
//!
//! 1. **Controller** ([`controller`]): paging state, one fetch at a time,
//!    generation-checked responses
//! 2. **Pipeline** ([`pipeline`]): filtering, card truncation, summary line
//! 3. **Outputs** ([`outputs`]): render targets (terminal, capture, JSON)
//! 4. **Session** ([`session`]): the command loop driving the two above
//!
//! The controller reaches the network only through [`api::NewsSource`], and
//! the pipeline reaches the screen only through [`outputs::RenderTarget`],
//! so both can be driven without a server or a terminal.

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod session;
pub mod utils;

#[cfg(test)]
mod test_support;

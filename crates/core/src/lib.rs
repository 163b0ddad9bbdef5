//! Core library for nutriai
//!
//! This crate implements the **Functional Core** of the nutriai client,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The nutriai project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`nutriai_core`** (this crate): Pure transformation functions with zero I/O
//! - **`nutriai`**: HTTP transport, timers, and terminal rendering (the Imperative Shell)
//!
//! Everything that decides *what* to ask the nutrition service and *how* to
//! interpret the answer lives here. The shell only sends the [`request::ApiRequest`]
//! values built in this crate and feeds the responses back in.
//!
//! # Module Organization
//!
//! - [`food`]: API record ↔ normalized [`food::Food`] mapping
//! - [`analysis`]: daily-value percentages, calorie breakdown, badges
//! - [`filters`]: nutrient range filters with min/max validation
//! - [`request`]: request shapes for every endpoint
//! - [`error`]: structured API errors and user-facing messages
//! - [`pagination`]: page cursor for "load more" listings
//! - [`fetch`]: results state machine with stale-response protection
//! - [`recipe`]: ingredient selection, recipe merging and local fallback
//! - [`chat`]: `/ask` answers and the chat transcript
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use nutriai_core::fetch::{ResultsView, SearchQuery};
//! use nutriai_core::food::map_remote_foods;
//!
//! let mut view = ResultsView::default();
//! let ticket = view.begin_query(&SearchQuery::default())?;
//!
//! // The shell sends `ticket.request` and hands back the body
//! let foods = map_remote_foods(Some(body))?;
//! view.complete(&ticket, Ok(foods));
//!
//! assert_eq!(view.cursor.page, 1);
//! ```

pub mod analysis;
pub mod chat;
pub mod error;
pub mod fetch;
pub mod filters;
pub mod food;
pub mod pagination;
pub mod recipe;
pub mod request;

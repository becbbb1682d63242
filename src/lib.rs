//! # Editorial Insights
//!
//! Read-only content analytics and editorial-audit abilities for AI
//! assistants.
//!
//! Four abilities surface what a site's readers engage with and which
//! content needs attention:
//!
//! | Ability | Data source | Cached |
//! |---------|-------------|--------|
//! | `editorial-insights/get-top-posts` | analytics + content | yes |
//! | `editorial-insights/get-search-terms` | analytics | yes |
//! | `editorial-insights/get-stale-drafts` | content | no |
//! | `editorial-insights/get-underperforming-posts` | content + per-post views | per post |
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  ┌──────────────┐  ┌──────────┐
//! │ Content Store│  │  Analytics   │  │  Cache   │
//! │   (SQLite)   │  │ (HTTP stats) │  │ mem/SQL  │
//! └──────┬───────┘  └──────┬───────┘  └────┬─────┘
//!        └─────────────────┼───────────────┘
//!                          ▼
//!                  ┌───────────────┐
//!                  │InsightsContext│
//!                  └───────┬───────┘
//!                          ▼
//!                  ┌───────────────┐
//!                  │AbilityRegistry│
//!                  └───────┬───────┘
//!          ┌───────────────┼───────────────┐
//!          ▼               ▼               ▼
//!     ┌─────────┐    ┌──────────┐    ┌──────────┐
//!     │   CLI   │    │ HTTP API │    │   MCP    │
//!     └─────────┘    └──────────┘    └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! insights init                          # create database
//! insights status                        # check analytics connection
//! insights call get-stale-drafts --param days_old=90
//! insights serve                         # start HTTP + MCP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Post records and ability outputs |
//! | [`content`] | Content store trait and query types |
//! | [`sqlite_content`] | SQLite content store |
//! | [`analytics`] | Analytics source trait, HTTP client, normalization |
//! | [`cache`] | Result cache trait and backends |
//! | [`context`] | Shared application context |
//! | [`abilities`] | The four built-in abilities |
//! | [`traits`] | Ability trait and registry |
//! | [`schema`] | Input validation |
//! | [`auth`] | Caller identity and capability checks |
//! | [`server`] | HTTP server |
//! | [`mcp`] | MCP protocol bridge |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod abilities;
pub mod analytics;
pub mod auth;
pub mod cache;
pub mod call;
pub mod config;
pub mod content;
pub mod context;
pub mod db;
pub mod error;
pub mod mcp;
pub mod migrate;
pub mod models;
pub mod schema;
pub mod server;
pub mod sqlite_content;
pub mod status;
pub mod text;
pub mod timestamps;
pub mod traits;

//! # gym-index-sync
//!
//! Search-index synchronization and seeding tools for the gym-management
//! services.
//!
//! Each run pulls the authoritative records (activities, subscription
//! plans) from a system of record, maps them to flat search documents with
//! stable `{type}_{id}` identifiers, and posts them one by one to the search
//! API. Seeding commands create the administrator account and the default
//! plan catalog.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌───────────┐   ┌─────────────────┐
//! │ Sources          │──▶│ Transform │──▶│ Search API      │
//! │ activities/plans │   │ per kind  │   │ POST /search/.. │
//! │ HTTP / mongosh   │   └───────────┘   └─────────────────┘
//! └──────────────────┘
//!
//! ┌──────────────┐        ┌─────────────────┐
//! │ seed admin   │───────▶│ usuarios (SQL)  │
//! └──────────────┘        └─────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! gymsync sources                 # show where records come from
//! gymsync sync activities         # index activities
//! gymsync sync all --dry-run      # fetch + transform, submit nothing
//! gymsync seed admin              # upsert the administrator account
//! gymsync seed plans              # create the plan catalog and index it
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration with local defaults |
//! | [`models`] | Records, documents, tallies |
//! | [`transform`] | Record → document mapping |
//! | [`traits`] | Source and sink seams |
//! | [`source_http`] | HTTP collection listings |
//! | [`source_command`] | Document-store export via shell command |
//! | [`index_client`] | Search API indexing client |
//! | [`sync`] | Fetch/transform/load pipeline |
//! | [`plans`] | Plan catalog seeding |
//! | [`admin`] | Administrator seeding |
//! | [`db`] | User store connection |
//! | [`migrate`] | Local user table setup |

pub mod admin;
pub mod config;
pub mod db;
pub mod index_client;
pub mod migrate;
pub mod models;
pub mod plans;
pub mod source_command;
pub mod source_http;
pub mod sources;
pub mod sync;
pub mod traits;
pub mod transform;

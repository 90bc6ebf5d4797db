//! Formsmith: a terminal builder for reusable form templates.
//!
//! The builder composes a [`schema::FormSchema`] out of typed fields,
//! reorders them through the [`drag`] state machine, edits field
//! properties through the [`inspector`], and persists the result as a
//! template via the [`repository`]. Persisted templates can later be
//! rendered read-only ([`render`]) or filled out as a validated form
//! instance ([`fill`]).

pub mod builder;
pub mod drag;
pub mod error;
pub mod fill;
pub mod inspector;
pub mod render;
pub mod repository;
pub mod schema;
pub mod tui;

//! UK train timetable server.
//!
//! A web service that answers: "travelling through these stations in
//! order, starting no earlier than this time, when do I arrive?"
//! Timetables come from TransportAPI one leg at a time and are kept
//! permanently in SQLite, so each station pair is fetched at most once
//! per waiting window.

pub mod cache;
pub mod config;
pub mod domain;
pub mod planner;
pub mod store;
pub mod transportapi;
pub mod web;

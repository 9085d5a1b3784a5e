//! Catchup - one-to-one check-ins with a synchronized reveal.
//!
//! A manager and an employee each privately rate a fixed list of categories
//! before meeting. In the session their ratings are revealed one category at
//! a time, employee first, so neither side anchors the other. Completed
//! sessions are stored and aggregated into per-relationship history and
//! per-category trends, and can be exported as a Markdown or HTML report.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

//! Data models for the Olympic medal dataset.
//!
//! - `OlympicCountry`: one national delegation and its full history
//! - `Participation`: one appearance of a delegation at one Games edition
//! - `Season`: Summer or Winter Games

pub mod olympic;

pub use olympic::{OlympicCountry, Participation, Season};

//! Step resolution and cycle progression for IUI and IVF treatments.
//!
//! The clinic records API owns treatments, cycles, consent agreements and
//! lab samples. This crate reads them through [`ports`], works out which
//! protocol step a treatment is on ([`domain::workflow`]) and drives cycle
//! start, completion and cancellation back through the same API
//! ([`application`]).

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

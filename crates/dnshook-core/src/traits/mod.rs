//! Core traits for dnshook
//!
//! This module defines the capability interfaces the core consumes.
//!
//! - [`DnsProvider`]: zone listing and record CRUD against the provider API
//! - [`SoaResolver`]: SOA queries used to find a hostname's zone apex

pub mod dns_provider;
pub mod soa_resolver;

pub use dns_provider::{DnsProvider, RecordPage, WriteResponse, ZoneEntry, ZonePage};
pub use soa_resolver::{SoaOutcome, SoaResolver};

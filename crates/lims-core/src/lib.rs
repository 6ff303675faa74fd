//! Entity store, credentials and configuration for the LIMS dispatch server.
//!
//! This crate holds everything the dispatcher reads or mutates but that
//! has no knowledge of the transport:
//!
//! # Modules
//!
//! - [`store`] -- [`EntityStore`], the in-memory sample and equipment
//!   collections with their monotonic id counters and dashboard
//!   aggregation.
//! - [`auth`] -- [`CredentialVerifier`] trait and the single-pair
//!   [`StaticCredentials`] implementation.
//! - [`config`] -- Configuration loading from `lims-config.yaml` into
//!   strongly-typed structs.
//! - [`seed`] -- Demo records inserted at startup.
//!
//! [`EntityStore`]: store::EntityStore
//! [`CredentialVerifier`]: auth::CredentialVerifier
//! [`StaticCredentials`]: auth::StaticCredentials

pub mod auth;
pub mod config;
pub mod seed;
pub mod store;

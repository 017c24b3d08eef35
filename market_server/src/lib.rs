//! # Marketplace matcher server
//! This crate hosts the HTTP surface for the marketplace matcher. It is responsible for:
//! * Receiving new listings from the posting flow and scanning them for matches.
//! * Serving matches, previews, conversations and notifications to the front end.
//! * A terminal `watch` mode that follows one user's notification feed, for operators and local testing.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/webhook/listing_created`: Ingests a listing created by the posting flow and scans it for matches.
//! * `/scan/{user_id}`, `/matches/{user_id}`, `/preview/{user_id}`: Match discovery for a user.
//! * `/conversations`, `/conversations/{user_id}`, `/conversations/{id}/messages`: Conversations between the parties to
//!   a match.
//! * `/notifications/{user_id}`, `/notifications/{user_id}/{id}/read`: The user's notifications.
//!
//! There is no authentication. Callers are expected to be trusted services behind a gateway.

pub mod alerts;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;
pub mod watch;

#[cfg(test)]
mod endpoint_tests;

//! Value types shared between the marketplace engine and server.
mod price;

pub mod helpers;
pub mod op;

pub use price::{Price, PriceParseError};

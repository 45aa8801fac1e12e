//! Business discovery: Google Places search and the industry catalog.

pub mod client;
pub mod error;
pub mod industries;

pub use client::PlacesClient;
pub use error::PlacesError;
pub use industries::top_industries;

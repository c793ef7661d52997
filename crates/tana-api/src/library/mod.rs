pub mod client;
pub mod error;

pub use client::LibraryClient;
pub use error::LibraryError;

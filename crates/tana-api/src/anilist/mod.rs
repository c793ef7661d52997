pub mod client;
pub mod covers;
pub mod error;
pub mod types;

pub use client::AniListClient;
pub use error::AniListError;

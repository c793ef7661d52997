pub mod anilist;
pub mod library;
pub mod links;

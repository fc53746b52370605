//! Implementations of [`crate::traits::BookingSite`]

pub mod replay;

pub use replay::ReplaySite;

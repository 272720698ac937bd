//! Integration test crate for ImaVid.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on every imavid library crate to verify they work together.

#[cfg(test)]
mod support;

#[cfg(test)]
mod video;

#[cfg(test)]
mod image;

#[cfg(test)]
mod script;

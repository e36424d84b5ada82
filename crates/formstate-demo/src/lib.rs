//! Demo application for the formstate tracking model.
//!
//! Runs a scripted contact-book editing session over an in-memory store:
//! load, edit, save, discard, delete, and a batch save with optional
//! failure injection, reporting gate states along the way.

pub mod logging;
pub mod session;

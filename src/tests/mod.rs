//! # Scenario Tests
//!
//! End-to-end runs of the controller with the terminal collaborators and the
//! frame renderer, driven by the same line commands the binary reads.

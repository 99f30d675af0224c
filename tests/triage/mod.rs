//! Integration tests for the detection pipeline.
//!
//! These tests validate detection end-to-end over synthesized artifacts and
//! focus on integration between components rather than isolated units.

mod classifier;
mod msi_scan;
mod msix;
mod pe;
mod signatures;

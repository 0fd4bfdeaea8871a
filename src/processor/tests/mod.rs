//! Integration tests for the processor module
//!
//! Tests the complete merge pipeline using shapefiles written into
//! temporary directories.

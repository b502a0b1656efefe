//! Tests for the built-in file loaders.
//!
//! Fixtures are written to temporary directories so every test works on a
//! real file, the way the registry sees it.

mod envi_tests;

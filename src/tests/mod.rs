//! Crate-level serialization tests

mod walk_tests;

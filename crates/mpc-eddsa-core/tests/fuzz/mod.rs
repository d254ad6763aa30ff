//! Property-based tests

mod commitment_fuzz;

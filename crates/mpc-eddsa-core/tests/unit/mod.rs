//! Unit tests for the ceremony engine

mod engine_test;

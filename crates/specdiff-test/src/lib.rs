//! Test harness for the `specdiff` binary.
//!
//! The tests live in [`cli`] and drive the built binary against the shared
//! fixtures under `tests/fixtures/`.

#[cfg(test)]
pub mod cli;

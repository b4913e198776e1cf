//! Test-only crate. The integration tests live under `tests/` and pull
//! every dependency through `[dev-dependencies]`; shared fixtures are in
//! `tests/helpers/mod.rs`.

//! Benchmarks for the `quark` crate live under `benches/`.

#[path = "e2e/genesis_to_number.rs"]
mod genesis_to_number;

#[path = "e2e/full_pipeline.rs"]
mod full_pipeline;

#[path = "e2e/determinism.rs"]
mod determinism;

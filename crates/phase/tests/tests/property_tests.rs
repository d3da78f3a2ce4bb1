#[path = "property/evolution.rs"]
mod evolution;

#[path = "property/normalize.rs"]
mod normalize;

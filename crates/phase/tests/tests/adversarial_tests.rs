#[path = "adversarial/stage_ordering.rs"]
mod stage_ordering;

#[path = "adversarial/tamper_marks.rs"]
mod tamper_marks;

#[path = "adversarial/forge_proofs.rs"]
mod forge_proofs;

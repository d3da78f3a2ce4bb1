#![deny(unsafe_code)]
//! Phase engine demo binary.
//!
//! Runs the whole lifecycle in-process:
//! 1. Genesis state creation
//! 2. Axiom-driven evolution to `number`
//! 3. Φ normalize, Ψ seal, Ω compact
//! 4. Independent verification of every artifact
//!
//! Logging goes through `tracing`; set `RUST_LOG=debug` to see every axiom
//! firing and rule stage.

use clap::{Parser, ValueEnum};
use maple_phase_invariants::verify_all_witnesses;
use maple_phase_lattice::{
    AxiomEngine, Blake3Strategy, EvolutionConfig, Fnv1a32, GenesisState, HashStrategy,
};
use maple_phase_pipeline::{
    verify_compact_proof, verify_pipeline, verify_seal_proof, Pipeline, RuleEngine,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "maple-phase-demo", about = "Evolve, seal and compact a genesis state")]
#[command(version)]
struct Cli {
    /// Energy applied at every evolution step
    #[arg(long, default_value_t = 0.3)]
    energy: f64,

    /// Evolution step cap
    #[arg(long, default_value_t = 100)]
    max_steps: usize,

    /// Built-in configuration preset
    #[arg(long, value_enum, default_value_t = Preset::Default)]
    preset: Preset,

    /// JSON configuration file; overrides --preset
    #[arg(long)]
    config: Option<PathBuf>,

    /// Hash strategy for witnesses, marks and proofs
    #[arg(long, value_enum, default_value_t = HashChoice::Fnv1a32)]
    hash: HashChoice,

    /// Print the compacted pipeline as JSON at the end
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Default,
    Fast,
    Conservative,
}

#[derive(Clone, Copy, ValueEnum)]
enum HashChoice {
    Fnv1a32,
    Blake3,
}

// ── Formatting Helpers ──────────────────────────────────────────────────

fn section(title: &str) {
    println!();
    println!(" ── {} {}", title, "─".repeat(56usize.saturating_sub(title.len())));
}

fn ok(msg: &str) {
    println!("   [OK]  {}", msg);
}

fn note(msg: &str) {
    println!("   [--]  {}", msg);
}

fn fail(msg: &str) {
    println!("   [!!]  {}", msg);
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!();
        eprintln!("   [FATAL]  Demo failed: {}", e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<EvolutionConfig, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.config {
        let doc = std::fs::read_to_string(path)?;
        return Ok(EvolutionConfig::from_json(&doc)?);
    }
    Ok(match cli.preset {
        Preset::Default => EvolutionConfig::default(),
        Preset::Fast => EvolutionConfig::fast(),
        Preset::Conservative => EvolutionConfig::conservative(),
    })
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let hasher: Arc<dyn HashStrategy> = match cli.hash {
        HashChoice::Fnv1a32 => Arc::new(Fnv1a32),
        HashChoice::Blake3 => Arc::new(Blake3Strategy),
    };
    let axioms = AxiomEngine::new(load_config(cli)?)?.with_hash_strategy(hasher.clone());
    let rules = RuleEngine::from_axiom_engine(&axioms);

    // ── Genesis ─────────────────────────────────────────────────────
    section("Genesis");
    let genesis = axioms.genesis();
    print_state(&genesis);
    note(&format!("hash strategy: {}", hasher.algorithm()));

    // ── Evolution ───────────────────────────────────────────────────
    section(&format!("Evolution  (energy {}, cap {})", cli.energy, cli.max_steps));
    let mut state = genesis;
    for _ in 0..cli.max_steps {
        if state.is_terminal() {
            break;
        }
        state = axioms.evolve_checked(&state, cli.energy)?;
    }
    for t in &state.history {
        ok(&format!(
            "tick {:>3}  {:<9} → {:<9}  {:<20} witness {}",
            t.tick,
            t.from.as_str(),
            t.to.as_str(),
            t.axiom.to_string(),
            t.witness.hash
        ));
    }
    if state.is_terminal() {
        ok(&format!("reached {} after {} steps", state.phase, state.tick));
    } else {
        fail(&format!("stopped at {} after {} steps", state.phase, state.tick));
    }
    let audit = verify_all_witnesses(hasher.as_ref(), &state);
    note(&format!(
        "witness audit: {}/{} checks passed",
        audit.checks_passed, audit.checks_performed
    ));

    // ── Pipeline ────────────────────────────────────────────────────
    section("Pipeline  Φ → Ψ → Ω");
    let open = rules.normalize(&rules.open(state))?;
    ok(&format!("Φ normalized to {} decimals", rules.normalize_decimals()));
    let sealed = rules.seal(&open)?;
    ok(&format!("Ψ sealed       proof {}", sealed.seal_proof().hash));
    let compacted = rules.compact(&sealed)?;
    ok(&format!("Ω compacted    proof {}", compacted.compact_proof().hash));

    let proof = compacted.compact_proof();
    note(&format!("progression      : {}", proof.phase_progression));
    note(&format!("transitions      : {}", proof.genesis_transitions));
    note(&format!("steps compacted  : {}", proof.steps_compacted));
    note(&format!("CS held          : {}", proof.all_cs_held));
    note(&format!("original → final : {} → {}", proof.original_hash, proof.final_hash));

    // ── Verification ────────────────────────────────────────────────
    section("Verification");
    let checks = [
        (
            "seal proof",
            verify_seal_proof(hasher.as_ref(), compacted.seal_proof(), compacted.current()),
        ),
        ("compact proof", verify_compact_proof(hasher.as_ref(), proof)),
        (
            "whole pipeline",
            verify_pipeline(hasher.as_ref(), &Pipeline::from(compacted.clone())),
        ),
    ];
    for (name, result) in &checks {
        let line = format!(
            "{:<15} {}/{} checks passed",
            name, result.checks_passed, result.checks_performed
        );
        if result.valid {
            ok(&line);
        } else {
            fail(&line);
            for e in &result.errors {
                fail(&format!("  {}", e));
            }
        }
    }
    info!(
        valid = checks.iter().all(|(_, r)| r.valid),
        proof = %proof.hash,
        "Demo finished"
    );

    if cli.json {
        println!();
        println!("{}", serde_json::to_string_pretty(&Pipeline::from(compacted))?);
    }
    Ok(())
}

fn print_state(state: &GenesisState) {
    note(&format!("phase     : {}", state.phase));
    note(&format!("curvature : {:.4}", state.curvature));
    note(&format!("entropy   : {:.4}", state.entropy));
    note(&format!("structure : {:.4}", state.structure));
    note(&format!("tick      : {}", state.tick));
}

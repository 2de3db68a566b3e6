//! Driftfield Quickstart — a complete, minimal host loop from scratch.
//!
//! Demonstrates:
//!   1. Building `Parameters` and a `Driver`
//!   2. Stepping and reading back the signature/trend diagnostics
//!   3. Injecting a perturbation
//!   4. Printing an ASCII heat map of the final field
//!   5. Resetting and verifying
//!
//! Run with:
//!   cargo run --bin driftfield-cli

use driftfield::prelude::*;

const GRID_SIZE: u32 = 64;
const WARMUP_STEPS: u64 = 50;
const COOLDOWN_STEPS: u64 = 20;

fn main() {
    tracing_subscriber::fmt::init();

    println!("=== Driftfield Quickstart ===\n");

    let params = Parameters {
        grid_size: GRID_SIZE,
        ..Parameters::default()
    };
    let mut driver = Driver::new(params, 42);
    driver.start();
    println!("Driver created. Seed: {}, mode: {}\n", driver.seed(), driver.mode());

    println!("Running warmup ({WARMUP_STEPS} steps)...");
    for _ in 0..WARMUP_STEPS {
        let diagnostics = driver.step_once().clone();
        if diagnostics.step_us > 0 && driver.current_step().is_multiple_of(10) {
            let signature = driver.signature();
            println!(
                "  step {:>3}: coherence={:.3}, basins={}, stable_metric={:.3}, step_us={}",
                driver.current_step(),
                signature.coherence,
                signature.basin_count,
                signature.stability_metric,
                diagnostics.step_us,
            );
        }
    }

    println!("\nInjecting an impulse at the grid centre...");
    let centre = (GRID_SIZE / 2) as i32;
    driver.perturb(
        centre,
        centre,
        PerturbationParams::Impulse(ImpulseParams {
            intensity: 0.8,
            radius: 6.0,
            decay: 1.0,
        }),
    );
    driver.step_once();
    println!("  step {:>3}: impulse applied", driver.current_step());

    println!("\nRunning cooldown ({COOLDOWN_STEPS} steps)...");
    for _ in 0..COOLDOWN_STEPS {
        driver.step_once();
    }

    let field = driver.field();
    println!("\nFinal field (step {}):", driver.current_step());
    let stride = (GRID_SIZE / 32).max(1) as usize;
    for y in (0..GRID_SIZE as i32).step_by(stride) {
        let row: String = (0..GRID_SIZE as i32)
            .step_by(stride)
            .map(|x| {
                let v = field.get(x, y);
                match v {
                    v if v >= 0.5 => '#',
                    v if v >= 0.1 => '+',
                    v if v <= -0.5 => '@',
                    v if v <= -0.1 => '-',
                    _ => '.',
                }
            })
            .collect();
        println!("  {row}");
    }

    let report = driver.run_determinism_check(50);
    println!(
        "\nDeterminism check over 50 steps: deterministic={}, pixel_difference={}",
        report.is_deterministic, report.pixel_difference
    );

    driver.reset(123);
    println!("\nReset to seed 123, step: {}", driver.current_step());

    println!("Done.");
}

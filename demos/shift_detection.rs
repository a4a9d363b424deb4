//! Shift Detection Demo
//!
//! Feeds a synthetic regime-switching stream through the adaptive mean
//! estimator and compares the pruned window against the same window with
//! the change test disabled.
//!
//! Run with: cargo run --example shift_detection

use adaptive_mean::AdaptiveMean;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> anyhow::Result<()> {
    // Surface the estimator's debug events (cut index, dropped counts).
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    println!("=== Distribution Shift Detection Demo ===\n");

    let mut rng = StdRng::seed_from_u64(42);

    // Three regimes: calm around 0, a jump to 4, then back down to 1.
    let regimes = [(0.0, 0.5, 3000usize), (4.0, 0.5, 3000), (1.0, 0.5, 3000)];
    let mut stream: Vec<f64> = Vec::new();
    for &(mu, sd, len) in &regimes {
        let dist = Normal::new(mu, sd).unwrap();
        stream.extend((0..len).map(|_| dist.sample(&mut rng)));
    }

    println!(
        "Generated {} samples across {} regimes\n",
        stream.len(),
        regimes.len()
    );

    // === Adaptive estimation ===
    println!("=== Adaptive Window ===\n");

    let mut estimator = AdaptiveMean::new(0.002)?.with_on_shift(|est| {
        println!(
            "  shift: window now {} observations, mean {:.3}",
            est.nobs(),
            est.mean()
        );
    });

    let mut shift_points: Vec<usize> = Vec::new();
    for (i, &x) in stream.iter().enumerate() {
        if estimator.fit(x)? {
            shift_points.push(i);
        }
    }

    println!("\nAdaptive Summary:");
    println!("  Total shifts: {}", estimator.shifts());
    println!("  Shift indices: {:?}", shift_points);
    println!(
        "  Live window: {} of {} samples",
        estimator.nobs(),
        stream.len()
    );
    println!("  Dropped: {}", estimator.dropped());
    println!("  Final mean: {:.4}", estimator.mean());
    println!("  Final variance: {:.4}", estimator.variance());

    // === Same pipeline, change test disabled ===
    println!("\n=== Without Dropping ===\n");

    let mut frozen = AdaptiveMean::new(0.002)?;
    {
        let mut handle = frozen.without_dropping();
        for &x in &stream {
            handle.fit(x)?;
        }
    }

    println!("  Window: {} samples (nothing pruned)", frozen.nobs());
    println!("  Mean over all regimes: {:.4}", frozen.mean());

    // === Comparison ===
    println!("\n=== Comparison ===\n");
    println!(
        "  adaptive mean {:.4} vs unpruned mean {:.4} (last regime centered on {:.1})",
        estimator.mean(),
        frozen.mean(),
        regimes.last().unwrap().0
    );

    Ok(())
}

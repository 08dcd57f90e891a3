use anyhow::Result;
use bayesnet::{Classifier, ContinuousDataset, ModelConfig, TrainingSet};
use clap::Parser;
use colored::Colorize;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sample counts to benchmark (comma-separated)
    #[arg(long, default_value = "200,1000,5000")]
    sample_counts: String,

    /// Number of continuous features
    #[arg(long, default_value_t = 6)]
    features: usize,

    /// Number of classes
    #[arg(long, default_value_t = 3)]
    classes: usize,

    /// Models to run, as JSON configurations separated by ';'
    #[arg(
        long,
        default_value = r#"{"model":"kdb"};{"model":"kdb_ld"};{"model":"tan"};{"model":"spode"};{"model":"aode"};{"model":"aode_ld"}"#
    )]
    models: String,

    #[arg(long, default_value_t = 17)]
    seed: u64,
}

/// Every feature is the class index scaled by a per-feature offset plus
/// uniform noise, so each one carries some class information.
fn synthetic_dataset(n_samples: usize, n_features: usize, n_classes: usize, seed: u64) -> Result<ContinuousDataset> {
    let mut rng = StdRng::seed_from_u64(seed);
    let labels: Array1<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_classes)).collect();
    let offsets: Vec<f64> = (0..n_features).map(|_| rng.gen_range(0.5..2.0)).collect();
    let samples = Array2::from_shape_fn((n_samples, n_features), |(i, j)| {
        labels[i] as f64 * offsets[j] + rng.r#gen::<f64>() * 1.5
    });
    let features = (0..n_features).map(|j| format!("x{}", j)).collect();
    Ok(ContinuousDataset::new(samples, labels, features, "class")?)
}

fn benchmark_sample_count(args: &Args, configs: &[ModelConfig], n_samples: usize) -> Result<()> {
    println!("\n========== BENCHMARKING WITH {} SAMPLES ==========", n_samples);
    let data = synthetic_dataset(n_samples, args.features, args.classes, args.seed)?;
    let (train, test) = data.train_test_split(0.3, args.seed);

    for config in configs {
        let mut model = config.build()?;
        let start = Instant::now();
        if let Err(e) = model.fit(&train) {
            println!("{:<8} {}", model.name(), format!("failed: {}", e).red());
            continue;
        }
        let elapsed = start.elapsed();
        let accuracy = model.score(test.samples(), test.labels())?;
        let summary = model.describe();
        println!(
            "{:<8} fit {:>8.3}s  accuracy {}  edges {:>4}  cpt cells {:>8}",
            model.name(),
            elapsed.as_secs_f64(),
            format!("{:.4}", accuracy).green(),
            summary.edges,
            summary.cpt_cells
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let sample_counts: Vec<usize> = args
        .sample_counts
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    if sample_counts.is_empty() {
        eprintln!("No valid sample counts provided");
        return Ok(());
    }
    let configs = args
        .models
        .split(';')
        .map(ModelConfig::from_json)
        .collect::<Result<Vec<_>, _>>()?;

    println!("=== BAYESNET MODEL BENCHMARK ===");
    println!(
        "{} features, {} classes, sample counts {:?}",
        args.features, args.classes, sample_counts
    );
    for &count in &sample_counts {
        if let Err(e) = benchmark_sample_count(&args, &configs, count) {
            eprintln!("Error benchmarking {} samples: {}", count, e);
        }
    }
    println!("\n=== BENCHMARK COMPLETE ===");
    Ok(())
}

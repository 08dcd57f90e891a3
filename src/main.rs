use anyhow::{Context, Result};
use bayesnet::common::setup::parse_configuration_options;
use bayesnet::{Classifier, ContinuousDataset, ModelConfig, TrainingSet};
use colored::Colorize;
use log::info;
use std::time::Instant;

fn main() -> Result<()> {
    let options = parse_configuration_options().context("invalid command line")?;
    let data = ContinuousDataset::from_json_file(&options.dataset)
        .with_context(|| format!("could not load dataset {}", options.dataset))?;
    let config = ModelConfig::from_parts(options.model.as_str(), &options.hyperparameters)
        .context("invalid hyperparameters")?;
    let mut model = config.build()?;

    let (train, test) = data.train_test_split(options.test_ratio, options.seed);
    info!(
        "training {} on {} samples, testing on {}",
        model.name(),
        train.n_samples(),
        test.n_samples()
    );

    let start = Instant::now();
    model
        .fit(&train)
        .with_context(|| format!("fitting {} failed", model.name()))?;
    let elapsed = start.elapsed();

    let train_accuracy = model.score(train.samples(), train.labels())?;
    println!("{} {}", "Model:".bold(), model.name());
    println!("{} {:.3}s", "Fit time:".bold(), elapsed.as_secs_f64());
    println!("{} {:.4}", "Train accuracy:".bold(), train_accuracy);
    if test.n_samples() > 0 {
        let test_accuracy = model.score(test.samples(), test.labels())?;
        println!("{} {}", "Test accuracy:".bold(), format!("{:.4}", test_accuracy).green());
    }

    let summary = model.describe();
    println!(
        "{} nodes={} edges={} states={} cpt_cells={}",
        "Summary:".bold(),
        summary.nodes,
        summary.edges,
        summary.states,
        summary.cpt_cells
    );

    if options.show_graph {
        for line in model.graph(model.name()) {
            println!("{}", line.trim_end());
        }
    }
    if options.dump_cpt {
        match model.network() {
            Some(network) => {
                for line in network.dump_cpt() {
                    println!("{}", line);
                }
            }
            None => println!("{}", "CPT dump is only available for single-network models".yellow()),
        }
    }
    Ok(())
}

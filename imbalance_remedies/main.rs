use anyhow::Result;
use imbalance_remedies::*;

use open_direction::logging::init_tracing;
use open_direction::report::{class_balance, remedy_report};

fn main() -> Result<()> {
    init_tracing("info");
    println!("Imbalance remedies - logistic regression\n");

    let config = Config::load()?;
    let dataset = load(&config)?;
    println!("{}", class_balance(&dataset.y, &dataset.label));

    let outcomes = run_all(&dataset, &config)?;
    for outcome in &outcomes {
        print!("{}", remedy_report(outcome));
        println!(
            "    Training: {} rows -> {} rows ({} / {})\n",
            outcome.n_train_before,
            outcome.n_train_after,
            outcome.train_class_counts[0],
            outcome.train_class_counts[1]
        );
    }

    let written = write_outputs(&outcomes, &config)?;
    println!("{} files written to {}", written.len(), config.output_dir.display());

    Ok(())
}

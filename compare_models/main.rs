use anyhow::Result;
use compare_models::*;

use open_direction::logging::init_tracing;
use open_direction::report::{class_balance, comparison_table, model_report};

fn main() -> Result<()> {
    init_tracing("info");
    println!("Model comparison - next-day open direction\n");

    let config = Config::load()?;
    let dataset = load(&config)?;

    println!("Rows: {}  Features: {}", dataset.len(), dataset.x.columns.join(", "));
    println!("{}", class_balance(&dataset.y, &dataset.label));

    let bundles = compare(&dataset, &config)?;
    for bundle in &bundles {
        print!("{}", model_report(bundle, &dataset.label));
    }

    println!("\nSummary:");
    println!("{}", comparison_table(&bundles));

    let written = write_outputs(&bundles, &dataset.label, &config)?;
    println!("{} files written to {}", written.len(), config.output_dir.display());

    Ok(())
}

use anyhow::Result;
use explore::*;

use open_direction::logging::init_tracing;

fn main() -> Result<()> {
    init_tracing("info");

    let (config, command) = Config::load()?;

    let written = match command {
        Command::Correlations { .. } => {
            let matrices = correlations(&config)?;
            for matrix in &matrices {
                println!("{matrix}");
                if let Some((a, b, r)) = matrix.strongest_pair() {
                    println!("Strongest pair: {a} / {b} ({r:.3})\n");
                }
            }
            write_result(&config, "correlations", &matrices)?
        }
        Command::Vif { .. } => {
            let vifs = vifs(&config)?;
            println!("{:<24} {:>10}", "Feature", "VIF");
            for vif in &vifs {
                println!("{vif}");
            }
            write_result(&config, "vif", &vifs)?
        }
        Command::Logit { .. } => {
            let terms = logit(&config)?;
            println!("{}", logit_header());
            for term in &terms {
                println!("{term}");
            }
            write_result(&config, "logit", &terms)?
        }
        Command::Tweets { .. } => {
            let counts = tweets(&config)?;
            print!("{}", frequency_table(&counts));
            if config.tweets.chart && !counts.is_empty() {
                println!("Chart:    {}", tweet_chart(&config, &counts)?.display());
            }
            write_result(&config, "tweet_words", &counts)?
        }
    };

    println!("Written:  {}", written.display());
    Ok(())
}

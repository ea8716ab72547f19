use anyhow::Result;
use prepare_master::*;

use open_direction::logging::init_tracing;

fn main() -> Result<()> {
    init_tracing("info");
    println!("Master table preparation\n");

    let config = Config::load()?;
    let table = run(&config)?;

    let (first, last) = match (table.dates.first(), table.dates.last()) {
        (Some(f), Some(l)) => (f.to_string(), l.to_string()),
        _ => (String::from("-"), String::from("-")),
    };
    println!("Indices:  {}", config.indices.join(", "));
    println!("Rows:     {}", table.len());
    println!("Columns:  {}", table.columns.len());
    println!("Range:    {first} to {last}");
    println!("Written:  {}", config.master_file.display());

    Ok(())
}

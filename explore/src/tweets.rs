use std::path::Path;

use anyhow::{Context, Result, anyhow};
use plotters::prelude::*;
use serde::Serialize;
use tracing::info;

use open_direction::text::{TweetCleaner, frequency_distribution, read_tweets};

/// One row of the frequency table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub frequency: usize,
}

/// Most frequent words of already-loaded tweets, most frequent first
pub fn word_frequencies<S: AsRef<str>>(tweets: &[S], cleaner: &TweetCleaner, top_n: usize) -> Vec<WordCount> {
    let cleaned: Vec<String> = tweets.iter().map(|t| cleaner.clean(t.as_ref())).collect();
    frequency_distribution(&cleaned, top_n)
        .into_iter()
        .map(|(word, frequency)| WordCount { word, frequency })
        .collect()
}

/// Read a tweet dump and count its words
pub fn tweet_frequencies<P: AsRef<Path>>(
    path: P,
    extra_stopwords: &[String],
    top_n: usize,
) -> Result<Vec<WordCount>> {
    let path = path.as_ref();
    let tweets = read_tweets(path)
        .with_context(|| format!("Failed to read tweets: {}", path.display()))?;
    info!(tweets = tweets.len(), "tweets loaded");

    let cleaner = TweetCleaner::new(extra_stopwords.iter().map(String::as_str));
    Ok(word_frequencies(&tweets, &cleaner, top_n))
}

/// `Words  Frequency` table with a row index, as a string
pub fn frequency_table(counts: &[WordCount]) -> String {
    let width = counts.iter().map(|c| c.word.len()).max().unwrap_or(0).max(5);
    let mut out = format!("    {:>width$}  Frequency\n", "Words");
    for (i, c) in counts.iter().enumerate() {
        out.push_str(&format!("{i:<3} {:>width$}  {:>9}\n", c.word, c.frequency));
    }
    out
}

fn draw_frequencies(
    counts: &[WordCount],
    title: &str,
    path: &Path,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let n = counts.len();
    let max = counts.iter().map(|c| c.frequency).max().unwrap_or(0);

    let root = BitMapBackend::new(path, (1280, 720)).into_drawing_area();
    root.fill(&WHITE)?;

    // most frequent word on the top row
    let word_at = |row: usize| n.checked_sub(row + 1).and_then(|k| counts.get(k));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(140)
        .build_cartesian_2d(0usize..max + max / 10 + 1, (0usize..n).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&|v| match v {
            SegmentValue::CenterOf(row) => word_at(*row).map(|c| c.word.clone()).unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc("Frequency")
        .draw()?;

    chart.draw_series(
        Histogram::horizontal(&chart)
            .style(BLUE.mix(0.7).filled())
            .margin(4)
            .data((0..n).filter_map(|row| word_at(row).map(|c| (row, c.frequency)))),
    )?;

    root.present()?;
    Ok(())
}

/// Horizontal bar chart of `counts` as a PNG, creating parent directories
pub fn plot_frequencies<P: AsRef<Path>>(counts: &[WordCount], title: &str, path: P) -> Result<()> {
    let path = path.as_ref();
    if counts.is_empty() {
        anyhow::bail!("No words to plot");
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    draw_frequencies(counts, title, path)
        .map_err(|e| anyhow!("Failed to draw {}: {}", path.display(), e))?;
    info!(path = %path.display(), "word frequency chart saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_frequencies() {
        let tweets = [
            "#Nifty50 looks strong, SENSEX up 200 points!",
            "Sensex and #BankNifty both up today",
            "stocks to watch: sensex movers",
        ];
        let counts = word_frequencies(&tweets, &TweetCleaner::default(), 3);
        assert_eq!(
            counts[0],
            WordCount {
                word: "sensex".into(),
                frequency: 3
            }
        );
        // ties keep first appearance
        assert_eq!(counts[1].word, "looks");
        assert_eq!(counts[2].word, "strong");
        assert!(counts.iter().all(|c| c.word != "banknifty" && c.word != "and"));
    }

    #[test]
    fn test_frequency_table() {
        let counts = vec![
            WordCount {
                word: "sensex".into(),
                frequency: 43,
            },
            WordCount {
                word: "stocks".into(),
                frequency: 38,
            },
        ];
        let table = frequency_table(&counts);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "     Words  Frequency");
        assert_eq!(lines[1], "0   sensex         43");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_plot_frequencies_needs_words() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts/words.png");
        let err = plot_frequencies(&[], "Top words", &path).unwrap_err();
        assert!(err.to_string().contains("No words"));
        assert!(!path.exists());
    }
}

//! Tweet cleaning and word frequencies.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::core::io::read_lines;
use crate::error::Result;

const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

/// Hashtag words too common in market tweets to carry information
pub const MARKET_STOPWORDS: &[&str] = &["nifty", "banknifty", "niftybank", "stockmarketindia", "stockmarket"];

/// Lower-cases, strips ASCII punctuation and digits, splits on whitespace
/// and drops stopwords.
#[derive(Debug, Clone)]
pub struct TweetCleaner {
    stopwords: HashSet<String>,
}

impl Default for TweetCleaner {
    fn default() -> Self {
        Self::new(MARKET_STOPWORDS.iter().copied())
    }
}

impl TweetCleaner {
    /// English stopwords plus `extra`
    pub fn new<'a>(extra: impl IntoIterator<Item = &'a str>) -> Self {
        let stopwords = ENGLISH_STOPWORDS
            .iter()
            .copied()
            .chain(extra)
            .map(str::to_lowercase)
            .collect();
        Self { stopwords }
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn tokens(&self, tweet: &str) -> Vec<String> {
        let stripped: String = tweet
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_ascii_punctuation() && !c.is_ascii_digit())
            .collect();
        stripped
            .split_whitespace()
            .filter(|w| !self.is_stopword(w))
            .map(str::to_string)
            .collect()
    }

    /// Cleaned tweet as a single space-separated line
    pub fn clean(&self, tweet: &str) -> String {
        self.tokens(tweet).join(" ")
    }
}

/// Non-empty lines of a tweet dump, one tweet per line
pub fn read_tweets<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    Ok(read_lines(path)?.into_iter().filter(|l| !l.is_empty()).collect())
}

/// The `top_n` most frequent words across all cleaned tweets.
///
/// Words with equal counts keep the order of their first appearance.
pub fn frequency_distribution<S: AsRef<str>>(cleaned: &[S], top_n: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut slot: HashMap<String, usize> = HashMap::new();

    for line in cleaned {
        for word in line.as_ref().split_whitespace() {
            match slot.get(word) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    slot.insert(word.to_string(), counts.len());
                    counts.push((word.to_string(), 1));
                }
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(top_n);
    counts
}

use std::fmt;

use anyhow::{Result, anyhow};
use serde::Serialize;
use tracing::debug;

use open_direction::Classifier;
use open_direction::dataset::{Dataset, FeatureMatrix, SplitConfig, train_test_split};
use open_direction::models::{ClassWeight, LogisticRegression};

/// One row of a fitted logit's coefficient table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogitTerm {
    pub term: String,
    pub coef: f64,
    pub std_err: f64,
    pub z: f64,
    /// Two-sided, from the standard normal
    pub p_value: f64,
}

impl fmt::Display for LogitTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<24} {:>10.4} {:>10.4} {:>8.3} {:>8.3}",
            self.term, self.coef, self.std_err, self.z, self.p_value
        )
    }
}

pub fn logit_header() -> String {
    format!(
        "{:<24} {:>10} {:>10} {:>8} {:>8}",
        "Term", "coef", "std err", "z", "P>|z|"
    )
}

/// Fit an unpenalised logit and report Wald statistics per term.
///
/// The first term is the intercept, named `const`.
pub fn logit_summary(x: &FeatureMatrix, y: &[u8]) -> Result<Vec<LogitTerm>> {
    let mut model = LogisticRegression::new(f64::INFINITY, 100, ClassWeight::None);
    model
        .fit(x, y)
        .map_err(|e| anyhow!("Logit fit failed: {}", e))?;
    let std_errs = model
        .standard_errors(x, y)
        .map_err(|e| anyhow!("Logit standard errors failed: {}", e))?;

    let intercept = model
        .intercept()
        .ok_or_else(|| anyhow!("Logit fit produced no intercept"))?;
    let coefs = std::iter::once(intercept).chain(model.coefficients().iter().copied());
    let names = std::iter::once("const").chain(x.columns.iter().map(String::as_str));

    let terms: Vec<LogitTerm> = names
        .zip(coefs)
        .zip(std_errs)
        .map(|((term, coef), std_err)| {
            let z = coef / std_err;
            LogitTerm {
                term: term.to_string(),
                coef,
                std_err,
                z,
                p_value: 2.0 * (1.0 - stats::normal_cdf(z.abs())),
            }
        })
        .collect();
    debug!(terms = terms.len(), rows = x.n_rows, "logit summary computed");
    Ok(terms)
}

/// Logit summary over the training partition of `split`
pub fn training_logit(dataset: &Dataset, split: &SplitConfig) -> Result<Vec<LogitTerm>> {
    let parts = train_test_split(&dataset.x, &dataset.y, split)?;
    logit_summary(&parts.x_train, &parts.y_train)
}

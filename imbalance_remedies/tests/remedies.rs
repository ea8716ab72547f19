use chrono::{Days, NaiveDate};
use tempfile::tempdir;

use imbalance_remedies::{Config, RemedySpec, load, run_all, write_outputs};
use open_direction::core::io::{IndexSeries, write_master_file};
use open_direction::dataset::{DataConfig, MasterTable, SplitConfig, train_test_split};
use open_direction::models::{ClassWeight, LogisticRegression};
use open_direction::resampling::ResamplerSpec;

/// Price path whose open gaps up about two days in three
fn series(name: &str, n: usize, base: f64, salt: usize) -> IndexSeries {
    let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    let mut s = IndexSeries::new(name);
    let mut close = base;
    for i in 0..n {
        let gap = if (i * 13 + salt) % 3 == 0 { -0.004 } else { 0.003 };
        let open = close * (1.0 + gap);
        let drift = (((i * 29 + salt * 7) % 19) as f64 / 19.0 - 0.5) * 0.02;
        let next = open * (1.0 + drift);
        s.push(
            start + Days::new(i as u64),
            open,
            open.max(next) * 1.001,
            open.min(next) * 0.999,
            next,
        );
        close = next;
    }
    s
}

fn config(dir: &std::path::Path) -> Config {
    let master = MasterTable::merge(&[series("AAA", 200, 100.0, 1), series("BBB", 200, 40.0, 5)]).unwrap();
    let master_file = dir.join("master.csv");
    write_master_file(&master_file, &master).unwrap();

    Config {
        data: DataConfig {
            master_file,
            indices: vec!["AAA".into(), "BBB".into()],
            target: "AAA".into(),
            features: vec!["BBB_DAILY_RETURNS".into(), "BBB_TSI".into(), "AAA_HL_RATIO".into()],
            indicators: Default::default(),
        },
        split: SplitConfig::default(),
        model: LogisticRegression::new(1.0, 1000, ClassWeight::None),
        remedies: vec![
            RemedySpec {
                class_weight: ClassWeight::Balanced,
                resampler: None,
            },
            RemedySpec::resample(ResamplerSpec::RandomUnder { seed: 0 }),
            RemedySpec::resample(ResamplerSpec::RandomOver { seed: 0 }),
            RemedySpec::resample(ResamplerSpec::Smote {
                k_neighbors: 5,
                seed: 0,
            }),
        ],
        output_dir: dir.join("out"),
        json: true,
    }
}

#[test]
fn test_every_remedy_shares_the_test_partition() {
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    let dataset = load(&config).unwrap();
    let expected = train_test_split(&dataset.x, &dataset.y, &config.split).unwrap();

    let outcomes = run_all(&dataset, &config).unwrap();
    assert_eq!(outcomes.len(), 4);
    assert_eq!(outcomes[0].remedy, "balanced");
    assert_eq!(outcomes[1].remedy, "RandomUnderSampler");

    for outcome in &outcomes {
        assert_eq!(outcome.test_rows, expected.test_rows);
        assert_eq!(outcome.bundle.test.n_rows, expected.y_test.len());
        assert_eq!(outcome.n_train_before, expected.y_train.len());
    }
    // resamplers equalise the training classes
    for outcome in &outcomes[1..] {
        assert_eq!(outcome.train_class_counts[0], outcome.train_class_counts[1]);
    }
}

#[test]
fn test_outputs_are_written() {
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    let dataset = load(&config).unwrap();

    let outcomes = run_all(&dataset, &config).unwrap();
    let written = write_outputs(&outcomes, &config).unwrap();
    assert_eq!(written.len(), 2);

    let log = std::fs::read_to_string(config.output_dir.join("IMBALANCE_REMEDIES.LOG")).unwrap();
    assert!(log.contains("\n SMOTE\n\n     AUC ROC: "));
    assert!(log.contains("\n LogisticRegression - class_weight: balanced\n\n     AUC ROC: "));

    let json = std::fs::read_to_string(config.output_dir.join("remedies.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0]["remedy"], "balanced");
}

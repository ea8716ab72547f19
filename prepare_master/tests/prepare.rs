use std::fs;

use open_direction::core::io::read_master_file;
use prepare_master::{Config, run};
use tempfile::tempdir;

const HEADER: &str = "Date,Open,High,Low,Close,Adj Close,Volume\n";

#[test]
fn test_merges_on_common_dates() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().join("raw");
    fs::create_dir_all(&data_dir).unwrap();

    fs::write(
        data_dir.join("NSEI.csv"),
        format!(
            "{HEADER}2024-01-02,100,101,99,100.5,100.5,1\n\
             2024-01-03,101,102,100,101.5,101.5,1\n\
             2024-01-04,102,103,101,102.5,102.5,1\n"
        ),
    )
    .unwrap();
    fs::write(
        data_dir.join("DJI.csv"),
        format!(
            "{HEADER}2024-01-03,200,201,199,200.5,200.5,1\n\
             2024-01-04,null,null,null,null,null,null\n\
             2024-01-05,202,203,201,202.5,202.5,1\n"
        ),
    )
    .unwrap();

    let config = Config {
        data_dir,
        indices: vec!["NSEI".into(), "DJI".into()],
        master_file: dir.path().join("out/master.csv"),
    };
    let table = run(&config).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.column("DJI_CLOSE").unwrap(), &[200.5]);

    let reread = read_master_file(&config.master_file).unwrap();
    assert_eq!(reread, table);
}

#[test]
fn test_missing_index_file_is_reported() {
    let dir = tempdir().unwrap();
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        indices: vec!["HSI".into()],
        master_file: dir.path().join("master.csv"),
    };
    let err = run(&config).unwrap_err();
    assert!(err.to_string().contains("HSI.csv"));
}

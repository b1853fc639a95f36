use anyhow::Result;
use sigscout::scan::{classify_targets, scan_with_cancellation};
use sigscout::{
    scan, Algorithm, CancellationToken, Outcome, PatternDatabase, ScanConfig, ScanError,
    ScanTarget, Strategy,
};
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const DATABASE: &[u8] = b"\
0;\"PK\";\"Zip archive\"
1;\"%PDF-\";\"PDF document\"
2;\"PK\x03\x04word/\";\"Word document\"
3;\"\x89PNG\";\"PNG image\"
";

fn create_test_files(dir: &Path, files: &[(&str, &[u8])]) -> Result<()> {
    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
    }
    Ok(())
}

fn setup() -> Result<(TempDir, ScanConfig)> {
    let dir = tempdir()?;
    let files = dir.path().join("files");
    create_test_files(
        &files,
        &[
            ("doc.pdf", b"%PDF-1.7\n..."),
            ("report.docx", b"PK\x03\x04word/document.xml"),
            ("archive.zip", b"PK\x03\x04data"),
            ("image.png", b"\x89PNG\r\n\x1a\n"),
            ("notes.txt", b"just text"),
            ("nested/inner.pdf", b"garbage %PDF-1.4"),
        ],
    )?;
    let db = dir.path().join("patterns.db");
    fs::write(&db, DATABASE)?;
    let config = ScanConfig::new(&files, &db);
    Ok((dir, config))
}

fn lines(report: &sigscout::ScanReport) -> Vec<String> {
    report.outcomes.iter().map(|o| o.to_string()).collect()
}

#[test]
fn test_scan_reports_every_file_in_order() -> Result<()> {
    let (_dir, config) = setup()?;
    let report = scan(&config)?;

    assert_eq!(
        lines(&report),
        vec![
            "archive.zip: Zip archive",
            "doc.pdf: PDF document",
            "image.png: PNG image",
            "inner.pdf: PDF document",
            "notes.txt: Unknown file type",
            "report.docx: Word document",
        ]
    );
    assert_eq!(report.files_matched, 5);
    assert_eq!(report.files_unknown, 1);
    Ok(())
}

#[test]
fn test_all_algorithms_and_strategies_agree() -> Result<()> {
    let (_dir, base) = setup()?;
    let expected = lines(&scan(&base)?);

    for algorithm in Algorithm::ALL {
        for strategy in [Strategy::PerFile, Strategy::Wavefront] {
            let config = ScanConfig {
                algorithm,
                strategy,
                thread_count: NonZeroUsize::new(3).unwrap(),
                ..base.clone()
            };
            assert_eq!(lines(&scan(&config)?), expected, "{} / {}", algorithm, strategy);
        }
    }
    Ok(())
}

#[test]
fn test_non_recursive_scan() -> Result<()> {
    let (_dir, base) = setup()?;
    let config = ScanConfig {
        recursive: false,
        ..base
    };
    let report = scan(&config)?;
    assert_eq!(report.files_scanned, 5);
    assert!(report.get("inner.pdf").is_none());
    Ok(())
}

#[test]
fn test_ignore_patterns() -> Result<()> {
    let (_dir, base) = setup()?;
    let config = ScanConfig {
        ignore_patterns: vec!["*.pdf".to_string()],
        ..base
    };
    let report = scan(&config)?;
    assert_eq!(report.files_scanned, 4);
    assert!(report.get("doc.pdf").is_none());
    Ok(())
}

#[test]
fn test_repeated_scans_are_identical() -> Result<()> {
    let (_dir, config) = setup()?;
    let first = scan(&config)?;
    for _ in 0..5 {
        assert_eq!(scan(&config)?.outcomes, first.outcomes);
    }
    Ok(())
}

#[test]
fn test_missing_arguments_fail_before_scanning() {
    let err = scan(&ScanConfig::default()).unwrap_err();
    assert!(matches!(err, ScanError::InvalidArguments(_)));
}

#[test]
fn test_malformed_database_fails_fast() -> Result<()> {
    let (dir, base) = setup()?;
    let db = dir.path().join("broken.db");
    fs::write(&db, "0;\"PK\";\"Zip archive\"\nten;\"%PDF-\";\"PDF document\"\n")?;

    let config = ScanConfig {
        patterns_path: db,
        ..base
    };
    match scan(&config) {
        Err(ScanError::MalformedPatternEntry { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected malformed entry, got {:?}", other),
    }
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_reported_alongside_results() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let (dir, config) = setup()?;
    let locked = dir.path().join("files/locked.bin");
    fs::write(&locked, "%PDF-")?;
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

    // Root ignores permission bits; nothing to check in that case.
    if fs::read(&locked).is_ok() {
        return Ok(());
    }

    for strategy in [Strategy::PerFile, Strategy::Wavefront] {
        let report = scan(&ScanConfig {
            strategy,
            ..config.clone()
        })?;
        assert_eq!(report.files_scanned, 7);
        assert_eq!(report.files_unreadable, 1);
        assert!(matches!(
            report.get("locked.bin").map(|o| &o.outcome),
            Some(Outcome::Unreadable(_))
        ));
        assert_eq!(report.files_matched, 5);
    }
    Ok(())
}

#[test]
fn test_cancelled_scan() -> Result<()> {
    let (_dir, config) = setup()?;
    let token = CancellationToken::new();
    token.cancel();

    let report = scan_with_cancellation(&config, token)?;
    assert_eq!(report.files_scanned, 6);
    assert_eq!(report.files_skipped, 6);
    Ok(())
}

#[test]
fn test_priority_example() -> Result<()> {
    let db = PatternDatabase::parse(b"0;\"AB\";\"TypeX\"\n0;\"CD\";\"TypeY\"\n")?;
    let targets = vec![
        ScanTarget::in_memory("both", "xxABxxCDxx"),
        ScanTarget::in_memory("ab", "xxABxx"),
        ScanTarget::in_memory("none", "xxxx"),
    ];

    for algorithm in Algorithm::ALL {
        for strategy in [Strategy::PerFile, Strategy::Wavefront] {
            let report = classify_targets(
                &db,
                &targets,
                algorithm,
                strategy,
                NonZeroUsize::new(10).unwrap(),
                CancellationToken::new(),
            )?;
            let lines: Vec<_> = report.outcomes.iter().map(|o| o.to_string()).collect();
            assert_eq!(lines, vec!["both: TypeY", "ab: TypeX", "none: Unknown file type"]);
        }
    }
    Ok(())
}

#[test]
fn test_hundred_files_on_disk() -> Result<()> {
    let dir = tempdir()?;
    let files = dir.path().join("files");
    fs::create_dir(&files)?;
    for i in 0..100 {
        let body = if i % 2 == 0 { format!("{} %PDF-", i) } else { format!("{} text", i) };
        fs::write(files.join(format!("file_{:03}", i)), body)?;
    }
    let db = dir.path().join("patterns.db");
    fs::write(&db, DATABASE)?;

    let single = scan(&ScanConfig {
        thread_count: NonZeroUsize::new(1).unwrap(),
        ..ScanConfig::new(&files, &db)
    })?;

    for strategy in [Strategy::PerFile, Strategy::Wavefront] {
        let report = scan(&ScanConfig {
            strategy,
            ..ScanConfig::new(&files, &db)
        })?;
        assert_eq!(report.outcomes.len(), 100);
        assert_eq!(report.files_matched, 50);
        assert_eq!(report.outcomes, single.outcomes);
    }
    Ok(())
}

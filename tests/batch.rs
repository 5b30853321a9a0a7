use std::fs;
use std::path::Path;

use micase::batch::{Outcome, convert_dir};
use micase::opts::Opts;
use micase::output_type::OutputType;

const FIXTURES: [&str; 3] = ["adv700ju023.xml", "col425mx075.xml", "lab175su026.xml"];

fn stage_fixtures(dir: &Path) -> anyhow::Result<()> {
    for name in FIXTURES {
        fs::copy(Path::new("tests/fixtures").join(name), dir.join(name))?;
    }
    Ok(())
}

#[test]
fn malformed_document_does_not_abort_the_batch() -> anyhow::Result<()> {
    let input = tempfile::tempdir()?;
    let output = tempfile::tempdir()?;
    stage_fixtures(input.path())?;

    let report = convert_dir(input.path(), output.path(), &Opts::default())?;

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.converted().count(), 2);

    let failed: Vec<_> = report.failed().collect();
    assert_eq!(failed.len(), 1);
    match failed[0] {
        Outcome::Failed { document, error } => {
            assert_eq!(document, "col425mx075");
            assert!(error.is_malformed());
        }
        other => panic!("expected failure, got {other:?}"),
    }

    let mut written: Vec<String> = fs::read_dir(output.path())?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    written.sort();
    assert_eq!(
        written,
        vec!["adv700ju023_Parsed.txt", "lab175su026_Parsed.txt"]
    );
    Ok(())
}

#[test]
fn converted_outcomes_point_at_complete_files() -> anyhow::Result<()> {
    let input = tempfile::tempdir()?;
    let output = tempfile::tempdir()?;
    stage_fixtures(input.path())?;

    let report = convert_dir(input.path(), output.path(), &Opts::default())?;
    for outcome in report.converted() {
        let Outcome::Converted {
            output, records, ..
        } = outcome
        else {
            unreachable!("converted() only yields conversions");
        };
        let text = fs::read_to_string(output)?;
        assert_eq!(text.matches("# utterance_id = ").count() as u64, *records);
        assert!(text.ends_with("\n\n"));
    }
    Ok(())
}

#[test]
fn json_lines_batch_writes_one_object_per_record() -> anyhow::Result<()> {
    let input = tempfile::tempdir()?;
    let output = tempfile::tempdir()?;
    stage_fixtures(input.path())?;

    let opts = Opts {
        output_type: OutputType::JsonLines,
        ..Opts::default()
    };
    convert_dir(input.path(), output.path(), &opts)?;

    let body = fs::read_to_string(output.path().join("lab175su026_Parsed.jsonl"))?;
    let records = body
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<Vec<serde_json::Value>, _>>()?;
    let ids: Vec<_> = records.iter().map(|r| r["utterance_id"].as_u64()).collect();
    assert_eq!(ids, vec![Some(1), Some(2), Some(3), Some(4)]);
    assert!(records.iter().all(|r| r["original_doc"] == "lab175su026"));
    Ok(())
}

#[test]
fn output_dir_is_created_when_missing() -> anyhow::Result<()> {
    let input = tempfile::tempdir()?;
    let root = tempfile::tempdir()?;
    fs::copy(
        "tests/fixtures/adv700ju023.xml",
        input.path().join("adv700ju023.xml"),
    )?;

    let output = root.path().join("XML_Data");
    let report = convert_dir(input.path(), &output, &Opts::default())?;
    assert_eq!(report.converted().count(), 1);
    assert!(output.join("adv700ju023_Parsed.txt").is_file());
    Ok(())
}

#[test]
fn declared_latin1_transcripts_are_decoded() -> anyhow::Result<()> {
    let input = tempfile::tempdir()?;
    let output = tempfile::tempdir()?;
    fs::copy(
        "tests/fixtures/sem300mu105.xml",
        input.path().join("sem300mu105.xml"),
    )?;

    let report = convert_dir(input.path(), output.path(), &Opts::default())?;
    assert_eq!(report.converted().count(), 1);

    let text = fs::read_to_string(output.path().join("sem300mu105_Parsed.txt"))?;
    assert!(text.contains("# l1 = French\n# person_id = S1\n"));
    assert!(text.contains("# sentence_id = TBD\ncaf\u{e9} ok\n\n"));
    assert!(text.contains("# sentence_id = TBD\nse\u{f1}or\n\n"));
    Ok(())
}

#[test]
fn undecodable_transcript_fails_alone() -> anyhow::Result<()> {
    let input = tempfile::tempdir()?;
    let output = tempfile::tempdir()?;
    fs::copy(
        "tests/fixtures/adv700ju023.xml",
        input.path().join("adv700ju023.xml"),
    )?;
    fs::write(
        input.path().join("bad.xml"),
        b"<?xml version=\"1.0\" encoding=\"x-unknown\"?><MICASE/>",
    )?;

    let report = convert_dir(input.path(), output.path(), &Opts::default())?;
    assert_eq!(report.converted().count(), 1);
    let failed: Vec<_> = report.failed().collect();
    match failed.as_slice() {
        [Outcome::Failed { document, error }] => {
            assert_eq!(document, "bad");
            assert!(error.is_malformed());
            assert!(error.to_string().contains("x-unknown"));
        }
        other => panic!("expected one failure, got {other:?}"),
    }
    assert!(!output.path().join("bad_Parsed.txt").exists());
    Ok(())
}

//! Log parsing: read a model log line by line and pull out timing records.
//!
//! Lines that don't match the active grammar are skipped; logs interleave
//! solver and physics diagnostics that never match. A line that does match
//! but carries an unparseable number or timestamp fails the whole parse.

mod grammar;

use std::{
    fs,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::model::{Model, OutputTimeRecord, StepRecord, TimeKind};

pub use grammar::StepGrammar;

/// Errors that can occur while parsing a log.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read log: {0}")]
    Read(#[from] io::Error),

    #[error("line {line}: malformed {field} {value:?}")]
    Malformed {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("{model} only reports {fixed} seconds, but {requested} seconds were requested")]
    UnsupportedKind {
        model: Model,
        requested: TimeKind,
        fixed: TimeKind,
    },
}

pub type Result<T> = core::result::Result<T, ParseError>;

/// Extract step records from `reader`, in file order.
///
/// Duplicate steps (a model restarting mid-log) are kept as separate rows.
pub fn parse_step_records(reader: impl BufRead, grammar: &StepGrammar) -> Result<Vec<StepRecord>> {
    let mut records = Vec::new();
    for_each_line(reader, |line, line_no| {
        if let Some(record) = grammar.match_line(line, line_no)? {
            records.push(record);
        }
        Ok(())
    })?;
    debug!(
        model = %grammar.model(),
        kind = %grammar.kind(),
        matched = records.len(),
        "parsed step records"
    );
    Ok(records)
}

/// Extract output-write durations from `reader`, in file order.
pub fn parse_output_times(reader: impl BufRead) -> Result<Vec<OutputTimeRecord>> {
    let mut records = Vec::new();
    for_each_line(reader, |line, line_no| {
        if let Some(seconds) = grammar::match_output_time(line, line_no)? {
            records.push(OutputTimeRecord { seconds });
        }
        Ok(())
    })?;
    debug!(matched = records.len(), "parsed output times");
    Ok(records)
}

/// Open `path` and extract its step records.
pub fn read_step_records(path: &Path, grammar: &StepGrammar) -> Result<Vec<StepRecord>> {
    let records = parse_step_records(open(path)?, grammar)?;
    info!(path = %path.display(), rows = records.len(), "read step timings");
    Ok(records)
}

/// Open `path` and extract its output-write durations.
pub fn read_output_times(path: &Path) -> Result<Vec<OutputTimeRecord>> {
    let records = parse_output_times(open(path)?)?;
    info!(path = %path.display(), rows = records.len(), "read output timings");
    Ok(records)
}

fn open(path: &Path) -> Result<BufReader<fs::File>> {
    let file = fs::File::open(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Feed each line to `visit` with its 1-based number.
///
/// Bytes that aren't valid UTF-8 are replaced rather than rejected: model
/// logs occasionally carry stray bytes from Fortran runtimes, and such
/// lines are never timing lines anyway.
fn for_each_line(
    mut reader: impl BufRead,
    mut visit: impl FnMut(&str, usize) -> Result<()>,
) -> Result<()> {
    let mut buf = Vec::new();
    let mut line_no = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        line_no += 1;
        let line = String::from_utf8_lossy(&buf);
        visit(line.trim_end_matches(['\n', '\r']), line_no)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use jiff::civil::date;
    use tempfile::TempDir;

    const GFS_LOG: &str = "\
 begin operational forecast----
 begin of gcr  5.298061077439735E-005
 RES of gcr  1.062585033967659E-023 in           37 iterations
Timing for processing for step        1:   15.51460 elapsed seconds.
 begin of gcr  6.001155404370011E-005
 RES of gcr  1.006302069134485E-023 in           37 iterations
Timing for processing for step        2:    0.30060 elapsed seconds.
 begin of gcr  5.512293401798762E-005
";

    const MESO_LOG: &str = "\
Timing for processing for step 1 (2020050900:00:00):         10.60030 elapsed seconds.
Timing for processing for step 1 (2020050900:00:00):          8.34263 cpu seconds.
 begin of gcr  3.311504627275603E-004
 RES of gcr  7.923976079163864E-013 in           37 iterations
 warm start: grid%do_cld = T
Timing for processing for step 2 (2020050900:00:30):          0.73180 elapsed seconds.
Timing for processing for step 2 (2020050900:00:30):          0.73085 cpu seconds.
 output modelvar use    2.41637611389160      seconds
  post grib2 compress and output use   0.456164121627808       seconds.
Timing for processing for step 3 (2020050900:01:00):          0.77260 elapsed seconds.
Timing for processing for step 3 (2020050900:01:00):          0.77182 cpu seconds.
 output modelvar use    2.10000000000000      seconds
";

    fn grammar(model: Model, kind: Option<TimeKind>) -> StepGrammar {
        StepGrammar::new(model, kind).unwrap()
    }

    #[test]
    fn gfs_log_yields_steps_in_file_order() {
        let records =
            parse_step_records(GFS_LOG.as_bytes(), &grammar(Model::GrapesGfs, None)).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].step, 1);
        assert!((records[0].elapsed_seconds - 15.5146).abs() < 1e-12);
        assert_eq!(records[0].valid_time, None);
        assert_eq!(records[1].step, 2);
        assert!((records[1].elapsed_seconds - 0.3006).abs() < 1e-12);
    }

    #[test]
    fn meso_log_yields_one_row_per_step_for_each_kind() {
        let elapsed = parse_step_records(
            MESO_LOG.as_bytes(),
            &grammar(Model::GrapesMeso, Some(TimeKind::Elapsed)),
        )
        .unwrap();
        let cpu = parse_step_records(
            MESO_LOG.as_bytes(),
            &grammar(Model::GrapesMeso, Some(TimeKind::Cpu)),
        )
        .unwrap();

        let steps = |records: &[StepRecord]| records.iter().map(|r| r.step).collect::<Vec<_>>();
        assert_eq!(steps(&elapsed), vec![1, 2, 3]);
        assert_eq!(steps(&cpu), vec![1, 2, 3]);
        assert!((elapsed[0].elapsed_seconds - 10.6003).abs() < 1e-12);
        assert!((cpu[0].elapsed_seconds - 8.34263).abs() < 1e-12);
        assert_eq!(elapsed[1].valid_time, Some(date(2020, 5, 9).at(0, 0, 30, 0)));
    }

    #[test]
    fn meso_3km_reads_elapsed_and_tym_reads_cpu() {
        let meso_3km =
            parse_step_records(MESO_LOG.as_bytes(), &grammar(Model::GrapesMeso3km, None)).unwrap();
        let tym = parse_step_records(MESO_LOG.as_bytes(), &grammar(Model::GrapesTym, None)).unwrap();

        assert!((meso_3km[2].elapsed_seconds - 0.7726).abs() < 1e-12);
        assert!((tym[2].elapsed_seconds - 0.77182).abs() < 1e-12);
    }

    #[test]
    fn out_of_order_and_repeated_steps_are_kept() {
        let log = "\
Timing for processing for step        5:    1.00000 elapsed seconds.
Timing for processing for step        6:    1.00000 elapsed seconds.
Timing for processing for step        1:    2.00000 elapsed seconds.
Timing for processing for step        6:    3.00000 elapsed seconds.
";
        let records = parse_step_records(log.as_bytes(), &grammar(Model::GrapesGfs, None)).unwrap();
        let steps: Vec<u32> = records.iter().map(|r| r.step).collect();
        assert_eq!(steps, vec![5, 6, 1, 6]);
    }

    #[test]
    fn log_without_timing_lines_is_empty_not_an_error() {
        let records = parse_step_records(
            " begin of gcr 1.0\n RES of gcr 2.0\n".as_bytes(),
            &grammar(Model::GrapesMeso, None),
        )
        .unwrap();
        assert!(records.is_empty());

        let records = parse_step_records("".as_bytes(), &grammar(Model::GrapesGfs, None)).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn malformed_seconds_fail_with_line_number() {
        let log = "noise\nTiming for processing for step        1:   15.5x elapsed seconds.\n";
        let err = parse_step_records(log.as_bytes(), &grammar(Model::GrapesGfs, None)).unwrap_err();

        match err {
            ParseError::Malformed { line, field, value } => {
                assert_eq!(line, 2);
                assert_eq!(field, "seconds");
                assert_eq!(value, "15.5x");
            }
            other => panic!("expected malformed error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_step_fails() {
        let log = "Timing for processing for step   one:   1.0 elapsed seconds.\n";
        let err = parse_step_records(log.as_bytes(), &grammar(Model::GrapesGfs, None)).unwrap_err();
        assert!(matches!(err, ParseError::Malformed { field: "step", .. }));
    }

    #[test]
    fn malformed_valid_time_fails() {
        let log = "Timing for processing for step 1 (20200509): 1.0 elapsed seconds.\n";
        let err =
            parse_step_records(log.as_bytes(), &grammar(Model::GrapesMeso, None)).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Malformed {
                field: "valid time",
                ..
            }
        ));
    }

    #[test]
    fn crlf_line_endings_and_stray_bytes_are_tolerated() {
        let mut log = b"\xff\xfe garbage\r\n".to_vec();
        log.extend_from_slice(b"Timing for processing for step        1:   15.51460 elapsed seconds.\r\n");

        let records = parse_step_records(log.as_slice(), &grammar(Model::GrapesGfs, None)).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn output_times_are_extracted_independently_of_steps() {
        let records = parse_output_times(MESO_LOG.as_bytes()).unwrap();
        let seconds: Vec<f64> = records.iter().map(|r| r.seconds).collect();
        assert_eq!(seconds, vec![2.416_376_113_891_6, 2.1]);
    }

    #[test]
    fn reading_a_file_twice_gives_identical_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fcst.1");
        fs::write(&path, MESO_LOG).unwrap();
        let grammar = grammar(Model::GrapesMeso, None);

        let first = read_step_records(&path, &grammar).unwrap();
        let second = read_step_records(&path, &grammar).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_file_is_an_io_error_with_path() {
        let path = PathBuf::from("/nonexistent/std.out");
        let err = read_step_records(&path, &grammar(Model::GrapesGfs, None)).unwrap_err();

        assert!(matches!(&err, ParseError::Io { path: p, .. } if p == &path));
        assert!(err.to_string().contains("/nonexistent/std.out"));

        assert!(matches!(
            read_output_times(&path),
            Err(ParseError::Io { .. })
        ));
    }
}

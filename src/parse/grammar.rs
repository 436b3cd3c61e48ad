//! Line grammars for each model's timing output.
//!
//! All four models share one line shape; they differ in whether a valid
//! time sits between the step and the colon, and in which timing kind is
//! read. A `StepGrammar` pins both down for one parse.

use std::sync::LazyLock;

use jiff::civil::DateTime;
use regex::{Captures, Regex};

use crate::model::{Model, StepRecord, TimeKind};

use super::{ParseError, Result};

static GFS_ELAPSED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Timing for processing for step\s+(.+):\s+(.+) elapsed seconds\.")
        .expect("GFS step pattern is valid")
});

static MESO_ELAPSED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Timing for processing for step\s+(.+) \((.*)\):\s+(.+) elapsed seconds\.")
        .expect("MESO elapsed pattern is valid")
});

static MESO_CPU: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Timing for processing for step\s+(.+) \((.*)\):\s+(.+) cpu seconds\.")
        .expect("MESO cpu pattern is valid")
});

static OUTPUT_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"output modelvar use\s+([0-9.]*)\s+seconds").expect("output pattern is valid")
});

const VALID_TIME_FORMAT: &str = "%Y%m%d%H:%M:%S";

/// The pattern and capture layout used to read step lines of one model.
#[derive(Debug, Clone)]
pub struct StepGrammar {
    model: Model,
    kind: TimeKind,
    pattern: &'static Regex,
}

impl StepGrammar {
    /// Select the grammar for `model`, reading `kind` seconds.
    ///
    /// `None` picks the model's default kind. Only GRAPES MESO lets the
    /// caller choose; asking the other models for a different kind fails.
    pub fn new(model: Model, kind: Option<TimeKind>) -> Result<Self> {
        let fixed = model.default_kind();
        let kind = kind.unwrap_or(fixed);
        if kind != fixed && !model.kind_selectable() {
            return Err(ParseError::UnsupportedKind {
                model,
                requested: kind,
                fixed,
            });
        }

        let pattern: &'static Regex = match (model.has_valid_time(), kind) {
            (false, _) => &*GFS_ELAPSED,
            (true, TimeKind::Elapsed) => &*MESO_ELAPSED,
            (true, TimeKind::Cpu) => &*MESO_CPU,
        };

        Ok(Self {
            model,
            kind,
            pattern,
        })
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn kind(&self) -> TimeKind {
        self.kind
    }

    /// Read one line. `Ok(None)` means the line is not a timing line.
    pub(super) fn match_line(&self, line: &str, line_no: usize) -> Result<Option<StepRecord>> {
        let Some(caps) = self.pattern.captures(line) else {
            return Ok(None);
        };

        let (valid_time, seconds_group) = if self.model.has_valid_time() {
            let text = group(&caps, 2);
            let valid_time =
                parse_valid_time(text).ok_or_else(|| malformed(line_no, "valid time", text))?;
            (Some(valid_time), 3)
        } else {
            (None, 2)
        };

        let step_text = group(&caps, 1);
        let step = step_text
            .trim()
            .parse::<u32>()
            .map_err(|_| malformed(line_no, "step", step_text))?;

        let seconds_text = group(&caps, seconds_group);
        let elapsed_seconds = parse_seconds(seconds_text)
            .ok_or_else(|| malformed(line_no, "seconds", seconds_text))?;

        Ok(Some(StepRecord {
            step,
            elapsed_seconds,
            valid_time,
        }))
    }
}

/// Read an `output modelvar use <seconds> seconds` line, anywhere in `line`.
pub(super) fn match_output_time(line: &str, line_no: usize) -> Result<Option<f64>> {
    let Some(caps) = OUTPUT_TIME.captures(line) else {
        return Ok(None);
    };
    let text = group(&caps, 1);
    parse_seconds(text)
        .map(Some)
        .ok_or_else(|| malformed(line_no, "output seconds", text))
}

fn group<'a>(caps: &Captures<'a>, index: usize) -> &'a str {
    caps.get(index).map_or("", |m| m.as_str())
}

fn parse_seconds(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s >= 0.0)
}

/// Parse the stamp printed beside each step.
fn parse_valid_time(text: &str) -> Option<DateTime> {
    DateTime::strptime(VALID_TIME_FORMAT, text.trim()).ok()
}

fn malformed(line: usize, field: &'static str, value: &str) -> ParseError {
    ParseError::Malformed {
        line,
        field,
        value: value.trim().to_string(),
    }
}

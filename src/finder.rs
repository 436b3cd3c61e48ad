//! Data finder: resolve a data-type tag and cycle start time to a log file.
//!
//! Path templates come from the config. Each `{time:<fmt>}` token is the
//! start time formatted with a strftime directive; `{time-3h:<fmt>}` and
//! `{time+6h:<fmt>}` shift it first. Logs are often filed under a
//! directory named for an earlier cycle, which is what the offset is for.

use std::path::PathBuf;
use std::sync::LazyLock;

use jiff::{SignedDuration, civil::DateTime, fmt::strtime};
use regex::Regex;
use tracing::debug;

use crate::config::Config;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{time(?:([+-]\d+)h)?:([^{}]*)\}").expect("template token pattern is valid")
});

/// Errors that can occur while resolving a data type.
#[derive(Debug, thiserror::Error)]
pub enum FindError {
    #[error("unknown data type {0:?}; add it under [[data-types]] in the config")]
    UnknownDataType(String),

    #[error("bad path template {template:?}: {reason}")]
    BadTemplate {
        template: String,
        reason: &'static str,
    },

    #[error("failed to format {format:?}: {source}")]
    Format {
        format: String,
        #[source]
        source: jiff::Error,
    },

    #[error("time offset in {0:?} is out of range")]
    TimeOverflow(String),
}

pub type Result<T> = core::result::Result<T, FindError>;

/// Find the file for `data_type` at the cycle starting at `start_time`.
///
/// Returns the first candidate that exists, or `None` when none do.
pub fn find_local_file(
    config: &Config,
    data_type: &str,
    start_time: DateTime,
) -> Result<Option<PathBuf>> {
    let entry = config
        .data_type(data_type)
        .ok_or_else(|| FindError::UnknownDataType(data_type.to_string()))?;

    for template in &entry.paths {
        let candidate = PathBuf::from(render_template(template, start_time)?);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "found data file");
            return Ok(Some(candidate));
        }
        debug!(path = %candidate.display(), "candidate missing");
    }

    Ok(None)
}

/// Expand every time token in `template`.
pub fn render_template(template: &str, start_time: DateTime) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in TOKEN.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_literal(&mut out, template, &template[last..whole.start()])?;

        let offset_hours = match caps.get(1) {
            Some(m) => m
                .as_str()
                .parse::<i64>()
                .map_err(|_| FindError::TimeOverflow(template.to_string()))?,
            None => 0,
        };
        let time = offset_hours
            .checked_mul(3600)
            .map(SignedDuration::from_secs)
            .and_then(|offset| start_time.checked_add(offset).ok())
            .ok_or_else(|| FindError::TimeOverflow(template.to_string()))?;

        let format = &caps[2];
        let formatted = strtime::format(format, time).map_err(|source| FindError::Format {
            format: format.to_string(),
            source,
        })?;
        out.push_str(&formatted);
        last = whole.end();
    }

    push_literal(&mut out, template, &template[last..])?;
    Ok(out)
}

/// Copy text between tokens, refusing stray braces.
fn push_literal(out: &mut String, template: &str, literal: &str) -> Result<()> {
    if literal.contains(['{', '}']) {
        return Err(FindError::BadTemplate {
            template: template.to_string(),
            reason: "expected `{time:<format>}` or `{time<+|-><hours>h:<format>}`",
        });
    }
    out.push_str(literal);
    Ok(())
}

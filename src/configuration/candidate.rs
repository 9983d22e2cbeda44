//! Scored fragment-to-quadrant assignments and their candidate-file line format
//!
//! ```text
//! mse:482,fragment1.png:UL,fragment2.png:LR,fragment3.png:UR,fragment4.png:LL
//! ```

use crate::fragment::PositionLabel;
use crate::io::error::{Result, integrity_error};
use std::fmt;

/// Prefix of the score field
pub const SCORE_PREFIX: &str = "mse:";
/// Prefix of fragment pseudonyms
pub const PSEUDONYM_PREFIX: &str = "fragment";
/// Suffix of fragment pseudonyms
pub const PSEUDONYM_SUFFIX: &str = ".png";

/// One fragment's place within a configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Pseudonym as written in the candidate file, e.g. `fragment3.png`
    pub pseudonym: String,
    /// Original file name the pseudonym refers to
    pub identity: String,
    /// Quadrant the fragment is assigned to
    pub label: PositionLabel,
}

/// A scored assignment of the four fragments to the four quadrants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Mean squared error from the discrete search; lower is better
    pub mse_score: i64,
    /// Assignments in file order
    pub assignments: Vec<Assignment>,
}

impl Configuration {
    /// Original identity of the fragment assigned to `label`
    pub fn identity_for(&self, label: PositionLabel) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.label == label)
            .map(|a| a.identity.as_str())
    }

    /// Quadrant assigned to the fragment with the given original identity
    pub fn label_for(&self, identity: &str) -> Option<PositionLabel> {
        self.assignments
            .iter()
            .find(|a| a.identity == identity)
            .map(|a| a.label)
    }

    /// Parse one line of the candidate file
    ///
    /// `line` is the 1-based line number used in errors. `filenames` must be the
    /// lexicographically sorted fragment file names; `fragmentN.png` maps to entry N−1.
    ///
    /// # Errors
    ///
    /// Returns `Integrity` if the embedded score token disagrees with the parsed
    /// score, a field is malformed, a pseudonym has no file, or the four labels
    /// and pseudonyms are not all distinct
    pub fn parse_line(line: usize, text: &str, filenames: &[String]) -> Result<Self> {
        let mut fields = text.trim().split(',').map(str::trim);
        let score_field = fields.next().unwrap_or_default();
        let mse_score = parse_score(line, score_field)?;

        let mut assignments: Vec<Assignment> = Vec::with_capacity(4);
        for field in fields {
            let assignment = parse_assignment(line, field, filenames)?;
            if let Some(clash) = assignments
                .iter()
                .find(|a| a.label == assignment.label || a.pseudonym == assignment.pseudonym)
            {
                return Err(integrity_error(
                    line,
                    &format!(
                        "'{}' conflicts with '{}:{}'",
                        field, clash.pseudonym, clash.label
                    ),
                ));
            }
            assignments.push(assignment);
        }

        if assignments.len() != PositionLabel::ALL.len() {
            return Err(integrity_error(
                line,
                &format!(
                    "expected {} fragment assignments, found {}",
                    PositionLabel::ALL.len(),
                    assignments.len()
                ),
            ));
        }

        Ok(Self {
            mse_score,
            assignments,
        })
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCORE_PREFIX}{}", self.mse_score)?;
        for assignment in &self.assignments {
            write!(f, ",{}:{}", assignment.pseudonym, assignment.label)?;
        }
        Ok(())
    }
}

/// Read the score twice, once as the last `:` piece and once as the whole embedded token
fn parse_score(line: usize, field: &str) -> Result<i64> {
    let embedded = field.strip_prefix(SCORE_PREFIX).ok_or_else(|| {
        integrity_error(line, &format!("score field '{field}' lacks '{SCORE_PREFIX}'"))
    })?;
    let parsed = field
        .rsplit(':')
        .next()
        .unwrap_or_default()
        .parse::<i64>()
        .map_err(|e| integrity_error(line, &format!("score in '{field}' is not an integer: {e}")))?;

    match embedded.parse::<i64>() {
        Ok(value) if value == parsed => Ok(parsed),
        _ => Err(integrity_error(
            line,
            &format!("embedded score token '{embedded}' disagrees with parsed score {parsed}"),
        )),
    }
}

fn parse_assignment(line: usize, field: &str, filenames: &[String]) -> Result<Assignment> {
    let (pseudonym, label) = field.rsplit_once(':').ok_or_else(|| {
        integrity_error(line, &format!("assignment '{field}' lacks a position label"))
    })?;
    let label: PositionLabel = label.parse().map_err(|e: String| integrity_error(line, &e))?;

    let number = pseudonym
        .strip_prefix(PSEUDONYM_PREFIX)
        .and_then(|rest| rest.strip_suffix(PSEUDONYM_SUFFIX))
        .and_then(|digits| digits.parse::<usize>().ok())
        .filter(|&n| n >= 1)
        .ok_or_else(|| {
            integrity_error(
                line,
                &format!(
                    "pseudonym '{pseudonym}' is not of the form {PSEUDONYM_PREFIX}<N>{PSEUDONYM_SUFFIX}"
                ),
            )
        })?;
    let identity = filenames.get(number - 1).ok_or_else(|| {
        integrity_error(
            line,
            &format!(
                "pseudonym '{pseudonym}' refers to file {number} but only {} file(s) exist",
                filenames.len()
            ),
        )
    })?;

    Ok(Assignment {
        pseudonym: pseudonym.to_string(),
        identity: identity.clone(),
        label,
    })
}

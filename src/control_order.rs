//! Ordering of control ids that follow the `label-digits.fraction-extra`
//! numbering convention (`ac-2`, `ac-11.2`, `si-4.10a`).
//!
//! Ids that do not fit the convention still sort, falling back to plain string
//! order on the label and remainder, so any directory listing has a total
//! deterministic order.

use regex::Regex;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Sort key parsed from a control id.
///
/// Field order matters: the derived `Ord` compares label, then the integer
/// digits, then the integer fraction, then the trailing text.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ControlSortKey {
    pub label: String,
    pub digits: u64,
    pub fraction: u64,
    pub extra: String,
}

impl ControlSortKey {
    pub fn parse(control_id: &str) -> Self {
        let Some((label, remainder)) = control_id.split_once('-') else {
            return Self {
                label: control_id.to_string(),
                ..Default::default()
            };
        };
        let (digits, fraction, extra) = parse_numbered(remainder)
            .unwrap_or_else(|| (0, 0, remainder.to_string()));
        Self {
            label: label.to_string(),
            digits,
            fraction,
            extra,
        }
    }
}

/// `digits.fraction` anywhere in `remainder`, else the first run of digits.
/// Text before the match is dropped; text after it becomes `extra`.
fn parse_numbered(remainder: &str) -> Option<(u64, u64, String)> {
    if let Some(caps) = fraction_pattern()?.captures(remainder) {
        return Some((
            parse_digits(&caps[1]),
            parse_digits(&caps[2]),
            caps[3].to_string(),
        ));
    }
    let caps = digits_pattern()?.captures(remainder)?;
    Some((parse_digits(&caps[1]), 0, caps[2].to_string()))
}

fn fraction_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"([0-9]+)\.([0-9]+)(.*)").ok())
        .as_ref()
}

fn digits_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"([0-9]+)(.*)").ok())
        .as_ref()
}

// Absurdly long digit runs saturate instead of failing the whole sort.
fn parse_digits(digits: &str) -> u64 {
    digits.parse().unwrap_or(u64::MAX)
}

pub fn compare_control_ids(a: &str, b: &str) -> Ordering {
    ControlSortKey::parse(a).cmp(&ControlSortKey::parse(b))
}

/// Control ids (file stems) in numbering order.
pub fn sort_control_ids<S: AsRef<str>>(ids: &mut [S]) {
    ids.sort_by_cached_key(|id| ControlSortKey::parse(id.as_ref()));
}

/// Paths ordered by the control id in their file stem.
pub fn sort_control_paths(paths: &mut [PathBuf]) {
    paths.sort_by_cached_key(|path| ControlSortKey::parse(&file_stem(path)));
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

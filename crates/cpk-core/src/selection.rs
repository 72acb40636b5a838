//! Log file discovery
//!
//! Log file names follow
//! `Variant.HW.Task.Type1.Type2.[Test.]YYYY.MM.DD.HHhMMmSSs.ID.log`. Every
//! configured group turns its filter into a regex, walks its directories and
//! files the matching logs under their test name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{FilenameFilter, GroupConfig};
use crate::error::Result;

/// Marker of the timestamp part; the test name is everything before it
const TIMESTAMP_MARKER: &str = ".201";

const NAME_WILDCARD: &str = "[A-Za-z]+";

fn alternation(values: &[String], wildcard: &str) -> String {
    if values.is_empty() {
        wildcard.to_string()
    } else {
        format!("(?:{})", values.join("|"))
    }
}

impl FilenameFilter {
    /// Build the filename regex. Matches are anchored at the start of the name.
    ///
    /// # Examples
    ///
    /// ```
    /// use cpk_core::config::FilenameFilter;
    ///
    /// let filter = FilenameFilter {
    ///     year: vec!["2018".into()],
    ///     ..FilenameFilter::default()
    /// };
    /// let regex = filter.to_regex().unwrap();
    /// assert!(regex.is_match("Prod.Hw.Task.Diagnostic.Regular.Clock.2018.05.01.12h30m15s.a1.log"));
    /// assert!(!regex.is_match("Prod.Hw.Task.Diagnostic.Regular.Clock.2019.05.01.12h30m15s.a1.log"));
    /// ```
    pub fn to_regex(&self) -> Result<Regex> {
        let test = if self.test.is_empty() {
            format!(r"(?:(?P<test>{NAME_WILDCARD}.*?)\.)?")
        } else {
            format!(r"(?P<test>{})\.", alternation(&self.test, NAME_WILDCARD))
        };
        let pattern = format!(
            concat!(
                r"^(?P<variant>{})\.(?P<hw>{})\.(?P<task>{})\.",
                r"(?P<type1>{})\.(?P<type2>{})\.{}",
                r"(?P<year>{})\.(?P<month>{})\.(?P<day>[0-9]{{2}})\.(?P<time>[a-z0-9]{{9}})\.",
                r"(?P<id>[a-z0-9]+)\.log",
            ),
            alternation(&self.variant, NAME_WILDCARD),
            alternation(&self.hw, NAME_WILDCARD),
            alternation(&self.task, NAME_WILDCARD),
            alternation(&self.transition.type1, NAME_WILDCARD),
            alternation(&self.transition.type2, NAME_WILDCARD),
            test,
            alternation(&self.year, "[0-9]{4}"),
            alternation(&self.month, "[0-9]{2}"),
        );
        Ok(Regex::new(&pattern)?)
    }
}

/// Test name of a log: the file name up to the first `".201"`.
pub fn test_name(file_name: &str) -> &str {
    file_name
        .split_once(TIMESTAMP_MARKER)
        .map_or(file_name, |(name, _)| name)
}

/// Whether a test name contains any exclude token
pub fn is_excluded(test_name: &str, excludes: &[String]) -> bool {
    excludes.iter().any(|token| test_name.contains(token.as_str()))
}

/// Logs of one group for one test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFiles {
    /// 1-based group index, in config order
    pub group: usize,
    pub files: Vec<PathBuf>,
}

/// All logs of one test name, per group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSelection {
    pub name: String,
    pub groups: Vec<GroupFiles>,
}

impl TestSelection {
    fn push(&mut self, group: usize, path: PathBuf) {
        match self.groups.iter_mut().find(|g| g.group == group) {
            Some(files) => files.files.push(path),
            None => self.groups.push(GroupFiles {
                group,
                files: vec![path],
            }),
        }
    }
}

/// Selected logs, tests in order of first discovery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub tests: Vec<TestSelection>,
}

impl Selection {
    /// Total number of selected files
    pub fn file_count(&self) -> usize {
        self.tests
            .iter()
            .flat_map(|t| &t.groups)
            .map(|g| g.files.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

/// Walk every group's directories and collect the matching logs.
///
/// Directory entries are visited in file-name order. Unreadable entries are
/// logged and skipped.
pub fn select_files(groups: &[GroupConfig], excludes: &[String]) -> Result<Selection> {
    let mut selection = Selection::default();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (offset, group) in groups.iter().enumerate() {
        let index = offset + 1;
        let regex = group.filter.to_regex()?;
        let mut matched = 0usize;

        for root in &group.paths {
            for path in walk_files(root) {
                let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if !regex.is_match(file_name) {
                    continue;
                }
                let name = test_name(file_name);
                if is_excluded(name, excludes) {
                    debug!(file = %path.display(), test = name, "Excluded by name");
                    continue;
                }

                let slot = match positions.get(name) {
                    Some(&slot) => slot,
                    None => {
                        positions.insert(name.to_string(), selection.tests.len());
                        selection.tests.push(TestSelection {
                            name: name.to_string(),
                            groups: Vec::new(),
                        });
                        selection.tests.len() - 1
                    }
                };
                selection.tests[slot].push(index, path);
                matched += 1;
            }
        }

        info!(group = index, files = matched, "Selected log files");
    }

    Ok(selection)
}

fn walk_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(root = %root.display(), error = %err, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

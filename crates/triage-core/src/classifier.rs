//! Rule-based failure classifier.
//!
//! An ordered table of `(pattern, title, advice)` rules is matched against the
//! analysis window. The first rule that matches wins, even if later rules
//! would also match; order is part of the contract.
//!
//! Advice templates may contain a single `{}` placeholder. It is replaced by
//! the first capture group that is non-empty once `:` and whitespace are
//! trimmed from it.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};
use serde::Serialize;

use crate::domain::ClassificationResult;

/// Placeholder substituted with the captured value.
pub const PLACEHOLDER: &str = "{}";

/// Optional GitHub log timestamp in front of a line.
macro_rules! line_start {
    () => {
        r"^(?:\d{4}-\d\d-\d\dT\d\d:\d\d:\d\d(?:\.\d+)?Z\s+)?\s*"
    };
}

/// Canonical rules as `(id, pattern, title, advice)`, in evaluation order.
pub const CANONICAL_RULES: &[(&str, &str, &str, &str)] = &[
    (
        "traceback",
        r#"Traceback \(most recent call last\)|Exception in thread "|thread '[^'\n]*' panicked at"#,
        "Exception traceback detected",
        "Read the last frame of the traceback and the exception line below it \
         (e.g. KeyError, ValueError); fix the code or input that raised the exception.",
    ),
    (
        "module_not_found",
        r#"ModuleNotFoundError:\s*(?:No module named\s+)?['"]?([\w.\-]+)|ImportError:\s*No module named\s+['"]?([\w.\-]+)|Cannot find module\s+['"]([^'"\s]+)['"]"#,
        "Module not found",
        "Install the missing module `{}` (add it to requirements.txt / package.json \
         and re-run the install step) or fix the import path.",
    ),
    (
        "test_failures",
        concat!(
            line_start!(),
            r"(?:=+ (?:FAILURES|ERRORS) =+|FAILED \S+::|test result: FAILED|Tests:\s+\d+ failed|\d+ failing\b|--- FAIL: )"
        ),
        "Test failures",
        "Open the first failing test in the report above, reproduce it locally \
         with the same command, and fix the code or the test.",
    ),
    (
        "assertion",
        r"AssertionError|assertion (?:`[^`\n]*` )?failed|expect\(received\)",
        "Assertion in tests",
        "A test assertion failed: compare the expected and actual values printed \
         above and fix the code or update the expectation.",
    ),
    (
        "package_manager",
        r"npm ERR!|npm error\s|ERR_PNPM_\w+|yarn(?:pkg)? error|error An unexpected error occurred|ERROR: (?:Could not find a version that satisfies|No matching distribution found|Could not install packages)|E: Unable to locate package",
        "Package manager error",
        "Read the first package-manager error above: check the lockfile, the \
         requested versions and registry access, then re-run the install step.",
    ),
    (
        "command_not_found",
        r"([\w.+\-/]+):\s*command not found",
        "Command not found",
        "Install `{}` in an earlier step (or add it to PATH), or fix the command name.",
    ),
    (
        "missing_path",
        r#"No such file or directory:\s*['"]([^'"\n]+)['"]|can't open file ['"]([^'"\n]+)['"]: \[Errno 2\] No such file or directory|ENOENT:\s*no such file or directory, \w+ ['"]([^'"\n]+)['"]|['"]([^'"\n]+)['"]:\s*No such file or directory|([^\s:'"]+):\s*No such file or directory"#,
        "Missing file or path",
        "Check that `{}` exists at that point of the job: a missing checkout, an \
         artifact that was never built, or a wrong working directory are the usual causes.",
    ),
    (
        "permission_denied",
        r"Permission denied|EACCES|Operation not permitted|Resource not accessible by integration",
        "Permission denied",
        "Make the script executable (chmod +x), check the workflow `permissions:` \
         and token scopes, or avoid writing outside the workspace.",
    ),
    (
        "exit_code",
        r"exit(?:ed with)? (?:code|status)\s*:?\s*[1-9]\d*|non-zero exit (?:code|status)",
        "Generic process failure",
        "A step exited with a non-zero code: scroll up to the first error printed \
         by that step and fix it.",
    ),
];

static CANONICAL: Lazy<Arc<RuleSet>> = Lazy::new(|| {
    Arc::new(RuleSet::from_table(CANONICAL_RULES).expect("canonical rule patterns compile"))
});

/// A single classification rule.
#[derive(Debug, Clone)]
pub struct Rule {
    id: String,
    pattern: Regex,
    title: String,
    advice: String,
}

impl Rule {
    /// Compile a rule. Patterns match case-insensitively with `^`/`$` at line boundaries.
    pub fn new(
        id: impl Into<String>,
        pattern: &str,
        title: impl Into<String>,
        advice: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .multi_line(true)
            .build()?;
        Ok(Self {
            id: id.into(),
            pattern,
            title: title.into(),
            advice: advice.into(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn advice(&self) -> &str {
        &self.advice
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Apply the rule to `text`; `None` when it does not match.
    pub fn apply(&self, text: &str) -> Option<ClassificationResult> {
        let caps = self.pattern.captures(text)?;
        let captured = first_capture(&caps);
        let advice = match &captured {
            Some(value) if self.advice.contains(PLACEHOLDER) => {
                self.advice.replacen(PLACEHOLDER, value, 1)
            }
            _ => self.advice.clone(),
        };
        Some(ClassificationResult {
            rule_id: Some(self.id.clone()),
            title: self.title.clone(),
            advice,
            captured,
        })
    }
}

/// First capture group, left to right, that is non-empty after trimming.
fn first_capture(caps: &Captures<'_>) -> Option<String> {
    caps.iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str().trim_matches(|c: char| c == ':' || c.is_whitespace()))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Ordered, immutable list of rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

/// Row of [`RuleSet::describe`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RuleDescription {
    pub position: usize,
    pub id: String,
    pub title: String,
    pub pattern: String,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Compile a table of `(id, pattern, title, advice)` rows.
    pub fn from_table(table: &[(&str, &str, &str, &str)]) -> Result<Self, regex::Error> {
        let rules = table
            .iter()
            .map(|(id, pattern, title, advice)| Rule::new(*id, pattern, *title, *advice))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    /// The built-in rule order, compiled once per process.
    pub fn canonical() -> Arc<RuleSet> {
        Arc::clone(&CANONICAL)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Classify `text`: first matching rule wins, otherwise the fallback.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(text))
            .unwrap_or_else(ClassificationResult::undetected)
    }

    /// 1-based listing of the rules in evaluation order.
    pub fn describe(&self) -> Vec<RuleDescription> {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, rule)| RuleDescription {
                position: i + 1,
                id: rule.id.clone(),
                title: rule.title.clone(),
                pattern: rule.pattern().to_string(),
            })
            .collect()
    }
}

/// Classify `text` with the canonical rules.
pub fn classify(text: &str) -> ClassificationResult {
    CANONICAL.classify(text)
}

//! Named pass/fail checks applied to every answer response

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Status code and body of a response as it came off the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedResponse {
    pub status: u16,
    pub body: String,
}

impl CapturedResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// The fixed set of checks, in reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    Status200,
    ContainsAnswer,
    ContainsClass1,
    ContainsClass2,
}

impl Check {
    pub const ALL: [Check; 4] = [
        Check::Status200,
        Check::ContainsAnswer,
        Check::ContainsClass1,
        Check::ContainsClass2,
    ];

    /// Human readable check name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            Check::Status200 => "status was 200",
            Check::ContainsAnswer => "response contains answer",
            Check::ContainsClass1 => "response contains class_1",
            Check::ContainsClass2 => "response contains class_2",
        }
    }

    /// Response field inspected by this check, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Check::Status200 => None,
            Check::ContainsAnswer => Some("answer"),
            Check::ContainsClass1 => Some("class_1"),
            Check::ContainsClass2 => Some("class_2"),
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Check::Status200 => 0,
            Check::ContainsAnswer => 1,
            Check::ContainsClass1 => 2,
            Check::ContainsClass2 => 3,
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of every check for one response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckResults {
    outcomes: [bool; 4],
    body_parsed: bool,
}

impl CheckResults {
    /// Result for a request that never produced a response
    pub fn all_failed() -> Self {
        Self {
            outcomes: [false; 4],
            body_parsed: false,
        }
    }

    pub fn passed(&self, check: Check) -> bool {
        self.outcomes[check.index()]
    }

    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|&ok| ok)
    }

    /// Whether the body parsed as a JSON object
    pub fn body_parsed(&self) -> bool {
        self.body_parsed
    }

    /// Check name to outcome, in reporting order
    pub fn iter(&self) -> impl Iterator<Item = (Check, bool)> + '_ {
        Check::ALL.iter().map(move |&check| (check, self.passed(check)))
    }

    pub fn failures(&self) -> impl Iterator<Item = Check> + '_ {
        self.iter().filter(|(_, ok)| !ok).map(|(check, _)| check)
    }
}

/// Evaluate every check against a response.
///
/// Never fails: a malformed body just makes every field check false.
pub fn evaluate(response: &CapturedResponse) -> CheckResults {
    let parsed = serde_json::from_str::<JsonValue>(&response.body)
        .ok()
        .filter(JsonValue::is_object);

    let mut outcomes = [false; 4];
    for check in Check::ALL {
        outcomes[check.index()] = match check.field() {
            None => response.status == 200,
            Some(field) => parsed
                .as_ref()
                .and_then(|body| body.get(field))
                .and_then(JsonValue::as_str)
                .is_some_and(|value| !value.is_empty()),
        };
    }

    CheckResults {
        outcomes,
        body_parsed: parsed.is_some(),
    }
}

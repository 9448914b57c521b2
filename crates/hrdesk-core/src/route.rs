// ABOUTME: Closed vocabulary of workers and supervisor decisions.
// ABOUTME: RouteDecision is always one of FINISH, DataAgent, PolicyAgent, or EmailAgent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label used on the wire for the finish decision.
pub const FINISH_LABEL: &str = "FINISH";

/// Identifies one of the three specialized workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkerId {
    DataAgent,
    PolicyAgent,
    EmailAgent,
}

impl WorkerId {
    /// Every worker, in the order they are presented to the classifier.
    pub const ALL: [WorkerId; 3] = [
        WorkerId::DataAgent,
        WorkerId::PolicyAgent,
        WorkerId::EmailAgent,
    ];

    /// The worker's name as it appears in prompts and message authorship.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerId::DataAgent => "DataAgent",
            WorkerId::PolicyAgent => "PolicyAgent",
            WorkerId::EmailAgent => "EmailAgent",
        }
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label that is not part of the routing vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized route '{0}'")]
pub struct ParseRouteError(pub String);

impl FromStr for WorkerId {
    type Err = ParseRouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkerId::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| ParseRouteError(s.to_string()))
    }
}

/// The supervisor's output for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RouteDecision {
    Worker(WorkerId),
    Finish,
}

impl RouteDecision {
    /// All four wire labels, FINISH first.
    pub fn labels() -> [&'static str; 4] {
        [
            FINISH_LABEL,
            WorkerId::DataAgent.as_str(),
            WorkerId::PolicyAgent.as_str(),
            WorkerId::EmailAgent.as_str(),
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteDecision::Worker(w) => w.as_str(),
            RouteDecision::Finish => FINISH_LABEL,
        }
    }
}

impl fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteDecision {
    type Err = ParseRouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == FINISH_LABEL {
            return Ok(RouteDecision::Finish);
        }
        s.parse().map(RouteDecision::Worker)
    }
}

impl TryFrom<String> for RouteDecision {
    type Error = ParseRouteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RouteDecision> for String {
    fn from(value: RouteDecision) -> Self {
        value.as_str().to_string()
    }
}

impl From<WorkerId> for RouteDecision {
    fn from(value: WorkerId) -> Self {
        RouteDecision::Worker(value)
    }
}

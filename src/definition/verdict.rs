//! @ai:module:intent Expected verdicts and the property-file filter grammar
//! @ai:module:layer domain
//! @ai:module:public_api ExpectedVerdict, VerdictFilter, PropertyFilter
//! @ai:module:stateless true

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

/// @ai:intent Expected outcome of a property for a task.
///            Only a false verdict can name a subproperty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum ExpectedVerdict {
    True,
    False {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subproperty: Option<String>,
    },
    Unknown,
}

impl ExpectedVerdict {
    /// @ai:intent Parse a verdict literal such as `true`, `false` or `false(sub)`
    /// @ai:effects pure
    pub fn parse(value: &str) -> Result<Self> {
        match parse_literal(value)? {
            Literal::True => Ok(ExpectedVerdict::True),
            Literal::False(subproperty) => Ok(ExpectedVerdict::False { subproperty }),
            Literal::Unknown => Ok(ExpectedVerdict::Unknown),
        }
    }

    /// @ai:intent Build a verdict from the loosely typed fields of a task definition
    /// @ai:effects pure
    pub fn from_task_fields(expected: Option<bool>, subproperty: Option<String>) -> Option<Self> {
        match (expected, subproperty) {
            (Some(true), None) => Some(ExpectedVerdict::True),
            (Some(false), subproperty) => Some(ExpectedVerdict::False { subproperty }),
            (None, None) => Some(ExpectedVerdict::Unknown),
            (_, Some(_)) => None,
        }
    }

    pub fn subproperty(&self) -> Option<&str> {
        match self {
            ExpectedVerdict::False { subproperty } => subproperty.as_deref(),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExpectedVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpectedVerdict::True => write!(f, "true"),
            ExpectedVerdict::False { subproperty: None } => write!(f, "false"),
            ExpectedVerdict::False {
                subproperty: Some(sub),
            } => write!(f, "false({})", sub),
            ExpectedVerdict::Unknown => write!(f, "unknown"),
        }
    }
}

/// @ai:intent Verdict constraint of a `<propertyfile>` filter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum VerdictFilter {
    /// No `expectedverdict` attribute: the property file alone selects
    Any,
    True,
    False {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subproperty: Option<String>,
    },
    Unknown,
}

impl VerdictFilter {
    /// @ai:intent Parse the optional `expectedverdict` attribute
    /// @ai:effects pure
    pub fn parse(attribute: Option<&str>) -> Result<Self> {
        let Some(value) = attribute else {
            return Ok(VerdictFilter::Any);
        };

        match parse_literal(value)? {
            Literal::True => Ok(VerdictFilter::True),
            Literal::False(subproperty) => Ok(VerdictFilter::False { subproperty }),
            Literal::Unknown => Ok(VerdictFilter::Unknown),
        }
    }

    /// @ai:intent Check whether an expected verdict satisfies this constraint
    /// @ai:effects pure
    pub fn accepts(&self, expected: &ExpectedVerdict) -> bool {
        match (self, expected) {
            (VerdictFilter::Any, _) => true,
            (VerdictFilter::True, ExpectedVerdict::True) => true,
            (VerdictFilter::Unknown, ExpectedVerdict::Unknown) => true,
            (VerdictFilter::False { subproperty: None }, ExpectedVerdict::False { .. }) => true,
            (
                VerdictFilter::False {
                    subproperty: Some(wanted),
                },
                ExpectedVerdict::False {
                    subproperty: Some(actual),
                },
            ) => wanted == actual,
            _ => false,
        }
    }
}

impl std::fmt::Display for VerdictFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerdictFilter::Any => write!(f, "any"),
            VerdictFilter::True => write!(f, "true"),
            VerdictFilter::False { subproperty: None } => write!(f, "false"),
            VerdictFilter::False {
                subproperty: Some(sub),
            } => write!(f, "false({})", sub),
            VerdictFilter::Unknown => write!(f, "unknown"),
        }
    }
}

/// @ai:intent A `<propertyfile>` element: property file plus verdict constraint.
///            `property_file` is already resolved against the benchmark definition directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyFilter {
    pub property_file: PathBuf,
    pub verdict: VerdictFilter,
}

impl PropertyFilter {
    /// @ai:intent Create a filter from an already resolved path and the raw attribute
    /// @ai:effects pure
    pub fn new(property_file: impl Into<PathBuf>, expected_verdict: Option<&str>) -> Result<Self> {
        Ok(Self {
            property_file: property_file.into(),
            verdict: VerdictFilter::parse(expected_verdict)?,
        })
    }
}

enum Literal {
    True,
    False(Option<String>),
    Unknown,
}

fn false_with_subproperty() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^false\((.+)\)$").expect("Invalid regex"))
}

fn parse_literal(value: &str) -> Result<Literal> {
    let value = value.trim();

    match value {
        "true" => return Ok(Literal::True),
        "false" => return Ok(Literal::False(None)),
        "unknown" => return Ok(Literal::Unknown),
        _ => {}
    }

    false_with_subproperty()
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|sub| Literal::False(Some(sub.as_str().to_string())))
        .ok_or_else(|| Error::InvalidVerdict(value.to_string()))
}

//! Per-class summary budget.
//!
//! A budget lists `(label, proportion)` pairs in the order the summary
//! should present them, plus a target. The target is either an absolute
//! duration in seconds or the count-share sentinel (`-1` when serialized),
//! which selects a proportion of each label's available segments instead.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::segment::ClassLabel;

/// Serialized value of [`SummaryTarget::ShareOfCount`].
pub const COUNT_SHARE_SENTINEL: f64 = -1.0;

/// Budget validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum BudgetError {
    #[error("Budget lists no classes")]
    NoClasses,

    #[error("Invalid proportion {proportion} for label '{label}'")]
    InvalidProportion { label: String, proportion: f64 },

    #[error("Label '{0}' is listed more than once")]
    DuplicateLabel(String),

    #[error("Invalid target duration: {0}")]
    InvalidTarget(f64),
}

/// How large the summary should be.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub enum SummaryTarget {
    /// Aim for this many seconds in total
    Duration(f64),
    /// Take each label's proportion of its own segment count
    ShareOfCount,
}

impl From<f64> for SummaryTarget {
    fn from(secs: f64) -> Self {
        if secs < 0.0 {
            Self::ShareOfCount
        } else {
            Self::Duration(secs)
        }
    }
}

impl From<SummaryTarget> for f64 {
    fn from(target: SummaryTarget) -> Self {
        match target {
            SummaryTarget::Duration(secs) => secs,
            SummaryTarget::ShareOfCount => COUNT_SHARE_SENTINEL,
        }
    }
}

/// Share of the summary reserved for one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClassShare {
    pub label: ClassLabel,
    pub proportion: f64,
}

impl ClassShare {
    pub fn new(label: impl Into<String>, proportion: f64) -> Self {
        Self {
            label: ClassLabel::new(label),
            proportion,
        }
    }
}

/// Ordered class shares plus the summary target.
///
/// Proportions need not sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClassBudgetSpec {
    pub classes: Vec<ClassShare>,
    /// Seconds, or `-1` for a share of each label's segment count
    #[schemars(with = "f64")]
    pub target_duration: SummaryTarget,
}

impl Default for ClassBudgetSpec {
    fn default() -> Self {
        Self {
            classes: vec![
                ClassShare::new("boring", 0.30),
                ClassShare::new("interesting", 0.34),
                ClassShare::new("neutral", 0.36),
            ],
            target_duration: SummaryTarget::Duration(90.0),
        }
    }
}

impl ClassBudgetSpec {
    pub fn new(classes: Vec<ClassShare>, target_duration: SummaryTarget) -> Self {
        Self {
            classes,
            target_duration,
        }
    }

    /// Parse and validate a JSON budget file.
    pub fn from_json(json: &str) -> Result<Self, BudgetParseError> {
        let spec: Self = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Check proportions and target are usable.
    pub fn validate(&self) -> Result<(), BudgetError> {
        if self.classes.is_empty() {
            return Err(BudgetError::NoClasses);
        }

        for (i, share) in self.classes.iter().enumerate() {
            if !share.proportion.is_finite() || share.proportion < 0.0 {
                return Err(BudgetError::InvalidProportion {
                    label: share.label.to_string(),
                    proportion: share.proportion,
                });
            }
            if self.classes[..i].iter().any(|s| s.label == share.label) {
                return Err(BudgetError::DuplicateLabel(share.label.to_string()));
            }
        }

        if let SummaryTarget::Duration(secs) = self.target_duration {
            if !secs.is_finite() {
                return Err(BudgetError::InvalidTarget(secs));
            }
        }

        Ok(())
    }
}

/// Errors reading a budget file.
#[derive(Debug, Error)]
pub enum BudgetParseError {
    #[error("Budget JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] BudgetError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        let spec = ClassBudgetSpec::default();
        assert_eq!(spec.classes.len(), 3);
        assert_eq!(spec.classes[0].label.as_str(), "boring");
        assert_eq!(spec.target_duration, SummaryTarget::Duration(90.0));
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_sentinel_target_parses_as_share_of_count() {
        let json = r#"{"classes":[{"label":"boring","proportion":0.5}],"target_duration":-1}"#;
        let spec = ClassBudgetSpec::from_json(json).unwrap();
        assert_eq!(spec.target_duration, SummaryTarget::ShareOfCount);

        let back = serde_json::to_value(&spec).unwrap();
        assert_eq!(back["target_duration"], serde_json::json!(-1.0));
    }

    #[test]
    fn test_absolute_target_parses() {
        let json = r#"{"classes":[{"label":"neutral","proportion":0.3}],"target_duration":100}"#;
        let spec = ClassBudgetSpec::from_json(json).unwrap();
        assert_eq!(spec.target_duration, SummaryTarget::Duration(100.0));
    }

    #[test]
    fn test_rejects_negative_proportion() {
        let spec = ClassBudgetSpec::new(
            vec![ClassShare::new("boring", -0.1)],
            SummaryTarget::Duration(60.0),
        );
        assert!(matches!(
            spec.validate(),
            Err(BudgetError::InvalidProportion { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_label() {
        let spec = ClassBudgetSpec::new(
            vec![ClassShare::new("boring", 0.3), ClassShare::new("boring", 0.2)],
            SummaryTarget::ShareOfCount,
        );
        assert_eq!(
            spec.validate(),
            Err(BudgetError::DuplicateLabel("boring".to_string()))
        );
    }

    #[test]
    fn test_rejects_empty_budget() {
        let spec = ClassBudgetSpec::new(Vec::new(), SummaryTarget::ShareOfCount);
        assert_eq!(spec.validate(), Err(BudgetError::NoClasses));
    }
}

//! # Certificate Selector
//!
//! Same wire shape as a Kubernetes `LabelSelector` (`matchLabels` plus
//! `matchExpressions`), converted into a kube [`Selector`] for listing and
//! for in-memory matching.

use kube::core::{Expression, Selector};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Label selector over secrets
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSelector {
    /// Exact label matches, all of which must hold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_labels: Option<BTreeMap<String, String>>,
    /// Set-based requirements, all of which must hold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_expressions: Option<Vec<SelectorRequirement>>,
}

/// One set-based requirement
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectorRequirement {
    /// Label key the requirement applies to
    pub key: String,
    /// One of `In`, `NotIn`, `Exists`, `DoesNotExist`
    pub operator: String,
    /// Values for `In`/`NotIn`; must be empty for `Exists`/`DoesNotExist`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("unknown selector operator '{operator}' for key '{key}'")]
    UnknownOperator { key: String, operator: String },
    #[error("operator '{operator}' for key '{key}' requires at least one value")]
    MissingValues { key: String, operator: String },
    #[error("operator '{operator}' for key '{key}' does not take values")]
    UnexpectedValues { key: String, operator: String },
}

impl CertificateSelector {
    /// Convert into a kube [`Selector`]
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] for unknown operators or value lists that
    /// do not fit the operator.
    pub fn to_selector(&self) -> Result<Selector, SelectorError> {
        let mut expressions: Vec<Expression> = self
            .match_labels
            .iter()
            .flatten()
            .map(|(key, value)| Expression::Equal(key.clone(), value.clone()))
            .collect();
        for requirement in self.match_expressions.iter().flatten() {
            expressions.push(requirement.to_expression()?);
        }
        Ok(expressions.into_iter().collect())
    }
}

impl SelectorRequirement {
    fn to_expression(&self) -> Result<Expression, SelectorError> {
        let values: BTreeSet<String> = self.values.iter().flatten().cloned().collect();
        let key = self.key.clone();
        match self.operator.as_str() {
            "In" | "NotIn" if values.is_empty() => Err(SelectorError::MissingValues {
                key,
                operator: self.operator.clone(),
            }),
            "Exists" | "DoesNotExist" if !values.is_empty() => {
                Err(SelectorError::UnexpectedValues {
                    key,
                    operator: self.operator.clone(),
                })
            }
            "In" => Ok(Expression::In(key, values)),
            "NotIn" => Ok(Expression::NotIn(key, values)),
            "Exists" => Ok(Expression::Exists(key)),
            "DoesNotExist" => Ok(Expression::DoesNotExist(key)),
            other => Err(SelectorError::UnknownOperator {
                key,
                operator: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::SelectorExt;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn requirement(key: &str, operator: &str, values: &[&str]) -> SelectorRequirement {
        SelectorRequirement {
            key: key.to_string(),
            operator: operator.to_string(),
            values: if values.is_empty() {
                None
            } else {
                Some(values.iter().map(|v| (*v).to_string()).collect())
            },
        }
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        let selector = CertificateSelector::default().to_selector().unwrap();
        assert!(selector.matches(&labels(&[])));
        assert!(selector.matches(&labels(&[("app", "web")])));
    }

    #[test]
    fn test_match_labels_require_all_pairs() {
        let selector = CertificateSelector {
            match_labels: Some(labels(&[("app", "web"), ("tier", "edge")])),
            match_expressions: None,
        }
        .to_selector()
        .unwrap();
        assert!(selector.matches(&labels(&[("app", "web"), ("tier", "edge"), ("x", "y")])));
        assert!(!selector.matches(&labels(&[("app", "web")])));
    }

    #[test]
    fn test_match_expressions() {
        let selector = CertificateSelector {
            match_labels: None,
            match_expressions: Some(vec![
                requirement("env", "In", &["prod", "staging"]),
                requirement("skip", "DoesNotExist", &[]),
            ]),
        }
        .to_selector()
        .unwrap();
        assert!(selector.matches(&labels(&[("env", "prod")])));
        assert!(!selector.matches(&labels(&[("env", "dev")])));
        assert!(!selector.matches(&labels(&[("env", "prod"), ("skip", "yes")])));
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let err = CertificateSelector {
            match_labels: None,
            match_expressions: Some(vec![requirement("env", "Contains", &["p"])]),
        }
        .to_selector()
        .unwrap_err();
        assert_eq!(
            err,
            SelectorError::UnknownOperator {
                key: "env".to_string(),
                operator: "Contains".to_string()
            }
        );
    }

    #[test]
    fn test_in_without_values_is_rejected() {
        let err = requirement("env", "In", &[]).to_expression().unwrap_err();
        assert!(matches!(err, SelectorError::MissingValues { .. }));
    }

    #[test]
    fn test_exists_with_values_is_rejected() {
        let err = requirement("env", "Exists", &["prod"])
            .to_expression()
            .unwrap_err();
        assert!(matches!(err, SelectorError::UnexpectedValues { .. }));
    }

    #[test]
    fn test_deserializes_label_selector_shape() {
        let selector: CertificateSelector = serde_json::from_value(serde_json::json!({
            "matchLabels": {"app": "web"},
            "matchExpressions": [{"key": "env", "operator": "NotIn", "values": ["dev"]}]
        }))
        .unwrap();
        let selector = selector.to_selector().unwrap();
        assert!(selector.matches(&labels(&[("app", "web"), ("env", "prod")])));
        assert!(!selector.matches(&labels(&[("app", "web"), ("env", "dev")])));
    }
}

//! Condition trees
//!
//! A [`ConditionNode`] is either a leaf naming a predicate and the value it
//! expects, or an AND/OR group of child nodes. Groups short-circuit: AND stops
//! at the first false child, OR at the first true one.
//!
//! Definitions accept three shapes:
//!
//! ```yaml
//! # a map of leaves, implicitly AND-ed
//! post_type: page
//! is_archive: false
//!
//! # a list of nodes, implicitly AND-ed
//! - post_type: page
//! - any: [{ is_homepage: true }, { is_archive: book }]
//!
//! # an explicit group
//! operator: OR
//! conditions: [{ post_type: post }, { post_type: page }]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{trace, warn};

use framering_config::UnknownRuleKeyPolicy;

use crate::context::ContextQuery;
use crate::error::{Result, RulesError};

/// Boolean operator of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "and" | "all" => Some(Operator::And),
            "or" | "any" => Some(Operator::Or),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Operator::And => "all",
            Operator::Or => "any",
        }
    }
}

/// The finite predicate table leaves dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// `is_homepage` / `is_home`: expects a boolean.
    Homepage,
    /// `is_post`: expects a boolean; true when the post type is `post`.
    IsPost,
    /// `is_page`: expects a boolean; true when the post type is `page`.
    IsPage,
    /// `post_type`: expects the post type name.
    PostType,
    /// `is_archive`: a boolean for "any archive", or a post type name.
    Archive,
}

impl Predicate {
    /// Every recognized leaf key.
    pub const KEYS: &'static [&'static str] = &[
        "is_homepage",
        "is_home",
        "is_post",
        "is_page",
        "post_type",
        "is_archive",
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "is_homepage" | "is_home" => Some(Predicate::Homepage),
            "is_post" => Some(Predicate::IsPost),
            "is_page" => Some(Predicate::IsPage),
            "post_type" => Some(Predicate::PostType),
            "is_archive" => Some(Predicate::Archive),
            _ => None,
        }
    }

    fn check_expected(self, key: &str, expected: &Value) -> Result<()> {
        let ok = match self {
            Predicate::Homepage | Predicate::IsPost | Predicate::IsPage => expected.is_boolean(),
            Predicate::PostType => expected.is_string(),
            Predicate::Archive => expected.is_boolean() || expected.is_string(),
        };
        if ok {
            Ok(())
        } else {
            let wanted = match self {
                Predicate::PostType => "a post type name",
                Predicate::Archive => "a boolean or a post type name",
                _ => "a boolean",
            };
            Err(RulesError::InvalidExpected {
                key: key.to_string(),
                message: format!("expected {wanted}, got {expected}"),
            })
        }
    }

    fn evaluate(self, key: &str, expected: &Value, ctx: &dyn ContextQuery) -> Result<bool> {
        self.check_expected(key, expected)?;
        let matched = match (self, expected) {
            (Predicate::Homepage, Value::Bool(want)) => ctx.is_homepage()? == *want,
            (Predicate::IsPost, Value::Bool(want)) => post_type_is(ctx, "post")? == *want,
            (Predicate::IsPage, Value::Bool(want)) => post_type_is(ctx, "page")? == *want,
            (Predicate::PostType, Value::String(wanted)) => post_type_is(ctx, wanted)?,
            (Predicate::Archive, Value::Bool(want)) => ctx.is_archive(None)? == *want,
            (Predicate::Archive, Value::String(post_type)) => ctx.is_archive(Some(post_type))?,
            _ => unreachable!("expected value shape checked above"),
        };
        Ok(matched)
    }
}

fn post_type_is(ctx: &dyn ContextQuery, wanted: &str) -> Result<bool> {
    Ok(ctx.current_post_type()?.as_deref() == Some(wanted))
}

/// A node of a visibility rule tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum ConditionNode {
    Leaf {
        key: String,
        expected: Value,
    },
    Group {
        operator: Operator,
        children: Vec<ConditionNode>,
    },
}

impl ConditionNode {
    pub fn leaf(key: impl Into<String>, expected: impl Into<Value>) -> Self {
        ConditionNode::Leaf {
            key: key.into(),
            expected: expected.into(),
        }
    }

    /// AND over `children`.
    pub fn all(children: Vec<ConditionNode>) -> Self {
        ConditionNode::Group {
            operator: Operator::And,
            children,
        }
    }

    /// OR over `children`.
    pub fn any(children: Vec<ConditionNode>) -> Self {
        ConditionNode::Group {
            operator: Operator::Or,
            children,
        }
    }

    /// A group with no children carries no rule at all.
    pub fn is_empty(&self) -> bool {
        matches!(self, ConditionNode::Group { children, .. } if children.iter().all(ConditionNode::is_empty))
    }

    /// Every leaf in evaluation order.
    pub fn leaves(&self) -> Vec<(&str, &Value)> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<(&'a str, &'a Value)>) {
        match self {
            ConditionNode::Leaf { key, expected } => out.push((key.as_str(), expected)),
            ConditionNode::Group { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// Check every leaf against the predicate table.
    ///
    /// Unknown keys fail under [`UnknownRuleKeyPolicy::Reject`] and are
    /// accepted under [`UnknownRuleKeyPolicy::Ignore`]. Known keys must carry
    /// an expected value of the right shape either way.
    pub fn validate(&self, policy: UnknownRuleKeyPolicy) -> Result<()> {
        for (key, expected) in self.leaves() {
            match Predicate::from_key(key) {
                Some(predicate) => predicate.check_expected(key, expected)?,
                None if policy == UnknownRuleKeyPolicy::Reject => {
                    return Err(RulesError::UnknownKey {
                        key: key.to_string(),
                    })
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Evaluate the tree against `ctx`, short-circuiting groups.
    ///
    /// Leaves with unknown keys pass. Context errors propagate.
    pub fn evaluate(&self, ctx: &dyn ContextQuery) -> Result<bool> {
        match self {
            ConditionNode::Leaf { key, expected } => match Predicate::from_key(key) {
                Some(predicate) => {
                    let matched = predicate.evaluate(key, expected, ctx)?;
                    trace!(key = %key, expected = %expected, matched, "evaluated rule");
                    Ok(matched)
                }
                None => {
                    warn!(key = %key, "unknown rule key treated as passing");
                    Ok(true)
                }
            },
            ConditionNode::Group {
                operator: Operator::And,
                children,
            } => {
                for child in children {
                    if !child.evaluate(ctx)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            ConditionNode::Group {
                operator: Operator::Or,
                children,
            } => {
                for child in children {
                    if child.evaluate(ctx)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    fn from_map(map: &Map<String, Value>) -> Result<Self> {
        if let Some(operator) = map.get("operator") {
            let operator = operator
                .as_str()
                .and_then(Operator::from_key)
                .ok_or_else(|| RulesError::malformed(format!("unknown operator {operator}")))?;
            let children = match map.get("conditions") {
                Some(conditions) => Self::children_of(conditions)?,
                None => Vec::new(),
            };
            return Ok(ConditionNode::Group { operator, children });
        }

        if let (1, Some((key, value))) = (map.len(), map.iter().next()) {
            if let Some(operator) = Operator::from_key(key) {
                return Ok(ConditionNode::Group {
                    operator,
                    children: Self::children_of(value)?,
                });
            }
            return Ok(ConditionNode::leaf(key.clone(), value.clone()));
        }

        Ok(ConditionNode::all(
            map.iter()
                .map(|(key, value)| ConditionNode::leaf(key.clone(), value.clone()))
                .collect(),
        ))
    }

    fn children_of(value: &Value) -> Result<Vec<ConditionNode>> {
        match value {
            Value::Array(items) => items.iter().cloned().map(ConditionNode::try_from).collect(),
            Value::Object(map) => Ok(map
                .iter()
                .map(|(key, value)| ConditionNode::leaf(key.clone(), value.clone()))
                .collect()),
            other => Err(RulesError::malformed(format!(
                "group conditions must be a list or a map, got {other}"
            ))),
        }
    }
}

impl TryFrom<Value> for ConditionNode {
    type Error = RulesError;

    fn try_from(value: Value) -> Result<Self> {
        match &value {
            Value::Array(_) => Ok(ConditionNode::all(Self::children_of(&value)?)),
            Value::Object(map) => Self::from_map(map),
            other => Err(RulesError::malformed(format!(
                "expected a list or a map of rules, got {other}"
            ))),
        }
    }
}

impl From<ConditionNode> for Value {
    fn from(node: ConditionNode) -> Self {
        match node {
            ConditionNode::Leaf { key, expected } => {
                let mut map = Map::new();
                map.insert(key, expected);
                Value::Object(map)
            }
            ConditionNode::Group { operator, children } => {
                let mut map = Map::new();
                map.insert(
                    operator.key().to_string(),
                    Value::Array(children.into_iter().map(Value::from).collect()),
                );
                Value::Object(map)
            }
        }
    }
}

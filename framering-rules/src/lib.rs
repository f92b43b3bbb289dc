//! Visibility rule trees
//!
//! A component is shown only when its [`ConditionNode`] evaluates to true
//! against the current page. Leaves dispatch to a fixed [`Predicate`] table,
//! and every question about the page goes through the host's
//! [`ContextQuery`] implementation.
//!
//! ```
//! use framering_rules::{ConditionNode, StaticContext};
//! use serde_json::json;
//!
//! let rule = ConditionNode::try_from(json!({"post_type": "page"})).unwrap();
//! assert!(rule.evaluate(&StaticContext::editing("page")).unwrap());
//! ```

pub mod condition;
pub mod context;
pub mod error;

pub use condition::{ConditionNode, Operator, Predicate};
pub use context::{ContextQuery, ContextResult, StaticContext};
pub use error::{ContextError, Result, RulesError};

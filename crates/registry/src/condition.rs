//! Condition predicate and the context it is evaluated against.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Opaque context handed unchanged to every condition evaluation in a reload.
///
/// The surrounding session swaps a new context in whenever it changes (see
/// [`crate::Registry::set_condition_context`]); the registry never inspects it.
#[derive(Clone, Default)]
pub struct ConditionContext {
	inner: Option<Arc<dyn Any + Send + Sync>>,
}

impl ConditionContext {
	/// The context used before any session has provided one.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Wraps an arbitrary session value.
	pub fn new<T: Any + Send + Sync>(value: T) -> Self {
		Self {
			inner: Some(Arc::new(value)),
		}
	}

	/// Returns the wrapped value if it is a `T`.
	pub fn get<T: Any>(&self) -> Option<&T> {
		self.inner.as_deref()?.downcast_ref::<T>()
	}

	/// Returns true for the empty context.
	pub fn is_empty(&self) -> bool {
		self.inner.is_none()
	}
}

impl fmt::Debug for ConditionContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConditionContext")
			.field("empty", &self.is_empty())
			.finish()
	}
}

/// Decides whether a dynamic document is included in the next tier.
///
/// A `false` result silently drops the document; it is not an error.
pub trait ConditionPredicate: Send + Sync {
	/// Tests a document (always a JSON object) against the current context.
	fn test(&self, document: &Value, context: &ConditionContext) -> bool;
}

impl<F> ConditionPredicate for F
where
	F: Fn(&Value, &ConditionContext) -> bool + Send + Sync,
{
	fn test(&self, document: &Value, context: &ConditionContext) -> bool {
		self(document, context)
	}
}

/// Predicate that includes every document.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl ConditionPredicate for AcceptAll {
	fn test(&self, _document: &Value, _context: &ConditionContext) -> bool {
		true
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn context_downcasts_to_wrapped_type() {
		let ctx = ConditionContext::new(vec!["nether".to_string()]);
		assert!(!ctx.is_empty());
		assert_eq!(ctx.get::<Vec<String>>().map(Vec::len), Some(1));
		assert!(ctx.get::<u32>().is_none());
		assert!(ConditionContext::empty().get::<Vec<String>>().is_none());
	}

	#[test]
	fn closures_are_predicates() {
		let enabled = |doc: &Value, ctx: &ConditionContext| {
			let Some(flag) = doc.get("requires").and_then(Value::as_str) else {
				return true;
			};
			ctx.get::<Vec<String>>().is_some_and(|flags| flags.iter().any(|f| f == flag))
		};
		let ctx = ConditionContext::new(vec!["nether".to_string()]);
		assert!(enabled.test(&json!({ "requires": "nether" }), &ctx));
		assert!(!enabled.test(&json!({ "requires": "end" }), &ctx));
		assert!(enabled.test(&json!({}), &ConditionContext::empty()));
		assert!(AcceptAll.test(&json!({}), &ctx));
	}
}

//! Ready-made rule trees.

use serde::Deserialize;
use serde::Serialize;

use crate::BlockRule;
use crate::Callback;
use crate::Content;
use crate::Delimiters;
use crate::Pattern;
use crate::Quotes;
use crate::RuleTree;
use crate::ScopeRule;
use crate::Template;
use crate::TransformResult;
use crate::tagged_call;

/// A named, built-in [`RuleTree`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
	/// Backtick literals with `{expr}` interpolation compiled to string
	/// concatenation.
	#[default]
	PhpLiteral,
	/// Backtick literals compiled to a tagged-template call.
	PhpTagged,
}

impl Preset {
	pub fn rule_tree(self) -> TransformResult<RuleTree> {
		match self {
			Self::PhpLiteral => php_literal(),
			Self::PhpTagged => php_tagged(),
		}
	}
}

/// Rewrites `` `Hello {$name}!` `` into `"Hello " . $name . "!"`.
///
/// Backticks inside single or double quoted strings and inside comments are
/// left alone.
pub fn php_literal() -> TransformResult<RuleTree> {
	let expression = ScopeRule::new(
		"expression",
		BlockRule::new(
			Delimiters::new("expression", "{", "}")?,
			Pattern::Template(Template::new("\" . %s . \"")?),
		)
		.with_content(Content::Expression),
	);

	let literal = ScopeRule::new(
		"literal",
		BlockRule::new(
			Delimiters::new("literal", "`", "`")?,
			Pattern::Template(Template::new("\"%s\"")?),
		)
		.with_content(Content::Literal),
	)
	.with_child(expression);

	Ok(RuleTree::new(vec![literal]).with_quotes(Quotes::php()))
}

/// Rewrites `` `A{$a}B` `` into `interleave(["A", "B"], [$a])`.
pub fn php_tagged() -> TransformResult<RuleTree> {
	let tagged = ScopeRule::new(
		"tagged",
		BlockRule::new(
			Delimiters::new("tagged", "`", "`")?,
			Pattern::Callback(Callback::Tagged {
				expression: Delimiters::new("tagged", "{", "}")?,
				callback: tagged_call,
			}),
		)
		.with_content(Content::Literal),
	);

	Ok(RuleTree::new(vec![tagged]).with_quotes(Quotes::php()))
}

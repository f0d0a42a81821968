use crate::*;

pub fn template_rule(
	name: &str,
	open: &str,
	close: &str,
	template: &str,
) -> TransformResult<ScopeRule> {
	let block = BlockRule::new(
		Delimiters::new(name, open, close)?,
		Pattern::Template(Template::new(template)?),
	);

	Ok(ScopeRule::new(name, block))
}

pub fn callback_rule(
	name: &str,
	open: &str,
	close: &str,
	callback: ContentCallback,
) -> TransformResult<ScopeRule> {
	let block = BlockRule::new(
		Delimiters::new(name, open, close)?,
		Pattern::Callback(Callback::Content(callback)),
	);

	Ok(ScopeRule::new(name, block))
}

/// Backtick literals whose `{expr}` blocks are joined with `.(expr).`.
pub fn literal_tree() -> TransformResult<RuleTree> {
	let mut expression = template_rule("expression", "{", "}", "\".(%s).\"")?;
	expression.block.content = Content::Expression;

	let mut literal = template_rule("literal", "`", "`", "\"%s\"")?;
	literal.block.content = Content::Literal;

	Ok(RuleTree::new(vec![literal.with_child(expression)]))
}

pub fn braces() -> TransformResult<Delimiters> {
	Delimiters::new("braces", "{", "}")
}

pub fn uppercase(content: &str) -> Result<String, CallbackError> {
	Ok(content.to_uppercase())
}

pub fn failing(_content: &str) -> Result<String, CallbackError> {
	Err(CallbackError::new("boom"))
}

pub const PHP_SOURCE: &str = r#"<?php
$greeting = `Hello {$user->name}!`;
$query = `SELECT * FROM users WHERE id = {$id}`;
echo "Plain `text` stays";"#;

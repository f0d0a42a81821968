use std::borrow::Cow;
use std::fmt::Display;

use serde::Serialize;
use tracing::debug;
use tracing::instrument;
use tracing::trace;
use tracing::warn;

use crate::Content;
use crate::Delimiters;
use crate::Extent;
use crate::Mode;
use crate::Quotes;
use crate::RuleTree;
use crate::Scope;
use crate::ScopeRule;
use crate::Segment;
use crate::TransformError;
use crate::TransformResult;
use crate::arena::Arena;
use crate::arena::Piece;
use crate::engine::apply;
use crate::lexer::has_escaped;
use crate::lexer::restore_escaped;
use crate::matcher::MatchOptions;
use crate::matcher::find_blocks;
use crate::normalize::prepare;

/// A soft condition met while walking. These never stop a transform; the
/// affected text is passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DiagnosticKind {
	/// A scope start marker with no end marker.
	UnterminatedScope,
	/// A block open delimiter with no close delimiter.
	UnterminatedBlock,
	/// A quote with no closing quote.
	UnterminatedLiteral,
}

impl Display for DiagnosticKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			DiagnosticKind::UnterminatedScope => write!(f, "unterminated scope"),
			DiagnosticKind::UnterminatedBlock => write!(f, "unterminated block"),
			DiagnosticKind::UnterminatedLiteral => write!(f, "unterminated string literal"),
		}
	}
}

/// A soft condition together with where it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformDiagnostic {
	pub kind: DiagnosticKind,
	/// Name of the rule whose scan found the condition.
	pub rule: String,
	/// Byte offset inside the fragment scanned at `depth`. At depth 0 this is
	/// an offset into the source buffer.
	pub offset: usize,
	/// Nesting depth of the rule, 0 for root rules.
	pub depth: usize,
}

impl TransformDiagnostic {
	pub fn message(&self) -> String {
		format!(
			"{} in rule `{}` at offset {} (depth {})",
			self.kind, self.rule, self.offset, self.depth
		)
	}
}

/// The output of a transform together with its soft diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
	pub output: String,
	pub diagnostics: Vec<TransformDiagnostic>,
}

impl Transformed {
	pub fn is_clean(&self) -> bool {
		self.diagnostics.is_empty()
	}
}

/// Rewrite `source` with every rule of `tree`, in order.
///
/// Unterminated scopes, blocks and literals are passed through unchanged. A
/// failing callback aborts the whole transform.
pub fn transform(source: impl AsRef<str>, tree: &RuleTree, mode: Mode) -> TransformResult<String> {
	transform_with_diagnostics(source, tree, mode).map(|transformed| transformed.output)
}

/// Like [`transform`], but also returns the soft diagnostics collected while
/// walking.
pub fn transform_with_diagnostics(
	source: impl AsRef<str>,
	tree: &RuleTree,
	mode: Mode,
) -> TransformResult<Transformed> {
	let source = source.as_ref();
	let (arena, root) = Arena::new(source);
	let mut walker = ScopeWalker {
		arena,
		mode,
		diagnostics: Vec::new(),
	};
	let level = Level {
		depth: 0,
		quotes: tree.quotes,
	};

	let mut current = root;
	for rule in &tree.rules {
		let pieces = walker.walk(current, rule, level)?;
		current = walker.arena.flatten(&pieces);
	}

	let output = walker.arena.text(current).to_string();
	debug!(
		input = source.len(),
		output = output.len(),
		diagnostics = walker.diagnostics.len(),
		"transform complete"
	);

	Ok(Transformed {
		output,
		diagnostics: walker.diagnostics,
	})
}

/// Where in the rule tree a walk is happening.
#[derive(Debug, Clone, Copy)]
struct Level {
	depth: usize,
	/// Quote styles recognised in the fragment at this level.
	quotes: Quotes,
}

impl Level {
	/// The level for the content of a block of kind `content`. A literal body
	/// holds no nested string literals.
	fn enter(self, content: Content) -> Self {
		Self {
			depth: self.depth + 1,
			quotes: match content {
				Content::Literal => Quotes::none(),
				Content::Raw | Content::Expression => self.quotes,
			},
		}
	}
}

struct ScopeWalker<'a> {
	arena: Arena<'a>,
	mode: Mode,
	diagnostics: Vec<TransformDiagnostic>,
}

impl ScopeWalker<'_> {
	/// Apply `rule` to `fragment`. Text outside the rule's scope regions is
	/// copied through verbatim, as are the scope markers.
	#[instrument(level = "trace", skip_all, fields(rule = %rule.name, depth = level.depth))]
	fn walk(&mut self, fragment: Piece, rule: &ScopeRule, level: Level) -> TransformResult<Vec<Piece>> {
		let Scope::Delimited(scope) = &rule.scope else {
			return self.rewrite(fragment, rule, level);
		};

		let options = MatchOptions {
			quotes: level.quotes,
			..MatchOptions::default()
		};
		let regions = find_blocks(self.arena.text(fragment), scope, options);

		if let Some(offset) = regions.unterminated {
			self.report(DiagnosticKind::UnterminatedScope, rule, offset, level);
		}

		let mut output = Vec::with_capacity(regions.set.len());
		for segment in regions.set.iter() {
			match *segment {
				Segment::Text(extent) => output.push(fragment.slice(extent)),
				Segment::Block(region) => {
					output.push(fragment.slice(Extent::new(region.outer.start, region.inner.start)));
					output.extend(self.rewrite(fragment.slice(region.inner), rule, level)?);
					output.push(fragment.slice(Extent::new(region.inner.end, region.outer.end)));
				}
			}
		}

		Ok(output)
	}

	/// Replace every block of `rule` inside `region`.
	fn rewrite(&mut self, region: Piece, rule: &ScopeRule, level: Level) -> TransformResult<Vec<Piece>> {
		let block = &rule.block;
		let options = MatchOptions::for_content(block.content, block.nesting, level.quotes);
		let matches = find_blocks(self.arena.text(region), &block.delimiters, options);

		if let Some(offset) = matches.unterminated {
			self.report(DiagnosticKind::UnterminatedBlock, rule, offset, level);
		}

		if let Some(offset) = matches.open_literal {
			self.report(DiagnosticKind::UnterminatedLiteral, rule, offset, level);
		}

		let mut output = Vec::with_capacity(matches.set.len());
		for segment in matches.set.iter() {
			match *segment {
				Segment::Text(extent) if matches.is_remainder(extent) => {
					output.push(region.slice(extent));
				}
				Segment::Text(extent) => {
					output.push(self.restore(region.slice(extent), &block.delimiters, level));
				}
				Segment::Block(found) => {
					trace!(
						start = found.outer.start,
						end = found.outer.end,
						"matched block"
					);
					output.push(self.substitute(region.slice(found.inner), rule, level)?);
				}
			}
		}

		Ok(output)
	}

	/// Produce the replacement for one block: prepare its content, run the
	/// child rules over it in order, restore escaped delimiters and apply
	/// the pattern.
	fn substitute(&mut self, inner: Piece, rule: &ScopeRule, level: Level) -> TransformResult<Piece> {
		let block = &rule.block;
		let inner_level = level.enter(block.content);
		let prepared = match prepare(self.arena.text(inner), block.content, self.mode) {
			Cow::Borrowed(_) => None,
			Cow::Owned(text) => Some(text),
		};
		let mut content = match prepared {
			Some(text) => self.arena.push(text),
			None => inner,
		};

		for child in &rule.children {
			let pieces = self.walk(content, child, inner_level)?;
			content = self.arena.flatten(&pieces);
		}

		let content = self.restore(content, &block.delimiters, inner_level);
		let replacement = apply(&block.pattern, self.arena.text(content), inner_level.quotes)
			.map_err(|error| {
				TransformError::CallbackFailure {
					rule: rule.name.clone(),
					message: error.to_string(),
				}
			})?;

		Ok(self.arena.push(replacement))
	}

	/// Strip the backslash from escaped delimiters that were never resolved
	/// into a block.
	fn restore(&mut self, piece: Piece, delimiters: &Delimiters, level: Level) -> Piece {
		let (open, close) = (delimiters.open(), delimiters.close());
		let text = self.arena.text(piece);

		if !has_escaped(text, open, close) {
			return piece;
		}

		let restored = restore_escaped(text, open, close, level.quotes);
		self.arena.push(restored)
	}

	fn report(&mut self, kind: DiagnosticKind, rule: &ScopeRule, offset: usize, level: Level) {
		warn!(rule = %rule.name, offset, depth = level.depth, "{kind}");
		self.diagnostics.push(TransformDiagnostic {
			kind,
			rule: rule.name.clone(),
			offset,
			depth: level.depth,
		});
	}
}

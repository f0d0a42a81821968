use serde::Deserialize;

use crate::CallbackError;
use crate::MatchSet;
use crate::Quotes;
use crate::TransformError;
use crate::TransformResult;

/// The placeholder a [`Template`] substitutes block content into.
pub const TEMPLATE_MARKER: &str = "%s";

/// A simple callback: receives the prepared inner content of a block and
/// returns its replacement.
pub type ContentCallback = fn(&str) -> Result<String, CallbackError>;

/// A tagged-template callback: receives the prepared content together with
/// the literal and expression segments found in it.
pub type TaggedCallback = fn(&TaggedInput<'_>) -> Result<String, CallbackError>;

/// A pair of non-empty open/close markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
	open: String,
	close: String,
}

impl Delimiters {
	/// Create a delimiter pair. `rule` is only used to label the error when a
	/// side is empty.
	pub fn new(
		rule: &str,
		open: impl Into<String>,
		close: impl Into<String>,
	) -> TransformResult<Self> {
		let open = open.into();
		let close = close.into();

		if open.is_empty() {
			return Err(TransformError::InvalidDelimiter {
				rule: rule.to_string(),
				side: "open",
			});
		}

		if close.is_empty() {
			return Err(TransformError::InvalidDelimiter {
				rule: rule.to_string(),
				side: "close",
			});
		}

		Ok(Self { open, close })
	}

	pub fn open(&self) -> &str {
		&self.open
	}

	pub fn close(&self) -> &str {
		&self.close
	}

	/// Whether the same marker opens and closes, e.g. a backtick pair.
	pub fn is_symmetric(&self) -> bool {
		self.open == self.close
	}
}

/// The region of a fragment a [`ScopeRule`] rewrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
	/// The entire fragment.
	Whole,
	/// Each region between a start and end marker. The markers themselves are
	/// copied through unchanged.
	Delimited(Delimiters),
}

/// How the inner text of a block is prepared before child rules and the
/// pattern see it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Content {
	/// Left untouched.
	#[default]
	Raw,
	/// The body of a string literal, normalized with the invocation's
	/// [`Mode`](crate::Mode). Its closing delimiter is found without string
	/// classification since quotes inside the body are body text.
	Literal,
	/// An expression embedded in a normalized literal; quote escapes added by
	/// normalization are removed again.
	Expression,
}

/// Whether repeated open delimiters increase depth before a close is found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nesting {
	#[default]
	Flat,
	/// Balanced matching. Has no effect when open and close are the same.
	Nested,
}

/// A replacement string with exactly one [`TEMPLATE_MARKER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
	source: String,
	marker: usize,
}

impl Template {
	pub fn new(source: impl Into<String>) -> TransformResult<Self> {
		let source = source.into();
		let found = source.matches(TEMPLATE_MARKER).count();

		let (Some(marker), 1) = (source.find(TEMPLATE_MARKER), found) else {
			return Err(TransformError::InvalidTemplate {
				template: source,
				found,
			});
		};

		Ok(Self { source, marker })
	}

	pub fn as_str(&self) -> &str {
		&self.source
	}

	/// Substitute `content` into the marker position.
	pub fn render(&self, content: &str) -> String {
		let prefix = &self.source[..self.marker];
		let suffix = &self.source[self.marker + TEMPLATE_MARKER.len()..];

		let mut rendered = String::with_capacity(prefix.len() + content.len() + suffix.len());
		rendered.push_str(prefix);
		rendered.push_str(content);
		rendered.push_str(suffix);
		rendered
	}
}

#[derive(Debug, Clone)]
pub enum Callback {
	Content(ContentCallback),
	Tagged {
		/// Markers of the expression segments inside the tagged content.
		expression: Delimiters,
		callback: TaggedCallback,
	},
}

/// The replacement strategy for a matched block.
#[derive(Debug, Clone)]
pub enum Pattern {
	Template(Template),
	Callback(Callback),
}

/// The input handed to a [`TaggedCallback`].
#[derive(Debug, Clone, Copy)]
pub struct TaggedInput<'a> {
	/// The prepared content of the tagged block.
	pub fragment: &'a str,
	/// Text and expression blocks found in `fragment`.
	pub matches: &'a MatchSet,
	/// The expression delimiters used to build `matches`.
	pub delimiters: &'a Delimiters,
	/// Quote styles recognised while matching.
	pub quotes: Quotes,
}

#[derive(Debug, Clone)]
pub struct BlockRule {
	pub delimiters: Delimiters,
	pub pattern: Pattern,
	pub content: Content,
	pub nesting: Nesting,
}

impl BlockRule {
	pub fn new(delimiters: Delimiters, pattern: Pattern) -> Self {
		Self {
			delimiters,
			pattern,
			content: Content::default(),
			nesting: Nesting::default(),
		}
	}

	#[must_use]
	pub fn with_content(mut self, content: Content) -> Self {
		self.content = content;
		self
	}

	#[must_use]
	pub fn with_nesting(mut self, nesting: Nesting) -> Self {
		self.nesting = nesting;
		self
	}
}

/// One node of the rule tree. Child rules only ever see the inner content of
/// blocks matched by this rule's [`BlockRule`].
#[derive(Debug, Clone)]
pub struct ScopeRule {
	pub name: String,
	pub scope: Scope,
	pub block: BlockRule,
	pub children: Vec<ScopeRule>,
}

impl ScopeRule {
	pub fn new(name: impl Into<String>, block: BlockRule) -> Self {
		Self {
			name: name.into(),
			scope: Scope::Whole,
			block,
			children: Vec::new(),
		}
	}

	#[must_use]
	pub fn within(mut self, scope: Delimiters) -> Self {
		self.scope = Scope::Delimited(scope);
		self
	}

	#[must_use]
	pub fn with_child(mut self, child: ScopeRule) -> Self {
		self.children.push(child);
		self
	}
}

/// The root rules of one transformation plus the quote styles the string
/// literal scanner recognises. Root rules compose left to right over the
/// whole buffer.
#[derive(Debug, Clone, Default)]
pub struct RuleTree {
	pub rules: Vec<ScopeRule>,
	pub quotes: Quotes,
}

impl RuleTree {
	pub fn new(rules: Vec<ScopeRule>) -> Self {
		Self {
			rules,
			quotes: Quotes::default(),
		}
	}

	#[must_use]
	pub fn with_quotes(mut self, quotes: Quotes) -> Self {
		self.quotes = quotes;
		self
	}
}

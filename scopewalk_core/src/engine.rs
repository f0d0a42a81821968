use crate::Callback;
use crate::CallbackError;
use crate::Delimiters;
use crate::Pattern;
use crate::Quotes;
use crate::Segment;
use crate::TaggedInput;
use crate::lexer::restore_escaped;
use crate::matcher::MatchOptions;
use crate::matcher::find_blocks;
use crate::normalize::unescape_quotes;

/// Name of the runtime function the `tagged` callback emits a call to. It
/// receives the literal segments and the expression values and interleaves
/// them.
pub const TAGGED_FUNCTION: &str = "interleave";

/// Names of the callbacks that can be referenced from configuration.
pub const BUILTIN_CALLBACKS: [&str; 2] = ["tagged", "verbatim"];

/// The literal and expression segments of a tagged block, split for
/// tagged-template reassembly. There is always exactly one more literal than
/// there are expressions; literals that would be missing are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedSegments {
	pub literals: Vec<String>,
	pub expressions: Vec<String>,
}

impl TaggedInput<'_> {
	/// Split the fragment into literal and expression segments. Escaped
	/// expression delimiters in literal text are restored; expression text is
	/// returned verbatim.
	pub fn segments(&self) -> TaggedSegments {
		let mut segments = TaggedSegments::default();
		let mut literal = String::new();

		for segment in self.matches.iter() {
			match segment {
				Segment::Text(extent) => {
					literal.push_str(&restore_escaped(
						extent.slice(self.fragment),
						self.delimiters.open(),
						self.delimiters.close(),
						self.quotes,
					));
				}
				Segment::Block(block) => {
					segments.literals.push(std::mem::take(&mut literal));
					segments
						.expressions
						.push(block.inner.slice(self.fragment).to_string());
				}
			}
		}

		segments.literals.push(literal);
		segments
	}
}

/// Apply `pattern` to the prepared inner content of a block.
///
/// Templates substitute the content into their marker. Content callbacks get
/// the text directly. Tagged callbacks get the text together with the
/// expression blocks found in it.
pub fn apply(pattern: &Pattern, content: &str, quotes: Quotes) -> Result<String, CallbackError> {
	match pattern {
		Pattern::Template(template) => Ok(template.render(content)),
		Pattern::Callback(Callback::Content(callback)) => callback(content),
		Pattern::Callback(Callback::Tagged {
			expression,
			callback,
		}) => {
			let options = MatchOptions {
				quotes,
				..MatchOptions::default()
			};
			let matches = find_blocks(content, expression, options);

			callback(&TaggedInput {
				fragment: content,
				matches: &matches.set,
				delimiters: expression,
				quotes,
			})
		}
	}
}

/// Interleave literal segments with evaluated expression values:
/// `literal[0] + value[0] + literal[1] + … + literal[N-1]`. A value with no
/// literal after it is ignored and a missing value contributes nothing.
pub fn reassemble<L, V>(literals: &[L], values: &[V]) -> String
where
	L: AsRef<str>,
	V: AsRef<str>,
{
	let mut output = String::new();
	let mut values = values.iter();

	for (index, literal) in literals.iter().enumerate() {
		if index > 0 {
			output.push_str(values.next().map_or("", AsRef::as_ref));
		}
		output.push_str(literal.as_ref());
	}

	output
}

/// Look up a built-in callback by name. `expression` is used by callbacks
/// that split their content into expression segments.
pub fn builtin_callback(name: &str, expression: Delimiters) -> Option<Callback> {
	match name {
		"tagged" => {
			Some(Callback::Tagged {
				expression,
				callback: tagged_call,
			})
		}
		"verbatim" => Some(Callback::Content(verbatim)),
		_ => None,
	}
}

/// Tagged-template callback.
///
/// Empty input becomes `""` and text without expressions a single quoted
/// string. Anything else becomes a call to [`TAGGED_FUNCTION`] with the
/// literal segments and the expressions as two ordered lists, so they are
/// interleaved when the generated code runs.
pub fn tagged_call(input: &TaggedInput<'_>) -> Result<String, CallbackError> {
	let segments = input.segments();

	if segments.expressions.is_empty() {
		return Ok(format!("\"{}\"", segments.literals.concat()));
	}

	if let Some(index) = segments
		.expressions
		.iter()
		.position(|expression| expression.trim().is_empty())
	{
		return Err(CallbackError::new(format!(
			"expression {} of the tagged template is empty",
			index + 1
		)));
	}

	let literals = segments
		.literals
		.iter()
		.map(|literal| format!("\"{literal}\""))
		.collect::<Vec<_>>()
		.join(", ");
	let expressions = segments
		.expressions
		.iter()
		.map(|expression| unescape_quotes(expression))
		.collect::<Vec<_>>()
		.join(", ");

	Ok(format!("{TAGGED_FUNCTION}([{literals}], [{expressions}])"))
}

/// Content callback that returns its input unchanged, dropping the block's
/// delimiters.
#[allow(clippy::unnecessary_wraps)]
pub fn verbatim(content: &str) -> Result<String, CallbackError> {
	Ok(content.to_string())
}

use std::borrow::Cow;

use serde::Deserialize;
use serde::Serialize;

use crate::Content;
use crate::lexer::is_escaped;

/// How the body of a literal block is normalized before it is re-quoted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	/// Backslash escapes are kept as inert text: `\n`, `\r` and `\t` pairs are
	/// doubled and every quote is escaped.
	#[default]
	Strict,
	/// Real control characters are dropped, `\n` and `\r` pairs become real
	/// control characters and quotes are escaped once.
	Lenient,
}

/// Normalize the body of a literal block.
pub fn normalize(content: &str, mode: Mode) -> String {
	match mode {
		Mode::Strict => normalize_strict(content),
		Mode::Lenient => normalize_lenient(content),
	}
}

/// Prepare the inner text of a block according to its [`Content`] kind.
pub fn prepare(content: &str, kind: Content, mode: Mode) -> Cow<'_, str> {
	match kind {
		Content::Raw => Cow::Borrowed(content),
		Content::Literal => Cow::Owned(normalize(content, mode)),
		Content::Expression => Cow::Owned(unescape_quotes(content)),
	}
}

fn normalize_strict(content: &str) -> String {
	content
		.replace("\\n", "\\\\n")
		.replace("\\r", "\\\\r")
		.replace("\\t", "\\\\t")
		.replace('"', "\\\"")
}

// The steps run in a fixed order. Changing it changes the result for inputs
// that mix real control characters with their escaped forms.
fn normalize_lenient(content: &str) -> String {
	let stripped: String = content
		.chars()
		.filter(|ch| !matches!(ch, '\n' | '\r' | '\t'))
		.collect();
	let converted = stripped.replace("\\n", "\n").replace("\\r", "\r");
	let reescaped = escape_backslash_quotes(&converted);
	escape_bare_quotes(&reescaped)
}

/// `\"` whose backslash is not itself escaped becomes `\\\"`, so the quote
/// stays escaped once the backslash is.
fn escape_backslash_quotes(text: &str) -> String {
	let bytes = text.as_bytes();
	let mut output = String::with_capacity(text.len());
	let mut copied = 0;
	let mut index = 0;

	while index + 1 < bytes.len() {
		if starts_unescaped_quote_escape(text, index) {
			output.push_str(&text[copied..index]);
			output.push_str("\\\\\\\"");
			index += 2;
			copied = index;
		} else {
			index += 1;
		}
	}

	output.push_str(&text[copied..]);
	output
}

/// Escape every quote that doesn't already follow an unescaped backslash.
fn escape_bare_quotes(text: &str) -> String {
	let mut output = String::with_capacity(text.len());

	for (index, ch) in text.char_indices() {
		if ch == '"' && !is_escaped(text, index) {
			output.push('\\');
		}
		output.push(ch);
	}

	output
}

/// Undo the quote escaping applied to a literal body: a backslash that is not
/// itself escaped and that precedes a quote is removed.
pub fn unescape_quotes(text: &str) -> String {
	let bytes = text.as_bytes();
	let mut output = String::with_capacity(text.len());
	let mut copied = 0;
	let mut index = 0;

	while index + 1 < bytes.len() {
		if starts_unescaped_quote_escape(text, index) {
			output.push_str(&text[copied..index]);
			index += 1;
			copied = index;
		}
		index += 1;
	}

	output.push_str(&text[copied..]);
	output
}

fn starts_unescaped_quote_escape(text: &str, index: usize) -> bool {
	let bytes = text.as_bytes();
	bytes[index] == b'\\' && bytes[index + 1] == b'"' && !is_escaped(text, index)
}

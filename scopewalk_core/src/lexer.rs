use logos::Logos;
use logos::SpannedIter;
use serde::Deserialize;
use serde::Serialize;

use crate::ClassifiedExtent;
use crate::Extent;

/// Raw tokens produced by logos for flat tokenization of a fragment.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum RawToken {
	/// A backslash and the character it escapes. An escaped quote never opens
	/// a literal.
	#[regex(r"\\(.|\n)")]
	Escape,
	#[token("\"")]
	DoubleQuote,
	#[token("'")]
	SingleQuote,
	#[token("//")]
	#[token("#")]
	LineComment,
	#[token("/*")]
	BlockComment,
	#[token("/")]
	Slash,
	#[regex(r#"[^"'\\/#]+"#)]
	Text,
}

/// The quote characters that delimit string literals, and whether comments
/// are skipped along with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quotes {
	/// `"..."` literals.
	pub double: bool,
	/// `'...'` literals.
	pub single: bool,
	/// `// ...`, `# ...` and `/* ... */` comments. A line comment ends before
	/// a newline or a `?>` tag, and `#[` opens an attribute rather than a
	/// comment.
	pub comments: bool,
}

impl Default for Quotes {
	fn default() -> Self {
		Self {
			double: true,
			single: false,
			comments: false,
		}
	}
}

impl Quotes {
	/// Both double and single quoted literals.
	pub fn all() -> Self {
		Self {
			double: true,
			single: true,
			comments: false,
		}
	}

	/// No string literals at all; every byte is candidate text.
	pub fn none() -> Self {
		Self {
			double: false,
			single: false,
			comments: false,
		}
	}

	/// PHP source: both quote styles plus comments.
	pub fn php() -> Self {
		Self {
			double: true,
			single: true,
			comments: true,
		}
	}
}

/// Lazily classifies a fragment into alternating candidate extents and
/// skipped (literal or comment) extents.
///
/// Extents are maximal: two candidate extents are never adjacent. A scan can
/// start part way into a fragment with [`LiteralScanner::starting_at`]; the
/// extents it yields are still relative to the whole fragment.
pub struct LiteralScanner<'a> {
	tokens: SpannedIter<'a, RawToken>,
	/// Offset of the scanned slice inside the fragment.
	base: usize,
	/// Length of the scanned slice.
	len: usize,
	quotes: Quotes,
	/// A literal or comment opener seen at the end of a candidate run. It is
	/// only consumed when the next extent is requested.
	opener: Option<(RawToken, usize)>,
	/// Start of the candidate run currently being extended.
	candidate_start: Option<usize>,
	/// Start of a literal that ran to the end of the fragment.
	unterminated: Option<usize>,
	done: bool,
}

impl<'a> LiteralScanner<'a> {
	pub fn new(fragment: &'a str, quotes: Quotes) -> Self {
		Self::starting_at(fragment, 0, quotes)
	}

	pub fn starting_at(fragment: &'a str, offset: usize, quotes: Quotes) -> Self {
		let source = &fragment[offset..];

		Self {
			tokens: RawToken::lexer(source).spanned(),
			base: offset,
			len: source.len(),
			quotes,
			opener: None,
			candidate_start: None,
			unterminated: None,
			done: false,
		}
	}

	/// Offset of a quote that was still open at the end of the fragment. Only
	/// meaningful once the scanner is exhausted.
	pub fn unterminated(&self) -> Option<usize> {
		self.unterminated
	}

	fn extent(&self, start: usize, end: usize) -> Extent {
		Extent::new(start, end).rebase(self.base)
	}

	/// Whether `token`, just lexed, starts a literal or comment under the
	/// current quote set.
	fn opens(&self, token: RawToken) -> bool {
		match token {
			RawToken::DoubleQuote => self.quotes.double,
			RawToken::SingleQuote => self.quotes.single,
			RawToken::LineComment => {
				self.quotes.comments
					&& !(self.tokens.slice() == "#" && self.tokens.remainder().starts_with('['))
			}
			RawToken::BlockComment => self.quotes.comments,
			_ => false,
		}
	}

	/// Consume the literal or comment opened by `token` at `start`. The lexer
	/// must still sit directly after the opener.
	fn skip(&mut self, token: RawToken, start: usize) -> ClassifiedExtent {
		let rest = self.tokens.remainder();

		let length = match token {
			RawToken::DoubleQuote | RawToken::SingleQuote => {
				let quote = if token == RawToken::DoubleQuote { b'"' } else { b'\'' };

				match closing_quote(rest, quote) {
					Some(index) => index + 1,
					None => {
						self.unterminated = Some(start + self.base);
						rest.len()
					}
				}
			}
			RawToken::LineComment => {
				[rest.find('\n'), rest.find("?>")]
					.into_iter()
					.flatten()
					.min()
					.unwrap_or(rest.len())
			}
			_ => rest.find("*/").map_or(rest.len(), |end| end + 2),
		};

		self.tokens.bump(length);
		let extent = self.extent(start, self.tokens.span().end);

		if matches!(token, RawToken::DoubleQuote | RawToken::SingleQuote) {
			ClassifiedExtent::literal(extent)
		} else {
			ClassifiedExtent::comment(extent)
		}
	}
}

/// Offset of the first `quote` in `rest` that isn't consumed by a backslash
/// escape.
fn closing_quote(rest: &str, quote: u8) -> Option<usize> {
	let bytes = rest.as_bytes();
	let mut index = 0;

	while index < bytes.len() {
		match bytes[index] {
			b'\\' => index += 2,
			byte if byte == quote => return Some(index),
			_ => index += 1,
		}
	}

	None
}

impl Iterator for LiteralScanner<'_> {
	type Item = ClassifiedExtent;

	fn next(&mut self) -> Option<Self::Item> {
		if let Some((token, start)) = self.opener.take() {
			return Some(self.skip(token, start));
		}

		if self.done {
			return None;
		}

		while let Some((result, span)) = self.tokens.next() {
			// Unrecognised bytes (a trailing lone backslash) are plain text.
			let Some(token) = result.ok().filter(|&token| self.opens(token)) else {
				self.candidate_start.get_or_insert(span.start);
				continue;
			};

			if let Some(candidate_start) = self.candidate_start.take() {
				self.opener = Some((token, span.start));
				return Some(ClassifiedExtent::candidate(
					self.extent(candidate_start, span.start),
				));
			}

			return Some(self.skip(token, span.start));
		}

		self.done = true;

		self.candidate_start
			.take()
			.map(|start| ClassifiedExtent::candidate(self.extent(start, self.len)))
	}
}

/// The full classification of a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
	pub extents: Vec<ClassifiedExtent>,
	/// Offset of an open quote with no closing quote. The literal is treated
	/// as running to the end of the fragment.
	pub unterminated: Option<usize>,
}

/// Classify every byte of `fragment` as literal, comment or candidate text.
pub fn classify(fragment: &str, quotes: Quotes) -> Classification {
	let mut scanner = LiteralScanner::new(fragment, quotes);
	let extents = scanner.by_ref().collect();

	Classification {
		extents,
		unterminated: scanner.unterminated(),
	}
}

/// Whether the character at `offset` is preceded by an unescaped backslash,
/// i.e. by an odd-length run of backslashes.
pub fn is_escaped(text: &str, offset: usize) -> bool {
	let run = text.as_bytes()[..offset]
		.iter()
		.rev()
		.take_while(|&&byte| byte == b'\\')
		.count();

	run % 2 == 1
}

/// Find the first unescaped occurrence of any of `needles` in `text[from..to]`.
/// Returns the absolute offset and the index of the needle that matched. When
/// two needles match at the same offset the earlier one in `needles` wins.
pub fn find_unescaped(
	text: &str,
	needles: &[&str],
	from: usize,
	to: usize,
) -> Option<(usize, usize)> {
	let mut position = from;

	while position < to {
		let window = &text[position..to];
		let (offset, index) = needles
			.iter()
			.enumerate()
			.filter_map(|(index, needle)| window.find(needle).map(|found| (position + found, index)))
			.min()?;

		if !is_escaped(text, offset) {
			return Some((offset, index));
		}

		position = offset + text[offset..].chars().next().map_or(1, char::len_utf8);
	}

	None
}

/// Strip the escaping backslash from every escaped occurrence of `open` or
/// `close` in candidate text. Literal and comment extents are copied
/// unchanged.
pub fn restore_escaped(text: &str, open: &str, close: &str, quotes: Quotes) -> String {
	let mut restored = String::with_capacity(text.len());

	for classified in LiteralScanner::new(text, quotes) {
		let slice = classified.extent.slice(text);

		if classified.is_candidate() {
			restore_candidate(slice, open, close, &mut restored);
		} else {
			restored.push_str(slice);
		}
	}

	restored
}

/// Whether [`restore_escaped`] would change `text`.
pub(crate) fn has_escaped(text: &str, open: &str, close: &str) -> bool {
	text.contains('\\') && (text.contains(open) || text.contains(close))
}

fn restore_candidate(text: &str, open: &str, close: &str, output: &mut String) {
	let mut copied = 0;
	let mut position = 0;

	while let Some(found) = text[position..].find('\\') {
		let slash = position + found;
		let rest = &text[slash + 1..];

		if is_escaped(text, slash) {
			position = slash + 1;
			continue;
		}

		let delimiter = [open, close]
			.into_iter()
			.find(|delimiter| rest.starts_with(delimiter));

		match delimiter {
			Some(delimiter) => {
				output.push_str(&text[copied..slash]);
				output.push_str(delimiter);
				copied = slash + 1 + delimiter.len();
				position = copied;
			}
			// Skip whatever this backslash escapes so it can't be mistaken for
			// the start of another escape.
			None => position = slash + 1 + rest.chars().next().map_or(0, char::len_utf8),
		}
	}

	output.push_str(&text[copied..]);
}

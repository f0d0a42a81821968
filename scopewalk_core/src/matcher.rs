use crate::BlockMatch;
use crate::ClassifiedExtent;
use crate::Content;
use crate::Delimiters;
use crate::Extent;
use crate::MatchSet;
use crate::Nesting;
use crate::Quotes;
use crate::lexer::LiteralScanner;
use crate::lexer::find_unescaped;

/// Options for one block matching pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
	pub nesting: Nesting,
	pub quotes: Quotes,
	/// Search for the closing delimiter without string classification. Used
	/// for blocks whose body is itself a string literal.
	pub raw_body: bool,
}

impl MatchOptions {
	/// Options for matching the blocks of a rule whose content is `content`.
	pub fn for_content(content: Content, nesting: Nesting, quotes: Quotes) -> Self {
		Self {
			nesting,
			quotes,
			raw_body: content == Content::Literal,
		}
	}
}

/// The result of one block matching pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
	pub set: MatchSet,
	/// Offset of an open delimiter with no matching close. Everything from
	/// here on is a single text segment that must be passed through
	/// unchanged.
	pub unterminated: Option<usize>,
	/// Offset of a quote that was never closed. The literal is treated as
	/// running to the end of the fragment.
	pub open_literal: Option<usize>,
}

impl Matches {
	/// Whether `extent` is the verbatim remainder after an unterminated open
	/// delimiter.
	pub fn is_remainder(&self, extent: Extent) -> bool {
		self.unterminated.is_some_and(|offset| extent.start >= offset)
	}
}

/// Walks the candidate extents of a fragment in order, searching only the text
/// that sits outside string literals and comments.
struct CandidateSearch<'a> {
	fragment: &'a str,
	scanner: LiteralScanner<'a>,
	current: Option<Extent>,
}

impl<'a> CandidateSearch<'a> {
	fn new(fragment: &'a str, offset: usize, quotes: Quotes) -> Self {
		Self {
			fragment,
			scanner: LiteralScanner::starting_at(fragment, offset, quotes),
			current: None,
		}
	}

	/// Find the first unescaped needle at or after `from` that lies in
	/// candidate text. `from` must never move backwards between calls.
	fn find(&mut self, needles: &[&str], from: usize) -> Option<(usize, usize)> {
		loop {
			let extent = match self.current {
				Some(extent) if extent.end > from => extent,
				_ => {
					self.current = Some(self.next_candidate()?);
					continue;
				}
			};

			let found = find_unescaped(self.fragment, needles, extent.start.max(from), extent.end);
			if found.is_some() {
				return found;
			}

			self.current = None;
		}
	}

	fn next_candidate(&mut self) -> Option<Extent> {
		self.scanner
			.by_ref()
			.find(ClassifiedExtent::is_candidate)
			.map(|classified| classified.extent)
	}
}

/// Find every block delimited by `delimiters` in `fragment`.
///
/// An open delimiter only counts when it is unescaped and outside a string
/// literal. The first unescaped close after it ends the block unless nesting
/// is enabled, in which case opens and closes are balanced. An open delimiter
/// with no close leaves the rest of the fragment as unmatched text.
pub fn find_blocks(fragment: &str, delimiters: &Delimiters, options: MatchOptions) -> Matches {
	let open = delimiters.open();
	let close = delimiters.close();
	let mut matches = Matches::default();
	let mut search = CandidateSearch::new(fragment, 0, options.quotes);
	let mut cursor = 0;

	while let Some((open_at, _)) = search.find(&[open], cursor) {
		let inner_start = open_at + open.len();
		let Some(close_at) = find_close(&mut search, delimiters, options, inner_start) else {
			matches.set.push_text(Extent::new(cursor, open_at));
			cursor = open_at;
			matches.unterminated = Some(open_at);
			break;
		};

		let end = close_at + close.len();
		matches.set.push_text(Extent::new(cursor, open_at));
		matches.set.push_block(BlockMatch {
			outer: Extent::new(open_at, end),
			inner: Extent::new(inner_start, close_at),
		});
		cursor = end;

		// The scanner read the literal body as ordinary text, so its view
		// of what follows can't be trusted.
		if options.raw_body {
			search = CandidateSearch::new(fragment, cursor, options.quotes);
		}
	}

	matches.set.push_text(Extent::new(cursor, fragment.len()));
	matches.open_literal = search.scanner.unterminated();
	matches
}

fn find_close(
	search: &mut CandidateSearch<'_>,
	delimiters: &Delimiters,
	options: MatchOptions,
	from: usize,
) -> Option<usize> {
	let nested = options.nesting == Nesting::Nested && !delimiters.is_symmetric();
	let both = [delimiters.close(), delimiters.open()];
	let needles = if nested { &both[..] } else { &both[..1] };
	let mut depth = 0_usize;
	let mut position = from;

	loop {
		let (at, index) = if options.raw_body {
			find_unescaped(search.fragment, needles, position, search.fragment.len())?
		} else {
			search.find(needles, position)?
		};

		if index == 0 {
			if depth == 0 {
				return Some(at);
			}

			depth -= 1;
			position = at + delimiters.close().len();
		} else {
			depth += 1;
			position = at + delimiters.open().len();
		}
	}
}

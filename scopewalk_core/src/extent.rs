use std::ops::Range;

use derive_more::Deref;

/// A half-open byte range `[start, end)` into the fragment currently being
/// scanned. Offsets are relative to that fragment, not the original buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Extent {
	pub start: usize,
	pub end: usize,
}

impl Extent {
	pub fn new(start: usize, end: usize) -> Self {
		debug_assert!(start <= end, "extent start {start} is past its end {end}");
		Self { start, end }
	}

	pub fn len(&self) -> usize {
		self.end - self.start
	}

	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	/// Shift the extent by `base`. Used when a scan of a sub-fragment is
	/// mapped back onto its parent.
	#[must_use]
	pub fn rebase(self, base: usize) -> Self {
		Self::new(self.start + base, self.end + base)
	}

	pub fn range(&self) -> Range<usize> {
		self.start..self.end
	}

	pub fn slice<'a>(&self, text: &'a str) -> &'a str {
		&text[self.range()]
	}
}

impl From<Range<usize>> for Extent {
	fn from(range: Range<usize>) -> Self {
		Self::new(range.start, range.end)
	}
}

/// Whether an extent is skipped by delimiter matching or eligible for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtentKind {
	/// Inside a quoted string literal, quotes included.
	Literal,
	/// A comment, markers included.
	Comment,
	/// Plain text where delimiters may match.
	Candidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedExtent {
	pub kind: ExtentKind,
	pub extent: Extent,
}

impl ClassifiedExtent {
	pub fn literal(extent: impl Into<Extent>) -> Self {
		Self {
			kind: ExtentKind::Literal,
			extent: extent.into(),
		}
	}

	pub fn candidate(extent: impl Into<Extent>) -> Self {
		Self {
			kind: ExtentKind::Candidate,
			extent: extent.into(),
		}
	}

	pub fn comment(extent: impl Into<Extent>) -> Self {
		Self {
			kind: ExtentKind::Comment,
			extent: extent.into(),
		}
	}

	pub fn is_candidate(&self) -> bool {
		self.kind == ExtentKind::Candidate
	}
}

/// One matched block: `outer` includes both delimiters, `inner` excludes
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockMatch {
	pub outer: Extent,
	pub inner: Extent,
}

/// A piece of a scanned fragment: plain text sitting directly in the fragment,
/// or a matched block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
	Text(Extent),
	Block(BlockMatch),
}

impl Segment {
	/// The full extent covered by this segment.
	pub fn extent(&self) -> Extent {
		match self {
			Segment::Text(extent) => *extent,
			Segment::Block(block) => block.outer,
		}
	}
}

/// The ordered, non-overlapping segments produced by one block matching pass.
/// Text segments are never empty, so two blocks with nothing between them are
/// adjacent in the set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct MatchSet(Vec<Segment>);

impl MatchSet {
	pub(crate) fn push_text(&mut self, extent: Extent) {
		if extent.is_empty() {
			return;
		}

		self.push(Segment::Text(extent));
	}

	pub(crate) fn push_block(&mut self, block: BlockMatch) {
		self.push(Segment::Block(block));
	}

	fn push(&mut self, segment: Segment) {
		debug_assert!(
			self.0
				.last()
				.is_none_or(|last| last.extent().end <= segment.extent().start),
			"segments must be ordered and non-overlapping"
		);
		self.0.push(segment);
	}

	/// The matched blocks, in document order.
	pub fn blocks(&self) -> impl Iterator<Item = &BlockMatch> {
		self.0.iter().filter_map(|segment| {
			match segment {
				Segment::Block(block) => Some(block),
				Segment::Text(_) => None,
			}
		})
	}

	pub fn into_segments(self) -> Vec<Segment> {
		self.0
	}
}

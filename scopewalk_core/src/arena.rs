use std::borrow::Cow;

use crate::Extent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BufferId(usize);

/// A slice of one arena buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Piece {
	pub buffer: BufferId,
	pub extent: Extent,
}

impl Piece {
	/// The sub-piece at `extent`, which is relative to the start of this
	/// piece.
	pub fn slice(self, extent: Extent) -> Self {
		debug_assert!(extent.end <= self.extent.len());

		Self {
			buffer: self.buffer,
			extent: extent.rebase(self.extent.start),
		}
	}
}

/// Holds the source buffer and every fragment generated while walking it.
/// Output is assembled from [`Piece`]s so unchanged text is never copied
/// until the final join.
#[derive(Debug)]
pub(crate) struct Arena<'a> {
	buffers: Vec<Cow<'a, str>>,
}

impl<'a> Arena<'a> {
	/// Create an arena over `source`, returning the piece that covers it.
	pub fn new(source: &'a str) -> (Self, Piece) {
		let mut arena = Self {
			buffers: Vec::new(),
		};
		let root = arena.insert(Cow::Borrowed(source));

		(arena, root)
	}

	/// Store a generated fragment.
	pub fn push(&mut self, text: String) -> Piece {
		self.insert(Cow::Owned(text))
	}

	fn insert(&mut self, text: Cow<'a, str>) -> Piece {
		let extent = Extent::new(0, text.len());
		self.buffers.push(text);

		Piece {
			buffer: BufferId(self.buffers.len() - 1),
			extent,
		}
	}

	pub fn text(&self, piece: Piece) -> &str {
		piece.extent.slice(&self.buffers[piece.buffer.0])
	}

	pub fn join(&self, pieces: &[Piece]) -> String {
		let len = pieces.iter().map(|piece| piece.extent.len()).sum();
		let mut joined = String::with_capacity(len);

		for piece in pieces {
			joined.push_str(self.text(*piece));
		}

		joined
	}

	/// Collapse `pieces` into one contiguous piece. A single piece is reused
	/// as is.
	pub fn flatten(&mut self, pieces: &[Piece]) -> Piece {
		if let [piece] = pieces {
			return *piece;
		}

		let joined = self.join(pieces);
		self.push(joined)
	}
}

//! `scopewalk_core` is a lexical rewriting engine for source text. It finds
//! delimited blocks inside nested scopes, skips anything inside string
//! literals, and replaces every block through a template or a callback. The
//! typical use is compiling a language extension, such as backtick template
//! strings with `{expr}` interpolation, down to plain source code.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Source text
//!   → Scope walker (applies each root rule in order, recursing into children)
//!   → Literal scanner (classifies extents as string literal, comment or candidate)
//!   → Block matcher (finds unescaped open/close pairs in candidate text)
//!   → Normalization (prepares literal bodies per strict or lenient mode)
//!   → Substitution engine (renders templates, calls callbacks)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `scopewalk.toml`, including the mode, quote styles, presets and custom rule tables.
//! - [`presets`]: Ready-made rule trees for backtick template literals.
//! - [`artifact`]: Loading sources from disk and materializing output as temporary files.
//!
//! ## Key Types
//!
//! - [`RuleTree`]: The root [`ScopeRule`]s of a transformation and the quote styles to honour.
//! - [`ScopeRule`]: A scope, the [`BlockRule`] applied inside it, and child rules applied to each block's content.
//! - [`Pattern`]: A [`Template`] with one `%s` marker, or a [`Callback`].
//! - [`MatchSet`]: The ordered text and block segments found in a fragment.
//! - [`Transformed`]: Output of a transform together with its [`TransformDiagnostic`]s.
//!
//! ## Quick Start
//!
//! ```rust
//! use scopewalk_core::Mode;
//! use scopewalk_core::presets::php_literal;
//! use scopewalk_core::transform;
//!
//! let tree = php_literal()?;
//! let output = transform("<?php echo `Hello {$name}!`;", &tree, Mode::Strict)?;
//!
//! assert_eq!(output, r#"<?php echo "Hello " . $name . "!";"#);
//! # Ok::<(), scopewalk_core::TransformError>(())
//! ```

pub use config::*;
pub use engine::*;
pub use error::*;
pub use extent::*;
pub use lexer::*;
pub use matcher::*;
pub use normalize::*;
pub use rules::*;
pub use walker::*;

mod arena;
pub mod artifact;
pub mod config;
mod engine;
#[allow(unused_assignments)]
mod error;
mod extent;
mod lexer;
mod matcher;
mod normalize;
pub mod presets;
mod rules;
mod walker;

#[cfg(test)]
mod __fixtures;

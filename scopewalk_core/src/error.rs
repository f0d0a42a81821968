use miette::Diagnostic;
use thiserror::Error;

use crate::BUILTIN_CALLBACKS;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TransformError {
	#[error(transparent)]
	#[diagnostic(code(scopewalk::io_error))]
	Io(#[from] std::io::Error),

	#[error("callback for rule `{rule}` failed: {message}")]
	#[diagnostic(
		code(scopewalk::callback_failure),
		help("the transform was aborted and no output was produced")
	)]
	CallbackFailure { rule: String, message: String },

	#[error("empty {side} delimiter in rule `{rule}`")]
	#[diagnostic(
		code(scopewalk::invalid_delimiter),
		help("every scope and block delimiter must contain at least one character")
	)]
	InvalidDelimiter { rule: String, side: &'static str },

	#[error("template `{template}` must contain exactly one `%s` marker, found {found}")]
	#[diagnostic(code(scopewalk::invalid_template))]
	InvalidTemplate { template: String, found: usize },

	#[error("unknown callback: `{0}`")]
	#[diagnostic(
		code(scopewalk::unknown_callback),
		help("available callbacks: {}", BUILTIN_CALLBACKS.join(", "))
	)]
	UnknownCallback(String),

	#[error("rule `{0}` needs exactly one of `template` or `callback`")]
	#[diagnostic(code(scopewalk::missing_pattern))]
	MissingPattern(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(scopewalk::config_parse),
		help("check that scopewalk.toml is valid TOML with `mode`, `preset` or [[rules]] entries")
	)]
	ConfigParse(String),

	#[error("source file not found: `{path}`")]
	#[diagnostic(code(scopewalk::source_not_found))]
	SourceNotFound { path: String },

	#[error("file too large: `{path}` is {size} bytes (limit: {limit} bytes)")]
	#[diagnostic(
		code(scopewalk::file_too_large),
		help("raise `max_file_size` in scopewalk.toml")
	)]
	FileTooLarge { path: String, size: u64, limit: u64 },
}

/// Error returned by a substitution callback. The walker wraps it into
/// [`TransformError::CallbackFailure`] together with the failing rule's name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CallbackError(pub String);

impl CallbackError {
	pub fn new(message: impl Into<String>) -> Self {
		Self(message.into())
	}
}

pub type TransformResult<T> = Result<T, TransformError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;

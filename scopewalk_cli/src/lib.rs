use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Rewrite delimited blocks in source files.",
	long_about = "scopewalk rewrites delimited blocks inside source files, skipping anything \
	              inside string literals.\n\nBy default it compiles backtick template literals \
	              with `{expr}` interpolation into plain string concatenation.\n\nQuick \
	              start:\n  scopewalk transform page.php     Print the rewritten file\n  \
	              scopewalk check page.php         Report unterminated blocks and literals\n  \
	              scopewalk materialize page.php   Write the rewritten file to a temp path"
)]
pub struct ScopewalkCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to a config file. Defaults to the first of `scopewalk.toml`,
	/// `.scopewalk.toml` or `.config/scopewalk.toml` in the current directory.
	#[arg(long, short, global = true)]
	pub config: Option<PathBuf>,

	/// Use a built-in rule set. Ignored when the config defines its own rules.
	#[arg(long, global = true, value_enum)]
	pub preset: Option<PresetArg>,

	/// How literal bodies are normalized. Overrides the config.
	#[arg(long, global = true, value_enum)]
	pub mode: Option<ModeArg>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Print the rewritten contents of a file.
	///
	/// Unterminated blocks and literals are passed through unchanged. Use
	/// `check` to find them.
	Transform {
		/// The source file to rewrite.
		file: PathBuf,

		/// Write the output to this file instead of stdout.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Show a unified diff between the source and the rewritten output
		/// instead of the output itself.
		#[arg(long, default_value_t = false)]
		diff: bool,
	},
	/// Report unterminated scopes, blocks and string literals.
	///
	/// Exits with status 1 when anything is reported, which makes it suitable
	/// for CI.
	Check {
		/// The source file to check.
		file: PathBuf,

		/// Output format. Use `text` for human-readable output or `json` for
		/// programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Write the rewritten file to a temporary location and print its path.
	///
	/// The file name embeds the original path and keeps its extension. It is
	/// not removed afterwards.
	Materialize {
		/// The source file to rewrite.
		file: PathBuf,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PresetArg {
	/// Backtick literals compiled to string concatenation.
	PhpLiteral,
	/// Backtick literals compiled to an `interleave(...)` call.
	PhpTagged,
}

impl From<PresetArg> for scopewalk_core::presets::Preset {
	fn from(preset: PresetArg) -> Self {
		match preset {
			PresetArg::PhpLiteral => Self::PhpLiteral,
			PresetArg::PhpTagged => Self::PhpTagged,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
	/// Escape sequences stay inert and every quote is escaped.
	Strict,
	/// Escape sequences for newline and carriage return become real control
	/// characters.
	Lenient,
}

impl From<ModeArg> for scopewalk_core::Mode {
	fn from(mode: ModeArg) -> Self {
		match mode {
			ModeArg::Strict => Self::Strict,
			ModeArg::Lenient => Self::Lenient,
		}
	}
}

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::BlockRule;
use crate::Content;
use crate::Delimiters;
use crate::Mode;
use crate::Nesting;
use crate::Pattern;
use crate::Quotes;
use crate::RuleTree;
use crate::ScopeRule;
use crate::Template;
use crate::TransformError;
use crate::TransformResult;
use crate::artifact::LoadOptions;
use crate::builtin_callback;
use crate::presets::Preset;

/// Default maximum source file size in bytes (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"scopewalk.toml",
	".scopewalk.toml",
	".config/scopewalk.toml",
];

/// Configuration loaded from a `scopewalk.toml` file.
///
/// ```toml
/// mode = "lenient"
/// max_file_size = 1048576
///
/// [quotes]
/// double = true
/// single = true
/// comments = true
///
/// [[rules]]
/// name = "literal"
/// open = "`"
/// close = "`"
/// content = "literal"
/// template = "\"%s\""
///
/// [[rules.children]]
/// name = "expression"
/// open = "{"
/// close = "}"
/// content = "expression"
/// template = "\" . %s . \""
/// ```
///
/// When no `[[rules]]` are given the `preset` is used, `php-literal` unless
/// configured otherwise.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopewalkConfig {
	#[serde(default)]
	pub mode: Mode,
	#[serde(default)]
	pub preset: Option<Preset>,
	/// Quote styles recognised outside literal bodies. Overrides the preset's
	/// set when present.
	#[serde(default)]
	pub quotes: Option<Quotes>,
	/// Maximum source file size in bytes. Larger files are rejected.
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
	#[serde(default)]
	pub rules: Vec<RuleConfig>,
}

impl Default for ScopewalkConfig {
	fn default() -> Self {
		Self {
			mode: Mode::default(),
			preset: None,
			quotes: None,
			max_file_size: DEFAULT_MAX_FILE_SIZE,
			rules: Vec::new(),
		}
	}
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}

/// Start and end markers of a delimited scope.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ScopeConfig {
	pub start: String,
	pub end: String,
}

/// Open and close markers of the expressions inside a tagged block.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExpressionConfig {
	pub open: String,
	pub close: String,
}

/// One `[[rules]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
	pub name: String,
	/// Restrict the rule to the regions between these markers. The whole
	/// fragment when absent.
	#[serde(default)]
	pub scope: Option<ScopeConfig>,
	pub open: String,
	pub close: String,
	#[serde(default)]
	pub content: Content,
	#[serde(default)]
	pub nesting: Nesting,
	#[serde(default)]
	pub template: Option<String>,
	/// Name of a built-in callback.
	#[serde(default)]
	pub callback: Option<String>,
	/// Expression markers for the `tagged` callback. Defaults to `{` and `}`.
	#[serde(default)]
	pub expression: Option<ExpressionConfig>,
	#[serde(default)]
	pub children: Vec<RuleConfig>,
}

impl RuleConfig {
	/// Validate the table and convert it, children included, into a
	/// [`ScopeRule`].
	pub fn into_rule(self) -> TransformResult<ScopeRule> {
		let delimiters = Delimiters::new(&self.name, self.open, self.close)?;
		let pattern = match (self.template, self.callback) {
			(Some(template), None) => Pattern::Template(Template::new(template)?),
			(None, Some(callback)) => {
				let expression = match self.expression {
					Some(expression) => Delimiters::new(&self.name, expression.open, expression.close)?,
					None => Delimiters::new(&self.name, "{", "}")?,
				};

				Pattern::Callback(
					builtin_callback(&callback, expression)
						.ok_or(TransformError::UnknownCallback(callback))?,
				)
			}
			_ => return Err(TransformError::MissingPattern(self.name)),
		};

		let block = BlockRule::new(delimiters, pattern)
			.with_content(self.content)
			.with_nesting(self.nesting);
		let mut rule = ScopeRule::new(&self.name, block);

		if let Some(scope) = self.scope {
			rule = rule.within(Delimiters::new(&self.name, scope.start, scope.end)?);
		}

		rule.children = self
			.children
			.into_iter()
			.map(Self::into_rule)
			.collect::<TransformResult<_>>()?;

		Ok(rule)
	}
}

impl ScopewalkConfig {
	/// Resolve the first config file path that exists at `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> TransformResult<Option<Self>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::from_file(&config_path).map(Some)
	}

	/// Load the config from an explicit path.
	pub fn from_file(path: &Path) -> TransformResult<Self> {
		let content = std::fs::read_to_string(path)?;
		Self::parse(&content)
	}

	pub fn parse(content: &str) -> TransformResult<Self> {
		toml::from_str(content).map_err(|e| TransformError::ConfigParse(e.to_string()))
	}

	pub fn load_options(&self) -> LoadOptions {
		LoadOptions {
			max_file_size: self.max_file_size,
		}
	}

	/// Build the rule tree this config describes. Explicit rules win over the
	/// preset.
	pub fn into_rule_tree(self) -> TransformResult<RuleTree> {
		let tree = if self.rules.is_empty() {
			self.preset.unwrap_or_default().rule_tree()?
		} else {
			let rules = self
				.rules
				.into_iter()
				.map(RuleConfig::into_rule)
				.collect::<TransformResult<_>>()?;
			RuleTree::new(rules)
		};

		Ok(match self.quotes {
			Some(quotes) => tree.with_quotes(quotes),
			None => tree,
		})
	}
}

use std::path::Path;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use clap::Parser;
use owo_colors::OwoColorize;
use scopewalk_cli::Commands;
use scopewalk_cli::OutputFormat;
use scopewalk_cli::ScopewalkCli;
use scopewalk_core::AnyEmptyResult;
use scopewalk_core::AnyResult;
use scopewalk_core::Mode;
use scopewalk_core::RuleTree;
use scopewalk_core::ScopewalkConfig;
use scopewalk_core::TransformDiagnostic;
use scopewalk_core::TransformError;
use scopewalk_core::artifact::LoadOptions;
use scopewalk_core::artifact::compile_file;
use scopewalk_core::artifact::load_source;
use scopewalk_core::transform_with_diagnostics;
use serde::Serialize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "SCOPEWALK_LOG";

static USE_COLOR: AtomicBool = AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(Ordering::Relaxed)
}

/// Style `text` with the named `owo_colors` method when color is enabled.
macro_rules! colored {
	($text:expr, $style:ident) => {
		if color_enabled() {
			format!("{}", $text.$style())
		} else {
			format!("{}", $text)
		}
	};
}

/// Pick up `NO_COLOR` and `--no-color`, then install the tracing subscriber
/// and the miette report handler to match.
fn configure_output(args: &ScopewalkCli) {
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	USE_COLOR.store(use_color, Ordering::Relaxed);

	init_tracing(args.verbose);

	let _ = miette::set_hook(Box::new(move |_| {
		let handler = miette::MietteHandlerOpts::new()
			.color(use_color)
			.unicode(use_color)
			.build();
		Box::new(handler)
	}));
}

fn main() {
	let args = ScopewalkCli::parse();

	configure_output(&args);

	let result = match &args.command {
		Some(Commands::Transform { file, output, diff }) => {
			run_transform(&args, file, output.as_deref(), *diff)
		}
		Some(Commands::Check { file, format }) => run_check(&args, file, *format),
		Some(Commands::Materialize { file }) => run_materialize(&args, file),
		None => {
			eprintln!("No subcommand specified. Run `scopewalk --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<TransformError>() {
			Ok(transform_err) => {
				let report: miette::Report = (*transform_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

fn init_tracing(verbose: bool) {
	let default_directive = if verbose { "debug" } else { "error" };
	let filter =
		EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(color_enabled())
		.with_target(false)
		.init();
}

/// Everything a command needs to run a transform.
struct Settings {
	tree: RuleTree,
	mode: Mode,
	options: LoadOptions,
}

/// Load the config (explicit path or discovered in the working directory)
/// and apply the command line overrides.
fn load_settings(args: &ScopewalkCli) -> AnyResult<Settings> {
	let mut config = match &args.config {
		Some(path) => ScopewalkConfig::from_file(path)?,
		None => ScopewalkConfig::load(&std::env::current_dir()?)?.unwrap_or_default(),
	};

	if let Some(preset) = args.preset {
		config.preset = Some(preset.into());
	}

	if let Some(mode) = args.mode {
		config.mode = mode.into();
	}

	let mode = config.mode;
	let options = config.load_options();
	let tree = config.into_rule_tree()?;

	if args.verbose {
		eprintln!(
			"Loaded {} rule(s), mode {mode:?}, limit {} bytes",
			tree.rules.len(),
			options.max_file_size
		);
	}

	Ok(Settings {
		tree,
		mode,
		options,
	})
}

fn run_transform(
	args: &ScopewalkCli,
	file: &Path,
	output: Option<&Path>,
	show_diff: bool,
) -> AnyEmptyResult {
	let settings = load_settings(args)?;
	let source = load_source(file, settings.options)?;
	let transformed = transform_with_diagnostics(&source, &settings.tree, settings.mode)?;

	if !transformed.is_clean() {
		eprintln!(
			"{} {} issue(s) in {} were passed through unchanged. Run `scopewalk check` for \
			 details.",
			colored!("warning:", yellow),
			transformed.diagnostics.len(),
			file.display()
		);
	}

	if let Some(path) = output {
		std::fs::write(path, &transformed.output)?;
		eprintln!("{} {}", colored!("Wrote", green), path.display());
	}

	if show_diff {
		print_diff(file, &source, &transformed.output);
	} else if output.is_none() {
		print!("{}", transformed.output);
	}

	Ok(())
}

#[derive(Serialize)]
struct CheckReport<'a> {
	file: String,
	ok: bool,
	diagnostics: &'a [TransformDiagnostic],
}

fn run_check(args: &ScopewalkCli, file: &Path, format: OutputFormat) -> AnyEmptyResult {
	let settings = load_settings(args)?;
	let source = load_source(file, settings.options)?;
	let transformed = transform_with_diagnostics(&source, &settings.tree, settings.mode)?;
	let is_clean = transformed.is_clean();

	match format {
		OutputFormat::Json => {
			let report = CheckReport {
				file: file.display().to_string(),
				ok: is_clean,
				diagnostics: &transformed.diagnostics,
			};
			println!("{}", serde_json::to_string_pretty(&report)?);
		}
		OutputFormat::Text => {
			if is_clean {
				println!(
					"{}",
					colored!(format!("No issues found in {}.", file.display()), green)
				);
			} else {
				for diagnostic in &transformed.diagnostics {
					println!("{} {}", colored!("warning:", yellow), diagnostic.message());
				}
				println!();
				println!(
					"{} issue(s) found in {}.",
					transformed.diagnostics.len(),
					file.display()
				);
			}
		}
	}

	if !is_clean {
		process::exit(1);
	}

	Ok(())
}

fn run_materialize(args: &ScopewalkCli, file: &Path) -> AnyEmptyResult {
	let settings = load_settings(args)?;
	let artifact = compile_file(file, &settings.tree, settings.mode, settings.options)?;
	let path = artifact.keep()?;

	println!("{}", path.display());

	Ok(())
}

fn print_diff(file: &Path, current: &str, transformed: &str) {
	println!("{}", colored!(format!("--- {}", file.display()), bold));
	println!(
		"{}",
		colored!(format!("+++ {} (transformed)", file.display()), bold)
	);

	let diff = TextDiff::from_lines(current, transformed);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => print!("{}", colored!(format!("-{change}"), red)),
			ChangeTag::Insert => print!("{}", colored!(format!("+{change}"), green)),
			ChangeTag::Equal => print!(" {change}"),
		}

		if change.missing_newline() {
			println!();
		}
	}
}

mod common;

use predicates::prelude::PredicateBooleanExt;
use scopewalk_core::AnyEmptyResult;

const GREETING: &str = "<?php echo `Hello {$name}!`;\n";

#[test]
fn transform_prints_rewritten_source() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = common::write_source(tmp.path(), "page.php", GREETING)?;

	common::scopewalk_cmd()
		.current_dir(tmp.path())
		.arg("transform")
		.arg(&file)
		.assert()
		.success()
		.stdout("<?php echo \"Hello \" . $name . \"!\";\n");

	Ok(())
}

#[test]
fn transform_writes_output_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = common::write_source(tmp.path(), "page.php", GREETING)?;
	let output = tmp.path().join("out.php");

	common::scopewalk_cmd()
		.current_dir(tmp.path())
		.arg("transform")
		.arg(&file)
		.arg("--output")
		.arg(&output)
		.assert()
		.success()
		.stdout("");

	assert_eq!(
		std::fs::read_to_string(&output)?,
		"<?php echo \"Hello \" . $name . \"!\";\n"
	);

	Ok(())
}

#[test]
fn transform_shows_diff() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = common::write_source(tmp.path(), "page.php", GREETING)?;

	common::scopewalk_cmd()
		.current_dir(tmp.path())
		.arg("transform")
		.arg(&file)
		.arg("--diff")
		.assert()
		.success()
		.stdout(
			predicates::str::contains("-<?php echo `Hello {$name}!`;")
				.and(predicates::str::contains(
					"+<?php echo \"Hello \" . $name . \"!\";",
				))
				.and(predicates::str::contains("(transformed)")),
		);

	Ok(())
}

#[test]
fn transform_with_tagged_preset() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = common::write_source(tmp.path(), "page.php", GREETING)?;

	common::scopewalk_cmd()
		.current_dir(tmp.path())
		.arg("--preset")
		.arg("php-tagged")
		.arg("transform")
		.arg(&file)
		.assert()
		.success()
		.stdout("<?php echo interleave([\"Hello \", \"!\"], [$name]);\n");

	Ok(())
}

#[test]
fn transform_with_lenient_mode() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = common::write_source(tmp.path(), "page.php", "echo `a\\nb`;")?;

	common::scopewalk_cmd()
		.current_dir(tmp.path())
		.arg("transform")
		.arg(&file)
		.arg("--mode")
		.arg("lenient")
		.assert()
		.success()
		.stdout("echo \"a\nb\";");

	Ok(())
}

#[test]
fn transform_uses_discovered_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_source(
		tmp.path(),
		"scopewalk.toml",
		"[[rules]]\nname = \"angle\"\nopen = \"[[\"\nclose = \"]]\"\ntemplate = \"<%s>\"\n",
	)?;
	let file = common::write_source(tmp.path(), "page.txt", "a [[b]] `c`")?;

	common::scopewalk_cmd()
		.current_dir(tmp.path())
		.arg("transform")
		.arg(&file)
		.assert()
		.success()
		.stdout("a <b> `c`");

	Ok(())
}

#[test]
fn transform_uses_explicit_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let config = common::write_source(tmp.path(), "rules.toml", "preset = \"php-tagged\"\n")?;
	let file = common::write_source(tmp.path(), "page.php", "`a{1}b`")?;

	common::scopewalk_cmd()
		.current_dir(tmp.path())
		.arg("--config")
		.arg(&config)
		.arg("transform")
		.arg(&file)
		.assert()
		.success()
		.stdout("interleave([\"a\", \"b\"], [1])");

	Ok(())
}

#[test]
fn transform_warns_about_unterminated_blocks() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = common::write_source(tmp.path(), "page.php", "echo `open")?;

	common::scopewalk_cmd()
		.current_dir(tmp.path())
		.arg("transform")
		.arg(&file)
		.assert()
		.success()
		.stdout("echo `open")
		.stderr(predicates::str::contains("warning: 1 issue(s)"));

	Ok(())
}

#[test]
fn transform_fails_for_missing_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::scopewalk_cmd()
		.current_dir(tmp.path())
		.arg("transform")
		.arg(tmp.path().join("missing.php"))
		.assert()
		.code(2)
		.stderr(predicates::str::contains("source file not found"));

	Ok(())
}

#[test]
fn transform_fails_for_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_source(tmp.path(), "scopewalk.toml", "mode = \"loose\"\n")?;
	let file = common::write_source(tmp.path(), "page.php", GREETING)?;

	common::scopewalk_cmd()
		.current_dir(tmp.path())
		.arg("transform")
		.arg(&file)
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}

#[test]
fn transform_fails_when_callback_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = common::write_source(tmp.path(), "page.php", "`a{ }b`")?;

	common::scopewalk_cmd()
		.current_dir(tmp.path())
		.arg("--preset")
		.arg("php-tagged")
		.arg("transform")
		.arg(&file)
		.assert()
		.code(2)
		.stdout("")
		.stderr(predicates::str::contains("callback for rule `tagged` failed"));

	Ok(())
}

#[test]
fn transform_leaves_comments_and_single_quoted_strings() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let source = "<?php\n// he said \"hi\n# `ls`\necho 'run `ls`', `{$a}`;\n";
	let file = common::write_source(tmp.path(), "page.php", source)?;

	common::scopewalk_cmd()
		.current_dir(tmp.path())
		.arg("transform")
		.arg(&file)
		.assert()
		.success()
		.stdout("<?php\n// he said \"hi\n# `ls`\necho 'run `ls`', \"\" . $a . \"\";\n");

	Ok(())
}

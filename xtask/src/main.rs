//! Developer tasks (schema generation, fixture conformance, explain coverage).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use deviceguard_test_util::normalize_nondeterministic;
use schemars::schema_for;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the project root (parent of xtask directory).
fn project_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    match manifest_dir.parent() {
        Some(parent) if manifest_dir.ends_with("xtask") => parent.to_path_buf(),
        _ => manifest_dir,
    }
}

fn schemas_dir() -> PathBuf {
    project_root().join("schemas")
}

fn fixtures_dir() -> PathBuf {
    project_root().join("tests").join("fixtures")
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(deviceguard_types::ReportEnvelope)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(deviceguard_settings::DeviceguardConfigV1)
}

fn generate_snapshot_schema() -> schemars::Schema {
    schema_for!(deviceguard_host::DeviceSnapshot)
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "deviceguard.report.v1.json",
            generate: generate_report_schema,
        },
        SchemaSpec {
            filename: "deviceguard.config.v1.json",
            generate: generate_config_schema,
        },
        SchemaSpec {
            filename: "deviceguard.snapshot.v1.json",
            generate: generate_snapshot_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Validate that schemas in the repo match what would be generated.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }
        let expected = serialize_schema(&(spec.generate)())?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }
    for name in &missing {
        eprintln!("  - missing: {name}");
    }
    for name in &mismatched {
        eprintln!("  - out of date: {name}");
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  conform           Validate fixture inputs and golden reports against the schemas");
    eprintln!("  conform-full      conform + run the deviceguard binary on every fixture");
    eprintln!("  explain-coverage  Validate all check IDs and codes have explanations");
}

fn compile(schema: schemars::Schema) -> anyhow::Result<jsonschema::Validator> {
    let value = serde_json::to_value(schema).context("Failed to serialize schema")?;
    jsonschema::validator_for(&value).map_err(|e| anyhow::anyhow!("Failed to compile schema: {e}"))
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn fixture_dirs() -> anyhow::Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(fixtures_dir()).context("Failed to read tests/fixtures/")? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        dirs.push((name, path));
    }
    dirs.sort();
    Ok(dirs)
}

/// Evidence codes must be known to the explain registry.
fn check_codes(name: &str, report: &Value, errors: &mut Vec<String>) {
    let known = deviceguard_types::explain::all_codes();
    let Some(indicators) = report.get("indicators").and_then(Value::as_array) else {
        return;
    };
    for (i, indicator) in indicators.iter().enumerate() {
        if let Some(code) = indicator.get("code").and_then(Value::as_str)
            && !known.contains(&code)
        {
            errors.push(format!("{name}: indicators[{i}].code '{code}' is not registered"));
        }
    }
}

/// Validate every fixture: snapshot and config against their schemas, golden report against the
/// report schema.
fn conform() -> anyhow::Result<()> {
    let report_schema = compile(generate_report_schema())?;
    let snapshot_schema = compile(generate_snapshot_schema())?;
    let mut errors = Vec::new();
    let mut count = 0;

    for (name, dir) in fixture_dirs()? {
        let device = read_json(&dir.join("device.json"))?;
        for err in snapshot_schema.iter_errors(&device) {
            errors.push(format!("{name}/device.json: {err}"));
        }

        let config_path = dir.join("deviceguard.toml");
        if config_path.exists() {
            let text = fs::read_to_string(&config_path)?;
            if let Err(err) = deviceguard_settings::parse_config_toml(&text) {
                errors.push(format!("{name}/deviceguard.toml: {err:#}"));
            }
        }

        let golden = read_json(&dir.join("expected.report.json"))?;
        for err in report_schema.iter_errors(&golden) {
            errors.push(format!("{name}/expected.report.json: {err}"));
        }
        check_codes(&name, &golden, &mut errors);

        count += 1;
        println!("  ✓ {name}");
    }

    if count == 0 {
        bail!("No fixtures found in {}", fixtures_dir().display());
    }
    if !errors.is_empty() {
        eprintln!("\nConformance errors:");
        for err in &errors {
            eprintln!("  - {err}");
        }
        bail!("Conformance validation failed with {} errors", errors.len());
    }

    println!("\n✓ All {count} fixtures pass conformance checks!");
    Ok(())
}

/// Run the built binary on every fixture and compare with the golden report.
fn conform_full() -> anyhow::Result<()> {
    conform()?;

    println!("\n--- Full conformance: deviceguard binary output ---\n");

    let report_schema = compile(generate_report_schema())?;
    let bin = project_root().join("target").join("debug").join("deviceguard");
    #[cfg(target_os = "windows")]
    let bin = bin.with_extension("exe");

    if !bin.exists() {
        bail!(
            "deviceguard binary not found at {}.\nRun `cargo build -p deviceguard-cli` first.",
            bin.display()
        );
    }

    let mut errors = Vec::new();
    for (name, dir) in fixture_dirs()? {
        let temp_dir = tempfile::tempdir().context("Failed to create temp dir")?;
        let report_out = temp_dir.path().join("report.json");

        let status = std::process::Command::new(&bin)
            .current_dir(&dir)
            .args(["check", "--snapshot", "device.json", "--report-out"])
            .arg(&report_out)
            .status()
            .with_context(|| format!("Failed to run deviceguard on fixture '{name}'"))?;

        // 0 and 2 are verdicts, 1 is a runtime error; all three write a report.
        if !matches!(status.code(), Some(0..=2)) {
            errors.push(format!("{name}: deviceguard exited with {status}"));
            continue;
        }

        let actual = match read_json(&report_out) {
            Ok(v) => v,
            Err(err) => {
                errors.push(format!("{name}: {err:#}"));
                continue;
            }
        };
        for err in report_schema.iter_errors(&actual) {
            errors.push(format!("{name}: schema validation: {err}"));
        }

        let golden = read_json(&dir.join("expected.report.json"))?;
        if normalize_nondeterministic(actual) != normalize_nondeterministic(golden) {
            errors.push(format!("{name}: output differs from expected.report.json"));
        } else {
            println!("  ✓ {name} matches golden report");
        }
    }

    if !errors.is_empty() {
        eprintln!("\nFull conformance errors:");
        for err in &errors {
            eprintln!("  - {err}");
        }
        bail!("Full conformance validation failed with {} errors", errors.len());
    }

    println!("\n✓ Full conformance checks passed!");
    Ok(())
}

/// Validate that all check IDs and codes have explanations.
fn explain_coverage() -> anyhow::Result<()> {
    use deviceguard_types::explain::{all_check_ids, all_codes, lookup_explanation};

    let mut errors = Vec::new();
    for (kind, ids) in [("Check ID", all_check_ids()), ("Code", all_codes())] {
        for id in ids {
            match lookup_explanation(id) {
                Some(exp) => {
                    for (field, text) in [
                        ("title", exp.title),
                        ("description", exp.description),
                        ("remediation", exp.remediation),
                    ] {
                        if text.is_empty() {
                            errors.push(format!("{kind} '{id}' has empty {field}"));
                        }
                    }
                }
                None => errors.push(format!("{kind} '{id}' has no explanation")),
            }
        }
    }

    if errors.is_empty() {
        println!("✓ {} check IDs have explanations", all_check_ids().len());
        println!("✓ {} codes have explanations", all_codes().len());
        return Ok(());
    }
    for error in &errors {
        eprintln!("  - {error}");
    }
    bail!(
        "Explain coverage validation failed with {} errors",
        errors.len()
    )
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(String::as_str).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "conform" => conform(),
        "conform-full" => conform_full(),
        "explain-coverage" => explain_coverage(),
        "print-schema-ids" => {
            println!("{}", deviceguard_types::SCHEMA_REPORT_V1);
            println!("{}", deviceguard_settings::SCHEMA_CONFIG_V1);
            println!("{}", deviceguard_host::SCHEMA_SNAPSHOT_V1);
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}

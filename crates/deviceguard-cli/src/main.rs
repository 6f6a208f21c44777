//! CLI entry point for deviceguard.
//!
//! This module is thin: it handles argument parsing, I/O, logging setup, and exit codes.
//! All business logic lives in the `deviceguard-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use deviceguard_app::{
    CheckInput, DeviceSource, ExplainOutput, format_explanation, format_not_found,
    parse_report_json, render_markdown, run_check, run_explain, runtime_error_report,
    threat_exit_code, write_report, write_text,
};
use deviceguard_host::{DEFAULT_BUILD_PROP, DEFAULT_PACKAGE_ROOT, LiveOptions};
use deviceguard_settings::Overrides;
use time::OffsetDateTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_ENV: &str = "DEVICEGUARD_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "deviceguard",
    version,
    about = "Device integrity evaluator: root, tamper, emulator and debugger detection"
)]
struct Cli {
    /// Path to deviceguard config TOML (missing file is allowed).
    #[arg(long, default_value = "deviceguard.toml")]
    config: Utf8PathBuf,

    /// Override profile (standard|strict|lenient).
    #[arg(long)]
    profile: Option<String>,

    /// Override the trusted signing identity (sha256:<digest>, hex:<bytes> or bare hex).
    #[arg(long)]
    expected_signature: Option<String>,

    /// Override the lowest threat level that fails the run (safe|medium|high|critical).
    #[arg(long)]
    fail_on: Option<String>,

    /// Override how long a privileged shell probe may block, in milliseconds.
    #[arg(long)]
    shell_timeout_ms: Option<u64>,

    /// Log at debug level (otherwise DEVICEGUARD_LOG, default warn).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate device integrity and write artifacts.
    Check {
        /// Evaluate a recorded device snapshot (JSON).
        #[arg(long, required_unless_present = "live", conflicts_with = "live")]
        snapshot: Option<Utf8PathBuf>,

        /// Evaluate the machine this process runs on.
        #[arg(long)]
        live: bool,

        /// Live mode: build.prop file to read build metadata from.
        #[arg(long, requires = "live", default_value = DEFAULT_BUILD_PROP)]
        build_prop: Utf8PathBuf,

        /// Live mode: directory whose subdirectories are installed packages.
        #[arg(long, requires = "live", default_value = DEFAULT_PACKAGE_ROOT)]
        package_root: Utf8PathBuf,

        /// Live mode: hex file holding the application's own signature.
        #[arg(long, requires = "live")]
        signature_file: Option<Utf8PathBuf>,

        /// Where to write the JSON report.
        #[arg(long, default_value = "artifacts/deviceguard/report.json")]
        report_out: Utf8PathBuf,

        /// Write a Markdown report alongside the JSON.
        #[arg(long)]
        write_markdown: bool,

        /// Where to write the Markdown report (if enabled).
        #[arg(long, default_value = "artifacts/deviceguard/comment.md")]
        markdown_out: Utf8PathBuf,
    },

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/deviceguard/report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Explain a check_id or code with remediation guidance.
    Explain {
        /// The check_id (e.g., "integrity.root") or code (e.g., "root_binary_present").
        identifier: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.cmd {
        Commands::Check {
            snapshot,
            live: _,
            build_prop,
            package_root,
            signature_file,
            report_out,
            write_markdown,
            markdown_out,
        } => {
            let source = match snapshot {
                Some(path) => DeviceSource::Snapshot(path.clone()),
                None => DeviceSource::Live(LiveOptions {
                    build_prop: build_prop.clone(),
                    package_root: package_root.clone(),
                    signature_file: signature_file.clone(),
                    ..LiveOptions::default()
                }),
            };
            let markdown_out = write_markdown.then_some(markdown_out.as_path());
            cmd_check(&cli, source, report_out, markdown_out)
        }
        Commands::Md { report, output } => cmd_md(report, output.as_deref()),
        Commands::Explain { identifier } => cmd_explain(identifier),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn cmd_check(
    cli: &Cli,
    source: DeviceSource,
    report_out: &Utf8Path,
    markdown_out: Option<&Utf8Path>,
) -> anyhow::Result<()> {
    let started_at = OffsetDateTime::now_utc();

    let result = (|| -> anyhow::Result<i32> {
        let cfg_text = if cli.config.exists() {
            std::fs::read_to_string(&cli.config)
                .with_context(|| format!("read config: {}", cli.config))?
        } else {
            tracing::debug!(path = %cli.config, "config file not found; using defaults");
            String::new()
        };

        let overrides = Overrides {
            profile: cli.profile.clone(),
            expected_signature: cli.expected_signature.clone(),
            fail_on: cli.fail_on.clone(),
            shell_timeout_ms: cli.shell_timeout_ms,
        };

        let output = run_check(CheckInput {
            config_text: &cfg_text,
            overrides,
            source,
        })?;

        write_report(report_out, &output.report).context("write report json")?;
        if let Some(md_path) = markdown_out {
            write_text(md_path, &render_markdown(&output.report)).context("write markdown")?;
        }

        Ok(threat_exit_code(
            output.threat_level,
            output.resolved_config.fail_on,
        ))
    })();

    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(err) => {
            let report = runtime_error_report(&format!("{err:#}"), started_at);
            if let Err(write_err) = write_report(report_out, &report) {
                tracing::warn!(error = %write_err, "could not write error report");
            }
            eprintln!("deviceguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn cmd_md(report_path: &Utf8Path, output: Option<&Utf8Path>) -> anyhow::Result<()> {
    let report_text = std::fs::read_to_string(report_path)
        .with_context(|| format!("read report: {report_path}"))?;
    let report = parse_report_json(&report_text)?;
    let md = render_markdown(&report);

    match output {
        Some(out_path) => write_text(out_path, &md).context("write markdown output")?,
        None => print!("{md}"),
    }
    Ok(())
}

fn cmd_explain(identifier: &str) -> anyhow::Result<()> {
    match run_explain(identifier) {
        ExplainOutput::Found(exp) => {
            print!("{}", format_explanation(&exp));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available_check_ids,
            available_codes,
        } => {
            eprint!(
                "{}",
                format_not_found(&identifier, available_check_ids, available_codes)
            );
            std::process::exit(1);
        }
    }
}

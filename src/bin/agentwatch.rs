//! AgentWatch CLI binary.
//!
//! Runs the security engine over text from the command line.
//!
//! # Commands
//!
//! - `scan` - Threat analysis of request content
//! - `privacy` - PII scan with masked samples
//! - `audit` - Run both checks over every input line and print the summary
//! - `patterns` - List the rule catalog
//! - `mask` - Mask a value the way PII samples are reported

use std::io::{self, Read};
use std::path::PathBuf;

use agentwatch::security::{threat_severity, PII_PATTERNS, THREAT_TABLES};
use agentwatch::{mask_value, Config, SecurityMonitor, Severity, VERSION};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "agentwatch")]
#[command(version = VERSION)]
#[command(about = "AgentWatch - threat, PII and compliance checks for agent traffic", long_about = None)]
struct Cli {
    /// Config file (default: platform config dir); AGENTWATCH_* env vars override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze content for injection attacks
    Scan {
        /// Content to scan (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Operation name recorded with the finding
        #[arg(short, long, default_value = "user_input")]
        operation: String,

        /// Exit with status 1 when severity reaches this level
        #[arg(long)]
        fail_on: Option<Severity>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check content for personal data
    Privacy {
        /// Content to check (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run threat and privacy checks over each input line
    Audit {
        /// Content (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print the full report instead of the summary
        #[arg(long)]
        report: bool,
    },

    /// List detection rules
    Patterns,

    /// Mask a sensitive value
    Mask {
        /// Value to mask
        value: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Scan {
            input,
            file,
            operation,
            fail_on,
            json,
        } => cmd_scan(cli.config, input, file, &operation, fail_on, json),
        Commands::Privacy { input, file, json } => cmd_privacy(cli.config, input, file, json),
        Commands::Audit {
            input,
            file,
            report,
        } => cmd_audit(cli.config, input, file, report),
        Commands::Patterns => cmd_patterns(),
        Commands::Mask { value } => {
            println!("{}", mask_value(&value));
            Ok(())
        },
    }
}

fn cmd_scan(
    config: Option<PathBuf>,
    input: Option<String>,
    file: Option<PathBuf>,
    operation: &str,
    fail_on: Option<Severity>,
    json_output: bool,
) -> anyhow::Result<()> {
    let content = read_input(input, file)?;
    let monitor = build_monitor(config)?;
    let result = monitor.analyze_request_security(operation, &content);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.safe {
        println!("SAFE ({:.2} ms)", result.analysis_time_ms);
    } else {
        println!(
            "UNSAFE: {} threats, severity {}",
            result.threat_count, result.severity
        );
        println!();
        println!("Detected threats:");
        for threat in &result.threats_detected {
            println!(
                "  - {} ({}) severity: {}",
                threat.rule, threat.category, threat.severity
            );
        }
    }

    if let Some(threshold) = fail_on {
        if !result.safe && result.severity >= threshold {
            std::process::exit(1);
        }
    }
    Ok(())
}

fn cmd_privacy(
    config: Option<PathBuf>,
    input: Option<String>,
    file: Option<PathBuf>,
    json_output: bool,
) -> anyhow::Result<()> {
    let content = read_input(input, file)?;
    let monitor = build_monitor(config)?;
    let result = monitor.check_data_privacy(&content);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "{} ({} types, {} instances)",
        result.compliance_status.as_str().to_uppercase(),
        result.pii_types_count,
        result.total_pii_instances
    );
    for pii in &result.pii_detected {
        println!(
            "  - {:<12} x{:<3} severity: {:<8} samples: {}",
            pii.pii_type.as_str(),
            pii.count,
            pii.severity,
            pii.samples.join(", ")
        );
    }
    Ok(())
}

fn cmd_audit(
    config: Option<PathBuf>,
    input: Option<String>,
    file: Option<PathBuf>,
    report: bool,
) -> anyhow::Result<()> {
    let content = read_input(input, file)?;
    let monitor = build_monitor(config)?;

    for (n, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let operation = format!("line_{}", n + 1);
        monitor.analyze_request_security(&operation, line);
        monitor.check_data_privacy(line);
    }

    if report {
        let report = monitor.generate_security_report();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let summary = monitor.get_security_summary();
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn cmd_patterns() -> anyhow::Result<()> {
    println!("Threat rules:");
    println!("{:<24} {:<18} {:<9} Description", "Name", "Category", "Severity");
    println!("{}", "-".repeat(76));
    for pattern in THREAT_TABLES.iter().flat_map(|t| t.iter()) {
        println!(
            "{:<24} {:<18} {:<9} {}",
            pattern.name,
            pattern.category.as_str(),
            threat_severity(pattern.category.as_str()),
            pattern.description
        );
    }

    println!();
    println!("PII rules:");
    println!("{:<14} {:<9}", "Kind", "Severity");
    println!("{}", "-".repeat(24));
    for pattern in PII_PATTERNS {
        println!(
            "{:<14} {:<9}",
            pattern.kind.as_str(),
            pattern.kind.severity()
        );
    }
    Ok(())
}

// Helper functions

fn init_logging(verbose: bool, json: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_monitor(config: Option<PathBuf>) -> anyhow::Result<SecurityMonitor> {
    let config = match config {
        Some(path) => Config::from_file(path)?.with_env_overrides(),
        None => Config::load()?,
    };
    Ok(SecurityMonitor::with_config(config)?)
}

fn read_input(input: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(path) = file {
        Ok(std::fs::read_to_string(path)?)
    } else if let Some(s) = input {
        if s == "-" {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        } else {
            Ok(s)
        }
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}

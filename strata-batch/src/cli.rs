//! CLI argument definitions for strata-batch.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use strata_core::config::ScanConfig;

/// Strata batch scanner.
///
/// Resolves the project module tree, installs batch extensions and
/// scans every module depth-first, children before parents.
#[derive(Parser, Debug)]
#[command(name = "strata-batch")]
#[command(version, about, long_about = None)]
pub struct BatchCli {
    /// Path to strata.toml configuration file.
    ///
    /// Without this flag `strata.toml` in the working directory is used
    /// if it exists; otherwise defaults and environment variables apply.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Enable the phase-timing profiler for this run.
    #[arg(long)]
    pub profiling: bool,

    /// Set a project property, e.g. `-D project.key=shop`. Repeatable.
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", value_parser = parse_define)]
    pub defines: Vec<(String, String)>,

    /// Build goal to run for every module through the build tool adapter. Repeatable.
    #[arg(long = "goal", value_name = "GOAL")]
    pub goals: Vec<String>,

    /// Format of the summary printed on stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Validate configuration file and exit without scanning.
    #[arg(long)]
    pub validate: bool,
}

impl BatchCli {
    /// Apply command-line overrides on top of a loaded configuration.
    ///
    /// CLI values win over the config file and environment variables.
    pub fn apply_overrides(&self, config: &mut ScanConfig) {
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.general.log_format = format.clone();
        }
        if self.profiling {
            config.diagnostics.profiling = true;
        }
        for (key, value) in &self.defines {
            config.set_property(key.clone(), value.clone());
        }
    }
}

/// Summary output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_define(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("property key must not be empty in '{raw}'"));
    }
    Ok((key.to_owned(), value.trim().to_owned()))
}

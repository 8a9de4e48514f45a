//! hadoopconf CLI
//!
//! Entry point for the `hadoopconf` command-line tool.

use clap::{Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use hadoopconf::resolve::{discover_candidates, WELL_KNOWN_CONF_GLOBS};
use hadoopconf::{
    logging, ConfSource, ConfigError, EnvError, EnvFileSet, EnvVar, HadoopConf, ResolveContext,
    Settings, SettingsError,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process;

/// Environment variable naming the conf directory
const CONF_ENV: &str = "HADOOP_CONF";

#[derive(Parser)]
#[command(name = "hadoopconf")]
#[command(about = "Inspect and edit a Hadoop cluster configuration", version)]
struct Cli {
    /// Base directory of the site and env files (default: $HADOOP_CONF or .)
    #[arg(long, short = 'c', global = true)]
    conf: Option<PathBuf>,

    /// Base directory of the packaged jars (default: the conf directory)
    #[arg(long, short = 'j', global = true)]
    jars: Option<PathBuf>,

    /// Log resolution steps to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Do not back up files before overwriting them
    #[arg(long, global = true)]
    no_backup: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show properties whose names match glob patterns
    Get {
        /// Glob patterns, e.g. 'dfs.namenode.*'
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Change existing properties (NAME=VALUE); unknown names are rejected
    Set {
        #[arg(required = true)]
        assignments: Vec<String>,
    },

    /// Show which files the configuration was resolved from
    Stat {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show environment variables whose names match glob patterns
    Env {
        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// Replace an environment variable's value
    Envset {
        name: String,
        /// New value; multiple words are joined with spaces
        value: Vec<String>,
    },

    /// Add tokens to an environment variable (prepended unless --append)
    Envadd {
        name: String,
        #[arg(required = true)]
        tokens: Vec<String>,

        /// Add at the end instead of the start
        #[arg(long)]
        append: bool,
    },

    /// Remove whole tokens from an environment variable
    Envdel {
        name: String,
        #[arg(required = true)]
        tokens: Vec<String>,
    },

    /// Replace the token starting with PREFIX, or prepend TOKEN if none does
    Envupdate {
        name: String,
        prefix: String,
        token: String,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("set accepts arguments of the form name=value, no '=' in '{0}'")]
    BadAssignment(String),

    #[error("no such property: {}", .0.join(", "))]
    UnknownProperties(Vec<String>),

    #[error("no such variable: {0}")]
    UnknownVariable(String),
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::load_default()?;
    let ctx = ResolveContext::new(
        cli.conf,
        cli.jars,
        cli.no_backup,
        std::env::var(CONF_ENV).ok(),
        &settings,
    );
    tracing::debug!(conf_dir = %ctx.conf_dir.display(), archive_dir = %ctx.archive_dir.display(), "resolve context");

    match cli.command {
        Commands::Get { patterns, json } => run_get(&ctx, &patterns, json),
        Commands::Set { assignments } => run_set(&ctx, &assignments),
        Commands::Stat { json } => run_stat(&ctx, json),
        Commands::Env { patterns } => run_env(&ctx, &patterns),
        Commands::Envset { name, value } => {
            let value = value.join(" ");
            edit_env(&ctx, &name, |v| v.set_value(value))
        }
        Commands::Envadd { name, tokens, append } => {
            let tokens = tokens.join(" ");
            edit_env(&ctx, &name, |v| {
                if append {
                    v.append(&tokens)
                } else {
                    v.prepend(&tokens)
                }
            })
        }
        Commands::Envdel { name, tokens } => edit_env(&ctx, &name, |v| {
            for token in &tokens {
                v.del(token);
            }
        }),
        Commands::Envupdate { name, prefix, token } => {
            edit_env(&ctx, &name, |v| v.update(&prefix, &token))
        }
    }
}

/// Resolve the configuration; on failure, point at likely conf directories
fn load_conf(ctx: &ResolveContext) -> Result<HadoopConf, CliError> {
    HadoopConf::resolve(ctx).map_err(|e| {
        let candidates = discover_candidates(WELL_KNOWN_CONF_GLOBS);
        if !candidates.is_empty() {
            eprintln!("Configuration directories found on this host:");
            for dir in candidates {
                eprintln!("  hadoopconf --conf {}", dir.display());
            }
        }
        CliError::from(e)
    })
}

fn glob_set(patterns: &[String]) -> Result<GlobSet, CliError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[derive(Serialize)]
struct PropertyView {
    name: String,
    value: String,
    source: String,
}

fn run_get(ctx: &ResolveContext, patterns: &[String], json: bool) -> Result<(), CliError> {
    let conf = load_conf(ctx)?;
    let matcher = glob_set(patterns)?;

    let views: Vec<PropertyView> = conf
        .keys()
        .into_iter()
        .filter(|key| matcher.is_match(key))
        .map(|name| {
            let (value, source) = conf.source_get(&name);
            PropertyView {
                source: source.file_name().to_string(),
                name,
                value,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        for v in &views {
            println!("{} {} = {}", v.source, v.name, v.value);
        }
    }
    Ok(())
}

fn run_set(ctx: &ResolveContext, assignments: &[String]) -> Result<(), CliError> {
    let pairs = assignments
        .iter()
        .map(|a| {
            a.split_once('=')
                .ok_or_else(|| CliError::BadAssignment(a.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut conf = load_conf(ctx)?;
    let mut unknown = Vec::new();
    for (name, value) in pairs {
        match conf.set_if_exist(name, value)? {
            (old, Some(subsystem)) => println!("{} {}: {} -> {}", subsystem.site_file(), name, old, value),
            (_, None) => unknown.push(name.to_string()),
        }
    }
    conf.save(ctx.backup)?;

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(CliError::UnknownProperties(unknown))
    }
}

#[derive(Serialize)]
struct StatView {
    subsystems: Vec<hadoopconf::StatEntry>,
    env_files: Vec<String>,
}

fn run_stat(ctx: &ResolveContext, json: bool) -> Result<(), CliError> {
    let conf = load_conf(ctx)?;
    let env_files = match EnvFileSet::discover(&ctx.conf_dir) {
        Ok(set) => set
            .files()
            .iter()
            .map(|f| f.path().display().to_string())
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "no env files");
            Vec::new()
        }
    };
    let view = StatView {
        subsystems: conf.stat(),
        env_files,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }
    for entry in &view.subsystems {
        let site = entry.site_file.as_deref().unwrap_or("<none>");
        let marker = if entry.site_exists { "" } else { " (not yet created)" };
        println!("{:<7} site     {}{}", entry.subsystem.name(), site, marker);
        println!(
            "{:<7} default  {}",
            entry.subsystem.name(),
            entry.default_source.as_deref().unwrap_or("<none>")
        );
    }
    for path in &view.env_files {
        println!("env     {}", path);
    }
    Ok(())
}

fn run_env(ctx: &ResolveContext, patterns: &[String]) -> Result<(), CliError> {
    let env = EnvFileSet::discover(&ctx.conf_dir)?;
    let matcher = glob_set(patterns)?;

    let mut shown: Vec<String> = Vec::new();
    for name in env.keys() {
        if !matcher.is_match(&name) || shown.contains(&name) {
            continue;
        }
        if let Some(var) = env.get(&name) {
            println!("{} {} = {}", file_name(var), var.name(), var.value());
        }
        shown.push(name);
    }
    Ok(())
}

/// Apply `edit` to the first declaration of `name`, save, and show the
/// value before and after.
fn edit_env(ctx: &ResolveContext, name: &str, edit: impl FnOnce(&mut EnvVar)) -> Result<(), CliError> {
    let mut env = EnvFileSet::discover(&ctx.conf_dir)?;
    let var = env
        .get_mut(name)
        .ok_or_else(|| CliError::UnknownVariable(name.to_string()))?;

    let was = var.value().to_string();
    edit(var);
    let origin = file_name(var);
    let now = var.value().to_string();

    env.save(ctx.backup)?;
    println!("{} {} was {}", origin, name, was);
    println!("{} {} now {}", origin, name, now);
    Ok(())
}

fn file_name(var: &EnvVar) -> String {
    var.source()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

//! html-include CLI
//!
//! Usage:
//!   html-include [OPTIONS] <COMMAND>
//!
//! Commands:
//!   build    Resolve every template and write the pages
//!   deps     Print the dependency graph without writing pages
//!   resolve  Resolve one file (or stdin) to stdout
//!
//! Options:
//!   -c, --config <FILE>  Config file (TOML), defaults to html-include.toml
//!   -v, --verbose        More log output (repeatable)
//!   -h, --help           Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use html_include::{
    build, load_config, resolve, resolve_file, write_depfile, BuildConfig, BuildError, FsHost,
    IncludeError,
};

#[derive(Parser)]
#[command(name = "html-include")]
#[command(about = "Expand nested <include> directives in HTML templates")]
struct Cli {
    /// Config file (TOML); html-include.toml is used when present
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve every template and write the pages
    Build(BuildArgs),

    /// Print the dependency graph without writing pages (`--depfile` still writes the rules)
    Deps {
        #[command(flatten)]
        build: BuildArgs,

        /// Print JSON instead of Make rules
        #[arg(long)]
        json: bool,
    },

    /// Resolve one file (reads stdin if not provided) to stdout
    Resolve {
        /// Template file
        input: Option<PathBuf>,

        /// Base directory for includes in stdin input
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Directory holding the top-level templates
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Glob selecting templates inside the source directory
    #[arg(short, long)]
    pattern: Option<String>,

    /// Directory receiving the resolved pages
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Write a Make-style dependency file
    #[arg(long)]
    depfile: Option<PathBuf>,
}

impl BuildArgs {
    fn apply(self, mut config: BuildConfig) -> BuildConfig {
        if let Some(dir) = self.source_dir {
            config = config.with_source_dir(dir);
        }
        if let Some(pattern) = self.pattern {
            config = config.with_pattern(pattern);
        }
        if let Some(dir) = self.out_dir {
            config = config.with_out_dir(dir);
        }
        if let Some(depfile) = self.depfile {
            config = config.with_depfile(depfile);
        }
        config
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` applies when no `-v` is given.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("html_include=info"),
        2 => EnvFilter::new("html_include=debug"),
        _ => EnvFilter::new("html_include=trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build(args) => {
            let config = load_or_exit(cli.config.as_deref());
            match build(&args.apply(config)) {
                Ok(report) => {
                    for template in &report.templates {
                        println!("{}", template.output.display());
                    }
                }
                Err(e) => exit_with_build_error(&e),
            }
        }
        Command::Deps { build: args, json } => {
            let config = args.apply(load_or_exit(cli.config.as_deref())).with_dry_run(true);
            let result = build(&config).and_then(|report| match &config.depfile {
                Some(depfile) => write_depfile(&report, depfile).map(|()| report),
                None => Ok(report),
            });
            match result {
                Ok(report) if json => match serde_json::to_string_pretty(&report) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                },
                Ok(report) => print!("{}", report.depfile()),
                Err(e) => exit_with_build_error(&e),
            }
        }
        Command::Resolve { input, dir } => run_resolve(input, dir),
    }
}

fn load_or_exit(path: Option<&Path>) -> BuildConfig {
    match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_resolve(input: Option<PathBuf>, dir: Option<PathBuf>) {
    let base = match dir {
        Some(dir) => dir,
        None => PathBuf::from("."),
    };
    let host = match FsHost::new(&base) {
        Ok(host) => host,
        Err(e) => {
            eprintln!("Error resolving directory '{}': {}", base.display(), e);
            std::process::exit(1);
        }
    };

    let result = match &input {
        Some(path) => resolve_file(path, &host).map_err(|e| (e, None)),
        None => {
            if io::stdin().is_terminal() {
                eprintln!("Reading template from stdin (Ctrl-D to finish)...");
            }
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading from stdin: {}", e);
                std::process::exit(1);
            }
            resolve(&buffer, &host, None).map_err(|e| (e, Some(buffer)))
        }
    };

    match result {
        Ok(html) => {
            for dep in host.dependencies() {
                tracing::debug!(dependency = %dep.display(), "read include");
            }
            print!("{}", html);
        }
        Err((e, stdin_source)) => {
            eprintln!("{}", describe_include_error(&e, stdin_source.as_deref()));
            std::process::exit(1);
        }
    }
}

fn exit_with_build_error(err: &BuildError) -> ! {
    match err {
        BuildError::Include { template, source } => {
            eprintln!("Error building '{}':", template.display());
            eprintln!("{}", describe_include_error(source, None));
        }
        other => eprintln!("Error: {}", other),
    }
    std::process::exit(1);
}

/// Render an include error against the text of the file holding the directive
fn describe_include_error(err: &IncludeError, stdin_source: Option<&str>) -> String {
    let color = io::stderr().is_terminal();
    match (err.origin(), stdin_source) {
        (Some(origin), _) => match fs::read_to_string(origin) {
            Ok(text) => err.format(&text, &origin.display().to_string(), color),
            Err(_) => format!("Error: {}", err),
        },
        (None, Some(text)) if err.span() != (0..0) => err.format(text, "<stdin>", color),
        _ => format!("Error: {}", err),
    }
}

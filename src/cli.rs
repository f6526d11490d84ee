//! Minimal CLI: ingest JSON/YAML → (dump | lookup)
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;

use mustache_data::{Backend, Data, DataStack, MAXSIZE};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// build template context trees from JSON/YAML and inspect them the way a renderer sees them
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,

    /// more logging (-v debug, -vv trace); RUST_LOG still wins when set
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// ingest and print each tree (JSON by default)
    Dump(DumpOut),
    /// resolve a dotted name against a stack of scopes
    Lookup(LookupOut),
    /// list the ingestion backends compiled into this build
    Backends,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Format {
    /// pick from the file extension
    #[default]
    Auto,
    Json,
    Yaml,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// input format
    #[arg(long, value_enum, default_value_t = Format::Auto)]
    format: Format,

    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct DumpOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// print an indented outline with tags and emptiness instead of JSON
    #[arg(long)]
    outline: bool,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct LookupOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// dotted name to resolve, e.g. `person.name` (`.` is the innermost scope)
    #[arg(long)]
    name: String,

    /// scopes to enter before resolving, outermost first
    #[arg(long)]
    scope: Vec<String>,

    /// context stack capacity
    #[arg(long, default_value_t = MAXSIZE)]
    max_depth: usize,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Format {
    fn backend_for(self, source: &str) -> Result<Backend> {
        let backend = match self {
            Format::Json => Backend::Json,
            Format::Yaml => Backend::Yaml,
            Format::Auto => Backend::from_extension(Path::new(source)).ok_or_else(|| {
                anyhow!("cannot tell the format of {source}; pass --format json|yaml")
            })?,
        };
        Ok(backend)
    }
}

impl InputSettings {
    /// Read and ingest every input. Each tree is independent, so files are
    /// converted in parallel.
    fn load_all(&self) -> Result<Vec<(String, Data)>> {
        let sources = resolve_file_path_patterns(&self.input)?;
        sources
            .par_iter()
            .map(|source| {
                let data = self.load_one(source)?;
                Ok((source.clone(), data))
            })
            .collect()
    }

    fn load_one(&self, source: &str) -> Result<Data> {
        let backend = self.format.backend_for(source)?;
        let text = if source == "-" {
            std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?
        } else {
            std::fs::read_to_string(source)
                .with_context(|| format!("failed to read source file {source}"))?
        };
        log::debug!("{source}: ingesting as {backend}");
        backend
            .ingest(&text)
            .with_context(|| format!("failed to ingest {source} as {backend}"))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<ExitCode> {
        init_logging(self.verbose);
        match &self.cmd {
            Command::Dump(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(ExitCode::SUCCESS);
                }

                let trees = target.input_settings.load_all()?;
                let mut rendered = String::new();
                for (source, data) in &trees {
                    if target.outline {
                        if trees.len() > 1 {
                            writeln!(rendered, "{}", format!("# {source}").bold())?;
                        }
                        write_outline(&mut rendered, None, data, 0)?;
                    } else if target.pretty {
                        rendered.push_str(&serde_json::to_string_pretty(data)?);
                        rendered.push('\n');
                    } else {
                        rendered.push_str(&serde_json::to_string(data)?);
                        rendered.push('\n');
                    }
                }
                emit(target.out.as_deref(), &rendered)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Lookup(target) => {
                let trees = target.input_settings.load_all()?;
                let [(_, root)] = trees.as_slice() else {
                    bail!("lookup takes exactly one input, got {}", trees.len());
                };

                let mut stack = DataStack::with_capacity(target.max_depth);
                stack.push(root)?;
                for scope in &target.scope {
                    let node = stack
                        .resolve(scope)
                        .ok_or_else(|| anyhow!("scope `{scope}` does not resolve"))?;
                    stack.push(node).with_context(|| format!("entering scope `{scope}`"))?;
                }

                match stack.resolve(&target.name) {
                    Some(found) => {
                        println!("{}", serde_json::to_string_pretty(found)?);
                        let truthy = if found.is_empty() { "false".red() } else { "true".green() };
                        eprintln!("{} {} {truthy}", found.tag().to_string().cyan(), "truthy:".dimmed());
                        Ok(ExitCode::SUCCESS)
                    }
                    None => {
                        eprintln!("{} `{}` not found in {} scope(s)", "miss:".yellow(), target.name, stack.len());
                        Ok(ExitCode::from(1))
                    }
                }
            }
            Command::Backends => {
                for backend in Backend::ALL {
                    let state = if backend.is_available() { "enabled".green() } else { "disabled".red() };
                    println!("{:<6} {state}", backend.name());
                }
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    // A second init (e.g. from tests) is harmless; ignore it.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

fn emit(out: Option<&Path>, rendered: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, rendered).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            print!("{rendered}");
            Ok(())
        }
    }
}

/// One line per node: `key: tag` plus the text for strings, `(empty)` when
/// the node would hide a section.
fn write_outline(out: &mut String, key: Option<&str>, data: &Data, indent: usize) -> std::fmt::Result {
    let pad = "  ".repeat(indent);
    let label = key.map(|k| format!("{}: ", k.bold())).unwrap_or_default();
    let tag = data.tag().to_string().cyan();
    let empty = if data.is_empty() { " (empty)".dimmed().to_string() } else { String::new() };

    match data {
        Data::String(s) => writeln!(out, "{pad}{label}{tag} {s:?}{empty}"),
        Data::None => writeln!(out, "{pad}{label}{tag}{empty}"),
        Data::Map(map) => {
            writeln!(out, "{pad}{label}{tag}[{}]{empty}", map.len())?;
            for (k, child) in map {
                write_outline(out, Some(k), child, indent + 1)?;
            }
            Ok(())
        }
        Data::List(_) | Data::Array(_) => {
            writeln!(out, "{pad}{label}{tag}[{}]{empty}", data.len())?;
            for (i, child) in data.children().enumerate() {
                write_outline(out, Some(&i.to_string()), child, indent + 1)?;
            }
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<String>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<String>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern {pattern}"))? {
                let path = entry?;
                matched_any = true;
                out.push(path.to_string_lossy().into_owned());
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(pattern.to_string());
        }
    }

    Ok(out)
}

// ------------------------------- Tests ------------------------------------ //

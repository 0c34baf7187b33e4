//! grammardoc: generate documentation from annotated Xtext grammars.
//!
//! Supports two modes:
//!
//! - **stdin mode**: `grammardoc < Domainmodel.xtext`
//! - **file mode**: `grammardoc -o docs/grammars --graph src/**/*.xtext`

mod logging;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use grammardoc::formatter::{self, references, syntax, GrammarDocsFormatter, GraphOptions, Link};
use grammardoc::grammar;
use grammardoc::model::GrammarDoc;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(
    name = "grammardoc",
    about = "Generate documentation and dependency graphs from annotated Xtext grammars"
)]
struct Cli {
    /// Grammar files (glob patterns and directories supported). If omitted, reads from stdin.
    files: Vec<String>,

    /// Output directory (required when files are given)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Prefix template file or directory containing _prefix.<ext>.
    /// Supports ${name} substitution.
    #[arg(short = 'p', long)]
    prefix: Option<String>,

    /// Output format: markdown (default), html, text, json, dot
    #[arg(short = 'f', long, default_value = "markdown")]
    format: String,

    /// Also write the rule dependency graph as <name>.dot
    #[arg(long)]
    graph: bool,

    /// Emit each edge of the dependency graph once, however often the rule is called
    #[arg(long)]
    collapse_edges: bool,

    /// Raise log verbosity (-v info, -vv debug). GRAMMARDOC_LOG overrides.
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn graph_options(&self) -> GraphOptions {
        GraphOptions {
            collapse_duplicate_edges: self.collapse_edges,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let formatter = formatter::create_formatter(&cli.format, cli.graph_options())?;

    if cli.files.is_empty() {
        return stdin_mode(&cli, formatter.as_ref());
    }

    file_mode(&cli, formatter.as_ref())
}

/// stdin mode: read one grammar from stdin, write the documentation to stdout.
fn stdin_mode(cli: &Cli, formatter: &dyn GrammarDocsFormatter) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let grammar = grammar::parse(&input).context("failed to parse grammar from stdin")?;
    let doc = GrammarDoc::new(&grammar)?;
    report_diagnostics(&doc);

    if cli.graph {
        warn!("--graph is ignored in stdin mode, use --format dot for the graph");
    }
    print!("{}", formatter.format_grammar(&doc));
    Ok(())
}

/// file mode: document every grammar into the output directory.
fn file_mode(cli: &Cli, formatter: &dyn GrammarDocsFormatter) -> Result<()> {
    let output_dir = cli
        .output
        .as_deref()
        .context("--output is required when files are given")?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;

    let ext = formatter.output_file_extension();
    let prefix_template = resolve_prefix(cli.prefix.as_deref(), output_dir, ext)?;

    let input_files = expand_globs(&cli.files)?;
    debug!(count = input_files.len(), "expanded input files");

    for path in &input_files {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let grammar = match grammar::parse(&content) {
            Ok(grammar) => grammar,
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let doc = match GrammarDoc::new(&grammar) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        debug!(grammar = doc.name(), rules = doc.rules().len(), "loaded grammar");
        report_diagnostics(&doc);

        let name = derive_output_name(path);
        let out_path = output_dir.join(format!("{}.{}", name, ext));

        let mut output = String::new();
        if let Some(ref tpl) = prefix_template {
            output.push_str(&tpl.replace("${name}", &name));
            output.push('\n');
        }
        output.push_str(&formatter.format_grammar(&doc));

        fs::write(&out_path, &output)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        info!("wrote {}", out_path.display());

        if cli.graph && ext != "dot" {
            let graph_path = output_dir.join(format!("{}.dot", name));
            fs::write(&graph_path, formatter.format_graph(&doc))
                .with_context(|| format!("failed to write {}", graph_path.display()))?;
            info!("wrote {}", graph_path.display());
        }
    }

    Ok(())
}

/// Log rules rendered with a missing-definition marker or unresolved references.
///
/// References into a grammar named in the `with` clause cannot be resolved
/// locally and are only logged at debug level.
fn report_diagnostics(doc: &GrammarDoc<'_>) {
    let inherits = !doc.used_grammars().is_empty();
    let mapping = doc.mapping();
    for rule_doc in doc.rules() {
        if let Err(missing) = syntax::render_rule(rule_doc) {
            warn!(grammar = doc.name(), "{}", missing);
        }
        for link in references(rule_doc, &mapping) {
            if let Link::Unresolved(call) = link {
                let target = call.qualified_name();
                if inherits {
                    debug!(grammar = doc.name(), rule = rule_doc.name(), "unresolved reference to {}", target);
                } else {
                    warn!(grammar = doc.name(), rule = rule_doc.name(), "unresolved reference to {}", target);
                }
            }
        }
    }
}

/// Resolve the prefix template from the -p flag.
///
/// A directory is searched for `_prefix.<ext>`; without -p the output
/// directory is searched the same way.
fn resolve_prefix(prefix_arg: Option<&str>, output_dir: &Path, ext: &str) -> Result<Option<String>> {
    let default_name = format!("_prefix.{}", ext);
    match prefix_arg {
        Some(p) => {
            let path = Path::new(p);
            if path.is_file() {
                Ok(Some(fs::read_to_string(path).with_context(|| {
                    format!("failed to read prefix file: {}", path.display())
                })?))
            } else if path.is_dir() {
                read_optional(&path.join(&default_name))
            } else {
                anyhow::bail!("prefix not found: {}", p);
            }
        }
        None => read_optional(&output_dir.join(&default_name)),
    }
}

fn read_optional(candidate: &Path) -> Result<Option<String>> {
    if candidate.is_file() {
        let content = fs::read_to_string(candidate)
            .with_context(|| format!("failed to read prefix file: {}", candidate.display()))?;
        Ok(Some(content))
    } else {
        Ok(None)
    }
}

/// File extensions recognized as grammar files.
const SUPPORTED_EXTENSIONS: &[&str] = &["xtext"];

/// Expand glob patterns into a list of real file paths.
/// Also handles bare directory paths by scanning for grammar files.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        // Directories are scanned non-recursively
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                let supported = p
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext));
                if p.is_file() && supported {
                    files.push(p);
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            warn!("no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Derive the output file name (without extension) from a grammar path.
/// "src/org/example/Domainmodel.xtext" → "Domainmodel"
fn derive_output_name(source: &Path) -> String {
    let filename = source
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    match filename.strip_suffix(".xtext") {
        Some(stem) => stem.to_string(),
        None => filename,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn output_name_from_xtext() {
        assert_eq!(derive_output_name(Path::new("src/org/example/Domainmodel.xtext")), "Domainmodel");
        assert_eq!(derive_output_name(Path::new("Domainmodel.xtext")), "Domainmodel");
    }

    #[test]
    fn output_name_no_extension() {
        assert_eq!(derive_output_name(Path::new("Makefile")), "Makefile");
    }

    #[test]
    fn collapse_flag_maps_to_graph_options() {
        let cli = Cli::parse_from(["grammardoc", "--collapse-edges", "-vv"]);
        assert!(cli.graph_options().collapse_duplicate_edges);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, "markdown");
    }

    #[test]
    fn expand_directory_keeps_only_grammars() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.xtext"), "grammar t.B").unwrap();
        fs::write(dir.path().join("a.xtext"), "grammar t.A").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let files = expand_globs(&[dir.path().to_string_lossy().into_owned()]).unwrap();
        let names: Vec<_> = files.iter().map(|p| derive_output_name(p)).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn prefix_from_output_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_prefix(None, dir.path(), "md").unwrap(), None);
        fs::write(dir.path().join("_prefix.md"), "# ${name}").unwrap();
        assert_eq!(
            resolve_prefix(None, dir.path(), "md").unwrap().as_deref(),
            Some("# ${name}")
        );
        assert!(resolve_prefix(Some("/nonexistent/prefix"), dir.path(), "md").is_err());
    }
}

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use colored::Colorize;

mod adapter;

#[derive(Parser)]
#[command(name = "abrex")]
#[command(about = "Convert ABNF grammars to regular expressions")]
#[command(version)]
struct Cli {
    /// Path to the ABNF grammar file
    #[arg(short, long)]
    input: PathBuf,

    /// Path to the output file; writes to STDOUT when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "single-regexp")]
    format: Format,
}

#[derive(ValueEnum, Clone, Copy)]
enum Format {
    /// One flattened regular expression
    SingleRegexp,
    /// A Python snippet of named patterns
    NestedPython,
}

fn main() {
    let cli = Cli::parse();

    let text = match std::fs::read_to_string(&cli.input) {
        Ok(text) => text,
        Err(err) => fail(&format!("failed to read {}: {err}", cli.input.display())),
    };

    let parsed = match abnf::rulelist(&normalize_line_endings(&text)) {
        Ok(parsed) => parsed,
        Err(err) => fail(&format!(
            "failed to parse the grammar: {err}; \
             did you make sure that the line endings are stored as CRLF?"
        )),
    };

    let rules = match adapter::convert_rules(&parsed) {
        Ok(rules) => rules,
        Err(err) => fail(&err.to_string()),
    };

    let rendered = match cli.format {
        Format::SingleRegexp => abrex_core::single_regexp(&rules),
        Format::NestedPython => abrex_core::nested_python(&rules),
    };

    let rendered = match rendered {
        Ok(rendered) => rendered,
        Err(err) => fail(&err.to_string()),
    };

    let output = format!("{rendered}\n");
    match cli.output {
        None => print!("{output}"),
        Some(path) => {
            if let Err(err) = std::fs::write(&path, output) {
                fail(&format!("failed to write {}: {err}", path.display()));
            }
        }
    }
}

/// The grammar file on disk uses CRLF per the ABNF standard; the parser is
/// happier with plain newlines, and a missing final newline would reject
/// the last rule.
fn normalize_line_endings(text: &str) -> String {
    let mut normalized = text.replace("\r\n", "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

fn fail(message: &str) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), message);
    std::process::exit(1);
}

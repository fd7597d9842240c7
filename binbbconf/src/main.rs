//! bbconf command-line tool for checking and transcoding bb harness definitions.
//!
//! Usage: bbconf [OPTIONS] [FILE|DIR]
//!
//! Options:
//!   -t, --to <FORMAT>      Output format (json, yaml, toml, cbor, diag) [default: json]
//!   -w, --write            Write output to file with inferred name
//!   -o, --output <FILE>    Write output to specified file
//!   --check                Check if file is valid (exit 0 if valid, 1 if invalid)
//!   -h, --help             Print help
//!   -V, --version          Print version
//!
//! Log verbosity follows `RUST_LOG` (default `warn`); logs go to stderr.

use libbbconf::{parse_with_filename, Mapping};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod transcode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
    Toml,
    Cbor,
    CborDiag,
}

/// How a parsed document is reported.
#[derive(Clone, Copy, Debug)]
struct Output<'a> {
    format: Format,
    output_file: Option<&'a str>,
    write_back: bool,
    check_only: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut to_format: Option<&str> = None;
    let mut write_back = false;
    let mut output_file: Option<&str> = None;
    let mut check_only = false;
    let mut input_path: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-V" | "--version" => {
                println!("bbconf {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "-t" | "--to" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: -t requires a format argument");
                    process::exit(1);
                }
                if parse_format(&args[i]).is_none() {
                    eprintln!("Error: Unknown format: {}", args[i]);
                    process::exit(1);
                }
                to_format = Some(&args[i]);
            }
            "-w" | "--write" => {
                write_back = true;
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires an argument");
                    process::exit(1);
                }
                output_file = Some(&args[i]);
            }
            "--check" => {
                check_only = true;
            }
            "-" => {
                // Explicit stdin
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                process::exit(1);
            }
            _ => {
                if input_path.is_some() {
                    eprintln!("Error: Multiple input paths not supported");
                    process::exit(1);
                }
                input_path = Some(&args[i]);
            }
        }
        i += 1;
    }

    if write_back && output_file.is_some() {
        eprintln!("Error: --write and --output are mutually exclusive");
        process::exit(1);
    }

    let output = Output {
        format: to_format.and_then(parse_format).unwrap_or(Format::Json),
        output_file,
        write_back,
        check_only,
    };

    if let Some(path) = input_path {
        if Path::new(path).is_dir() {
            if output_file.is_some() {
                eprintln!("Error: --output cannot be used with directory input");
                process::exit(1);
            }
            process_directory(path, output);
            return;
        }
    }

    let input = match input_path {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            buffer
        }
    };

    process::exit(process_input(&input, input_path, output));
}

fn parse_format(s: &str) -> Option<Format> {
    match s {
        "json" => Some(Format::Json),
        "yaml" | "yml" => Some(Format::Yaml),
        "toml" => Some(Format::Toml),
        "cbor" => Some(Format::Cbor),
        "diag" => Some(Format::CborDiag),
        _ => None,
    }
}

fn format_extension(format: Format) -> &'static str {
    match format {
        Format::Json => "json",
        Format::Yaml => "yaml",
        Format::Toml => "toml",
        Format::Cbor => "cbor",
        Format::CborDiag => "diag",
    }
}

/// Process every `.bbconf` file in a directory, in name order.
fn process_directory(dir_path: &str, output: Output<'_>) {
    let entries = match fs::read_dir(dir_path) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error reading directory {}: {}", dir_path, e);
            process::exit(1);
        }
    };

    let mut paths: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|e| e == "bbconf").unwrap_or(false))
        .collect();
    paths.sort();
    debug!(dir = dir_path, files = paths.len(), "processing directory");

    let mut had_errors = false;

    for path in paths {
        let path_str = path.to_string_lossy().into_owned();
        let input = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path_str, e);
                had_errors = true;
                continue;
            }
        };

        if process_input(&input, Some(path_str.as_str()), output) != 0 {
            had_errors = true;
        }
    }

    process::exit(if had_errors { 1 } else { 0 });
}

/// Parse one document and report it. Returns the exit code.
fn process_input(input: &str, input_file: Option<&str>, output: Output<'_>) -> i32 {
    let filename = input_file.map(|p| {
        Path::new(p)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| p.to_string())
    });

    let tree = match parse_with_filename(input, filename.as_deref()) {
        Ok(tree) => tree,
        Err(e) => {
            if let Some(path) = input_file {
                eprintln!("{}: {}", path, e);
            } else {
                eprintln!("Parse error: {}", e);
            }
            return 1;
        }
    };

    if output.check_only {
        if let Some(path) = input_file {
            println!("{}: ok", path);
        } else {
            println!("ok");
        }
        return 0;
    }

    match encode(&tree, output.format) {
        Ok(Encoded::Text(text)) => write_text_output(&text, input_file, output),
        Ok(Encoded::Binary(bytes)) => write_binary_output(&bytes, input_file, output),
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    }

    0
}

enum Encoded {
    Text(String),
    Binary(Vec<u8>),
}

fn encode(tree: &Mapping, format: Format) -> Result<Encoded, String> {
    match format {
        Format::Json => transcode::json::encode(tree)
            .map(Encoded::Text)
            .map_err(|e| format!("Cannot convert to JSON: {}", e)),
        Format::Yaml => transcode::yaml::encode(tree)
            .map(Encoded::Text)
            .map_err(|e| format!("Cannot convert to YAML: {}", e)),
        Format::Toml => transcode::toml::encode(tree)
            .map(Encoded::Text)
            .map_err(|e| format!("Cannot convert to TOML: {}", e)),
        Format::Cbor => Ok(Encoded::Binary(transcode::cbor::encode(tree))),
        // Render from the encoded bytes so the notation shows the wire format.
        Format::CborDiag => transcode::cbor::diagnostic(&transcode::cbor::encode(tree))
            .map(Encoded::Text)
            .map_err(|e| format!("Cannot render CBOR diagnostic notation: {}", e)),
    }
}

fn write_text_output(text: &str, input_file: Option<&str>, output: Output<'_>) {
    let mut text = text.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    write_binary_output(text.as_bytes(), input_file, output);
}

fn write_binary_output(bytes: &[u8], input_file: Option<&str>, output: Output<'_>) {
    if let Some(path) = output.output_file {
        if let Err(e) = fs::write(path, bytes) {
            eprintln!("Error writing {}: {}", path, e);
            process::exit(1);
        }
    } else if output.write_back {
        if let Some(input_path) = input_file {
            let ext = format_extension(output.format);
            let output_path = Path::new(input_path).with_extension(ext);
            if let Err(e) = fs::write(&output_path, bytes) {
                eprintln!("Error writing {}: {}", output_path.display(), e);
                process::exit(1);
            }
            debug!(path = %output_path.display(), "wrote output");
        } else {
            eprintln!("Error: --write requires an input file");
            process::exit(1);
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = handle.write_all(bytes) {
            eprintln!("Error writing to stdout: {}", e);
            process::exit(1);
        }
    }
}

fn print_help() {
    println!(
        "bbconf - bb harness definition tool

USAGE:
    bbconf [OPTIONS] [FILE|DIR]

ARGS:
    [FILE|DIR]    Input file or directory (reads from stdin if not provided)
                  When a directory is given, processes all .bbconf files in it

OPTIONS:
    -t, --to <FORMAT>      Output format [default: json]
                           Supported: json, yaml, toml, cbor, diag

    -w, --write            Write output to file with inferred extension

    -o, --output <FILE>    Write output to specified file (not valid with directory input)

    --check                Check if input is valid (exit 0 if valid, 1 if invalid)

    -h, --help             Print help

    -V, --version          Print version

ENVIRONMENT:
    RUST_LOG               Log filter for diagnostics on stderr [default: warn]

EXAMPLES:
    # Print an environment definition as JSON
    bbconf environment.bbconf

    # Validate every definition in a directory
    bbconf --check ./tests/

    # Convert a test definition to YAML
    bbconf -t yaml performance-test.bbconf

    # Convert to TOML and write it next to the input
    bbconf -t toml -w performance-test.bbconf

    # Convert to CBOR (binary)
    bbconf -t cbor environment.bbconf -o environment.cbor

    # View the CBOR encoding in diagnostic notation (RFC 8949 §8)
    bbconf -t diag environment.bbconf

    # Trace classification of every line
    RUST_LOG=libbbconf=trace bbconf environment.bbconf
"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format("json"), Some(Format::Json));
        assert_eq!(parse_format("yml"), Some(Format::Yaml));
        assert_eq!(parse_format("diag"), Some(Format::CborDiag));
        assert_eq!(parse_format("xml"), None);
    }

    #[test]
    fn test_write_back_extension() {
        let ext = format_extension(Format::Toml);
        let path = Path::new("tests/performance-test.bbconf").with_extension(ext);
        assert_eq!(path, Path::new("tests/performance-test.toml"));
    }

    #[test]
    fn test_encode_formats() {
        let tree = libbbconf::parse("protocol:\n  type: http").unwrap();
        for format in [Format::Json, Format::Yaml, Format::Toml, Format::CborDiag] {
            match encode(&tree, format) {
                Ok(Encoded::Text(text)) => assert!(text.contains("http"), "{:?}: {}", format, text),
                _ => panic!("expected text output for {:?}", format),
            }
        }
        assert!(matches!(encode(&tree, Format::Cbor), Ok(Encoded::Binary(_))));
    }
}

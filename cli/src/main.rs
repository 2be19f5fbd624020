use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use clap::Parser;
use keyvalues::{Indent, WriteOptions};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kv", version, about = "KeyValues <-> JSON converter")]
struct Args {
    /// Input file path (.vmf, .kv, .vdf, .txt or .json). Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Force encode mode, KeyValues to JSON (overrides auto-detection).
    #[arg(short = 'e', long, conflicts_with = "decode")]
    encode: bool,

    /// Force decode mode, JSON to KeyValues (overrides auto-detection).
    #[arg(short = 'd', long)]
    decode: bool,

    /// Indentation width in spaces. KeyValues output defaults to tabs, JSON to 2.
    #[arg(long, value_name = "number")]
    indent: Option<usize>,

    /// Only parse the input and report whether it is valid KeyValues.
    #[arg(long)]
    check: bool,

    /// Encode with the byte transcoder instead of building a tree.
    #[arg(long)]
    fast: bool,
}

const DEFAULT_JSON_INDENT: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Encode,
    Decode,
}

#[derive(Debug)]
enum InputSource {
    Stdin,
    File(String),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let (input, input_source) = read_input(args.input.as_deref())?;
    if args.check {
        return run_check(&input);
    }
    let mode = resolve_mode(&args, &input_source)?;
    debug!(?mode, bytes = input.len(), "converting");
    match mode {
        Mode::Encode => run_encode(&args, &input, &input_source),
        Mode::Decode => run_decode(&args, &input, &input_source),
    }
}

fn run_check(input: &[u8]) -> Result<(), Box<dyn Error>> {
    let document = keyvalues::from_slice(input)?;
    let nodes = document.descendants(document.root()).count();
    println!("✔ valid ({nodes} nodes)");
    Ok(())
}

fn run_encode(args: &Args, input: &[u8], input_source: &InputSource) -> Result<(), Box<dyn Error>> {
    let indent = args.indent.unwrap_or(DEFAULT_JSON_INDENT);
    let output_target = OutputTarget::from_arg(args.output.as_deref());

    if args.fast {
        let json = keyvalues::key_values_to_json(input);
        let output = if indent == 0 {
            let mut json = json;
            json.push(b'\n');
            json
        } else {
            let value: serde_json::Value = serde_json::from_slice(&json)?;
            let mut pretty = Vec::with_capacity(json.len() * 2);
            write_json(&mut pretty, &value, indent)?;
            pretty
        };
        write_output(output_target.path(), &output)?;
    } else {
        let document = keyvalues::from_slice(input)?;
        let view = keyvalues::NodeRef::new(&document, document.root());
        with_output_writer(output_target.path(), |writer| write_json(writer, &view, indent))?;
    }

    if let OutputTarget::File(path) = &output_target {
        report_status(Mode::Encode, input_source, path);
    }
    Ok(())
}

fn run_decode(args: &Args, input: &[u8], input_source: &InputSource) -> Result<(), Box<dyn Error>> {
    let indent = match args.indent {
        Some(width) => Indent::Spaces(width),
        None => Indent::Tab,
    };
    let options = WriteOptions::new().with_indent(indent);
    let output = keyvalues::json_to_key_values_with_options(input, &options)?;

    let output_target = OutputTarget::from_arg(args.output.as_deref());
    write_output(output_target.path(), &output)?;
    if let OutputTarget::File(path) = &output_target {
        report_status(Mode::Decode, input_source, path);
    }
    Ok(())
}

fn resolve_mode(args: &Args, input_source: &InputSource) -> Result<Mode, Box<dyn Error>> {
    if args.encode {
        return Ok(Mode::Encode);
    }
    if args.decode {
        return Ok(Mode::Decode);
    }
    match input_source {
        InputSource::Stdin => Ok(Mode::Encode),
        InputSource::File(path) => match Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Ok(Mode::Decode),
            Some("vmf" | "kv" | "vdf" | "txt") => Ok(Mode::Encode),
            _ => Err("unable to auto-detect mode; use --encode or --decode".into()),
        },
    }
}

fn read_input(input: Option<&str>) -> Result<(Vec<u8>, InputSource), Box<dyn Error>> {
    match input {
        None | Some("-") => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok((buf, InputSource::Stdin))
        }
        Some(path) => {
            let buf = fs::read(path)?;
            Ok((buf, InputSource::File(path.to_string())))
        }
    }
}

#[derive(Clone, Debug)]
enum OutputTarget {
    Stdout,
    File(String),
}

impl OutputTarget {
    fn from_arg(output: Option<&str>) -> Self {
        match output {
            Some(path) if path != "-" => OutputTarget::File(path.to_string()),
            _ => OutputTarget::Stdout,
        }
    }

    fn path(&self) -> Option<&str> {
        match self {
            OutputTarget::Stdout => None,
            OutputTarget::File(path) => Some(path.as_str()),
        }
    }
}

fn with_output_writer<F>(path: Option<&str>, f: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&mut dyn Write) -> Result<(), Box<dyn Error>>,
{
    match path {
        Some(path) => {
            let mut file = fs::File::create(path)?;
            f(&mut file)
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            f(&mut handle)
        }
    }
}

fn write_output(path: Option<&str>, data: &[u8]) -> Result<(), Box<dyn Error>> {
    with_output_writer(path, |writer| {
        writer.write_all(data)?;
        Ok(())
    })
}

fn write_json<T: Serialize + ?Sized>(
    writer: &mut dyn Write,
    value: &T,
    indent: usize,
) -> Result<(), Box<dyn Error>> {
    if indent == 0 {
        serde_json::to_writer(&mut *writer, value)?;
    } else {
        let indent_bytes = vec![b' '; indent];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_bytes);
        let mut serializer = serde_json::Serializer::with_formatter(&mut *writer, formatter);
        value.serialize(&mut serializer)?;
    }
    writer.write_all(b"\n")?;
    Ok(())
}

fn report_status(mode: Mode, input_source: &InputSource, output_path: &str) {
    let input_label = match input_source {
        InputSource::Stdin => "stdin".to_string(),
        InputSource::File(path) => display_path(path),
    };
    let output_label = display_path(output_path);
    let verb = match mode {
        Mode::Encode => "Encoded",
        Mode::Decode => "Decoded",
    };
    println!("✔ {verb} {input_label} → {output_label}");
}

fn display_path(path: &str) -> String {
    let path = Path::new(path);
    let Ok(cwd) = std::env::current_dir() else {
        return path.to_string_lossy().into_owned();
    };
    match path.strip_prefix(&cwd) {
        Ok(relative) => relative.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

//! oktet CLI — pack, decode and describe ISO 8583 message bodies.
//!
//! Field catalogs are deliberately not built in; the template comes from
//! the command line as a compact DSL, one `FIELD:SPEC` entry per field:
//!
//!   n6       ASCII numeric, fixed 6
//!   an40     ASCII alphanumeric, fixed 40
//!   x9       ASCII rev-87 amount (C/D + digits), fixed 9
//!   lln19    ASCII LL numeric, max 19
//!   llln999  ASCII LLL numeric
//!   llc25    ASCII LL character
//!   lllc999  ASCII LLL character
//!   b8       Binary, fixed 8 bytes
//!   lllb999  Binary with ASCII LLL byte-count indicator
//!   bcd6     BCD numeric, fixed 6 digits
//!
//! Example: `oktet decode -t "2:lln19,3:n6" -i body.hex`

use std::io::{IsTerminal, Read};
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use oktet::{FieldDescriptor, Formatter, Message, Template};

#[derive(Parser)]
#[command(name = "oktet", about = "ISO 8583 message body codec")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print how each field of a template packs
    Describe(DescribeArgs),
    /// Decode a hex-encoded message body
    Decode(DecodeArgs),
    /// Pack field values into a hex-encoded message body
    Pack(PackArgs),
}

#[derive(Args)]
struct DescribeArgs {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct DecodeArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Input file with the hex-encoded body (- for stdin)
    #[arg(short, long)]
    input: String,

    /// Byte offset into the input where the body starts (after any MTI)
    #[arg(long, default_value_t = 0)]
    offset: usize,
}

#[derive(Args)]
struct PackArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Field value as NUM=VALUE, repeatable
    #[arg(short, long = "field", value_name = "NUM=VALUE")]
    fields: Vec<String>,
}

#[derive(Args)]
struct CommonArgs {
    /// Template DSL: comma-separated FIELD:SPEC entries
    #[arg(short, long)]
    template: String,

    /// Hex-rendered (ASCII) bitmap instead of raw binary
    #[arg(long)]
    ascii_bitmap: bool,
}

impl CommonArgs {
    fn to_template(&self) -> Result<Arc<Template>, String> {
        parse_template(&self.template).map(Arc::new)
    }

    fn to_message(&self, template: Arc<Template>) -> Result<Message, String> {
        if self.ascii_bitmap {
            Message::with_bitmap_formatter(template, Formatter::Ascii)
                .map_err(|e| format!("Bitmap-Fehler: {e}"))
        } else {
            Ok(Message::new(template))
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Fehler: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Describe(args) => run_describe(args),
        Command::Decode(args) => run_decode(args),
        Command::Pack(args) => run_pack(args),
    }
}

fn run_describe(args: DescribeArgs) -> Result<(), String> {
    let template = args.common.to_template()?;
    print!("{}", template.describe_packing());
    Ok(())
}

fn run_decode(args: DecodeArgs) -> Result<(), String> {
    let template = args.common.to_template()?;
    let text = read_input(&args.input)?;
    let data = parse_hex(&text)?;

    let mut message = args.common.to_message(template)?;
    let consumed = message
        .unpack(&data, args.offset)
        .map_err(|e| format!("Decode-Fehler: {e}"))?;

    print!("{message}");
    if consumed < data.len() {
        eprintln!("Hinweis: {} Bytes nach dem Body ignoriert", data.len() - consumed);
    }
    Ok(())
}

fn run_pack(args: PackArgs) -> Result<(), String> {
    let template = args.common.to_template()?;
    let mut message = args.common.to_message(template)?;

    for entry in &args.fields {
        let (field, value) = entry
            .split_once('=')
            .ok_or_else(|| format!("Feldangabe '{entry}' ist nicht NUM=VALUE"))?;
        let field: u32 = field
            .parse()
            .map_err(|_| format!("ungueltige Feldnummer '{field}'"))?;
        message
            .set_field(field, value)
            .map_err(|e| format!("Feld-Fehler: {e}"))?;
    }

    let packed = message.to_msg().map_err(|e| format!("Pack-Fehler: {e}"))?;
    println!("{}", to_hex(&packed));
    Ok(())
}

fn read_input(path: &str) -> Result<String, String> {
    if path == "-" {
        if std::io::stdin().is_terminal() {
            eprintln!("Lese von stdin (Ctrl+D zum Beenden)...");
        }
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Lesefehler (stdin): {e}"))?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("Lesefehler '{path}': {e}"))
    }
}

/// Parst Hex-Text in Bytes; Whitespace wird ignoriert.
fn parse_hex(text: &str) -> Result<Vec<u8>, String> {
    let digits: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(format!("Hex-Input hat ungerade Laenge ({})", digits.len()));
    }
    let mut out = Vec::with_capacity(digits.len() / 2);
    for pair in digits.chunks(2) {
        let hi = pair[0]
            .to_digit(16)
            .ok_or_else(|| format!("'{}' ist keine Hex-Ziffer", pair[0]))?;
        let lo = pair[1]
            .to_digit(16)
            .ok_or_else(|| format!("'{}' ist keine Hex-Ziffer", pair[1]))?;
        out.push(((hi << 4) | lo) as u8);
    }
    Ok(out)
}

fn to_hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

fn parse_template(dsl: &str) -> Result<Template, String> {
    let mut template = Template::new();
    for entry in dsl.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (field, spec) = entry
            .split_once(':')
            .ok_or_else(|| format!("Template-Eintrag '{entry}' ist nicht FIELD:SPEC"))?;
        let field: u32 = field
            .trim()
            .parse()
            .map_err(|_| format!("ungueltige Feldnummer '{field}'"))?;
        if !(2..=128).contains(&field) {
            return Err(format!("Feldnummer {field} ausserhalb 2..=128"));
        }
        template.set(field, parse_spec(spec.trim())?);
    }
    if template.is_empty() {
        return Err("Template definiert kein Feld".into());
    }
    Ok(template)
}

fn parse_spec(spec: &str) -> Result<FieldDescriptor, String> {
    // Laengste Praefixe zuerst, sonst faengt "n" auch "lln" ab.
    const KINDS: [&str; 10] = [
        "llln", "lllc", "lllb", "lln", "llc", "bcd", "an", "x", "n", "b",
    ];
    let kind = KINDS
        .iter()
        .find(|k| spec.starts_with(**k))
        .ok_or_else(|| format!("unbekannter Feld-Typ in '{spec}'"))?;
    let size: usize = spec[kind.len()..]
        .parse()
        .map_err(|_| format!("ungueltige Laenge in '{spec}'"))?;
    if size == 0 {
        return Err(format!("Laenge 0 in '{spec}'"));
    }

    Ok(match *kind {
        "llln" => FieldDescriptor::ascii_lll_numeric(size),
        "lllc" => FieldDescriptor::ascii_lll_character(size),
        "lllb" => FieldDescriptor::ascii_lll_binary(size),
        "lln" => FieldDescriptor::ascii_ll_numeric(size),
        "llc" => FieldDescriptor::ascii_ll_character(size),
        "bcd" => FieldDescriptor::bcd_fixed(size),
        "an" => FieldDescriptor::ascii_alpha_numeric(size),
        "x" => FieldDescriptor::ascii_amount(size),
        "n" => FieldDescriptor::ascii_numeric(size),
        "b" => FieldDescriptor::binary_fixed(size),
        _ => unreachable!(),
    })
}

use anyhow::{Context, bail};
use clap::{ArgAction, Parser};
use psshbox::{
    container::{CONTAINER_OVERHEAD, Container, RECORD_OVERHEAD},
    json_api::{JsonContainer, JsonPssh},
    pssh::{ProtectionData, PsshBox},
    record::RecordValue,
    registry::playready_registry,
    util::{hex_dump, truncate_text},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "PlayReady object / PSSH box explorer")]
struct Args {
    /// File holding a PlayReady object (or a pssh box with --pssh)
    path: String,

    /// Input is a complete `pssh` (or PIFF `uuid`) box
    #[arg(long, action = ArgAction::SetTrue)]
    pssh: bool,

    /// Start parsing at this byte offset
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Emit JSON instead of a human-readable tree
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Hex dump every record payload
    #[arg(long, action = ArgAction::SetTrue)]
    hex: bool,

    /// Re-encode and fail unless the output matches the input byte for byte
    #[arg(long, action = ArgAction::SetTrue)]
    verify: bool,

    /// Maximum characters of text shown per record in tree output
    #[arg(long, default_value_t = 120)]
    max_text: usize,

    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let data = std::fs::read(&args.path).with_context(|| format!("reading {}", args.path))?;
    if args.offset > data.len() {
        bail!("offset {} is past end of file ({} bytes)", args.offset, data.len());
    }
    let input = &data[args.offset..];
    let registry = playready_registry();

    let (encoded, consumed) = if args.pssh {
        let b = PsshBox::parse(input, &registry).context("parsing pssh box")?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&JsonPssh::try_from(&b)?)?);
        } else {
            print_pssh(&b, &args)?;
        }
        let out = b.serialize()?;
        let n = out.len();
        (out, n)
    } else {
        let (c, consumed) =
            Container::parse_prefix(input, &registry).context("parsing PlayReady object")?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&JsonContainer::try_from(&c)?)?);
        } else {
            print_container(&c, &args, args.offset, 0)?;
        }
        (c.serialize()?, consumed)
    };

    if args.verify {
        if input.get(..consumed) != Some(&encoded[..]) {
            bail!("re-encoded bytes differ from input ({} vs {} bytes)", encoded.len(), consumed);
        }
        eprintln!("verify: {} bytes round-tripped", encoded.len());
    }
    Ok(())
}

fn print_pssh(b: &PsshBox, args: &Args) -> anyhow::Result<()> {
    let system = b.system_id.known_name().unwrap_or("unknown system");
    println!(
        "{:?} box v{} flags=0x{:06x} system={} ({})",
        b.form, b.version, b.flags, b.system_id, system
    );
    for kid in &b.key_ids {
        println!("  kid {}", kid);
    }
    let data_offset = args.offset + b.data_offset()?;
    match &b.data {
        ProtectionData::PlayReady(c) => print_container(c, args, data_offset, 1)?,
        ProtectionData::Opaque(d) => {
            println!("  data: {} bytes", d.len());
            if args.hex {
                print!("{}", indent(&hex_dump(d, data_offset), 4));
            }
        }
    }
    Ok(())
}

/// `base` is the file offset of the container; payload offsets assume the
/// records sit where they were parsed from.
fn print_container(c: &Container, args: &Args, base: usize, depth: usize) -> anyhow::Result<()> {
    let pad = "  ".repeat(depth);
    let length = c
        .parsed_length()
        .map(|l| l.to_string())
        .unwrap_or_else(|| "?".into());
    println!("{pad}PlayReadyObject length={} records={}", length, c.len());

    let mut offset = base + CONTAINER_OVERHEAD;
    for (i, record) in c.records().iter().enumerate() {
        let len = record.serialize()?.len();
        let payload_offset = offset + RECORD_OVERHEAD;
        match record.value() {
            RecordValue::Text(s) => println!(
                "{pad}  [{i}] {} tag={} len={} \"{}\"",
                record.name(),
                record.tag(),
                len,
                truncate_text(&s, args.max_text)
            ),
            RecordValue::Bytes(b) => {
                println!("{pad}  [{i}] {} tag={} len={}", record.name(), record.tag(), len);
                if args.hex {
                    print!("{}", indent(&hex_dump(&b, payload_offset), depth * 2 + 6));
                }
            }
        }
        offset = payload_offset + record.raw_len().unwrap_or(len);
    }
    Ok(())
}

fn indent(s: &str, n: usize) -> String {
    let pad = " ".repeat(n);
    s.lines().map(|l| format!("{pad}{l}\n")).collect()
}

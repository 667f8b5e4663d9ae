use std::{env, error, fs, io::Read, process};

use emu::cpu::arm7tdmi::Arm7tdmi;
use emu::cpu::config::CpuConfig;
use emu::memory::InternalMemory;
use logger::LogKind;
use tracing::info;

const USAGE: &str = "usage: arm7-cycle <image> [--load ADDR] [--entry ADDR] [--cycles N] \
                     [--config FILE.json] [--log-file] [--trace]";

const CARTRIDGE_START: u32 = 0x0800_0000;

/// One second of the handheld's master clock.
const DEFAULT_CYCLES: u64 = 16_777_216;

#[derive(Debug)]
struct Options {
    image: String,
    load: u32,
    entry: Option<u32>,
    cycles: u64,
    config: Option<String>,
    log_kind: LogKind,
    trace: bool,
}

fn main() {
    println!("arm7-cycle v{}", env!("CARGO_PKG_VERSION"));

    let options = match parse_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            println!("{e}");
            println!("{USAGE}");
            process::exit(1)
        }
    };

    if let Err(e) = run(&options) {
        println!("{e}");
        process::exit(2);
    }
}

fn run(options: &Options) -> Result<(), Box<dyn error::Error>> {
    let fallback = if options.trace { "trace" } else { "info" };
    let _guard = logger::init_logger_with_filter(options.log_kind, fallback);

    let config = match &options.config {
        Some(path) => serde_json::from_str::<CpuConfig>(&fs::read_to_string(path)?)?,
        None => CpuConfig::default(),
    };

    let image = read_file(&options.image)?;
    let mut memory = InternalMemory::default();
    memory.load(options.load, &image);
    info!("loaded {} bytes at {:#010x}", image.len(), options.load);

    let entry = options.entry.unwrap_or(options.load);
    let mut cpu = Arm7tdmi::with_config(memory, config, entry);
    let result = cpu.run(options.cycles);

    println!("{} cycles", cpu.cycles());
    println!("{}", cpu.registers());
    println!("CPSR {}", cpu.cpsr());

    result?;
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, Box<dyn error::Error>> {
    let mut image = None;
    let mut options = Options {
        image: String::new(),
        load: CARTRIDGE_START,
        entry: None,
        cycles: DEFAULT_CYCLES,
        config: None,
        log_kind: LogKind::Stdout,
        trace: false,
    };

    while let Some(arg) = args.next() {
        let mut value = || args.next().ok_or_else(|| format!("{arg} needs a value"));
        match arg.as_str() {
            "--load" => options.load = parse_number(&value()?)?,
            "--entry" => options.entry = Some(parse_number(&value()?)?),
            "--cycles" => options.cycles = value()?.parse()?,
            "--config" => options.config = Some(value()?),
            "--log-file" => options.log_kind = LogKind::File,
            "--trace" => options.trace = true,
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}").into()),
            _ if image.is_none() => image = Some(arg.clone()),
            _ => return Err(format!("unexpected argument {arg}").into()),
        }
    }

    options.image = image.ok_or("no image given")?;
    Ok(options)
}

/// Decimal, or hexadecimal with a `0x` prefix.
fn parse_number(text: &str) -> Result<u32, Box<dyn error::Error>> {
    let digits = text.replace('_', "");
    let value = match digits.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16)?,
        None => digits.parse()?,
    };
    Ok(value)
}

fn read_file(filepath: &str) -> Result<Vec<u8>, std::io::Error> {
    let mut f = fs::File::open(filepath)?;
    let mut buf = Vec::new();

    f.read_to_end(&mut buf)?;

    Ok(buf)
}

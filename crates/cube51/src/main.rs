use std::path::PathBuf;

use cube51::RunOptions;
use cube51_core::{Exception, Variant};

const USAGE: &str = "usage: cube51 <firmware.hex> [--ticks N] [--break ADDR] [--profile] \
                     [--trace] [--classic] [-c]";

fn parse_u16(text: &str) -> Option<u16> {
    let text = text.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(text, 16).ok()
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mut path = None;
    let mut ticks = 1_000_000u64;
    let mut breakpoint = None;
    let mut profile = false;
    let mut trace = false;
    let mut classic = false;
    let mut keep_going = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--ticks" => {
                let value = args.next().unwrap_or_default();
                ticks = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid tick count '{value}'"))?;
            }
            "--break" => {
                let value = args.next().unwrap_or_default();
                breakpoint = Some(
                    parse_u16(&value)
                        .ok_or_else(|| anyhow::anyhow!("invalid breakpoint '{value}'"))?,
                );
            }
            "--profile" => profile = true,
            "--trace" => trace = true,
            "--classic" => classic = true,
            "-c" => keep_going = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            other if path.is_none() && !other.starts_with('-') => {
                path = Some(PathBuf::from(other));
            }
            other => {
                eprintln!("Unknown argument '{other}'.\n{USAGE}");
                std::process::exit(1);
            }
        }
    }

    let Some(path) = path else {
        eprintln!("No firmware image provided.\n{USAGE}");
        std::process::exit(1);
    };

    let variant = if classic {
        Variant::Classic
    } else {
        Variant::Nrf24le1
    };
    let options = RunOptions::builder()
        .ticks(ticks)
        .variant(variant)
        .profile(profile)
        .trace(trace)
        .keep_going(keep_going)
        .build();
    let options = RunOptions {
        breakpoint,
        ..options
    };

    log::info!("Running firmware '{}'", path.display());
    let report = cube51::run(&path, options)?;

    match report.stopped {
        None | Some(Exception::Break) => Ok(()),
        Some(exception) => {
            eprintln!("Stopped: {exception}");
            std::process::exit(2);
        }
    }
}

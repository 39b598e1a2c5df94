//! Show the bits of a UPER encoding.
//!
//! Usage:
//!   uper_bits [OPTIONS] [HEX ...]
//!   uper_bits < capture.hex
//!
//! Hex arguments are concatenated (whitespace allowed); with none, hex is read from stdin.
//!
//! Options:
//!   --from=N   First bit of the window (default 0)
//!   --len=N    Window length in bits (default: to the end)
//!   --group=N  Insert a space every N bits (default 8, 0 = no grouping)
//!
//! Set `RUST_LOG=debug` for log output.

use std::io::{self, Read};
use uperkit::diag::from_hex;
use uperkit::Bitstream;

fn take_opt(args: &mut Vec<String>, name: &str) -> anyhow::Result<Option<usize>> {
    let prefix = format!("--{}=", name);
    match args.iter().position(|a| a.starts_with(&prefix)) {
        Some(pos) => {
            let arg = args.remove(pos);
            let n = arg[prefix.len()..]
                .parse()
                .map_err(|e| anyhow::anyhow!("--{}: {}", name, e))?;
            Ok(Some(n))
        }
        None => Ok(None),
    }
}

fn grouped(bits: &str, group: usize) -> String {
    if group == 0 {
        return bits.to_string();
    }
    bits.as_bytes()
        .chunks(group)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let from = take_opt(&mut args, "from")?.unwrap_or(0);
    let len = take_opt(&mut args, "len")?;
    let group = take_opt(&mut args, "group")?.unwrap_or(8);

    let src = if args.is_empty() {
        let mut s = String::new();
        io::stdin().read_to_string(&mut s)?;
        s
    } else {
        args.join("")
    };
    let bytes = from_hex(&src)?;
    let stream = Bitstream::from_bytes(&bytes);
    let len = len.unwrap_or_else(|| stream.len().saturating_sub(from));
    log::debug!("{} octets, window {}+{}", bytes.len(), from, len);

    let bits = stream.render(from, len)?;
    println!("{}", grouped(&bits, group));
    eprintln!("{} bits shown of {}", len, stream.len());
    Ok(())
}

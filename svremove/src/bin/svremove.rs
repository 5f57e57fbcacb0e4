use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;

/// Removes a service from an MPEG transport stream.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Service to remove: a service id (decimal or 0x-prefixed hexadecimal)
    /// or a service name as found in the SDT, ignoring case and blanks
    service: Option<String>,

    /// Do not fail when the service is not in the stream
    #[arg(short = 'a', long)]
    ignore_absent: bool,

    /// Do not modify the BAT
    #[arg(short = 'b', long)]
    ignore_bat: bool,

    /// Do not modify the NIT
    #[arg(short = 'n', long)]
    ignore_nit: bool,

    /// Replace removed packets with null packets to preserve the bitrate
    #[arg(short = 's', long)]
    stuffing: bool,

    /// Input file (default: standard input)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (default: standard output)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML file with the same settings
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Args {
    fn options(&self) -> anyhow::Result<svremove::Options> {
        let mut options = match self.config {
            Some(ref path) => svremove::Options::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => svremove::Options::default(),
        };
        if let Some(ref service) = self.service {
            options.service = service.clone();
        }
        options.ignore_absent |= self.ignore_absent;
        options.ignore_bat |= self.ignore_bat;
        options.ignore_nit |= self.ignore_nit;
        options.stuffing |= self.stuffing;
        if options.service.trim().is_empty() {
            anyhow::bail!("no service to remove, give one on the command line or in the configuration file");
        }
        Ok(options)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let options = args.options()?;

    let input: Box<dyn std::io::Read> = match args.input {
        Some(ref path) => Box::new(std::io::BufReader::new(
            std::fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(std::io::BufReader::new(std::io::stdin())),
    };
    let output: Box<dyn std::io::Write> = match args.output {
        Some(ref path) => Box::new(std::io::BufWriter::new(
            std::fs::File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(std::io::BufWriter::new(std::io::stdout())),
    };

    svremove::remove_service(input, output, &options)
        .with_context(|| format!("failed to remove service {}", options.service))?;
    Ok(())
}

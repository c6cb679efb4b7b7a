// SPDX-License-Identifier: GPL-3.0-or-later
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use clap::{Parser, Subcommand};
use clap_num::maybe_hex;
use log::error;
use tpm12_call::{ops, Device, ReturnCode, DIGEST_SIZE};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(short, long, default_value = "/dev/tpm0")]
    device: String,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode return code
    Rc {
        /// Return code
        #[arg(value_parser = maybe_hex::<u32>)]
        rc: u32,
    },
    /// Read a PCR
    Pcr {
        /// Register index
        index: u32,
    },
    /// Draw hardware randomness
    Random {
        /// Number of bytes
        size: u32,
    },
    /// Extend a PCR
    Extend {
        /// Register index
        index: u32,
        /// SHA-1 digest to extend with, as 40 hex digits
        digest: String,
    },
}

fn open(path: &str) -> Device {
    Device::open(path).unwrap_or_else(|err| {
        error!("{err}");
        std::process::exit(1);
    })
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    match &cli.command {
        Commands::Rc { rc } => match ReturnCode::from_repr(*rc) {
            Some(code) => println!("{code} {rc:#010x}"),
            None => println!("unknown return code {rc:#010x}"),
        },
        Commands::Pcr { index } => {
            let mut chip = open(&cli.device);
            let value = ops::pcr_read(&mut chip, *index).unwrap_or_else(|err| {
                error!("{err}");
                std::process::exit(1);
            });
            println!("{}", hex::encode(value));
        }
        Commands::Random { size } => {
            let mut chip = open(&cli.device);
            let bytes = ops::get_random(&mut chip, *size).unwrap_or_else(|err| {
                error!("{err}");
                std::process::exit(1);
            });
            println!("{}", hex::encode(bytes));
        }
        Commands::Extend { index, digest } => {
            let Ok(bytes) = hex::decode(digest) else {
                error!("digest is not hex");
                std::process::exit(1);
            };
            let Ok(digest) = <[u8; DIGEST_SIZE]>::try_from(bytes.as_slice()) else {
                error!("digest must be {DIGEST_SIZE} bytes");
                std::process::exit(1);
            };
            let mut chip = open(&cli.device);
            let value = ops::extend(&mut chip, *index, &digest).unwrap_or_else(|err| {
                error!("{err}");
                std::process::exit(1);
            });
            println!("{}", hex::encode(value));
        }
    }
}

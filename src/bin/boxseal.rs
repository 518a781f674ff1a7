//! boxseal CLI - anonymous public-key encryption
//!
//! Command-line interface for generating X25519 key pairs and for sealing
//! and opening messages with NaCl sealed boxes.

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process;

use boxseal::commands;
use boxseal::input;

#[derive(Parser)]
#[command(name = "boxseal")]
#[command(version)]
#[command(about = "Anonymous public-key encryption.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a key pair and save it as FILENAME.pub and FILENAME.pvt
    #[command(alias = "g")]
    Genkey {
        /// Base name of the key files to create
        #[arg(value_name = "FILENAME")]
        filename: PathBuf,
    },

    /// Encrypt a file or standard input for the given public key
    #[command(alias = "e")]
    Encrypt {
        /// Input file path. Uses standard input if not provided
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Public key file of the recipient
        #[arg(short, long, value_name = "FILE")]
        public_key: PathBuf,
    },

    /// Decrypt base64 from a file or standard input with the given key pair
    #[command(alias = "d")]
    Decrypt {
        /// Base64 input file path. Uses standard input if not provided
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Private key file for decrypting
        #[arg(short = 'k', long, value_name = "FILE")]
        private_key: PathBuf,

        /// Public key file for decrypting
        #[arg(short, long, value_name = "FILE")]
        public_key: PathBuf,
    },
}

fn main() {
    // Usage errors exit 1 like every other failure; help and version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            eprint!("{}", e);
            process::exit(1);
        }
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match cli.command {
        Commands::Genkey { filename } => commands::genkey(&filename, &mut out),
        Commands::Encrypt { file, public_key } => {
            let mut reader = input::file_or_stdin(file.as_deref());
            commands::encrypt(&mut *reader, &public_key, &mut out)
        }
        Commands::Decrypt {
            file,
            private_key,
            public_key,
        } => {
            let mut reader = input::file_or_stdin(file.as_deref());
            commands::decrypt(&mut *reader, &public_key, &private_key, &mut out)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e.report());
        process::exit(1);
    }
}

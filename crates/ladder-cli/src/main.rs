use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// Constant-time P-256 scalar multiplication, from the command line.
#[derive(Parser)]
#[command(name = "p256-ladder")]
#[command(about = "Constant-time P-256 scalar multiplication and ECDSA signing")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug)]
enum LadderArg {
    Jacobian,
    CoZ,
}

impl std::fmt::Display for LadderArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jacobian => write!(f, "jac"),
            Self::CoZ => write!(f, "coz"),
        }
    }
}

impl std::str::FromStr for LadderArg {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "jac" | "jacobian" => Ok(Self::Jacobian),
            "coz" | "co-z" => Ok(Self::CoZ),
            _ => Err(format!("unknown ladder: {} (use jac or coz)", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Multiply the base point by a scalar and append "scalar,x,y" to a file.
    Mult {
        /// Scalar as 64 hex digits, big-endian.
        scalar: String,

        /// Point-arithmetic strategy.
        #[arg(long, default_value = "coz")]
        ladder: LadderArg,

        /// Randomize the internal point representation (co-Z only).
        #[arg(long)]
        randomize_z: bool,

        /// File the result line is appended to.
        #[arg(long, default_value = "output.txt")]
        output: PathBuf,
    },

    /// Sign the SHA-256 of a message file; the DER blob is appended.
    Sign {
        /// PEM-encoded P-256 private key.
        key: PathBuf,

        /// Message file to hash and sign.
        message: PathBuf,

        /// Signature output file.
        signature: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Mult {
            scalar,
            ladder,
            randomize_z,
            output,
        } => commands::mult(&scalar, &ladder, randomize_z, &output),
        Commands::Sign {
            key,
            message,
            signature,
        } => commands::sign(&key, &message, &signature),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

//! CLI command implementations.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use ladder_crypto::{
    scalar_mult_base_coz, scalar_mult_base_coz_randomized, scalar_mult_base_jac, AffinePoint,
};

use crate::LadderArg;

type Result = std::result::Result<(), Box<dyn std::error::Error>>;

/// Parse a 64-digit big-endian hex scalar into the little-endian byte form
/// the ladders consume.
fn parse_scalar(s: &str) -> std::result::Result<[u8; 32], Box<dyn std::error::Error>> {
    let bytes = hex::decode(s)?;
    if bytes.len() != 32 {
        return Err(format!("expected 32 scalar bytes, got {}", bytes.len()).into());
    }
    let mut k = [0u8; 32];
    for (i, b) in bytes.iter().enumerate() {
        k[31 - i] = *b;
    }
    Ok(k)
}

pub fn mult(scalar_hex: &str, ladder: &LadderArg, randomize_z: bool, output: &Path) -> Result {
    let k = parse_scalar(scalar_hex)?;
    let point = match ladder {
        LadderArg::Jacobian if randomize_z => {
            return Err("--randomize-z only applies to the co-Z ladder".into());
        }
        LadderArg::Jacobian => scalar_mult_base_jac(&k),
        LadderArg::CoZ if randomize_z => scalar_mult_base_coz_randomized(&k),
        LadderArg::CoZ => scalar_mult_base_coz(&k, None),
    };

    append_result(&k, &point, output)?;
    log::info!("result appended to {}", output.display());
    Ok(())
}

/// One "scalar,x,y" line, all hex big-endian.
fn append_result(k: &[u8; 32], point: &AffinePoint, output: &Path) -> std::io::Result<()> {
    let mut k_be = *k;
    k_be.reverse();
    let line = format!(
        "{},{},{}\n",
        hex::encode(k_be),
        hex::encode(point.x),
        hex::encode(point.y)
    );
    let mut file = OpenOptions::new().create(true).append(true).open(output)?;
    file.write_all(line.as_bytes())
}

pub fn sign(key: &Path, message: &Path, signature: &Path) -> Result {
    let blob = ladder_crypto::sign::sign_file(key, message, signature)?;
    log::info!("signature written ({} bytes)", blob.len());
    Ok(())
}

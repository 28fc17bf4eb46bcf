//! Constant-time scalar multiplication on NIST P-256.
//!
//! Two interchangeable implementations of `[k]G`: a Montgomery ladder over
//! classical Jacobian coordinates (`jacobian`), and one over the co-Z
//! XY-only representation with Z-recovery at termination (`coz`). Both run
//! a fixed 256-iteration schedule on a scalar padded into `[2^256, 2^257)`,
//! and every secret-dependent choice is a masked selection rather than a
//! branch or an indexed load.
//!
//! The `sign` module drives the co-Z ladder as the core of an ECDSA signer;
//! the field and scalar layers underneath are in `fe` and `scalar`.

pub mod coz;
pub mod fe;
pub mod jacobian;
pub mod scalar;
pub mod sign;

use fe::Fe;

pub use coz::ladder_coz;
pub use jacobian::ladder_jac;

/// x-coordinate of the base point G, Montgomery domain.
pub(crate) const CURVE_GX: Fe = Fe([
    0x79e730d418a9143c,
    0x75ba95fc5fedb601,
    0x79fb732b77622510,
    0x18905f76a53755c6,
]);

/// y-coordinate of the base point G, Montgomery domain.
pub(crate) const CURVE_GY: Fe = Fe([
    0xddf25357ce95560a,
    0x8b4ab8e4ba19e45c,
    0xd2e88688dd21f325,
    0x8571ff1825885d85,
]);

/// Affine result of a scalar multiplication: big-endian coordinates in the
/// normal (non-Montgomery) domain. The point at infinity is all zeros.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AffinePoint {
    pub x: [u8; 32],
    pub y: [u8; 32],
}

/// `[k]G` via the Jacobian ladder. `k` is 32 bytes little-endian.
pub fn scalar_mult_base_jac(k: &[u8; 32]) -> AffinePoint {
    jacobian::ladder_jac(k)
}

/// `[k]G` via the co-Z ladder, optionally with a caller-supplied initial Z
/// (32 bytes little-endian, nonzero mod p) that randomizes the internal
/// point representation. Scalars outside `[2, q-3]` yield undefined output.
pub fn scalar_mult_base_coz(k: &[u8; 32], initial_z: Option<&[u8; 32]>) -> AffinePoint {
    coz::ladder_coz(k, initial_z)
}

/// `[k]G` via the co-Z ladder with a fresh random initial Z drawn from the
/// OS CSPRNG on every call.
pub fn scalar_mult_base_coz_randomized(k: &[u8; 32]) -> AffinePoint {
    let mut z = [0u8; 32];
    loop {
        getrandom::getrandom(&mut z).expect("getrandom failed");
        // Any drawn value works except the two representatives of zero;
        // to_mont reduces mod p internally.
        if Fe::to_mont(&Fe::from_bytes_le(&z)).is_zero() == 0 {
            break;
        }
    }
    coz::ladder_coz(k, Some(&z))
}

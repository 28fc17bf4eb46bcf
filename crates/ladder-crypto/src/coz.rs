//! Co-Z (shared-Z) XY-only point arithmetic and its ladder driver.
//!
//! The two ladder registers are kept at a common Z-coordinate that is never
//! materialized: each addition variant below yields both of its outputs at a
//! fresh shared Z, so the whole ladder runs on (X, Y) pairs alone. The true
//! Z is recovered once, at termination, from the ladder invariant
//! `r1 - r0 = G`. Operation sequences follow Goundar, Joye and Miyaji,
//! "Co-Z addition formulae and binary ladders on elliptic curves"; the
//! sequences are load-bearing and must not be reordered.
//!
//! The formulas are incomplete for scalars congruent to 0, 1, q-1 or q-2;
//! callers keep nonces inside `[2, q-3]` (see `scalar::nonce_in_range`).

use crate::fe::Fe;
use crate::scalar;
use crate::{AffinePoint, CURVE_GX, CURVE_GY};

/// An XY-only point at a shared, externally managed Z.
#[derive(Clone, Copy, Debug)]
pub struct PointXy {
    pub(crate) x: Fe,
    pub(crate) y: Fe,
}

impl PointXy {
    /// Swap `a` and `b` when `swap` is 1.
    pub fn cswap(a: &mut PointXy, b: &mut PointXy, swap: u64) {
        Fe::cswap(&mut a.x, &mut b.x, swap);
        Fe::cswap(&mut a.y, &mut b.y, swap);
    }
}

/// Combined add/sub: `(r0, r1) <- (r0 + r1, r0 - r1)`, outputs at a new
/// shared Z.
fn xycz_addc(r0: &mut PointXy, r1: &mut PointXy) {
    let mut t1 = r0.x;
    let mut t2 = r0.y;
    let mut t3 = r1.x;
    let mut t4 = r1.y;

    let mut t5 = Fe::sub(&t3, &t1);
    t5 = Fe::square(&t5);
    let t6 = Fe::mul(&t1, &t5);
    t1 = Fe::mul(&t3, &t5);
    t5 = Fe::add(&t4, &t2);
    t4 = Fe::sub(&t4, &t2);
    t3 = Fe::sub(&t1, &t6);
    let t7 = Fe::mul(&t2, &t3);
    t3 = Fe::add(&t1, &t6);

    t1 = Fe::square(&t4);
    t1 = Fe::sub(&t1, &t3);
    t2 = Fe::sub(&t6, &t1);
    t2 = Fe::mul(&t4, &t2);

    t2 = Fe::sub(&t2, &t7);
    t4 = Fe::square(&t5);
    t3 = Fe::sub(&t4, &t3);
    t4 = Fe::sub(&t3, &t6);
    t4 = Fe::mul(&t4, &t5);
    t4 = Fe::sub(&t4, &t7);

    r0.x = t1;
    r0.y = t2;
    r1.x = t3;
    r1.y = t4;
}

/// `(r0, r1) <- (r0 + r1, r0)`, outputs at a new shared Z.
fn xycz_add(r0: &mut PointXy, r1: &mut PointXy) {
    let mut t1 = r0.x;
    let mut t2 = r0.y;
    let mut t3 = r1.x;
    let mut t4 = r1.y;

    let mut t5 = Fe::sub(&t3, &t1); // X1 - X0
    t5 = Fe::square(&t5); // A = (X1 - X0)^2
    let mut t6 = Fe::mul(&t3, &t5); // B = X1 * A
    t3 = Fe::mul(&t1, &t5); // C = X0 * A
    t5 = Fe::sub(&t4, &t2); // Y1 - Y0
    t1 = Fe::square(&t5);
    t1 = Fe::sub(&t1, &t3);
    t1 = Fe::sub(&t1, &t6); // X3 = (Y1 - Y0)^2 - C - B
    t6 = Fe::sub(&t6, &t3); // B - C = (X1 - X0)^3
    t4 = Fe::mul(&t2, &t6); // Y0 * (X1 - X0)^3
    t2 = Fe::sub(&t3, &t1);
    t2 = Fe::mul(&t5, &t2);
    t2 = Fe::sub(&t2, &t4); // Y3 = (Y1 - Y0)(C - X3) - Y0(X1 - X0)^3

    r0.x = t1;
    r0.y = t2;
    r1.x = t3;
    r1.y = t4;
}

/// `(r0, r1) <- (r1 - r0, r0)`, outputs at a new shared Z. The difference is
/// the ladder invariant, i.e. a representation of the base point, which is
/// what makes the terminal Z recoverable.
fn xycz_getinvariant(r0: &mut PointXy, r1: &mut PointXy) {
    let mut t1 = r0.x;
    let mut t2 = r0.y;
    let mut t3 = r1.x;
    let mut t4 = r1.y;

    let mut t5 = Fe::sub(&t3, &t1);
    t5 = Fe::square(&t5);
    let mut t6 = Fe::mul(&t3, &t5);
    t3 = Fe::mul(&t1, &t5);
    t5 = Fe::add(&t4, &t2); // Y1 + Y0
    t1 = Fe::square(&t5);
    t1 = Fe::sub(&t1, &t3);
    t1 = Fe::sub(&t1, &t6);
    t6 = Fe::sub(&t6, &t3);
    t4 = Fe::mul(&t2, &t6);
    t2 = Fe::sub(&t3, &t1);
    t2 = Fe::mul(&t5, &t2);
    t2 = Fe::add(&t2, &t4);

    r0.x = t1;
    r0.y = t2;
    r1.x = t3;
    r1.y = t4;
}

/// Rescale onto Z-coordinate `z`: `(X, Y) <- (z^2 X, z^3 Y)`.
pub(crate) fn apply_z(p: &mut PointXy, z: &Fe) {
    let mut t = Fe::square(z);
    p.x = Fe::mul(&p.x, &t);
    t = Fe::mul(&t, z);
    p.y = Fe::mul(&p.y, &t);
}

/// Ladder initialization: `(P, [2]P)` at a common, unstored Z. A supplied
/// `initial_z` (normal domain, nonzero mod p) first re-randomizes the
/// projective representation of P, so every intermediate coordinate of the
/// ladder becomes unpredictable to a side-channel observer.
fn xycz_initdbljac(p: &PointXy, initial_z: Option<&Fe>) -> (PointXy, PointXy) {
    let mut pp = *p;
    let z = match initial_z {
        Some(z) => {
            let zm = Fe::to_mont(z);
            apply_z(&mut pp, &zm);
            zm
        }
        None => Fe::ONE,
    };

    let mut t7 = Fe::square(&pp.x);
    let mut t2 = Fe::add(&t7, &t7);
    t7 = Fe::add(&t7, &t2);
    let mut t1 = Fe::square(&z);
    t1 = Fe::square(&t1);
    let mut t5 = Fe::add(&t1, &t1);
    t5 = Fe::add(&t5, &t1);
    t7 = Fe::sub(&t7, &t5); // M = 3X^2 - 3Z^4

    t2 = Fe::square(&pp.y);
    t2 = Fe::add(&t2, &t2);
    t5 = Fe::add(&t2, &t2);
    t1 = Fe::mul(&t5, &pp.x); // 4XY^2, P's X at the new shared Z
    let mut t6 = Fe::square(&t7);

    t6 = Fe::sub(&t6, &t1);
    let t3 = Fe::sub(&t6, &t1); // X([2]P)
    t6 = Fe::sub(&t1, &t3);

    t6 = Fe::mul(&t6, &t7);
    t2 = Fe::square(&t2);
    t2 = Fe::add(&t2, &t2); // 8Y^4, P's Y at the new shared Z
    let t4 = Fe::sub(&t6, &t2); // Y([2]P)

    (PointXy { x: t1, y: t2 }, PointXy { x: t3, y: t4 })
}

/// `[k]G` through the co-Z Montgomery ladder; `k` is 32 bytes little-endian
/// and must be congruent to a value in `[2, q-3]`. An `initial_z` (32 bytes
/// little-endian, nonzero mod p) randomizes the internal representation.
pub fn ladder_coz(k: &[u8; 32], initial_z: Option<&[u8; 32]>) -> AffinePoint {
    let padded = scalar::pad(k);
    let base = PointXy {
        x: CURVE_GX,
        y: CURVE_GY,
    };
    let z0 = initial_z.map(Fe::from_bytes_le);
    let (mut r0, mut r1) = xycz_initdbljac(&base, z0.as_ref());

    let mut pbit = 0u64;
    for i in (0..=255usize).rev() {
        let kbit = scalar::bit(&padded, i);
        pbit ^= kbit;
        PointXy::cswap(&mut r0, &mut r1, pbit);
        pbit = kbit;

        xycz_addc(&mut r0, &mut r1); // (r0, r1) <- (r0 + r1, r0 - r1)
        xycz_add(&mut r0, &mut r1); // (r0, r1) <- (r0 + r1, r0)
    }
    // The closing swap keys on the loop-final kbit, i.e. bit 0 of the
    // padded scalar. pbit holds the same value at this point (each
    // iteration ends with pbit = kbit), so either selector closes the
    // ladder identically; kbit is the historical choice for this driver.
    let kbit = scalar::bit(&padded, 0);
    PointXy::cswap(&mut r0, &mut r1, kbit);

    // (r0, r1) = ([k]G, [k+1]G)  ->  (invariant, [k]G)
    xycz_getinvariant(&mut r0, &mut r1);

    // Z-recovery: the invariant slot is G at the terminal shared Z, so
    // z = X' * yG / (Y' * xG).
    let mut z = Fe::mul(&r0.y, &base.x);
    z = Fe::inverse(&z);
    z = Fe::mul(&z, &base.y);
    z = Fe::mul(&z, &r0.x);

    apply_z(&mut r0, &z);
    apply_z(&mut r1, &z);

    // After recovery r0 must equal G exactly. XORing r1 with r0 ^ G is the
    // identity on a clean run; any perturbation of r0 garbles the output
    // instead of passing through silently.
    for i in 0..4 {
        r1.x.0[i] ^= r0.x.0[i] ^ base.x.0[i];
        r1.y.0[i] ^= r0.y.0[i] ^ base.y.0[i];
    }

    AffinePoint {
        x: Fe::from_mont(&r1.x).to_bytes_be(),
        y: Fe::from_mont(&r1.y).to_bytes_be(),
    }
}

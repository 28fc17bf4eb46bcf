//! Jacobian-coordinate point arithmetic and the classical ladder driver.
//!
//! Points are `(X, Y, Z)` with affine `(X/Z^2, Y/Z^3)`; `Z = 0` encodes the
//! point at infinity. Coordinates stay in the Montgomery domain throughout.
//! The doubling and addition sequences are the nistz256 ones for the
//! short-Weierstrass curve with `a = -3`.

use crate::fe::Fe;
use crate::scalar;
use crate::{AffinePoint, CURVE_GX, CURVE_GY};

#[derive(Clone, Copy, Debug)]
pub struct PointJacobian {
    pub(crate) x: Fe,
    pub(crate) y: Fe,
    pub(crate) z: Fe,
}

impl PointJacobian {
    /// The base point G with Z = 1.
    pub fn generator() -> PointJacobian {
        PointJacobian {
            x: CURVE_GX,
            y: CURVE_GY,
            z: Fe::ONE,
        }
    }

    /// The point at infinity, all-zero encoding.
    pub fn infinity() -> PointJacobian {
        PointJacobian {
            x: Fe::ZERO,
            y: Fe::ZERO,
            z: Fe::ZERO,
        }
    }

    /// `[2]self`. Total: doubling infinity stays at infinity.
    pub fn double(&self) -> PointJacobian {
        let mut s = Fe::mul_by_2(&self.y);
        let mut zsqr = Fe::square(&self.z);
        s = Fe::square(&s); // 4y^2
        let mut rz = Fe::mul(&self.z, &self.y);
        rz = Fe::mul_by_2(&rz); // Z3 = 2yz
        let mut m = Fe::add(&self.x, &zsqr);
        zsqr = Fe::sub(&self.x, &zsqr);
        let mut ry = Fe::square(&s);
        ry = Fe::div_by_2(&ry); // 8y^4
        m = Fe::mul(&m, &zsqr);
        m = Fe::mul_by_3(&m); // M = 3(x^2 - z^4)
        s = Fe::mul(&s, &self.x); // 4xy^2
        let tmp = Fe::mul_by_2(&s);
        let mut rx = Fe::square(&m);
        rx = Fe::sub(&rx, &tmp); // X3 = M^2 - 8xy^2
        s = Fe::sub(&s, &rx);
        s = Fe::mul(&s, &m);
        let ry = Fe::sub(&s, &ry); // Y3 = M(4xy^2 - X3) - 8y^4
        PointJacobian {
            x: rx,
            y: ry,
            z: rz,
        }
    }

    /// `self + other`. Infinite operands pass the other point through via
    /// masked selection. Coincident finite operands have no chord and fall
    /// back to the tangent formula; the ladder never takes that path, since
    /// its two registers always differ by the base point.
    pub fn add(&self, other: &PointJacobian) -> PointJacobian {
        let in1inf = self.z.is_zero();
        let in2inf = other.z.is_zero();

        let z2sqr = Fe::square(&other.z);
        let z1sqr = Fe::square(&self.z);
        let mut s1 = Fe::mul(&z2sqr, &other.z);
        let mut s2 = Fe::mul(&z1sqr, &self.z);
        s1 = Fe::mul(&s1, &self.y); // S1 = y1 * z2^3
        s2 = Fe::mul(&s2, &other.y); // S2 = y2 * z1^3
        let r = Fe::sub(&s2, &s1);
        let u1 = Fe::mul(&self.x, &z2sqr); // U1 = x1 * z2^2
        let mut u2 = Fe::mul(&other.x, &z1sqr); // U2 = x2 * z1^2
        let h = Fe::sub(&u2, &u1);

        if h.is_zero() != 0 && in1inf == 0 && in2inf == 0 {
            if r.is_zero() != 0 {
                return self.double();
            }
            return PointJacobian::infinity();
        }

        let rsqr = Fe::square(&r);
        let mut rz = Fe::mul(&h, &self.z);
        let mut hsqr = Fe::square(&h);
        rz = Fe::mul(&rz, &other.z); // Z3 = h * z1 * z2
        let hcub = Fe::mul(&hsqr, &h);
        u2 = Fe::mul(&u1, &hsqr);
        hsqr = Fe::mul_by_2(&u2);
        let mut rx = Fe::sub(&rsqr, &hsqr);
        rx = Fe::sub(&rx, &hcub); // X3 = r^2 - 2*U1*h^2 - h^3
        let mut ry = Fe::sub(&u2, &rx);
        ry = Fe::mul(&ry, &r);
        s2 = Fe::mul(&s1, &hcub);
        ry = Fe::sub(&ry, &s2); // Y3 = r(U1*h^2 - X3) - S1*h^3

        rx = Fe::select(&other.x, &rx, in1inf);
        ry = Fe::select(&other.y, &ry, in1inf);
        rz = Fe::select(&other.z, &rz, in1inf);
        rx = Fe::select(&self.x, &rx, in2inf);
        ry = Fe::select(&self.y, &ry, in2inf);
        rz = Fe::select(&self.z, &rz, in2inf);
        PointJacobian {
            x: rx,
            y: ry,
            z: rz,
        }
    }

    /// Swap `a` and `b` when `swap` is 1, coordinate by coordinate.
    pub fn cswap(a: &mut PointJacobian, b: &mut PointJacobian, swap: u64) {
        Fe::cswap(&mut a.x, &mut b.x, swap);
        Fe::cswap(&mut a.y, &mut b.y, swap);
        Fe::cswap(&mut a.z, &mut b.z, swap);
    }

    /// Affine coordinates out of the Montgomery domain. Fermat inversion
    /// maps Z = 0 to 0, so infinity falls out as the all-zero pair without
    /// a branch.
    pub fn to_affine(&self) -> AffinePoint {
        let zinv = Fe::inverse(&self.z);
        let zinv2 = Fe::square(&zinv);
        let zinv3 = Fe::mul(&zinv2, &zinv);
        let x = Fe::mul(&self.x, &zinv2);
        let y = Fe::mul(&self.y, &zinv3);
        AffinePoint {
            x: Fe::from_mont(&x).to_bytes_be(),
            y: Fe::from_mont(&y).to_bytes_be(),
        }
    }
}

/// `[k]G` through the Jacobian Montgomery ladder; `k` is 32 bytes
/// little-endian. The schedule performs the same field operations for every
/// scalar, and the two registers are reordered only through masked swaps.
pub fn ladder_jac(k: &[u8; 32]) -> AffinePoint {
    let padded = scalar::pad(k);

    // (r0, r1) = (G, [2]G); bit 256 of the padded scalar is always set.
    let mut r0 = PointJacobian::generator();
    let mut r1 = r0.double();

    let mut pbit = 0u64;
    for i in (0..=255usize).rev() {
        let kbit = scalar::bit(&padded, i);
        pbit ^= kbit;
        PointJacobian::cswap(&mut r0, &mut r1, pbit);
        pbit = kbit;

        r1 = r0.add(&r1);
        r0 = r0.double();
    }
    PointJacobian::cswap(&mut r0, &mut r1, pbit);

    r0.to_affine()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_infinity_is_identity() {
        let g = PointJacobian::generator();
        let inf = PointJacobian::infinity();
        assert_eq!(inf.add(&g).to_affine(), g.to_affine());
        assert_eq!(g.add(&inf).to_affine(), g.to_affine());
    }

    #[test]
    fn adding_negation_gives_infinity() {
        let g = PointJacobian::generator();
        let neg = PointJacobian {
            x: g.x,
            y: Fe::neg(&g.y),
            z: g.z,
        };
        let sum = g.add(&neg);
        assert_eq!(sum.z.is_zero(), u64::MAX);
    }

    #[test]
    fn coincident_add_matches_double() {
        let g = PointJacobian::generator();
        assert_eq!(g.add(&g).to_affine(), g.double().to_affine());
    }

    #[test]
    fn chained_doubles_and_adds_agree() {
        // [4]G two ways: double twice, or ((G + [2]G) + G)
        let g = PointJacobian::generator();
        let g2 = g.double();
        let g4 = g2.double();
        let g3 = g.add(&g2);
        assert_eq!(g3.add(&g).to_affine(), g4.to_affine());
    }
}

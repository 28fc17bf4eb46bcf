//! Arithmetic in GF(p) for the P-256 prime, in Montgomery form.
//!
//! A field element is four 64-bit little-endian limbs holding the Montgomery
//! representative `a * R mod p` with `R = 2^256` and
//! `p = 2^256 - 2^224 + 2^192 + 2^96 - 1`. Every operation keeps its output
//! fully reduced in `[0, p)` and runs in constant time: reductions happen
//! through borrow masks, never through data-dependent branches.
//!
//! The word-by-word Montgomery reduction leans on the shape of p:
//! `-p^-1 mod 2^64` is 1, so each round's multiplier is just the low limb of
//! the accumulator; limb 2 of p is zero; and limb 0 is `2^64 - 1`, which
//! collapses the round's low-limb update into a carry of the multiplier.

/// The field prime, little-endian limbs.
pub(crate) const P: [u64; 4] = [
    0xffffffffffffffff,
    0x00000000ffffffff,
    0x0000000000000000,
    0xffffffff00000001,
];

/// `R^2 mod p`: multiplying by this moves a value into the Montgomery domain.
const RR: Fe = Fe([
    0x0000000000000003,
    0xfffffffbffffffff,
    0xfffffffffffffffe,
    0x00000004fffffffd,
]);

#[inline(always)]
const fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let t = a as u128 + b as u128 + carry as u128;
    (t as u64, (t >> 64) as u64)
}

/// Subtract with borrow. `borrow` is all-ones when set, and so is the
/// returned borrow.
#[inline(always)]
const fn sbb(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let t = (a as u128).wrapping_sub(b as u128 + (borrow >> 63) as u128);
    (t as u64, (t >> 64) as u64)
}

#[inline(always)]
const fn mac(a: u64, b: u64, c: u64, carry: u64) -> (u64, u64) {
    let t = a as u128 + (b as u128) * (c as u128) + carry as u128;
    (t as u64, (t >> 64) as u64)
}

/// `l - r` over five limbs. On underflow the modulus is added back under a
/// mask, so for `|l - r| < p` the result is `l - r mod p`.
fn sub_inner(l: [u64; 5], r: [u64; 5]) -> [u64; 4] {
    let (w0, borrow) = sbb(l[0], r[0], 0);
    let (w1, borrow) = sbb(l[1], r[1], borrow);
    let (w2, borrow) = sbb(l[2], r[2], borrow);
    let (w3, borrow) = sbb(l[3], r[3], borrow);
    let (_, borrow) = sbb(l[4], r[4], borrow);

    let (w0, carry) = adc(w0, P[0] & borrow, 0);
    let (w1, carry) = adc(w1, P[1] & borrow, carry);
    let (w2, carry) = adc(w2, P[2] & borrow, carry);
    let (w3, _) = adc(w3, P[3] & borrow, carry);

    [w0, w1, w2, w3]
}

/// Reduce an eight-limb product to `t * R^-1 mod p`, fully reduced.
fn montgomery_reduce(w: &[u64; 8]) -> [u64; 4] {
    let [a0, a1, a2, a3, a4, a5, a6, a7] = *w;

    let (a1, carry) = mac(a1, a0, P[1], a0);
    let (a2, carry) = adc(a2, 0, carry);
    let (a3, carry) = mac(a3, a0, P[3], carry);
    let (a4, carry2) = adc(a4, 0, carry);

    let (a2, carry) = mac(a2, a1, P[1], a1);
    let (a3, carry) = adc(a3, 0, carry);
    let (a4, carry) = mac(a4, a1, P[3], carry);
    let (a5, carry2) = adc(a5, carry2, carry);

    let (a3, carry) = mac(a3, a2, P[1], a2);
    let (a4, carry) = adc(a4, 0, carry);
    let (a5, carry) = mac(a5, a2, P[3], carry);
    let (a6, carry2) = adc(a6, carry2, carry);

    let (a4, carry) = mac(a4, a3, P[1], a3);
    let (a5, carry) = adc(a5, 0, carry);
    let (a6, carry) = mac(a6, a3, P[3], carry);
    let (a7, a8) = adc(a7, carry2, carry);

    sub_inner([a4, a5, a6, a7, a8], [P[0], P[1], P[2], P[3], 0])
}

/// Field element in 4 x 64-bit little-endian limbs, Montgomery domain by
/// convention (conversions are explicit, the type does not track the domain).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fe(pub(crate) [u64; 4]);

impl Fe {
    pub const ZERO: Fe = Fe([0; 4]);

    /// The Montgomery image of 1, i.e. `R mod p`.
    pub const ONE: Fe = Fe([
        0x0000000000000001,
        0xffffffff00000000,
        0xffffffffffffffff,
        0x00000000fffffffe,
    ]);

    /// Load 32 little-endian bytes as an integer, without reduction.
    pub fn from_bytes_le(bytes: &[u8; 32]) -> Fe {
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes[8 * i..8 * i + 8]);
            *limb = u64::from_le_bytes(buf);
        }
        Fe(limbs)
    }

    /// Serialize to 32 big-endian bytes.
    pub fn to_bytes_be(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for i in 0..4 {
            out[8 * i..8 * i + 8].copy_from_slice(&self.0[3 - i].to_be_bytes());
        }
        out
    }

    /// `a + b mod p`.
    pub fn add(a: &Fe, b: &Fe) -> Fe {
        // Bit 255 of p is set, so the raw sum needs a fifth word before the
        // masked reduction.
        let (w0, carry) = adc(a.0[0], b.0[0], 0);
        let (w1, carry) = adc(a.0[1], b.0[1], carry);
        let (w2, carry) = adc(a.0[2], b.0[2], carry);
        let (w3, w4) = adc(a.0[3], b.0[3], carry);
        Fe(sub_inner([w0, w1, w2, w3, w4], [P[0], P[1], P[2], P[3], 0]))
    }

    /// `a - b mod p`.
    pub fn sub(a: &Fe, b: &Fe) -> Fe {
        Fe(sub_inner(
            [a.0[0], a.0[1], a.0[2], a.0[3], 0],
            [b.0[0], b.0[1], b.0[2], b.0[3], 0],
        ))
    }

    /// `-a mod p`.
    pub fn neg(a: &Fe) -> Fe {
        Fe::sub(&Fe::ZERO, a)
    }

    /// `2a mod p`.
    pub fn mul_by_2(a: &Fe) -> Fe {
        Fe::add(a, a)
    }

    /// `3a mod p`.
    pub fn mul_by_3(a: &Fe) -> Fe {
        Fe::add(&Fe::add(a, a), a)
    }

    /// `a / 2 mod p`.
    pub fn div_by_2(a: &Fe) -> Fe {
        // Odd values pick up p first so the shift stays exact; the extra bit
        // lands in a carry word.
        let mask = 0u64.wrapping_sub(a.0[0] & 1);
        let (w0, carry) = adc(a.0[0], P[0] & mask, 0);
        let (w1, carry) = adc(a.0[1], P[1] & mask, carry);
        let (w2, carry) = adc(a.0[2], P[2] & mask, carry);
        let (w3, w4) = adc(a.0[3], P[3] & mask, carry);
        Fe([
            (w0 >> 1) | (w1 << 63),
            (w1 >> 1) | (w2 << 63),
            (w2 >> 1) | (w3 << 63),
            (w3 >> 1) | (w4 << 63),
        ])
    }

    /// Montgomery product `a * b * R^-1 mod p`.
    pub fn mul(a: &Fe, b: &Fe) -> Fe {
        let mut w = [0u64; 8];
        for i in 0..4 {
            let mut carry = 0;
            for j in 0..4 {
                let (lo, hi) = mac(w[i + j], a.0[i], b.0[j], carry);
                w[i + j] = lo;
                carry = hi;
            }
            w[i + 4] = carry;
        }
        Fe(montgomery_reduce(&w))
    }

    /// Montgomery square `a^2 * R^-1 mod p`.
    pub fn square(a: &Fe) -> Fe {
        Fe::mul(a, a)
    }

    /// Move a normal-domain value (any 256-bit integer) into the Montgomery
    /// domain, reducing mod p along the way.
    pub fn to_mont(a: &Fe) -> Fe {
        Fe::mul(a, &RR)
    }

    /// Leave the Montgomery domain by reducing against a zero high half.
    pub fn from_mont(a: &Fe) -> Fe {
        Fe(montgomery_reduce(&[
            a.0[0], a.0[1], a.0[2], a.0[3], 0, 0, 0, 0,
        ]))
    }

    /// `a^-1 mod p` by Fermat, as a fixed chain over the windows `a^3`,
    /// `a^f`, `a^ff`, `a^ffff`, `a^ffffffff`: roughly 255 squarings and 12
    /// multiplications regardless of the value. Maps 0 to 0.
    pub fn inverse(a: &Fe) -> Fe {
        let mut res = Fe::square(a);
        let p2 = Fe::mul(&res, a); // a^3

        res = Fe::square(&p2);
        res = Fe::square(&res);
        let p4 = Fe::mul(&res, &p2); // a^f

        res = Fe::square(&p4);
        for _ in 0..3 {
            res = Fe::square(&res);
        }
        let p8 = Fe::mul(&res, &p4); // a^ff

        res = Fe::square(&p8);
        for _ in 0..7 {
            res = Fe::square(&res);
        }
        let p16 = Fe::mul(&res, &p8); // a^ffff

        res = Fe::square(&p16);
        for _ in 0..15 {
            res = Fe::square(&res);
        }
        let p32 = Fe::mul(&res, &p16); // a^ffffffff

        res = Fe::square(&p32);
        for _ in 0..31 {
            res = Fe::square(&res);
        }
        res = Fe::mul(&res, a);

        for _ in 0..128 {
            res = Fe::square(&res);
        }
        res = Fe::mul(&res, &p32);

        for _ in 0..32 {
            res = Fe::square(&res);
        }
        res = Fe::mul(&res, &p32);

        for _ in 0..16 {
            res = Fe::square(&res);
        }
        res = Fe::mul(&res, &p16);

        for _ in 0..8 {
            res = Fe::square(&res);
        }
        res = Fe::mul(&res, &p8);

        for _ in 0..4 {
            res = Fe::square(&res);
        }
        res = Fe::mul(&res, &p4);

        for _ in 0..2 {
            res = Fe::square(&res);
        }
        res = Fe::mul(&res, &p2);

        for _ in 0..2 {
            res = Fe::square(&res);
        }
        Fe::mul(&res, a)
    }

    /// Swap `a` and `b` when `swap` is 1, through an XOR mask.
    pub fn cswap(a: &mut Fe, b: &mut Fe, swap: u64) {
        let mask = 0u64.wrapping_sub(swap);
        for i in 0..4 {
            let t = mask & (a.0[i] ^ b.0[i]);
            a.0[i] ^= t;
            b.0[i] ^= t;
        }
    }

    /// `a` where `mask` is all-ones, `b` where it is zero.
    pub(crate) fn select(a: &Fe, b: &Fe, mask: u64) -> Fe {
        let mut r = [0u64; 4];
        for i in 0..4 {
            r[i] = (a.0[i] & mask) | (b.0[i] & !mask);
        }
        Fe(r)
    }

    /// All-ones when the element is zero, all-zeros otherwise.
    pub(crate) fn is_zero(&self) -> u64 {
        let acc = self.0[0] | self.0[1] | self.0[2] | self.0[3];
        let any = (acc | acc.wrapping_neg()) >> 63;
        any.wrapping_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(hex_be: &str) -> Fe {
        let mut bytes: [u8; 32] = hex::decode(hex_be).unwrap().try_into().unwrap();
        bytes.reverse();
        Fe::from_bytes_le(&bytes)
    }

    #[test]
    fn one_leaves_montgomery_as_unit() {
        let one = Fe::from_mont(&Fe::ONE);
        assert_eq!(one.0, [1, 0, 0, 0]);
    }

    #[test]
    fn mont_roundtrip() {
        let a = fe("6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296");
        let back = Fe::from_mont(&Fe::to_mont(&a));
        assert_eq!(a, back);
    }

    #[test]
    fn to_mont_of_gx_matches_constant() {
        let gx = fe("6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296");
        assert_eq!(Fe::to_mont(&gx), crate::CURVE_GX);
    }

    #[test]
    fn add_wraps_at_p() {
        // (p - 1) + 1 == 0
        let pm1 = fe("ffffffff00000001000000000000000000000000fffffffffffffffffffffffe");
        let one = fe("0000000000000000000000000000000000000000000000000000000000000001");
        assert_eq!(Fe::add(&pm1, &one), Fe::ZERO);
        assert_eq!(Fe::sub(&Fe::ZERO, &one), pm1);
        assert_eq!(Fe::neg(&one), pm1);
        assert_eq!(Fe::neg(&Fe::ZERO), Fe::ZERO);
    }

    #[test]
    fn mul_identity_in_montgomery_domain() {
        let a = Fe::to_mont(&fe(
            "4b03a4b38e95ffb0d822a3f7030c4ad7bdab0ae1c2f5c36fa0a0c94d7b9a1b3c",
        ));
        assert_eq!(Fe::mul(&a, &Fe::ONE), a);
    }

    #[test]
    fn div_by_2_inverts_doubling() {
        for hex_val in [
            "0000000000000000000000000000000000000000000000000000000000000001",
            "00000000000000000000000000000000000000000000000000000000deadbeef",
            "ffffffff00000001000000000000000000000000fffffffffffffffffffffffe",
        ] {
            let a = fe(hex_val);
            assert_eq!(Fe::mul_by_2(&Fe::div_by_2(&a)), a);
            assert_eq!(Fe::div_by_2(&Fe::mul_by_2(&a)), a);
        }
    }

    #[test]
    fn small_multiples_of_the_unit() {
        // ONE is the Montgomery image of 1, so x2/x3 must land on the images
        // of 2 and 3.
        assert_eq!(Fe::mul_by_2(&Fe::ONE), Fe::to_mont(&Fe([2, 0, 0, 0])));
        assert_eq!(Fe::mul_by_3(&Fe::ONE), Fe::to_mont(&Fe([3, 0, 0, 0])));
    }

    #[test]
    fn inverse_times_value_is_one() {
        let a = Fe::to_mont(&fe(
            "4b03a4b38e95ffb0d822a3f7030c4ad7bdab0ae1c2f5c36fa0a0c94d7b9a1b3c",
        ));
        assert_eq!(Fe::mul(&a, &Fe::inverse(&a)), Fe::ONE);
    }

    #[test]
    fn inverse_of_zero_is_zero() {
        assert_eq!(Fe::inverse(&Fe::ZERO), Fe::ZERO);
    }

    #[test]
    fn cswap_both_ways() {
        let a0 = Fe([1, 2, 3, 4]);
        let b0 = Fe([5, 6, 7, 8]);

        let (mut a, mut b) = (a0, b0);
        Fe::cswap(&mut a, &mut b, 0);
        assert_eq!((a, b), (a0, b0));

        Fe::cswap(&mut a, &mut b, 1);
        assert_eq!((a, b), (b0, a0));
    }

    #[test]
    fn select_and_is_zero_masks() {
        let a = Fe([1, 2, 3, 4]);
        let b = Fe([5, 6, 7, 8]);
        assert_eq!(Fe::select(&a, &b, u64::MAX), a);
        assert_eq!(Fe::select(&a, &b, 0), b);
        assert_eq!(Fe::ZERO.is_zero(), u64::MAX);
        assert_eq!(a.is_zero(), 0);
    }

    #[test]
    fn bytes_be_roundtrip() {
        let a = fe("07775510db8ed040293d9ac69f7430dbba7dade63ce982299e04b79d227873d1");
        assert_eq!(
            hex::encode(a.to_bytes_be()),
            "07775510db8ed040293d9ac69f7430dbba7dade63ce982299e04b79d227873d1"
        );
    }
}

/// Position hash of a color, used to index the 64-entry color array.
///
/// Wrapping u8 arithmetic is fine here: 64 divides 256, so the truncated sum
/// masked to 6 bits equals `(r*3 + g*5 + b*7 + a*11) % 64` computed at full
/// width. Encoder and decoder must agree on this function exactly.
#[inline]
pub const fn hash([r, g, b, a]: [u8; 4]) -> u8 {
    r.wrapping_mul(3)
        .wrapping_add(g.wrapping_mul(5))
        .wrapping_add(b.wrapping_mul(7))
        .wrapping_add(a.wrapping_mul(11))
        & 0b11_1111 // % 64
}

/// Computes the wrapping signed difference between two channel values.
#[cfg(any(test, feature = "alloc"))]
#[inline]
pub(crate) const fn diff(a: u8, b: u8) -> i8 {
    a.wrapping_sub(b) as i8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_hash([r, g, b, a]: [u8; 4]) -> u8 {
        ((u32::from(r) * 3 + u32::from(g) * 5 + u32::from(b) * 7 + u32::from(a) * 11) % 64) as u8
    }

    #[test]
    fn hash_fixed_points() {
        assert_eq!(hash([0, 0, 0, 0]), 0);
        // (255*3 + 255*5 + 255*7 + 255*11) % 64
        assert_eq!(hash([255, 255, 255, 255]), 38);
    }

    #[test]
    fn hash_matches_full_width_reference() {
        use rand::{Rng, SeedableRng};
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x9017);
        for _ in 0..10_000 {
            let px: [u8; 4] = rng.gen();
            assert_eq!(hash(px), reference_hash(px), "color {px:?}");
        }
    }

    #[test]
    fn diff_wraps() {
        assert_eq!(diff(0, 255), 1);
        assert_eq!(diff(255, 0), -1);
        assert_eq!(diff(0, 2), -2);
        assert_eq!(diff(128, 0), -128);
    }
}

//! Packs axis-aligned directions like `(1, 0, 0)` or `(1, -1, 0)` into a single byte.
//!
//! This is a lossy, sign-only encoding. Each axis owns two bits: one for the positive and one
//! for the negative direction. Only the sign of each component survives, so it is meant for
//! unit directions and their diagonal combinations, not for arbitrary vectors.
//!
//! | bit | meaning |
//! |-----|---------|
//! | 0   | X+      |
//! | 1   | X-      |
//! | 2   | Y+      |
//! | 3   | Y-      |
//! | 4   | Z+      |
//! | 5   | Z-      |

use glam::I16Vec3;

const AXIS_SHIFTS: [u32; 3] = [0, 2, 4];

/// Packs the signs of a direction vector into the lower six bits of a byte.
#[must_use]
pub fn pack_dir(dir: I16Vec3) -> u8 {
    dir.to_array()
        .into_iter()
        .zip(AXIS_SHIFTS)
        .fold(0, |packed, (component, shift)| {
            packed | (pack_axis(component) << shift)
        })
}

/// Unpacks a direction packed with [`pack_dir`].
///
/// Every component is one of `-1`, `0`, or `1`. If both bits of an axis are set (which
/// `pack_dir` never does), the positive direction wins.
#[must_use]
pub fn unpack_dir(packed: u8) -> I16Vec3 {
    I16Vec3::from_array(AXIS_SHIFTS.map(|shift| unpack_axis(packed >> shift)))
}

fn pack_axis(component: i16) -> u8 {
    match component {
        1.. => 0b01,
        ..0 => 0b10,
        0 => 0b00,
    }
}

fn unpack_axis(bits: u8) -> i16 {
    if bits & 0b01 != 0 {
        1
    } else if bits & 0b10 != 0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_layout() {
        assert_eq!(pack_dir(I16Vec3::ZERO), 0);
        assert_eq!(pack_dir(I16Vec3::X), 0b00_0001);
        assert_eq!(pack_dir(I16Vec3::NEG_X), 0b00_0010);
        assert_eq!(pack_dir(I16Vec3::Y), 0b00_0100);
        assert_eq!(pack_dir(I16Vec3::NEG_Y), 0b00_1000);
        assert_eq!(pack_dir(I16Vec3::Z), 0b01_0000);
        assert_eq!(pack_dir(I16Vec3::NEG_Z), 0b10_0000);
        assert_eq!(pack_dir(I16Vec3::new(1, -1, 0)), 0b00_1001);
    }

    #[test]
    fn all_sign_combinations_round_trip() {
        for x in -1..=1 {
            for y in -1..=1 {
                for z in -1..=1 {
                    let dir = I16Vec3::new(x, y, z);
                    assert_eq!(unpack_dir(pack_dir(dir)), dir);
                }
            }
        }
    }

    #[test]
    fn only_signs_survive() {
        assert_eq!(
            unpack_dir(pack_dir(I16Vec3::new(7, -300, 0))),
            I16Vec3::new(1, -1, 0)
        );
    }

    #[test]
    fn positive_bit_wins() {
        assert_eq!(unpack_dir(0b11_1111), I16Vec3::ONE);
        assert_eq!(unpack_dir(0b00_0011), I16Vec3::X);
    }
}

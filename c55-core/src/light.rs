//! Brightness levels and helpers to spread them from node to node.
//!
//! Light is stored logarithmically in the low four bits of a node's `param` for every
//! material which propagates light (see [`ContentId::light_propagates`](crate::ContentId::light_propagates)).

/// Brightest light level which can be stored in a node.
pub const LIGHT_MAX: u8 = 14;

/// Direct sunlight.
///
/// This only exists while light is being computed; stored light never exceeds [`LIGHT_MAX`].
pub const LIGHT_SUN: u8 = LIGHT_MAX + 1;

/// Mask of the bits of `param` which hold the light level.
pub const LIGHT_MASK: u8 = 0x0f;

/// Returns the light level one step further away from the source.
///
/// Sunlight drops to regular light.
#[must_use]
pub const fn diminish_light(light: u8) -> u8 {
    if light == 0 {
        0
    } else if light >= LIGHT_MAX {
        LIGHT_MAX - 1
    } else {
        light - 1
    }
}

/// Returns the light level `distance` steps further away from the source.
#[must_use]
pub const fn diminish_light_by(light: u8, distance: u8) -> u8 {
    light.saturating_sub(distance)
}

/// Reverts one step of [`diminish_light`].
#[must_use]
pub const fn undiminish_light(light: u8) -> u8 {
    // there's no way to know whether this particular 0 was a diminished 1, so keep it
    if light == 0 || light == LIGHT_MAX {
        light
    } else {
        light + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diminish() {
        assert_eq!(diminish_light(0), 0);
        assert_eq!(diminish_light(1), 0);
        assert_eq!(diminish_light(7), 6);
        assert_eq!(diminish_light(LIGHT_MAX), LIGHT_MAX - 1);
        assert_eq!(diminish_light(LIGHT_SUN), LIGHT_MAX - 1);
    }

    #[test]
    fn diminish_by_distance() {
        assert_eq!(diminish_light_by(10, 3), 7);
        assert_eq!(diminish_light_by(3, 3), 0);
        assert_eq!(diminish_light_by(3, 10), 0);
    }

    #[test]
    fn undiminish() {
        assert_eq!(undiminish_light(0), 0);
        assert_eq!(undiminish_light(5), 6);
        assert_eq!(undiminish_light(LIGHT_MAX), LIGHT_MAX);
        for light in 2..LIGHT_MAX {
            assert_eq!(undiminish_light(diminish_light(light)), light);
        }
    }
}

//! The static classification table which maps every content id to its semantic properties.
//!
//! All lookups are constant time and free of shared mutable state, so they may be performed
//! concurrently from any thread. The reserved ids [`ContentId::AIR`] and [`ContentId::IGNORE`]
//! are resolved before the table of defined materials is consulted.

use crate::{content_id::ContentId, light::LIGHT_MAX};

/// Number of ids which are looked up in the dense table; the reserved ids above are excluded.
const TABLE_SIZE: usize = ContentId::AIR.0 as usize;

/// On a node-node surface, the material of the node with higher solidness is used for drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Solidness {
    /// No geometry at all.
    Invisible = 0,
    /// Rendered but see-through (liquids).
    Transparent = 1,
    /// Fully opaque.
    Opaque = 2,
}

impl From<Solidness> for u8 {
    fn from(value: Solidness) -> Self {
        value as u8
    }
}

/// Which side of a node-node surface a face is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceContents {
    /// No face is generated between the two nodes.
    NoFace,
    /// The face uses the content of the first node.
    UseFirst,
    /// The face uses the content of the second node.
    UseSecond,
}

/// Semantic properties of a single material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "each flag is an independent property of the material"
)]
pub struct ContentFeatures {
    /// The material allows light propagation and brightness is stored in `param`.
    pub light_propagates: bool,
    /// The material allows lossless sunlight propagation.
    pub sunlight_propagates: bool,
    /// Decides which side of a surface is drawn.
    pub solidness: Solidness,
    /// Objects collide with walkable contents.
    pub walkable: bool,
    /// A liquid resists fast movement.
    pub liquid: bool,
    /// Pointable contents can be pointed to in the map.
    pub pointable: bool,
    /// The material can be dug by the player.
    pub diggable: bool,
    /// Placing a node into this material replaces it.
    pub buildable_to: bool,
    /// When placing a node, direction info is added to it if this is true.
    pub directional: bool,
    /// The material forms the base ground that follows the main heightmap.
    pub ground_content: bool,
    /// Flowing liquid may replace this material.
    pub liquid_replaces: bool,
    /// Brightness emitted by the material itself.
    pub light_source: u8,
    /// Tile to draw instead of the material's own one.
    pub tile_override: Option<ContentId>,
}

impl ContentFeatures {
    /// Properties of every material that doesn't specify anything else.
    pub const OPAQUE: Self = Self {
        light_propagates: false,
        sunlight_propagates: false,
        solidness: Solidness::Opaque,
        walkable: true,
        liquid: false,
        pointable: true,
        diggable: true,
        buildable_to: false,
        directional: false,
        ground_content: false,
        liquid_replaces: false,
        light_source: 0,
        tile_override: None,
    };

    const GROUND: Self = Self {
        ground_content: true,
        ..Self::OPAQUE
    };

    const LIQUID: Self = Self {
        light_propagates: true,
        solidness: Solidness::Transparent,
        walkable: false,
        liquid: true,
        pointable: false,
        diggable: false,
        buildable_to: true,
        ..Self::OPAQUE
    };

    const TORCH: Self = Self {
        light_propagates: true,
        sunlight_propagates: true,
        walkable: false,
        directional: true,
        liquid_replaces: true,
        light_source: LIGHT_MAX,
        tile_override: Some(ContentId::AIR),
        ..Self::OPAQUE
    };

    const AIR: Self = Self {
        light_propagates: true,
        sunlight_propagates: true,
        solidness: Solidness::Invisible,
        walkable: false,
        pointable: false,
        diggable: false,
        buildable_to: true,
        liquid_replaces: true,
        tile_override: Some(ContentId::AIR),
        ..Self::OPAQUE
    };

    const IGNORE: Self = Self {
        tile_override: Some(ContentId::AIR),
        ..Self::OPAQUE
    };

    /// Looks up the properties of the given content.
    #[must_use]
    pub fn of(content: ContentId) -> &'static Self {
        match content {
            ContentId::AIR => &Self::AIR,
            ContentId::IGNORE => &Self::IGNORE,
            ContentId(id) => DEFINED.get(usize::from(id)).unwrap_or(&Self::OPAQUE),
        }
    }

    const fn for_defined(content: ContentId) -> Self {
        match content {
            ContentId::STONE
            | ContentId::GRASS
            | ContentId::GRASS_FOOTSTEPS
            | ContentId::MESE
            | ContentId::MUD => Self::GROUND,
            ContentId::WATER | ContentId::OCEAN => Self::LIQUID,
            ContentId::LIGHT => Self::TORCH,
            _ => Self::OPAQUE,
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::indexing_slicing,
    reason = "the loop stays below TABLE_SIZE, which is below 256"
)]
static DEFINED: [ContentFeatures; TABLE_SIZE] = {
    let mut table = [ContentFeatures::OPAQUE; TABLE_SIZE];
    let mut index = 0;
    while index < TABLE_SIZE {
        let content = ContentId(index as u8);
        table[index] = ContentFeatures::for_defined(content);
        index += 1;
    }
    table
};

/// Nodes make a face if contents differ and solidness differs.
///
/// `IGNORE` on either side never produces a face.
#[must_use]
pub fn face_contents(first: ContentId, second: ContentId) -> FaceContents {
    if first == ContentId::IGNORE || second == ContentId::IGNORE {
        return FaceContents::NoFace;
    }

    let first_solidness = first.solidness();
    let second_solidness = second.solidness();
    if first == second || first_solidness == second_solidness {
        return FaceContents::NoFace;
    }

    if first_solidness > second_solidness {
        FaceContents::UseFirst
    } else {
        FaceContents::UseSecond
    }
}

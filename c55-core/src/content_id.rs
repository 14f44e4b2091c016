//! Holds the content id type

use std::fmt::{self, Display};

use crate::content_features::{ContentFeatures, Solidness};

/// The content id describes the _material_ a `MapNode` is made of.
///
/// Ids below [`ContentId::USEFUL_COUNT`] are the defined materials. [`ContentId::AIR`] and
/// [`ContentId::IGNORE`] are reserved and never part of that enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ContentId(pub u8);

impl Default for ContentId {
    fn default() -> Self {
        Self::AIR
    }
}

impl ContentId {
    /// Plain rock, the bulk of the underground.
    pub const STONE: Self = Self(0);
    /// Dirt with a grass cover.
    pub const GRASS: Self = Self(1);
    /// Flowing water.
    pub const WATER: Self = Self(2);
    /// A torch. Emits light and remembers the face it is attached to.
    pub const LIGHT: Self = Self(3);
    /// Tree trunk.
    pub const TREE: Self = Self(4);
    /// Tree foliage.
    pub const LEAVES: Self = Self(5);
    /// Grass which has been trodden on.
    pub const GRASS_FOOTSTEPS: Self = Self(6);
    /// Mese ore.
    pub const MESE: Self = Self(7);
    /// Bare dirt.
    pub const MUD: Self = Self(8);
    /// Still water of the ocean.
    pub const OCEAN: Self = Self(9);

    /// Number of defined materials. All ids below this value are in use.
    pub const USEFUL_COUNT: u8 = 10;

    /// The common material through which the player can walk and which
    /// is transparent to light
    pub const AIR: Self = Self(254);

    /// Ignored node.
    ///
    /// Anything that stores map nodes doesn't have to preserve parameters
    /// associated with this material.
    ///
    /// Doesn't create faces with anything and is considered being
    /// out-of-map in the game map.
    pub const IGNORE: Self = Self(255);

    /// The parameter `IGNORE` nodes are created with.
    pub const IGNORE_DEFAULT_PARAM: i8 = 0;

    /// Returns `true` for the two ids which are not part of the material enumeration.
    #[must_use]
    pub const fn is_reserved(self) -> bool {
        self.0 == Self::AIR.0 || self.0 == Self::IGNORE.0
    }

    /// Returns `true` if this id refers to one of the enumerated materials.
    #[must_use]
    pub const fn is_defined(self) -> bool {
        self.0 < Self::USEFUL_COUNT
    }

    /// Returns all semantic properties of this content.
    #[must_use]
    pub fn features(self) -> &'static ContentFeatures {
        ContentFeatures::of(self)
    }

    /// If true, the material allows light propagation and brightness is stored in `param`.
    #[must_use]
    pub fn light_propagates(self) -> bool {
        self.features().light_propagates
    }

    /// If true, the material allows lossless sunlight propagation.
    #[must_use]
    pub fn sunlight_propagates(self) -> bool {
        self.features().sunlight_propagates
    }

    /// Ranking used to decide whether two adjacent nodes produce a face.
    #[must_use]
    pub fn solidness(self) -> Solidness {
        self.features().solidness
    }

    /// Objects collide with walkable contents.
    #[must_use]
    pub fn walkable(self) -> bool {
        self.features().walkable
    }

    /// A liquid resists fast movement.
    #[must_use]
    pub fn liquid(self) -> bool {
        self.features().liquid
    }

    /// Pointable contents can be pointed to in the map.
    #[must_use]
    pub fn pointable(self) -> bool {
        self.features().pointable
    }

    /// Whether the player may dig this content.
    #[must_use]
    pub fn diggable(self) -> bool {
        self.features().diggable
    }

    /// Whether placing a node into this content replaces it.
    #[must_use]
    pub fn buildable_to(self) -> bool {
        self.features().buildable_to
    }

    /// When placing a node, direction info is added to it if this is true.
    #[must_use]
    pub fn directional(self) -> bool {
        self.features().directional
    }

    /// Contents that form the base ground that follows the main heightmap.
    #[must_use]
    pub fn ground_content(self) -> bool {
        self.features().ground_content
    }

    /// Whether flowing liquid may replace this content.
    #[must_use]
    pub fn liquid_replaces(self) -> bool {
        self.features().liquid_replaces
    }

    /// Brightness emitted by this material. Note that a material which doesn't
    /// propagate light can still be a light source.
    #[must_use]
    pub fn light_source(self) -> u8 {
        self.features().light_source
    }

    /// The content whose tile is used to draw all sides of this content.
    #[must_use]
    pub fn tile(self) -> Self {
        self.features().tile_override.unwrap_or(self)
    }
}

impl Display for ContentId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::STONE => "stone",
            Self::GRASS => "grass",
            Self::WATER => "water",
            Self::LIGHT => "light",
            Self::TREE => "tree",
            Self::LEAVES => "leaves",
            Self::GRASS_FOOTSTEPS => "grass_footsteps",
            Self::MESE => "mese",
            Self::MUD => "mud",
            Self::OCEAN => "ocean",
            Self::AIR => "air",
            Self::IGNORE => "ignore",
            Self(other) => return write!(formatter, "unknown({other})"),
        };
        formatter.write_str(name)
    }
}

impl From<ContentId> for usize {
    fn from(value: ContentId) -> Self {
        usize::from(value.0)
    }
}

impl From<u8> for ContentId {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<ContentId> for u8 {
    fn from(value: ContentId) -> Self {
        value.0
    }
}

//! Contains a single `MapNode` which is the fundamental building block (voxel, cube) of a c55
//! world.

use crate::{
    content_features::Solidness,
    content_id::ContentId,
    direction::{pack_dir, unpack_dir},
    light::LIGHT_MASK,
    map_block::MapBlockPos,
};
use glam::{I16Vec3, U8Vec3, U16Vec3, UVec3, Vec3};

/// Size of a node in world units.
pub const BS: f32 = 10.0;

/// A single map node with its parameters.
///
/// The meaning of `param2` is selected by the content:
/// liquids store their pressure in it, directional contents a direction packed with
/// [`pack_dir`]. Use [`MapNode::param2_kind`] to get a typed view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapNode {
    /// describes the _material_ this node is made of.
    pub content: ContentId,
    /// Misc parameter.
    ///
    /// For contents which propagate light, the low four bits are the light intensity,
    /// stored logarithmically from 0 to [`LIGHT_MAX`](crate::LIGHT_MAX).
    pub param: i8,
    /// content-dependent second auxiliary parameter (pressure or direction)
    pub param2: u8,
}

/// Typed view of [`MapNode::param2`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(variant_size_differences, reason = "all variants are small enough")]
pub enum Param2 {
    /// Pressure of a liquid. Its semantics are owned by the liquid simulation.
    Pressure(u8),
    /// Direction of a directional content like a torch.
    Direction(I16Vec3),
    /// The content doesn't assign any meaning to `param2`.
    Unused(u8),
}

impl MapNode {
    /// Creates a node of the given content with both auxiliary parameters cleared.
    #[must_use]
    pub const fn new(content: ContentId) -> Self {
        Self {
            content,
            param: 0,
            param2: 0,
        }
    }

    /// Creates a node with all parameters given.
    #[must_use]
    pub const fn with_params(content: ContentId, param: i8, param2: u8) -> Self {
        Self {
            content,
            param,
            param2,
        }
    }

    /// The raw bit pattern of `param` as it is stored on the wire.
    #[must_use]
    pub const fn param_byte(self) -> u8 {
        self.param.to_be_bytes()[0]
    }

    /// Replaces `param` by a raw byte as it is stored on the wire.
    pub const fn set_param_byte(&mut self, byte: u8) {
        self.param = i8::from_be_bytes([byte]);
    }

    /// Shorthand for [`ContentId::light_propagates`] of this node's content.
    #[must_use]
    pub fn light_propagates(self) -> bool {
        self.content.light_propagates()
    }

    /// Shorthand for [`ContentId::sunlight_propagates`].
    #[must_use]
    pub fn sunlight_propagates(self) -> bool {
        self.content.sunlight_propagates()
    }

    /// Shorthand for [`ContentId::solidness`].
    #[must_use]
    pub fn solidness(self) -> Solidness {
        self.content.solidness()
    }

    /// Brightness emitted by this node itself.
    #[must_use]
    pub fn light_source(self) -> u8 {
        self.content.light_source()
    }

    /// Returns the brightest of the propagated light and the node's own emission.
    #[must_use]
    pub fn light(self) -> u8 {
        let propagated = if self.light_propagates() {
            self.param_byte() & LIGHT_MASK
        } else {
            0
        };
        propagated.max(self.light_source())
    }

    /// Stores a light level in this node.
    ///
    /// Contents which don't propagate light can't store any, so this silently does nothing for
    /// them. Otherwise the whole `param` is overwritten; callers pass an already masked level.
    pub fn set_light(&mut self, light: u8) {
        if !self.light_propagates() {
            return;
        }
        self.set_param_byte(light);
    }

    /// Interprets `param2` according to the content of this node.
    #[must_use]
    pub fn param2_kind(self) -> Param2 {
        if self.content.liquid() {
            Param2::Pressure(self.param2)
        } else if self.content.directional() {
            Param2::Direction(unpack_dir(self.param2))
        } else {
            Param2::Unused(self.param2)
        }
    }

    /// Returns the pressure if this node is a liquid.
    #[must_use]
    pub fn pressure(self) -> Option<u8> {
        self.content.liquid().then_some(self.param2)
    }

    /// Stores the pressure of a liquid.
    ///
    /// Nodes of other contents are left unchanged and `false` is returned.
    pub fn set_pressure(&mut self, pressure: u8) -> bool {
        let is_liquid = self.content.liquid();
        if is_liquid {
            self.param2 = pressure;
        }
        is_liquid
    }

    /// Returns the direction if this node is directional.
    #[must_use]
    pub fn dir(self) -> Option<I16Vec3> {
        self.content
            .directional()
            .then(|| unpack_dir(self.param2))
    }

    /// Stores a direction. Only its signs are retained.
    ///
    /// Nodes of non-directional contents are left unchanged and `false` is returned.
    pub fn set_dir(&mut self, dir: I16Vec3) -> bool {
        let is_directional = self.content.directional();
        if is_directional {
            self.param2 = pack_dir(dir);
        }
        is_directional
    }
}

impl From<ContentId> for MapNode {
    fn from(value: ContentId) -> Self {
        Self::new(value)
    }
}

/// The coordinates of a single node within the world
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MapNodePos(pub I16Vec3);

impl MapNodePos {
    /// Position of the map node at the world's center
    pub const ZERO: Self = Self(I16Vec3::ZERO);

    /// Returns the node containing the given position measured in world units.
    ///
    /// Each coordinate is rounded half away from zero.
    #[must_use]
    pub fn from_world(pos: Vec3) -> Self {
        let half = Vec3::splat(BS / 2.0).copysign(pos);
        // the float to int conversion saturates, which clamps to the map boundary
        Self(((pos + half) / BS).trunc().as_i16vec3())
    }

    /// Returns the center of this node measured in world units.
    #[must_use]
    pub fn to_world(self) -> Vec3 {
        self.0.as_vec3() * BS
    }

    /// Splits a map node position into its map block position and its index therein.
    #[must_use]
    pub fn split_index(self) -> (MapBlockPos, MapNodeIndex) {
        (self.block_pos(), self.index())
    }

    /// Returns the position of the map block which contains this node.
    #[must_use]
    pub const fn block_pos(self) -> MapBlockPos {
        MapBlockPos::for_node(self)
    }

    /// Returns the index of this node within its map block.
    #[must_use]
    pub fn index(self) -> MapNodeIndex {
        MapNodeIndex::for_node(self)
    }
}

/// The index of a map node within its map block.
///
/// It is equivalent to `(16 * z + y) * 16 + x`, where `x`, `y`, `z` are from 0 to 15.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MapNodeIndex(u16);

impl MapNodeIndex {
    /// Bit indices of the individual coordinates within the index.
    const SHIFT: UVec3 = UVec3::new(0, MapBlockPos::SIZE_BITS, 2 * MapBlockPos::SIZE_BITS);
    /// Bit masks of the individual coordinates when they've been aligned towards the least significant bit.
    const MASK: U16Vec3 = U16Vec3::splat(MapBlockPos::SIZE_MASK);
    /// index of the first node within a block (0, 0, 0)
    pub const MIN: Self = Self(0);
    /// index of the last node within a block (15, 15, 15)
    pub const MAX: Self = Self(MapBlockPos::NODE_COUNT - 1);

    /// Converts a given node position into the index within its containing map block.
    #[must_use]
    pub fn for_node(node_pos: MapNodePos) -> Self {
        // only retain the lower-most bits of the coordinates and align them next to each other
        let vec = (node_pos.0.as_u16vec3() & Self::MASK) << Self::SHIFT;
        Self(vec.x | vec.y | vec.z)
    }

    /// Creates the index of a node from its coordinates relative to the block's origin.
    ///
    /// Returns `None` if the coordinates lie outside of a block.
    #[must_use]
    pub fn from_local(local: U8Vec3) -> Option<Self> {
        let local = local.as_u16vec3();
        local
            .cmplt(U16Vec3::splat(MapBlockPos::SIZE))
            .all()
            .then(|| {
                let vec = local << Self::SHIFT;
                Self(vec.x | vec.y | vec.z)
            })
    }

    /// Iterates over all node indices of a block in storage order.
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN.0..=Self::MAX.0).map(Self)
    }
}

impl From<MapNodeIndex> for U16Vec3 {
    fn from(value: MapNodeIndex) -> Self {
        // right-align the bits of all three coordinates and mask off excessive high-bits
        (U16Vec3::splat(value.0) >> MapNodeIndex::SHIFT) & MapNodeIndex::MASK
    }
}

impl From<MapNodeIndex> for U8Vec3 {
    fn from(value: MapNodeIndex) -> Self {
        U16Vec3::from(value).as_u8vec3()
    }
}

impl From<MapNodeIndex> for UVec3 {
    fn from(value: MapNodeIndex) -> Self {
        U16Vec3::from(value).as_uvec3()
    }
}

impl From<MapNodeIndex> for u16 {
    fn from(value: MapNodeIndex) -> Self {
        value.0
    }
}

impl From<MapNodeIndex> for usize {
    fn from(value: MapNodeIndex) -> Self {
        value.0.into()
    }
}

impl TryFrom<u16> for MapNodeIndex {
    type Error = u16;

    /// Fails with the rejected value if it doesn't address a node within a block.
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value < MapBlockPos::NODE_COUNT {
            Ok(Self(value))
        } else {
            Err(value)
        }
    }
}

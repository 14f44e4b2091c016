//! Contains the node grid of a map block and the position of map blocks within the world.

use std::{
    fmt::{self, Display},
    ops::{Index, IndexMut},
};

use glam::{I16Vec3, UVec3};

use crate::{
    content_id::ContentId,
    map_node::{MapNode, MapNodeIndex, MapNodePos},
};

/// Contains all `MapNodes` of a single map block.
///
/// Nodes are stored in the order given by [`MapNodeIndex`].
#[derive(Clone, PartialEq, Eq)]
pub struct MapBlockNodes(pub [MapNode; MapBlockPos::NODE_COUNT as usize]);

impl MapBlockNodes {
    /// Creates a block where every node is the given one.
    #[must_use]
    pub fn filled(node: MapNode) -> Self {
        Self([node; MapBlockPos::NODE_COUNT as usize])
    }

    /// Iterates over all nodes together with their index.
    pub fn iter(&self) -> impl Iterator<Item = (MapNodeIndex, &MapNode)> {
        MapNodeIndex::all().zip(self.0.iter())
    }

    /// Returns `true` if every node of the block has the given content.
    #[must_use]
    pub fn is_uniform(&self, content: ContentId) -> bool {
        self.0.iter().all(|node| node.content == content)
    }
}

impl Default for MapBlockNodes {
    fn default() -> Self {
        Self::filled(MapNode::default())
    }
}

impl fmt::Debug for MapBlockNodes {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("MapBlockNodes[…]")
    }
}

impl Index<MapNodeIndex> for MapBlockNodes {
    type Output = MapNode;

    fn index(&self, index: MapNodeIndex) -> &Self::Output {
        #[expect(
            clippy::indexing_slicing,
            reason = "MapNodeIndex by construction is guaranteed to be within bounds"
        )]
        &self.0[usize::from(index)]
    }
}

impl IndexMut<MapNodeIndex> for MapBlockNodes {
    fn index_mut(&mut self, index: MapNodeIndex) -> &mut Self::Output {
        #[expect(
            clippy::indexing_slicing,
            reason = "MapNodeIndex by construction is guaranteed to be within bounds"
        )]
        &mut self.0[usize::from(index)]
    }
}

/// The position of a map block.
/// The position is _not_ measured in world coordinates. It can be viewed as a signed 3D-index,
/// where `(0, 0, 0)` is located at the world's center
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MapBlockPos(I16Vec3);

impl MapBlockPos {
    /// number of bit shifts to perform in order to convert between map node and map block
    /// coordinates.
    pub const SIZE_BITS: u32 = 4;
    /// Number of map nodes per map blocks in each dimension.
    pub const SIZE: u16 = 1 << Self::SIZE_BITS;
    /// Mask to be used to address the bits of a node coordinate that make up the the position
    /// within their block.
    pub const SIZE_MASK: u16 = Self::SIZE - 1;
    /// number of map nodes within a single block
    pub const NODE_COUNT: u16 = Self::SIZE * Self::SIZE * Self::SIZE;

    /// Position of the map block at the world's center
    pub const ZERO: Self = Self(I16Vec3::ZERO);

    /// Converts a given node position into that of the containing map block.
    #[must_use]
    pub const fn for_node(node_pos: MapNodePos) -> Self {
        Self(I16Vec3 {
            x: node_pos.0.x >> MapBlockPos::SIZE_BITS,
            y: node_pos.0.y >> MapBlockPos::SIZE_BITS,
            z: node_pos.0.z >> MapBlockPos::SIZE_BITS,
        })
    }

    /// returns the map node position for a certain map node in this map block
    #[must_use]
    pub fn node_pos(self, index: MapNodeIndex) -> MapNodePos {
        MapNodePos(MapNodePos::from(self).0 + UVec3::from(index).as_i16vec3())
    }
}

impl Display for MapBlockPos {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        // use double square brackets to indicate that a map block is bigger than a single map node
        write!(formatter, "[[{}, {}, {}]]", self.0.x, self.0.y, self.0.z)
    }
}

impl From<MapBlockPos> for MapNodePos {
    fn from(value: MapBlockPos) -> Self {
        Self(value.0 << MapBlockPos::SIZE_BITS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_positions() {
        let block = MapBlockPos::for_node(MapNodePos(I16Vec3::new(-5, 7, 40)));
        let first = block.node_pos(MapNodeIndex::MIN);
        let last = block.node_pos(MapNodeIndex::MAX);
        assert_eq!(first, MapNodePos(I16Vec3::new(-16, 0, 32)));
        assert_eq!(last, MapNodePos(I16Vec3::new(-1, 15, 47)));
        assert_eq!(first.split_index(), (block, MapNodeIndex::MIN));
        assert_eq!(last.split_index(), (block, MapNodeIndex::MAX));
        assert_eq!(block.to_string(), "[[-1, 0, 2]]");
    }

    #[test]
    fn indexing() {
        let mut nodes = MapBlockNodes::default();
        assert!(nodes.is_uniform(ContentId::AIR));

        let index = MapNodePos(I16Vec3::new(3, 4, 5)).index();
        nodes[index] = MapNode::new(ContentId::MESE);
        assert_eq!(nodes[index].content, ContentId::MESE);
        assert_eq!(nodes.0[5 * 256 + 4 * 16 + 3].content, ContentId::MESE);
        assert!(!nodes.is_uniform(ContentId::AIR));

        let found: Vec<_> = nodes
            .iter()
            .filter(|(_, node)| node.content == ContentId::MESE)
            .map(|(index, _)| index)
            .collect();
        assert_eq!(found, vec![index]);
    }
}

//! # Block Catalog
//!
//! Static per-type metadata: which normalized height band a type is generated in,
//! how long it takes to dig, and which material a dig reveals underneath.
//! The catalog holds no mutable state.

use super::block_type::{BlockType, REAL_BLOCK_TYPE_COUNT};

/// Immutable record describing one block type.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockProperties {
    pub block_type: BlockType,
    /// Material used by whoever draws the block.
    pub material_id: u16,
    /// Inclusive band of `height / maxHeight` this type is generated on top of.
    /// `None` for types that only ever appear underneath or by building.
    pub generation_range: Option<(f32, f32)>,
    pub destroy_time_seconds: f32,
    /// Type used under this one in gap fills, and revealed when it is dug.
    pub type_exposed_when_dug: BlockType,
}

impl BlockProperties {
    pub fn within_height_range(&self, ratio: f32) -> bool {
        match self.generation_range {
            Some((low, high)) => ratio >= low && ratio <= high,
            None => false,
        }
    }
}

/// Lookup table from block type to its properties.
#[derive(Clone, Debug)]
pub struct BlockCatalog {
    properties: Vec<BlockProperties>,
}

const STANDARD_PROPERTIES: [BlockProperties; REAL_BLOCK_TYPE_COUNT] = [
    BlockProperties {
        block_type: BlockType::Dirt,
        material_id: 1,
        generation_range: None,
        destroy_time_seconds: 0.75,
        type_exposed_when_dug: BlockType::Dirt,
    },
    BlockProperties {
        block_type: BlockType::DirtGrass,
        material_id: 2,
        generation_range: Some((0.25, 0.55)),
        destroy_time_seconds: 0.75,
        type_exposed_when_dug: BlockType::Dirt,
    },
    BlockProperties {
        block_type: BlockType::Stone,
        material_id: 3,
        generation_range: Some((0.55, 0.8)),
        destroy_time_seconds: 1.5,
        type_exposed_when_dug: BlockType::Stone,
    },
    BlockProperties {
        block_type: BlockType::StoneSnow,
        material_id: 4,
        generation_range: Some((0.8, 1.0)),
        destroy_time_seconds: 1.5,
        type_exposed_when_dug: BlockType::Stone,
    },
    BlockProperties {
        block_type: BlockType::Sand,
        material_id: 5,
        generation_range: Some((0.0, 0.25)),
        destroy_time_seconds: 0.5,
        type_exposed_when_dug: BlockType::Sand,
    },
    BlockProperties {
        block_type: BlockType::Ice,
        material_id: 6,
        generation_range: None,
        destroy_time_seconds: 1.0,
        type_exposed_when_dug: BlockType::Ice,
    },
    BlockProperties {
        block_type: BlockType::Invisible,
        material_id: 0,
        generation_range: None,
        destroy_time_seconds: 0.0,
        type_exposed_when_dug: BlockType::Invisible,
    },
];

impl Default for BlockCatalog {
    fn default() -> Self {
        BlockCatalog::standard()
    }
}

impl BlockCatalog {
    /// The palette shipped with the game. Its bands cover [0, 1] without gaps.
    pub fn standard() -> Self {
        BlockCatalog {
            properties: STANDARD_PROPERTIES.to_vec(),
        }
    }

    /// Builds a catalog from custom records, indexed by their block type.
    ///
    /// Records for `BlockType::None` are ignored. Types without a record fall
    /// back to the standard entry.
    pub fn from_properties(records: impl IntoIterator<Item = BlockProperties>) -> Self {
        let mut properties = STANDARD_PROPERTIES.to_vec();
        for record in records {
            if record.block_type == BlockType::None {
                log::warn!("Ignoring catalog record bound to BlockType::None");
                continue;
            }
            properties[record.block_type.as_size() as usize] = record;
        }
        BlockCatalog { properties }
    }

    /// Properties of a real block type; `None` for the `None` sentinel.
    pub fn get(&self, block_type: BlockType) -> Option<&BlockProperties> {
        self.properties.get(block_type.as_size() as usize)
    }

    /// Records in scan order, used by height classification.
    pub fn iter(&self) -> impl Iterator<Item = &BlockProperties> {
        self.properties.iter()
    }

    /// Whether some band covers `ratio`.
    pub fn covers(&self, ratio: f32) -> bool {
        self.iter().any(|properties| properties.within_height_range(ratio))
    }

    pub fn destroy_time(&self, block_type: BlockType) -> Option<f32> {
        self.get(block_type).map(|properties| properties.destroy_time_seconds)
    }

    pub fn exposed_when_dug(&self, block_type: BlockType) -> Option<BlockType> {
        self.get(block_type).map(|properties| properties.type_exposed_when_dug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_bands_cover_unit_interval() {
        let catalog = BlockCatalog::standard();
        for i in 0..=10_000 {
            let ratio = i as f32 / 10_000.0;
            assert!(catalog.covers(ratio), "gap at {}", ratio);
        }
    }

    #[test]
    fn records_are_indexed_by_type() {
        let catalog = BlockCatalog::standard();
        for block_type in BlockType::ALL {
            assert_eq!(catalog.get(block_type).unwrap().block_type, block_type);
        }
        assert!(catalog.get(BlockType::None).is_none());
    }

    #[test]
    fn stone_reveals_stone() {
        let catalog = BlockCatalog::standard();
        assert_eq!(catalog.exposed_when_dug(BlockType::Stone), Some(BlockType::Stone));
        assert_eq!(catalog.exposed_when_dug(BlockType::DirtGrass), Some(BlockType::Dirt));
    }

    #[test]
    fn custom_records_override_standard_ones() {
        let catalog = BlockCatalog::from_properties([BlockProperties {
            block_type: BlockType::Sand,
            material_id: 5,
            generation_range: Some((0.0, 0.1)),
            destroy_time_seconds: 0.2,
            type_exposed_when_dug: BlockType::Sand,
        }]);
        assert_eq!(catalog.destroy_time(BlockType::Sand), Some(0.2));
        assert!(!catalog.covers(0.2));
    }
}

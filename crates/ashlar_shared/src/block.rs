use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

#[repr(transparent)]
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Pod,
    Zeroable,
)]
pub struct BlockId(pub u16);

impl BlockId {
    pub const AIR: Self = Self(0);
    pub const KEELSTONE: Self = Self(1);
    pub const GRANITE: Self = Self(2);
    pub const SOIL: Self = Self(3);
    pub const MEADOW_TURF: Self = Self(4);
    pub const SHORE_SAND: Self = Self(5);
    pub const PINE_LOG: Self = Self(6);
    pub const CUT_PLANK: Self = Self(7);
    pub const PINE_LEAVES: Self = Self(8);
    pub const STILL_WATER: Self = Self(9);
    pub const COBBLE: Self = Self(10);
    pub const FROST_GLASS: Self = Self(11);
    pub const SNOW_CAP: Self = Self(12);
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockProperties {
    pub name: String,
    pub solid: bool,
    pub transparent: bool,
    pub hardness: f32,
}

#[derive(Default, Debug, Clone)]
pub struct BlockRegistry {
    properties: Vec<BlockProperties>,
    by_name: HashMap<String, BlockId>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self {
            properties: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn register(&mut self, props: BlockProperties) -> BlockId {
        if let Some(existing) = self.by_name.get(props.name.as_str()) {
            return *existing;
        }

        let next_index = self.properties.len();
        let id = BlockId(
            u16::try_from(next_index).expect("block registry exceeded BlockId capacity (u16::MAX)"),
        );

        self.by_name.insert(props.name.clone(), id);
        self.properties.push(props);
        id
    }

    /// Unknown ids resolve to air so a stale or corrupt id degrades to an
    /// empty cell instead of a panic mid-frame.
    pub fn properties_of(&self, id: BlockId) -> &BlockProperties {
        self.properties
            .get(usize::from(id.0))
            .or_else(|| self.properties.get(usize::from(BlockId::AIR.0)))
            .expect("block registry is empty; call register_default_blocks() first")
    }

    pub fn is_opaque(&self, id: BlockId) -> bool {
        let props = self.properties_of(id);
        props.solid && !props.transparent
    }

    pub fn get_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

pub fn register_default_blocks() -> BlockRegistry {
    fn block(name: &str, solid: bool, transparent: bool, hardness: f32) -> BlockProperties {
        BlockProperties {
            name: name.to_string(),
            solid,
            transparent,
            hardness,
        }
    }

    let mut registry = BlockRegistry::new();

    let defaults = [
        block("air", false, true, 0.0),
        block("keelstone", true, false, 1000.0),
        block("granite", true, false, 4.0),
        block("soil", true, false, 1.2),
        block("meadow_turf", true, false, 0.8),
        block("shore_sand", true, false, 0.6),
        block("pine_log", true, false, 2.0),
        block("cut_plank", true, false, 1.5),
        block("pine_leaves", true, true, 0.2),
        block("still_water", false, true, 100.0),
        block("cobble", true, false, 3.5),
        block("frost_glass", true, true, 0.5),
        block("snow_cap", true, true, 0.1),
    ];

    for props in defaults {
        registry.register(props);
    }

    registry
}

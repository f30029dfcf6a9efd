//! Voxel palette: dense, append-only registry mapping names to small
//! integer IDs plus the per-voxel face/collision/style descriptor.
//!
//! Grounded on the reference engine's `vx::DataManager` (`Voxel.hpp` /
//! `Voxel.cpp`): air is inserted first to guarantee ID 0, lookups by ID
//! and by name are O(1) once built, and a dedicated `OutOfBounds`
//! descriptor is handed back for the sentinel ID rather than stored in
//! the table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Reserved sentinel voxel ID. Never stored in a chunk; returned by
/// lookups that cross outside the loaded grid.
pub const OUT_OF_BOUNDS_ID: u8 = 255;

/// Air is always inserted first and therefore always receives this ID.
pub const AIR_ID: u8 = 0;

/// A palette may hold at most this many real entries (IDs `0..=254`);
/// `255` is reserved for the sentinel.
const MAX_ENTRIES: usize = 254;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshStyle {
    Voxel,
    Cross,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoxelType {
    Solid,
    Liquid,
    Gas,
    Detail,
}

/// Face order used to index [`VoxelDescriptor::tile_ids`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Top,
    Bottom,
    North,
    South,
    East,
    West,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Top,
        Face::Bottom,
        Face::North,
        Face::South,
        Face::East,
        Face::West,
    ];

    pub fn index(self) -> usize {
        match self {
            Face::Top => 0,
            Face::Bottom => 1,
            Face::North => 2,
            Face::South => 3,
            Face::East => 4,
            Face::West => 5,
        }
    }

    /// Axis-aligned outward normal for this face, used both for vertex
    /// normals and as the transparent-triangle sort key.
    pub fn normal(self) -> glam::Vec3 {
        match self {
            Face::Top => glam::Vec3::Y,
            Face::Bottom => glam::Vec3::NEG_Y,
            Face::North => glam::Vec3::Z,
            Face::South => glam::Vec3::NEG_Z,
            Face::East => glam::Vec3::X,
            Face::West => glam::Vec3::NEG_X,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelDescriptor {
    pub id: u8,
    pub name: String,
    pub collidable: bool,
    pub style: MeshStyle,
    pub kind: VoxelType,
    pub tile_ids: [u16; 6],
}

impl VoxelDescriptor {
    fn uniform(name: &str, collidable: bool, style: MeshStyle, kind: VoxelType, tile: u16) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            collidable,
            style,
            kind,
            tile_ids: [tile; 6],
        }
    }
}

/// The six named common voxels every default palette registers, plus
/// the sentinel. Gameplay code can resolve these without a string
/// lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonVoxel {
    Air,
    Stone,
    Sand,
    Water,
    Dirt,
    Grass,
}

pub struct VoxelPalette {
    descriptors: Vec<VoxelDescriptor>,
    name_to_id: HashMap<String, u8>,
    common: HashMap<CommonVoxel, u8>,
    out_of_bounds: VoxelDescriptor,
}

impl VoxelPalette {
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            name_to_id: HashMap::new(),
            common: HashMap::new(),
            out_of_bounds: VoxelDescriptor {
                id: OUT_OF_BOUNDS_ID,
                name: "out_of_bounds".to_string(),
                collidable: false,
                style: MeshStyle::None,
                kind: VoxelType::Gas,
                tile_ids: [0; 6],
            },
        }
    }

    /// Appends a descriptor, assigning it the next dense ID. Fails once
    /// the palette already holds [`MAX_ENTRIES`] entries.
    pub fn add(&mut self, mut descriptor: VoxelDescriptor) -> PipelineResult<u8> {
        if self.descriptors.len() >= MAX_ENTRIES {
            return Err(PipelineError::PaletteOverflow);
        }
        let id = self.descriptors.len() as u8;
        descriptor.id = id;
        self.name_to_id.insert(descriptor.name.clone(), id);
        self.descriptors.push(descriptor);
        Ok(id)
    }

    pub fn id_of(&self, name: &str) -> PipelineResult<u8> {
        self.name_to_id
            .get(name)
            .copied()
            .ok_or_else(|| PipelineError::UnknownVoxelName(name.to_string()))
    }

    pub fn id_of_common(&self, common: CommonVoxel) -> PipelineResult<u8> {
        self.common
            .get(&common)
            .copied()
            .ok_or(PipelineError::UnknownCommonVoxel(common))
    }

    /// Returns the out-of-bounds descriptor for the sentinel ID;
    /// otherwise the stored descriptor for `id`.
    pub fn descriptor_of(&self, id: u8) -> &VoxelDescriptor {
        if id == OUT_OF_BOUNDS_ID {
            &self.out_of_bounds
        } else {
            &self.descriptors[id as usize]
        }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for VoxelPalette {
    /// Default load: air, water, sand, stone, dirt, grass, then three
    /// Cross-style detail entries, matching the reference `DataManager`
    /// constructor's registration order exactly (air must land on ID 0).
    fn default() -> Self {
        let mut palette = Self::new();

        let air_id = palette
            .add(VoxelDescriptor::uniform(
                "air",
                false,
                MeshStyle::None,
                VoxelType::Gas,
                0,
            ))
            .expect("empty palette always accepts the first entry");
        debug_assert_eq!(air_id, AIR_ID);
        palette.common.insert(CommonVoxel::Air, air_id);

        let water_id = palette
            .add(VoxelDescriptor::uniform(
                "water",
                true,
                MeshStyle::Voxel,
                VoxelType::Liquid,
                17,
            ))
            .expect("palette has room");
        palette.common.insert(CommonVoxel::Water, water_id);

        let sand_id = palette
            .add(VoxelDescriptor::uniform(
                "sand",
                true,
                MeshStyle::Voxel,
                VoxelType::Solid,
                1,
            ))
            .expect("palette has room");
        palette.common.insert(CommonVoxel::Sand, sand_id);

        let stone_id = palette
            .add(VoxelDescriptor::uniform(
                "stone",
                true,
                MeshStyle::Voxel,
                VoxelType::Solid,
                9,
            ))
            .expect("palette has room");
        palette.common.insert(CommonVoxel::Stone, stone_id);

        let dirt_id = palette
            .add(VoxelDescriptor::uniform(
                "dirt",
                true,
                MeshStyle::Voxel,
                VoxelType::Solid,
                0,
            ))
            .expect("palette has room");
        palette.common.insert(CommonVoxel::Dirt, dirt_id);

        let mut grass = VoxelDescriptor::uniform(
            "grass",
            true,
            MeshStyle::Voxel,
            VoxelType::Solid,
            8,
        );
        grass.tile_ids[Face::Top.index()] = 16;
        grass.tile_ids[Face::Bottom.index()] = 0;
        let grass_id = palette.add(grass).expect("palette has room");
        palette.common.insert(CommonVoxel::Grass, grass_id);

        palette
            .add(VoxelDescriptor::uniform(
                "sand_grass",
                false,
                MeshStyle::Cross,
                VoxelType::Detail,
                7,
            ))
            .expect("palette has room");
        palette
            .add(VoxelDescriptor::uniform(
                "short_grass01",
                false,
                MeshStyle::Cross,
                VoxelType::Detail,
                15,
            ))
            .expect("palette has room");
        palette
            .add(VoxelDescriptor::uniform(
                "short_grass02",
                false,
                MeshStyle::Cross,
                VoxelType::Detail,
                23,
            ))
            .expect("palette has room");

        palette
    }
}

//! # Save Stores
//!
//! Storage backends for [`SaveSnapshot`]s.
//!
//! [`FileSaveStore`] writes JSON files under one directory:
//!
//! ```text
//! <root>/gamesave.json                    world record
//! <root>/ChunksData/<x>_<z>_ChunkData.json one per chunk
//! <root>/playerData.json                  viewpoint record
//! ```
//!
//! The chunk directory is wiped on every save so chunks dropped from the
//! world do not linger.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    core::error::{TerrainError, TerrainResult},
    engine_state::voxels::chunk::ChunkKey,
};

use super::{ChunkRecord, SaveSnapshot, ViewpointRecord, WorldRecord};

const WORLD_FILE: &str = "gamesave.json";
const CHUNK_DIRECTORY: &str = "ChunksData";
const VIEWPOINT_FILE: &str = "playerData.json";

/// Durable storage for the three saved records.
pub trait SaveStore {
    fn save(&mut self, snapshot: &SaveSnapshot) -> TerrainResult<()>;

    /// Whether a complete save is present.
    fn save_exists(&self) -> bool;

    /// # Errors
    /// `PersistenceMiss` if no world record was saved.
    fn load_world(&self) -> TerrainResult<WorldRecord>;

    /// # Errors
    /// `PersistenceMiss` if the chunk has no saved record.
    fn load_chunk(&self, key: ChunkKey) -> TerrainResult<ChunkRecord>;

    /// A missing viewpoint loads as the origin.
    fn load_viewpoint(&self) -> TerrainResult<ViewpointRecord>;
}

/// JSON files in a save directory.
pub struct FileSaveStore {
    root: PathBuf,
}

impl FileSaveStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSaveStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn world_path(&self) -> PathBuf {
        self.root.join(WORLD_FILE)
    }

    fn chunk_directory(&self) -> PathBuf {
        self.root.join(CHUNK_DIRECTORY)
    }

    fn chunk_path(&self, key: ChunkKey) -> PathBuf {
        self.chunk_directory().join(format!("{}_ChunkData.json", key))
    }

    fn viewpoint_path(&self) -> PathBuf {
        self.root.join(VIEWPOINT_FILE)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> TerrainResult<()> {
    let bytes = serde_json::to_vec(value)?;
    fs::write(path, bytes)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> TerrainResult<T> {
    if !path.exists() {
        return Err(TerrainError::PersistenceMiss(path.display().to_string()));
    }
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

impl SaveStore for FileSaveStore {
    fn save(&mut self, snapshot: &SaveSnapshot) -> TerrainResult<()> {
        fs::create_dir_all(&self.root)?;
        write_json(&self.world_path(), &snapshot.world)?;

        let chunk_directory = self.chunk_directory();
        if chunk_directory.exists() {
            fs::remove_dir_all(&chunk_directory)?;
        }
        fs::create_dir_all(&chunk_directory)?;
        for record in &snapshot.chunks {
            let path = self.chunk_path(record.world_position.to_key());
            debug!("Writing {}", path.display());
            write_json(&path, record)?;
        }

        write_json(&self.viewpoint_path(), &snapshot.viewpoint)?;
        info!(
            "Saved {} chunks to {}",
            snapshot.chunks.len(),
            self.root.display()
        );
        Ok(())
    }

    fn save_exists(&self) -> bool {
        self.world_path().is_file() && self.chunk_directory().is_dir()
    }

    fn load_world(&self) -> TerrainResult<WorldRecord> {
        read_json(&self.world_path())
    }

    fn load_chunk(&self, key: ChunkKey) -> TerrainResult<ChunkRecord> {
        read_json(&self.chunk_path(key))
    }

    fn load_viewpoint(&self) -> TerrainResult<ViewpointRecord> {
        match read_json(&self.viewpoint_path()) {
            Err(TerrainError::PersistenceMiss(_)) => Ok(ViewpointRecord::default()),
            result => result,
        }
    }
}

/// Keeps the last save in memory.
#[derive(Default, Clone, Debug)]
pub struct MemorySaveStore {
    world: Option<WorldRecord>,
    chunks: HashMap<ChunkKey, ChunkRecord>,
    viewpoint: Option<ViewpointRecord>,
}

impl MemorySaveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets one chunk record, as if its file had been lost.
    pub fn remove_chunk(&mut self, key: ChunkKey) -> Option<ChunkRecord> {
        self.chunks.remove(&key)
    }
}

impl SaveStore for MemorySaveStore {
    fn save(&mut self, snapshot: &SaveSnapshot) -> TerrainResult<()> {
        self.world = Some(snapshot.world.clone());
        self.chunks = snapshot
            .chunks
            .iter()
            .map(|record| (record.world_position.to_key(), record.clone()))
            .collect();
        self.viewpoint = Some(snapshot.viewpoint);
        Ok(())
    }

    fn save_exists(&self) -> bool {
        self.world.is_some()
    }

    fn load_world(&self) -> TerrainResult<WorldRecord> {
        self.world
            .clone()
            .ok_or_else(|| TerrainError::PersistenceMiss("world record".to_string()))
    }

    fn load_chunk(&self, key: ChunkKey) -> TerrainResult<ChunkRecord> {
        self.chunks
            .get(&key)
            .cloned()
            .ok_or_else(|| TerrainError::PersistenceMiss(format!("chunk {}", key)))
    }

    fn load_viewpoint(&self) -> TerrainResult<ViewpointRecord> {
        Ok(self.viewpoint.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::persistence::{BlockRecord, Vec2Record, Vec3Record};
    use tempfile::TempDir;

    fn chunk_record(x: f32, z: f32) -> ChunkRecord {
        ChunkRecord {
            world_position: Vec2Record { x, y: z },
            max_height: 16,
            noise_offset: Vec2Record { x: 0.5, y: 0.5 },
            changed: true,
            height_map_image: None,
            ground_blocks: vec![BlockRecord {
                position: Vec3Record { x, y: 3.0, z },
                block_type_id: 1,
            }],
            invisible_blocks: Vec::new(),
        }
    }

    fn snapshot(chunks: Vec<ChunkRecord>) -> SaveSnapshot {
        SaveSnapshot {
            world: WorldRecord {
                chunk_size: 16,
                noise_scale: 1.0,
                start_noise_offset: Vec2Record { x: 0.5, y: 0.5 },
                window_size: 3,
                noise_seed: 7,
                chunk_world_positions: chunks.iter().map(|record| record.world_position).collect(),
            },
            chunks,
            viewpoint: ViewpointRecord {
                position: Vec3Record { x: 24.0, y: 9.0, z: -8.0 },
            },
        }
    }

    #[test]
    fn file_store_round_trips_every_record() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileSaveStore::new(temp_dir.path().join("save"));
        assert!(!store.save_exists());

        let saved = snapshot(vec![chunk_record(0.0, 0.0), chunk_record(16.0, -16.0)]);
        store.save(&saved).unwrap();

        assert!(store.save_exists());
        assert!(store.root().join("ChunksData/16_-16_ChunkData.json").is_file());
        assert_eq!(store.load_world().unwrap(), saved.world);
        assert_eq!(store.load_chunk(ChunkKey::new(16, -16)).unwrap(), saved.chunks[1]);
        assert_eq!(store.load_viewpoint().unwrap(), saved.viewpoint);
    }

    #[test]
    fn file_store_wipes_stale_chunks() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileSaveStore::new(temp_dir.path());

        store.save(&snapshot(vec![chunk_record(0.0, 0.0), chunk_record(16.0, 0.0)])).unwrap();
        store.save(&snapshot(vec![chunk_record(0.0, 0.0)])).unwrap();

        assert!(store.load_chunk(ChunkKey::new(0, 0)).is_ok());
        let err = store.load_chunk(ChunkKey::new(16, 0)).unwrap_err();
        assert!(matches!(err, TerrainError::PersistenceMiss(_)));
    }

    #[test]
    fn missing_records_are_persistence_misses() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSaveStore::new(temp_dir.path());

        let err = store.load_world().unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(store.load_viewpoint().unwrap(), ViewpointRecord::default());
    }

    #[test]
    fn world_record_without_seed_defaults_to_zero() {
        let json = r#"{
            "chunk_size": 16,
            "noise_scale": 1.0,
            "start_noise_offset": {"x": 0.5, "y": 0.5},
            "window_size": 3,
            "chunk_world_positions": []
        }"#;
        let world: WorldRecord = serde_json::from_str(json).unwrap();
        assert_eq!(world.noise_seed, 0);
    }

    #[test]
    fn memory_store_tracks_the_last_save() {
        let mut store = MemorySaveStore::new();
        assert!(!store.save_exists());
        assert!(store.load_world().is_err());

        store.save(&snapshot(vec![chunk_record(0.0, 0.0)])).unwrap();
        assert!(store.save_exists());
        assert!(store.remove_chunk(ChunkKey::new(0, 0)).is_some());
        assert!(store.load_chunk(ChunkKey::new(0, 0)).is_err());
        assert_eq!(store.load_viewpoint().unwrap().position.x, 24.0);
    }
}

//! Model references, the repository/loader seams, and glTF bounds parsing.
//!
//! DESIGN
//! ======
//! A user picks a model by an opaque reference string. A [`ModelRepository`]
//! resolves it to a location, and an [`AssetLoader`] fetches and parses the
//! bytes there into a [`ModelAsset`]. The engine never interprets references
//! or locations; both traits exist so hosts can plug in their own catalog and
//! transport and tests can substitute mocks.
//!
//! Placement only needs the model's extent, so parsing reads the glTF JSON
//! (from a `.glb` container or a plain `.gltf` document), walks the default
//! scene's node hierarchy, and unions each mesh primitive's POSITION accessor
//! `min`/`max` transformed by the node's world matrix.

#[cfg(test)]
#[path = "assets_test.rs"]
mod assets_test;

use std::collections::HashMap;
use std::fmt;

use glam::{DMat4, DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::AssetError;
use crate::geom::Aabb;

const GLB_MAGIC: u32 = 0x4654_6C67;
const GLB_CHUNK_JSON: u32 = 0x4E4F_534A;
const GLB_HEADER_LEN: usize = 12;
const GLB_CHUNK_HEADER_LEN: usize = 8;

/// Opaque model identifier chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelRef(pub String);

impl ModelRef {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed model, reduced to what placement and picking need.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAsset {
    /// Where the bytes came from.
    pub source: String,
    /// Model-space bounds of all mesh geometry.
    pub bounds: Aabb,
    /// Number of mesh primitives contributing to `bounds`.
    pub primitive_count: usize,
}

impl ModelAsset {
    /// Vertical extent in model units.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.bounds.size().y
    }
}

/// Resolves a [`ModelRef`] to a loadable asset location.
#[async_trait::async_trait]
pub trait ModelRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AssetError::Resolve`] when the reference is unknown or the
    /// catalog is unreachable.
    async fn resolve(&self, reference: &ModelRef) -> Result<String, AssetError>;
}

/// Fetches and parses the asset at a location.
#[async_trait::async_trait]
pub trait AssetLoader: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AssetError::Fetch`] when the bytes cannot be read and
    /// [`AssetError::Parse`] when they are not a glTF model.
    async fn load(&self, location: &str) -> Result<ModelAsset, AssetError>;
}

/// Fixed reference → location table.
#[derive(Debug, Clone, Default)]
pub struct StaticRepository {
    entries: HashMap<String, String>,
}

impl StaticRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, reference: impl Into<String>, location: impl Into<String>) -> Self {
        self.insert(reference, location);
        self
    }

    pub fn insert(&mut self, reference: impl Into<String>, location: impl Into<String>) {
        self.entries.insert(reference.into(), location.into());
    }
}

#[async_trait::async_trait]
impl ModelRepository for StaticRepository {
    async fn resolve(&self, reference: &ModelRef) -> Result<String, AssetError> {
        self.entries.get(reference.as_str()).cloned().ok_or_else(|| AssetError::Resolve {
            reference: reference.0.clone(),
            reason: "not in catalog".into(),
        })
    }
}

/// Loads `.glb` / `.gltf` files from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileAssetLoader;

#[async_trait::async_trait]
impl AssetLoader for FileAssetLoader {
    async fn load(&self, location: &str) -> Result<ModelAsset, AssetError> {
        let bytes = tokio::fs::read(location).await.map_err(|e| AssetError::Fetch {
            location: location.to_string(),
            reason: e.to_string(),
        })?;
        let source = location.to_string();
        tokio::task::spawn_blocking(move || parse_model(&source, &bytes))
            .await
            .map_err(|e| AssetError::Parse(format!("parse task failed: {e}")))?
    }
}

/// Parse a binary (`.glb`) or JSON (`.gltf`) model into its bounds.
///
/// # Errors
///
/// Returns [`AssetError::Parse`] for malformed containers, missing accessors,
/// a node hierarchy that is not a tree, or a model with no positioned geometry.
pub fn parse_model(source: &str, bytes: &[u8]) -> Result<ModelAsset, AssetError> {
    let json = if bytes.starts_with(b"glTF") { glb_json_chunk(bytes)? } else { bytes };
    let doc: GltfDoc = serde_json::from_slice(json).map_err(|e| AssetError::Parse(format!("glTF JSON: {e}")))?;
    let (bounds, primitive_count) = doc.bounds()?;
    Ok(ModelAsset { source: source.to_string(), bounds, primitive_count })
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32, AssetError> {
    let slice = bytes
        .get(at..at + 4)
        .ok_or_else(|| AssetError::Parse(format!("GLB truncated at byte {at}")))?;
    let mut word = [0_u8; 4];
    word.copy_from_slice(slice);
    Ok(u32::from_le_bytes(word))
}

fn glb_json_chunk(bytes: &[u8]) -> Result<&[u8], AssetError> {
    if read_u32(bytes, 0)? != GLB_MAGIC {
        return Err(AssetError::Parse("bad GLB magic".into()));
    }
    let version = read_u32(bytes, 4)?;
    if version != 2 {
        return Err(AssetError::Parse(format!("unsupported GLB version {version}")));
    }
    let chunk_len = read_u32(bytes, GLB_HEADER_LEN)? as usize;
    let chunk_type = read_u32(bytes, GLB_HEADER_LEN + 4)?;
    if chunk_type != GLB_CHUNK_JSON {
        return Err(AssetError::Parse("first GLB chunk is not JSON".into()));
    }
    let start = GLB_HEADER_LEN + GLB_CHUNK_HEADER_LEN;
    bytes
        .get(start..start + chunk_len)
        .ok_or_else(|| AssetError::Parse("GLB JSON chunk exceeds file".into()))
}

// ── glTF subset ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GltfDoc {
    #[serde(default)]
    scene: Option<usize>,
    #[serde(default)]
    scenes: Vec<GltfScene>,
    #[serde(default)]
    nodes: Vec<GltfNode>,
    #[serde(default)]
    meshes: Vec<GltfMesh>,
    #[serde(default)]
    accessors: Vec<GltfAccessor>,
}

#[derive(Debug, Deserialize)]
struct GltfScene {
    #[serde(default)]
    nodes: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct GltfNode {
    #[serde(default)]
    children: Vec<usize>,
    mesh: Option<usize>,
    matrix: Option<[f64; 16]>,
    translation: Option<[f64; 3]>,
    rotation: Option<[f64; 4]>,
    scale: Option<[f64; 3]>,
}

#[derive(Debug, Deserialize)]
struct GltfMesh {
    #[serde(default)]
    primitives: Vec<GltfPrimitive>,
}

#[derive(Debug, Deserialize)]
struct GltfPrimitive {
    #[serde(default)]
    attributes: HashMap<String, usize>,
}

#[derive(Debug, Deserialize)]
struct GltfAccessor {
    min: Option<Vec<f64>>,
    max: Option<Vec<f64>>,
}

impl GltfNode {
    fn local_matrix(&self) -> DMat4 {
        if let Some(m) = self.matrix {
            return DMat4::from_cols_array(&m);
        }
        let t = self.translation.map_or(DVec3::ZERO, DVec3::from_array);
        let r = self.rotation.map_or(DQuat::IDENTITY, |q| DQuat::from_array(q).normalize());
        let s = self.scale.map_or(DVec3::ONE, DVec3::from_array);
        DMat4::from_scale_rotation_translation(s, r, t)
    }
}

impl GltfDoc {
    /// Root nodes of the default scene, or every unparented node if no scene is declared.
    fn roots(&self) -> Vec<usize> {
        if let Some(scene) = self.scene.and_then(|i| self.scenes.get(i)).or_else(|| self.scenes.first()) {
            return scene.nodes.clone();
        }
        let mut is_child = vec![false; self.nodes.len()];
        for node in &self.nodes {
            for &c in &node.children {
                if let Some(flag) = is_child.get_mut(c) {
                    *flag = true;
                }
            }
        }
        (0..self.nodes.len()).filter(|&i| !is_child[i]).collect()
    }

    /// Each node is visited at most once; a node reached twice (shared child or
    /// cycle) is rejected, since glTF node graphs are strict trees.
    fn bounds(&self) -> Result<(Aabb, usize), AssetError> {
        let mut bounds = Aabb::empty();
        let mut count = 0;
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<(usize, DMat4)> = self.roots().into_iter().map(|n| (n, DMat4::IDENTITY)).collect();

        while let Some((index, parent)) = stack.pop() {
            let node = self
                .nodes
                .get(index)
                .ok_or_else(|| AssetError::Parse(format!("node {index} out of range")))?;
            if let Some(seen) = visited.get_mut(index) {
                if *seen {
                    return Err(AssetError::Parse(format!("node {index} has multiple parents")));
                }
                *seen = true;
            }
            let world = parent * node.local_matrix();
            if let Some(mesh_index) = node.mesh {
                let mesh = self
                    .meshes
                    .get(mesh_index)
                    .ok_or_else(|| AssetError::Parse(format!("mesh {mesh_index} out of range")))?;
                for primitive in &mesh.primitives {
                    let Some(&accessor) = primitive.attributes.get("POSITION") else {
                        continue;
                    };
                    let local = self.accessor_box(accessor)?;
                    for corner in local.corners() {
                        bounds.grow(world.transform_point3(corner));
                    }
                    count += 1;
                }
            }
            stack.extend(node.children.iter().map(|&c| (c, world)));
        }

        if count == 0 || bounds.is_empty() {
            return Err(AssetError::Parse("model contains no positioned geometry".into()));
        }
        Ok((bounds, count))
    }

    fn accessor_box(&self, index: usize) -> Result<Aabb, AssetError> {
        let accessor = self
            .accessors
            .get(index)
            .ok_or_else(|| AssetError::Parse(format!("accessor {index} out of range")))?;
        let vec3 = |v: &Option<Vec<f64>>, which: &str| match v.as_deref() {
            Some([x, y, z]) => Ok(DVec3::new(*x, *y, *z)),
            _ => Err(AssetError::Parse(format!("accessor {index} has no 3-component {which}"))),
        };
        Ok(Aabb::new(vec3(&accessor.min, "min")?, vec3(&accessor.max, "max")?))
    }
}

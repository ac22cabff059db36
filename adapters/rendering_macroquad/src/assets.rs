//! Asset registry loading tile textures described by a TOML manifest.
//!
//! ```toml
//! version = 1
//!
//! [tiles]
//! Grass = "tiles/grass.png"
//! Bush = "tiles/bush.png"
//! Tree = "tiles/tree.png"
//! Forest = "tiles/forest.png"
//! ```
//!
//! Paths are resolved relative to the manifest's directory.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use log::debug;
use macroquad::texture::{self, DrawTextureParams, Texture2D};
use tile_lands_core::TileKind;
use tile_lands_rendering::Color;

use crate::to_macroquad_color;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;
const DRAWN_KINDS: [TileKind; 4] = [
    TileKind::Grass,
    TileKind::Bush,
    TileKind::Tree,
    TileKind::Forest,
];

/// Textures for every drawable tile kind, owned by the backend instead of global state.
#[derive(Debug)]
pub(crate) struct AssetRegistry {
    textures: HashMap<TileKind, Texture2D>,
}

impl AssetRegistry {
    /// Loads the textures listed by the manifest at the provided path.
    pub(crate) fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Draws the texture of a tile kind with its top-left corner at `position`.
    ///
    /// Returns `false` when the registry has no texture for the kind.
    pub(crate) fn draw(&self, kind: TileKind, position: Vec2, tint: Color) -> bool {
        let Some(texture) = self.textures.get(&kind).copied() else {
            return false;
        };
        texture::draw_texture_ex(
            texture,
            position.x,
            position.y,
            to_macroquad_color(tint),
            DrawTextureParams::default(),
        );
        true
    }

    fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        mut loader: impl FnMut(TileKind, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read asset manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let entries = parse_manifest(&contents, &base)?;
        Self::from_entries(entries, &mut loader)
    }

    fn from_entries(
        entries: Vec<(TileKind, PathBuf)>,
        loader: &mut impl FnMut(TileKind, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let mut textures = HashMap::with_capacity(entries.len());
        for (kind, path) in entries {
            let texture = loader(kind, &path).with_context(|| {
                format!("failed to load {kind:?} texture from {}", path.display())
            })?;
            if textures.insert(kind, texture).is_some() {
                bail!("duplicate texture entry for {kind:?}");
            }
            debug!("loaded {kind:?} texture from {}", path.display());
        }
        Ok(Self { textures })
    }

    #[cfg(test)]
    fn contains(&self, kind: TileKind) -> bool {
        self.textures.contains_key(&kind)
    }
}

fn default_loader(_kind: TileKind, path: &Path) -> Result<Texture2D> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read texture at {}", path.display()))?;
    Ok(Texture2D::from_file_with_format(&bytes, None))
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    tiles: HashMap<String, String>,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(TileKind, PathBuf)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse asset manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported asset manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut resolved = HashMap::new();
    for (name, relative_path) in manifest.tiles {
        let kind = parse_tile_kind(&name)
            .with_context(|| format!("unknown tile kind `{name}` in manifest"))?;
        if resolved.insert(kind, base_path.join(relative_path)).is_some() {
            bail!("asset manifest contains duplicate entry for {kind:?}");
        }
    }

    let mut ordered = Vec::with_capacity(DRAWN_KINDS.len());
    for kind in DRAWN_KINDS {
        let Some(path) = resolved.remove(&kind) else {
            bail!("asset manifest missing entry for {kind:?}");
        };
        ordered.push((kind, path));
    }

    Ok(ordered)
}

fn parse_tile_kind(name: &str) -> Result<TileKind> {
    match name {
        "Grass" => Ok(TileKind::Grass),
        "Bush" => Ok(TileKind::Bush),
        "Tree" => Ok(TileKind::Tree),
        "Forest" => Ok(TileKind::Forest),
        "Empty" => bail!("empty cells are never drawn"),
        _ => bail!("unknown tile kind `{name}`"),
    }
}

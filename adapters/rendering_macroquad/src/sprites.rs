use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use macroquad::{
    color::WHITE,
    math::{Rect, Vec2 as MacroquadVec2},
    texture::{self, DrawTextureParams, Texture2D},
};
use blaster_alley_rendering::SpriteKey;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;
const ALL_SPRITE_KEYS: [SpriteKey; 4] = [
    SpriteKey::Background,
    SpriteKey::PlayerSheet,
    SpriteKey::EnemySheet,
    SpriteKey::Projectile,
];

/// Parameters describing how a texture should be drawn on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DrawParams {
    /// Position in screen-space pixels where the top-left corner is placed.
    pub(crate) position: Vec2,
    /// Desired destination size in screen-space pixels.
    pub(crate) dest_size: Vec2,
    /// Region of the texture to sample, in texture pixels; `None` draws all.
    pub(crate) source: Option<Rect>,
    /// Whether the texture is mirrored around its vertical axis.
    pub(crate) flip_horizontal: bool,
}

impl DrawParams {
    /// Creates draw parameters covering the whole texture.
    #[must_use]
    pub(crate) fn new(position: Vec2, dest_size: Vec2) -> Self {
        Self {
            position,
            dest_size,
            source: None,
            flip_horizontal: false,
        }
    }

    /// Restricts sampling to the provided source rectangle.
    #[must_use]
    pub(crate) fn with_source(mut self, source: Rect) -> Self {
        self.source = Some(source);
        self
    }

    /// Overrides the horizontal mirroring flag.
    #[must_use]
    pub(crate) fn with_flip_horizontal(mut self, flip: bool) -> Self {
        self.flip_horizontal = flip;
        self
    }
}

/// Cache of textures loaded from the sprite manifest.
#[derive(Debug)]
pub(crate) struct SpriteAtlas {
    textures: HashMap<SpriteKey, Texture2D>,
}

impl SpriteAtlas {
    /// Loads the default sprite manifest from disk.
    pub(crate) fn from_default_manifest() -> Result<Self> {
        Self::from_manifest_path(Self::default_manifest_path())
    }

    /// Loads sprites from the manifest located at the provided path.
    pub(crate) fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Returns the default manifest path relative to the working directory.
    #[must_use]
    pub(crate) fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/manifest.toml")
    }

    /// Draws the requested texture using the supplied parameters.
    pub(crate) fn draw(&self, key: SpriteKey, params: DrawParams) -> Result<()> {
        let texture = *self
            .textures
            .get(&key)
            .with_context(|| format!("sprite {key:?} missing from atlas"))?;

        let draw_params = DrawTextureParams {
            dest_size: Some(MacroquadVec2::new(params.dest_size.x, params.dest_size.y)),
            source: params.source,
            flip_x: params.flip_horizontal,
            ..DrawTextureParams::default()
        };

        texture::draw_texture_ex(
            texture,
            params.position.x,
            params.position.y,
            WHITE,
            draw_params,
        );

        Ok(())
    }

    /// Returns whether the atlas contains the provided key.
    #[allow(dead_code)]
    #[must_use]
    pub(crate) fn contains(&self, key: SpriteKey) -> bool {
        self.textures.contains_key(&key)
    }

    /// Returns the number of textures stored in the atlas.
    #[allow(dead_code)]
    #[must_use]
    pub(crate) fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        mut loader: impl FnMut(SpriteKey, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read sprite manifest at {}",
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
        entries: Vec<(SpriteKey, PathBuf)>,
        loader: &mut impl FnMut(SpriteKey, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let mut textures = HashMap::with_capacity(entries.len());
        for (key, path) in entries {
            let texture = loader(key, &path).with_context(|| {
                format!("failed to load sprite {key:?} from {}", path.display())
            })?;
            if textures.insert(key, texture).is_some() {
                bail!("duplicate sprite entry for {key:?}");
            }
        }
        Ok(Self { textures })
    }
}

fn default_loader(_key: SpriteKey, path: &Path) -> Result<Texture2D> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite asset at {}", path.display()))?;
    Ok(Texture2D::from_file_with_format(&bytes, None))
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    sprites: HashMap<String, String>,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(SpriteKey, PathBuf)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut resolved = HashMap::new();
    for (name, relative_path) in manifest.sprites {
        let key = parse_sprite_key(&name)
            .with_context(|| format!("unknown sprite key `{name}` in manifest"))?;
        let path = base_path.join(relative_path);
        if resolved.insert(key, path).is_some() {
            bail!("sprite manifest contains duplicate entry for {key:?}");
        }
    }

    let mut ordered = Vec::with_capacity(ALL_SPRITE_KEYS.len());
    for key in ALL_SPRITE_KEYS {
        let Some(path) = resolved.remove(&key) else {
            bail!("sprite manifest missing entry for {key:?}");
        };
        ordered.push((key, path));
    }

    if !resolved.is_empty() {
        let unexpected = resolved
            .into_keys()
            .map(|key| format!("{key:?}"))
            .collect::<Vec<_>>()
            .join(", ");
        bail!("sprite manifest contains unexpected keys: {unexpected}");
    }

    Ok(ordered)
}

fn parse_sprite_key(name: &str) -> Result<SpriteKey> {
    match name {
        "Background" => Ok(SpriteKey::Background),
        "PlayerSheet" => Ok(SpriteKey::PlayerSheet),
        "EnemySheet" => Ok(SpriteKey::EnemySheet),
        "Projectile" => Ok(SpriteKey::Projectile),
        _ => bail!("unknown sprite key `{name}`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, path::Path};

    #[test]
    fn parse_manifest_requires_all_known_keys() {
        let manifest = r#"
            version = 1

            [sprites]
            Background = "background.png"
            PlayerSheet = "sheet.png"
            EnemySheet = "badman_sheet.png"
        "#;

        let result = parse_manifest(manifest, Path::new("assets"));
        assert!(result.is_err(), "manifest missing Projectile should fail");
    }

    #[test]
    fn manifest_rejects_unknown_keys() {
        let manifest = r#"
            version = 1

            [sprites]
            Background = "background.png"
            PlayerSheet = "sheet.png"
            EnemySheet = "badman_sheet.png"
            Projectile = "bullet.png"
            Extra = "extra.png"
        "#;

        let result = parse_manifest(manifest, Path::new("assets"));
        assert!(result.is_err(), "unknown keys must be rejected");
    }

    #[test]
    fn manifest_rejects_unsupported_versions() {
        let manifest = r#"
            version = 2

            [sprites]
            Background = "background.png"
            PlayerSheet = "sheet.png"
            EnemySheet = "badman_sheet.png"
            Projectile = "bullet.png"
        "#;

        let result = parse_manifest(manifest, Path::new("assets"));
        assert!(result.is_err(), "future manifest versions must be rejected");
    }

    #[test]
    fn manifest_resolves_paths_relative_to_base_directory() {
        let manifest = r#"
            version = 1

            [sprites]
            Projectile = "bullet.png"
            EnemySheet = "badman_sheet.png"
            PlayerSheet = "sheet.png"
            Background = "background.png"
        "#;

        let parsed = parse_manifest(manifest, Path::new("root")).expect("manifest should parse");
        let expected = vec![
            (SpriteKey::Background, PathBuf::from("root/background.png")),
            (SpriteKey::PlayerSheet, PathBuf::from("root/sheet.png")),
            (
                SpriteKey::EnemySheet,
                PathBuf::from("root/badman_sheet.png"),
            ),
            (SpriteKey::Projectile, PathBuf::from("root/bullet.png")),
        ];
        assert_eq!(parsed, expected);
    }

    #[test]
    fn atlas_loads_textures_using_deterministic_order() {
        let manifest = r#"
            version = 1

            [sprites]
            EnemySheet = "badman_sheet.png"
            Background = "background.png"
            Projectile = "bullet.png"
            PlayerSheet = "sheet.png"
        "#;
        let entries = parse_manifest(manifest, Path::new("assets"))
            .expect("manifest should parse into canonical order");
        let load_order = RefCell::new(Vec::new());
        let atlas = SpriteAtlas::from_entries(entries, &mut |key, _| {
            load_order.borrow_mut().push(key);
            Ok(Texture2D::empty())
        })
        .expect("atlas should load using provided loader");

        assert_eq!(load_order.borrow().as_slice(), &ALL_SPRITE_KEYS);
        assert_eq!(atlas.texture_count(), ALL_SPRITE_KEYS.len());
        for key in ALL_SPRITE_KEYS {
            assert!(atlas.contains(key));
        }
    }

    #[test]
    fn loader_failure_names_the_offending_asset() {
        let entries = vec![(SpriteKey::Background, PathBuf::from("missing.png"))];
        let error = SpriteAtlas::from_entries(entries, &mut |_, _| bail!("decode failed"))
            .expect_err("loader failure must propagate");

        let chain = format!("{error:#}");
        assert!(chain.contains("missing.png"), "diagnostic: {chain}");
    }
}

//! PWA icon and splash-screen bundle.
//!
//! ## Archive layout
//!
//! ```text
//! pwa-assets.zip
//! ├── icon-72x72.png          # one per icon size, configured order
//! ├── ...
//! ├── splash-640x1136.png     # one per splash size, configured order
//! ├── ...
//! └── manifest.json           # pretty-printed, 2-space indent
//! ```
//!
//! Icons are rendered in parallel; splash screens one after another. Nothing
//! is added to the archive until every image is ready, so entry order never
//! depends on scheduling.
//!
//! ## Splash screens
//!
//! Each splash is filled with `background_color`, and the source image is
//! stretched into a centered square whose side is 80% of the splash's
//! shorter edge.

use crate::archive::Archive;
use crate::error::PipelineError;
use crate::imaging::{
    RasterBackend, RustBackend, Surface, parse_color, render_resized, splash_layout,
};
use crate::preview::{Preview, PreviewKind};
use crate::types::{Codec, ImageBlob};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const ARCHIVE_NAME: &str = "pwa-assets.zip";
pub const MANIFEST_NAME: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PwaConfig {
    pub icon_sizes: Vec<u32>,
    /// `(width, height)` pairs, in archive order.
    pub splash_sizes: Vec<(u32, u32)>,
    /// CSS colour for splash backgrounds and the manifest colours.
    pub background_color: String,
    pub name: String,
    pub short_name: String,
}

impl Default for PwaConfig {
    fn default() -> Self {
        Self {
            icon_sizes: vec![72, 96, 128, 144, 152, 192, 384, 512],
            splash_sizes: vec![
                (640, 1136),
                (750, 1334),
                (828, 1792),
                (1125, 2436),
                (1242, 2688),
                (1536, 2048),
                (1668, 2224),
                (2048, 2732),
            ],
            background_color: "#ffffff".into(),
            name: "My PWA App".into(),
            short_name: "PWA App".into(),
        }
    }
}

impl PwaConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.icon_sizes.contains(&0) {
            return Err(PipelineError::InvalidConfig(
                "pwa.icon_sizes must be positive".into(),
            ));
        }
        if self.splash_sizes.iter().any(|&(w, h)| w == 0 || h == 0) {
            return Err(PipelineError::InvalidConfig(
                "pwa.splash_sizes must be positive".into(),
            ));
        }
        // Duplicates would collide in the archive.
        let mut seen = HashSet::new();
        if let Some(size) = self.icon_sizes.iter().find(|&&s| !seen.insert(s)) {
            return Err(PipelineError::InvalidConfig(format!(
                "pwa.icon_sizes lists {size} twice"
            )));
        }
        let mut seen = HashSet::new();
        if let Some((w, h)) = self.splash_sizes.iter().find(|&&s| !seen.insert(s)) {
            return Err(PipelineError::InvalidConfig(format!(
                "pwa.splash_sizes lists {w}x{h} twice"
            )));
        }
        parse_color(&self.background_color)?;
        Ok(())
    }
}

/// Web app manifest. Field order is part of the output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub short_name: String,
    pub icons: Vec<ManifestIcon>,
    pub background_color: String,
    pub theme_color: String,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime: String,
}

impl Manifest {
    pub fn for_config(config: &PwaConfig) -> Self {
        Self {
            name: config.name.clone(),
            short_name: config.short_name.clone(),
            icons: config
                .icon_sizes
                .iter()
                .map(|&size| ManifestIcon {
                    src: icon_name(size),
                    sizes: format!("{size}x{size}"),
                    mime: Codec::Png.mime().to_string(),
                })
                .collect(),
            background_color: config.background_color.clone(),
            theme_color: config.background_color.clone(),
            display: "standalone".into(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// The archive plus previews of every image in it, icons first.
#[derive(Debug, Clone)]
pub struct PwaBundle {
    pub archive: ImageBlob,
    pub previews: Vec<Preview>,
}

pub fn icon_name(size: u32) -> String {
    format!("icon-{size}x{size}.png")
}

pub fn splash_name(width: u32, height: u32) -> String {
    format!("splash-{width}x{height}.png")
}

pub fn generate_pwa_icons(
    blob: &ImageBlob,
    config: &PwaConfig,
) -> Result<PwaBundle, PipelineError> {
    generate_pwa_icons_with(&RustBackend::new(), blob, config)
}

/// Build the PWA bundle using a specific backend (allows testing with mock).
pub fn generate_pwa_icons_with(
    backend: &impl RasterBackend,
    blob: &ImageBlob,
    config: &PwaConfig,
) -> Result<PwaBundle, PipelineError> {
    config.validate()?;
    let background = parse_color(&config.background_color)?;

    let icons = config
        .icon_sizes
        .par_iter()
        .map(|&size| {
            let surface = render_resized(backend, blob, size, size)?;
            backend.encode_surface(&surface, Codec::Png, 1.0, &icon_name(size))
        })
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(count = icons.len(), "rendered PWA icons");

    let mut splashes = Vec::with_capacity(config.splash_sizes.len());
    for &(width, height) in &config.splash_sizes {
        let layout = splash_layout(width, height);
        let mut canvas = Surface::filled(width, height, background);
        let icon = backend.decode_and_draw_scaled(blob, layout.side, layout.side)?;
        canvas.draw(&icon, layout.x, layout.y);
        splashes.push(backend.encode_surface(
            &canvas,
            Codec::Png,
            1.0,
            &splash_name(width, height),
        )?);
        tracing::debug!(width, height, side = layout.side, "rendered splash");
    }

    let manifest = Manifest::for_config(config).to_json()?;

    let mut archive = Archive::new();
    for image in icons.iter().chain(&splashes) {
        archive.add_blob(image)?;
    }
    archive.add(MANIFEST_NAME, manifest.as_bytes())?;
    let archive = archive.finish(ARCHIVE_NAME)?;

    let previews = icons
        .into_iter()
        .map(|b| Preview::new(PreviewKind::Icon, b))
        .chain(
            splashes
                .into_iter()
                .map(|b| Preview::new(PreviewKind::Splash, b)),
        )
        .collect();

    Ok(PwaBundle { archive, previews })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp, fake_blob};
    use std::io::{Cursor, Read};

    fn config(icons: &[u32], splashes: &[(u32, u32)]) -> PwaConfig {
        PwaConfig {
            icon_sizes: icons.to_vec(),
            splash_sizes: splashes.to_vec(),
            ..PwaConfig::default()
        }
    }

    fn entry_names(archive: &ImageBlob) -> Vec<String> {
        let zip = zip::ZipArchive::new(Cursor::new(archive.bytes().to_vec())).unwrap();
        zip.file_names().map(String::from).collect::<Vec<_>>()
    }

    #[test]
    fn archive_entries_in_fixed_order() {
        let mock = MockBackend::new();
        let blob = fake_blob("logo.png", "image/png", 512, 512);
        let bundle =
            generate_pwa_icons_with(&mock, &blob, &config(&[512, 192], &[(640, 1136)])).unwrap();

        assert_eq!(bundle.archive.name(), ARCHIVE_NAME);
        assert_eq!(bundle.archive.mime(), "application/zip");

        let mut zip = zip::ZipArchive::new(Cursor::new(bundle.archive.bytes().to_vec())).unwrap();
        let ordered: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(
            ordered,
            [
                "icon-512x512.png",
                "icon-192x192.png",
                "splash-640x1136.png",
                "manifest.json"
            ]
        );

        let kinds: Vec<(String, PreviewKind)> = bundle
            .previews
            .iter()
            .map(|p| (p.name.clone(), p.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("icon-512x512.png".to_string(), PreviewKind::Icon),
                ("icon-192x192.png".to_string(), PreviewKind::Icon),
                ("splash-640x1136.png".to_string(), PreviewKind::Splash),
            ]
        );
    }

    #[test]
    fn no_splash_entries_without_splash_sizes() {
        let mock = MockBackend::new();
        let blob = fake_blob("logo.png", "image/png", 512, 512);
        let bundle = generate_pwa_icons_with(&mock, &blob, &config(&[192, 512], &[])).unwrap();
        let mut names = entry_names(&bundle.archive);
        names.sort();
        assert_eq!(
            names,
            ["icon-192x192.png", "icon-512x512.png", "manifest.json"]
        );
    }

    #[test]
    fn splash_draws_centered_square() {
        let mock = MockBackend::new();
        let blob = fake_blob("logo.png", "image/png", 300, 100);
        generate_pwa_icons_with(&mock, &blob, &config(&[], &[(1000, 2000)])).unwrap();
        assert_eq!(
            mock.get_operations(),
            vec![
                RecordedOp::DecodeScaled {
                    name: "logo.png".into(),
                    width: 800,
                    height: 800,
                },
                RecordedOp::Encode {
                    name: "splash-1000x2000.png".into(),
                    codec: Codec::Png,
                    quality: 100,
                    width: 1000,
                    height: 2000,
                },
            ]
        );
    }

    #[test]
    fn manifest_json_layout() {
        let cfg = PwaConfig {
            icon_sizes: vec![192],
            background_color: "#123456".into(),
            name: "Demo".into(),
            short_name: "D".into(),
            ..PwaConfig::default()
        };
        let json = Manifest::for_config(&cfg).to_json().unwrap();
        let expected = r##"{
  "name": "Demo",
  "short_name": "D",
  "icons": [
    {
      "src": "icon-192x192.png",
      "sizes": "192x192",
      "type": "image/png"
    }
  ],
  "background_color": "#123456",
  "theme_color": "#123456",
  "display": "standalone"
}"##;
        assert_eq!(json, expected);
    }

    #[test]
    fn manifest_inside_archive_lists_icons() {
        let mock = MockBackend::new();
        let blob = fake_blob("logo.png", "image/png", 64, 64);
        let bundle = generate_pwa_icons_with(&mock, &blob, &config(&[48, 96], &[])).unwrap();
        let mut zip = zip::ZipArchive::new(Cursor::new(bundle.archive.bytes().to_vec())).unwrap();
        let mut text = String::new();
        zip.by_name(MANIFEST_NAME)
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        let manifest: Manifest = serde_json::from_str(&text).unwrap();
        let sizes: Vec<&str> = manifest.icons.iter().map(|i| i.sizes.as_str()).collect();
        assert_eq!(sizes, ["48x48", "96x96"]);
        assert_eq!(manifest.theme_color, "#ffffff");
    }

    #[test]
    fn invalid_background_rejected_before_rendering() {
        let mock = MockBackend::new();
        let blob = fake_blob("logo.png", "image/png", 64, 64);
        let cfg = PwaConfig {
            background_color: "not-a-colour".into(),
            ..config(&[16], &[])
        };
        let err = generate_pwa_icons_with(&mock, &blob, &cfg).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidColor(_)));
        assert!(mock.get_operations().is_empty());
    }

    #[test]
    fn duplicate_icon_sizes_rejected() {
        assert!(matches!(
            config(&[192, 192], &[]).validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn splash_sizes_from_toml_pairs() {
        let cfg: PwaConfig = toml::from_str("splash_sizes = [[640, 1136], [750, 1334]]").unwrap();
        assert_eq!(cfg.splash_sizes, vec![(640, 1136), (750, 1334)]);
        assert_eq!(cfg.icon_sizes.len(), 8);
    }
}

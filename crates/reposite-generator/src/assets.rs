//! Binary assets: deterministic placeholder images and best-effort image
//! optimization over a bundle tree.

use std::{
    collections::HashSet,
    ffi::OsString,
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};

use image::{
    DynamicImage, ImageEncoder, Rgb, RgbImage,
    codecs::{
        ico::IcoEncoder,
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType, PngEncoder},
        webp::WebPEncoder,
    },
};
use rayon::prelude::*;
use reposite_core::{AssetKind, SiteAsset, SiteGenerationConfig};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Asset processing errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Decoding or encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// File extension is not a recompressible raster format.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// FNV-1a over the given parts, separated by a zero byte.
fn fnv1a(parts: &[&str]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    parts
        .join("\0")
        .bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

#[derive(Debug, Clone, Copy)]
enum Encoding {
    Png,
    Ico,
}

#[derive(Debug, Clone, Copy)]
struct Placeholder {
    path: &'static str,
    width: u32,
    height: u32,
    encoding: Encoding,
    /// Varies the gradient between placeholders of one site.
    salt: u8,
}

const HERO: Placeholder = Placeholder {
    path: "/assets/hero-image.png",
    width: 960,
    height: 480,
    encoding: Encoding::Png,
    salt: 0,
};

const FEATURE: Placeholder = Placeholder {
    path: "/assets/feature-1.png",
    width: 480,
    height: 320,
    encoding: Encoding::Png,
    salt: 1,
};

const SCREENSHOTS: [Placeholder; 2] = [
    Placeholder {
        path: "/assets/screenshot-1.png",
        width: 640,
        height: 360,
        encoding: Encoding::Png,
        salt: 2,
    },
    Placeholder {
        path: "/assets/screenshot-2.png",
        width: 640,
        height: 360,
        encoding: Encoding::Png,
        salt: 3,
    },
];

const FAVICON: Placeholder = Placeholder {
    path: "/favicon.ico",
    width: 32,
    height: 32,
    encoding: Encoding::Ico,
    salt: 4,
};

const SOCIAL: [Placeholder; 2] = [
    Placeholder {
        path: "/og-image.png",
        width: 1200,
        height: 630,
        encoding: Encoding::Png,
        salt: 5,
    },
    Placeholder {
        path: "/twitter-image.png",
        width: 1200,
        height: 600,
        encoding: Encoding::Png,
        salt: 6,
    },
];

/// Generates placeholder images whose colours derive from the site identity.
///
/// The same site id and name always yield the same paths and bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderGenerator;

impl PlaceholderGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Hero, feature, optional screenshots, favicon and social cards.
    ///
    /// An image that fails to encode is logged and left out.
    pub fn generate(&self, config: &SiteGenerationConfig) -> Vec<SiteAsset> {
        let seed = fnv1a(&[&config.site_id, &config.site_name]);

        let mut placeholders = vec![HERO, FEATURE];
        if config.features.include_demo {
            placeholders.extend(SCREENSHOTS);
        }
        placeholders.push(FAVICON);
        placeholders.extend(SOCIAL);

        placeholders
            .into_iter()
            .filter_map(|p| match render_placeholder(seed, p) {
                Ok(bytes) => Some(SiteAsset::inline(AssetKind::Image, p.path, bytes)),
                Err(err) => {
                    warn!(path = p.path, %err, "placeholder image skipped");
                    None
                }
            })
            .collect()
    }
}

fn render_placeholder(seed: u64, placeholder: Placeholder) -> Result<Vec<u8>> {
    let mixed = seed.rotate_left(u32::from(placeholder.salt) * 8);
    let bytes = mixed.to_le_bytes();
    let from = [bytes[0], bytes[1], bytes[2]];
    let to = [bytes[3], bytes[4], bytes[5]];

    let (w, h) = (placeholder.width, placeholder.height);
    let span = (w + h).saturating_sub(2).max(1);
    let img = RgbImage::from_fn(w, h, |x, y| {
        let t = (x + y) * 255 / span;
        let mix = |a: u8, b: u8| -> u8 {
            let (a, b, t) = (u32::from(a), u32::from(b), t.min(255));
            ((a * (255 - t) + b * t) / 255) as u8
        };
        Rgb([mix(from[0], to[0]), mix(from[1], to[1]), mix(from[2], to[2])])
    });

    let mut buf = Vec::new();
    match placeholder.encoding {
        Encoding::Png => {
            let encoder = PngEncoder::new_with_quality(
                &mut buf,
                CompressionType::Best,
                FilterType::Adaptive,
            );
            encoder.write_image(img.as_raw(), w, h, image::ExtendedColorType::Rgb8)?;
        }
        Encoding::Ico => {
            let rgba = DynamicImage::ImageRgb8(img).to_rgba8();
            IcoEncoder::new(&mut buf).write_image(
                rgba.as_raw(),
                w,
                h,
                image::ExtendedColorType::Rgba8,
            )?;
        }
    }
    Ok(buf)
}

/// Result of an optimization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizationReport {
    /// Images recompressed in place.
    pub optimized: Vec<PathBuf>,
    /// WebP siblings written.
    pub derived: Vec<PathBuf>,
    /// Images left untouched, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl OptimizationReport {
    fn merge(mut self, other: Self) -> Self {
        self.optimized.extend(other.optimized);
        self.derived.extend(other.derived);
        self.failed.extend(other.failed);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RasterFormat {
    Png,
    Jpeg,
}

impl RasterFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

/// Recompresses PNG and JPEG files and derives WebP siblings.
///
/// Each file is handled independently; a failure leaves that file as it
/// was. Page markup is never rewritten to reference the WebP files.
#[derive(Debug, Clone)]
pub struct ImageOptimizer {
    jpeg_quality: u8,
    generate_webp: bool,
}

impl Default for ImageOptimizer {
    fn default() -> Self {
        Self::new(85, true)
    }
}

impl ImageOptimizer {
    #[must_use]
    pub fn new(jpeg_quality: u8, generate_webp: bool) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
            generate_webp,
        }
    }

    /// Optimize every raster image under `root`, in parallel.
    ///
    /// A WebP sibling is derived only for the first source, in sorted path
    /// order, that maps to a given `<stem>.webp`; files already present
    /// under that name are never overwritten.
    pub fn optimize_dir(&self, root: &Path) -> OptimizationReport {
        let entries: Vec<PathBuf> = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(%err, "skipping unreadable entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .collect();

        let mut claimed: HashSet<PathBuf> = entries.iter().cloned().collect();
        let files: Vec<(PathBuf, bool)> = entries
            .into_iter()
            .filter(|p| RasterFormat::from_path(p).is_some())
            .map(|path| {
                let derive = self.generate_webp && claimed.insert(path.with_extension("webp"));
                if self.generate_webp && !derive {
                    debug!(path = %path.display(), "webp name already taken, not derived");
                }
                (path, derive)
            })
            .collect();

        info!(count = files.len(), root = %root.display(), "optimizing images");

        let mut report = files
            .par_iter()
            .map(|(path, derive)| {
                let mut report = OptimizationReport::default();
                match self.optimize(path, *derive) {
                    Ok(webp) => {
                        report.optimized.push(path.clone());
                        report.derived.extend(webp);
                    }
                    Err(err) => {
                        warn!(path = %path.display(), %err, "image optimization failed");
                        report.failed.push((path.clone(), err.to_string()));
                    }
                }
                report
            })
            .reduce(OptimizationReport::default, OptimizationReport::merge);

        report.optimized.sort();
        report.derived.sort();
        report.failed.sort();

        info!(
            optimized = report.optimized.len(),
            derived = report.derived.len(),
            failed = report.failed.len(),
            "image optimization finished"
        );
        report
    }

    /// Recompress one image in place; returns the WebP sibling if written.
    pub fn optimize_file(&self, path: &Path) -> Result<Option<PathBuf>> {
        self.optimize(path, self.generate_webp)
    }

    fn optimize(&self, path: &Path, derive_webp: bool) -> Result<Option<PathBuf>> {
        let format = RasterFormat::from_path(path)
            .ok_or_else(|| AssetError::UnsupportedFormat(path.to_path_buf()))?;

        let img = image::load_from_memory(&fs::read(path)?)?;

        // Encode everything before touching the file system.
        let optimized = self.encode(&img, format)?;
        let webp = if derive_webp {
            let mut buf = Vec::new();
            img.to_rgba8()
                .write_with_encoder(WebPEncoder::new_lossless(Cursor::new(&mut buf)))?;
            Some(buf)
        } else {
            None
        };

        let mut tmp = OsString::from(path.as_os_str());
        tmp.push(".optimized");
        let tmp = PathBuf::from(tmp);

        if let Err(err) = fs::write(&tmp, &optimized).and_then(|()| fs::rename(&tmp, path)) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        debug!(path = %path.display(), bytes = optimized.len(), "recompressed image");

        match webp {
            Some(bytes) => {
                let webp_path = path.with_extension("webp");
                fs::write(&webp_path, bytes)?;
                debug!(path = %webp_path.display(), "derived webp");
                Ok(Some(webp_path))
            }
            None => Ok(None),
        }
    }

    fn encode(&self, img: &DynamicImage, format: RasterFormat) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        match format {
            RasterFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut buf,
                    CompressionType::Best,
                    FilterType::Adaptive,
                );
                img.write_with_encoder(encoder)?;
            }
            RasterFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality);
                img.to_rgb8().write_with_encoder(encoder)?;
            }
        }
        Ok(buf)
    }
}

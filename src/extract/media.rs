//! Image relationship index and image persistence.

use crate::docx::Package;
use crate::error::Result;
use crate::opc::OpcPackage;
use image::{DynamicImage, ImageFormat, ImageReader};
use phf::phf_map;
use std::fs;
use std::path::{Path, PathBuf};

/// MIME type to file extension map for embedded media.
static MEDIA_EXTENSIONS: phf::Map<&'static str, &'static str> = phf_map! {
    "image/png" => ".png",
    "image/jpeg" => ".jpg",
    "image/jpg" => ".jpg",
    "image/gif" => ".gif",
    "image/bmp" => ".bmp",
    "image/tiff" => ".tiff",
    "image/x-emf" => ".emf",
    "image/x-wmf" => ".wmf",
    "image/x-pict" => ".pict",
};

/// Resolve the file extension for a declared MIME type.
///
/// Unrecognized types default to ".png".
pub fn extension_for(content_type: &str) -> &'static str {
    MEDIA_EXTENSIONS.get(content_type).copied().unwrap_or(".png")
}

/// Generate a short unique image filename like `image_3fa9c2d1.png`.
pub fn unique_image_name(ext: &str) -> String {
    format!("image_{:08x}{}", rand::random::<u32>(), ext)
}

/// One embedded image resource, borrowed from the loaded package.
#[derive(Debug, Clone, Copy)]
pub struct MediaEntry<'a> {
    pub blob: &'a [u8],
    pub content_type: &'a str,
}

/// Read-only index from relationship ID to embedded image resource.
///
/// Built once per document from the main part's relationships. Entries are
/// sorted by relationship ID so fallback scans run in a stable order.
#[derive(Debug, Default)]
pub struct MediaIndex<'a> {
    entries: Vec<(String, MediaEntry<'a>)>,
}

impl<'a> MediaIndex<'a> {
    /// Build the index from a document package.
    ///
    /// Collects every internal relationship of the main document part whose
    /// type denotes an image. External image links carry no payload and are
    /// skipped.
    pub fn from_package(package: &'a Package) -> Result<Self> {
        let opc: &OpcPackage = package.opc();
        let main = package.main_part()?;

        let mut entries = Vec::new();
        for rel in main.rels().iter() {
            if rel.is_external() || !rel.reltype().contains("image") {
                continue;
            }
            let partname = rel.target_partname()?;
            let part = match opc.get_part(&partname) {
                Ok(part) => part,
                Err(err) => {
                    log::warn!("image part missing for {}: {}", rel.r_id(), err);
                    continue;
                },
            };
            entries.push((
                rel.r_id().to_string(),
                MediaEntry {
                    blob: part.blob(),
                    content_type: part.content_type(),
                },
            ));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(Self { entries })
    }

    /// Look up an entry by relationship ID.
    pub fn get(&self, r_id: &str) -> Option<MediaEntry<'a>> {
        self.entries
            .iter()
            .find(|(id, _)| id == r_id)
            .map(|(_, entry)| *entry)
    }

    /// Iterate over all entries in relationship ID order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, MediaEntry<'a>)> {
        self.entries
            .iter()
            .map(|(id, entry)| (id.as_str(), *entry))
    }

    /// Get the number of indexed images.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Write image bytes to `output_dir/filename`, then validate the result.
///
/// The bytes are written verbatim first to preserve the original data and
/// quality. Validation and repair run afterwards and never fail the call
/// once the file is on disk.
pub fn persist_image(output_dir: &Path, filename: &str, blob: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(filename);
    fs::write(&path, blob)?;

    validate_and_fix_image(&path);

    Ok(path)
}

/// Verify a written image decodes; re-encode it as PNG if it does not.
///
/// Repair decodes with format sniffing (the declared type may lie), converts
/// to an 8-bit RGB(A) model, writes a `_fixed.png` sibling and renames it
/// over the original. A failed repair leaves the original file in place.
fn validate_and_fix_image(path: &Path) {
    match image::open(path) {
        Ok(_) => {},
        Err(err) => {
            log::warn!("image validation failed for {}: {}", path.display(), err);
            if let Err(repair_err) = repair_image(path) {
                log::error!("image repair failed for {}: {}", path.display(), repair_err);
            } else {
                log::info!("image repaired: {}", path.display());
            }
        },
    }
}

fn repair_image(path: &Path) -> Result<()> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;

    let img = match img {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => img,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
    let fixed = path.with_file_name(format!("{}_fixed.png", stem));
    img.save_with_format(&fixed, ImageFormat::Png)?;
    fs::rename(&fixed, path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_known_types() {
        assert_eq!(extension_for("image/jpeg"), ".jpg");
        assert_eq!(extension_for("image/x-emf"), ".emf");
    }

    #[test]
    fn test_extension_for_unknown_defaults_to_png() {
        assert_eq!(extension_for("application/octet-stream"), ".png");
    }

    #[test]
    fn test_unique_image_name_shape() {
        let name = unique_image_name(".png");
        assert!(name.starts_with("image_"));
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), "image_".len() + 8 + ".png".len());
    }

    #[test]
    fn test_persist_image_writes_bytes_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        // Not a decodable image; repair fails and the bytes stay untouched
        let blob = b"not really a png";
        let path = persist_image(dir.path(), "image_00000001.png", blob).unwrap();
        assert_eq!(fs::read(&path).unwrap(), blob);
    }

    #[test]
    fn test_persist_valid_image_left_intact() {
        let dir = tempfile::tempdir().unwrap();
        let mut png = Vec::new();
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([255, 0, 0]));
        DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let path = persist_image(dir.path(), "image_00000002.png", &png).unwrap();
        assert_eq!(fs::read(&path).unwrap(), png);
    }
}

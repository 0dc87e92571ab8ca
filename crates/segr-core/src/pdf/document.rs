//! Source document access using lopdf.

use std::collections::BTreeSet;
use std::path::Path;

use image::{DynamicImage, ImageBuffer, Luma, Rgb};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{PdfSplitter, Result};
use crate::error::PdfError;

/// An opened source document.
///
/// Pages are addressed by 0-based index throughout; lopdf's 1-based page
/// numbers stay internal to this type.
pub struct PdfDocument {
    document: Document,
    // The page tree is never modified in place, so the count is taken once.
    page_count: usize,
}

impl PdfDocument {
    /// Open and parse a PDF file.
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| PdfError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::load(&data, path).map_err(|e| match e {
            PdfError::Parse(reason) => PdfError::Open {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parse a PDF held in memory. `path` is only used for reporting.
    pub fn load(data: &[u8], path: &Path) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted {} with empty password", path.display());
        }

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded {} with {} pages", path.display(), page_count);
        Ok(Self {
            document,
            page_count,
        })
    }

    /// Text layer of one page.
    pub fn page_text(&self, page: usize) -> Result<String> {
        let number = self.page_number(page)?;
        self.document
            .extract_text(&[number])
            .map_err(|e| PdfError::Parse(format!("page {}: {}", page, e)))
    }

    /// Raster images placed on one page, in resource order.
    ///
    /// Scanned documents usually carry exactly one image per page.
    pub fn page_images(&self, page: usize) -> Result<Vec<DynamicImage>> {
        let number = self.page_number(page)?;
        let pages = self.document.get_pages();
        let page_id = pages.get(&number).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();

        if let Some(resources) = self.page_resources(*page_id) {
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobj_dict))) = self.document.dereference(xobjects) {
                    for (_name, obj_ref) in xobj_dict.iter() {
                        if let Ok((_, obj)) = self.document.dereference(obj_ref) {
                            if let Some(img) = self.decode_image(obj) {
                                images.push(img);
                            }
                        }
                    }
                }
            }
        }

        debug!("Found {} images on page {}", images.len(), page);
        Ok(images)
    }

    fn page_number(&self, page: usize) -> Result<u32> {
        if page >= self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }
        u32::try_from(page + 1).map_err(|_| PdfError::InvalidPage(page))
    }

    /// Resources dictionary of a page, following `Parent` inheritance.
    fn page_resources(&self, node_id: ObjectId) -> Option<Dictionary> {
        let Ok(Object::Dictionary(dict)) = self.document.get_object(node_id) else {
            return None;
        };

        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok((_, Object::Dictionary(res_dict))) = self.document.dereference(resources) {
                return Some(res_dict.clone());
            }
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => self.page_resources(*parent_id),
            _ => None,
        }
    }

    fn decode_image(&self, obj: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        let dict = &stream.dict;

        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
        let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;
        trace!("Found image object: {}x{}", width, height);

        if let Ok(filter) = dict.get(b"Filter") {
            let filter_name = match filter {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                _ => None,
            };

            match filter_name {
                Some(b"DCTDecode") => {
                    trace!("Decoding JPEG image");
                    return image::load_from_memory_with_format(
                        &stream.content,
                        image::ImageFormat::Jpeg,
                    )
                    .ok();
                }
                Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                    trace!("Unsupported image filter: {:?}", filter_name.map(String::from_utf8_lossy));
                    return None;
                }
                _ => {}
            }
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => self.document.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);

        raw_to_image(&data, width, height, color_space, bits)
    }
}

fn raw_to_image(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
    bits_per_component: i64,
) -> Option<DynamicImage> {
    if bits_per_component != 8 {
        trace!("Unsupported bits per component: {}", bits_per_component);
        return None;
    }

    let pixels = (width as usize).checked_mul(height as usize)?;

    match color_space {
        b"DeviceRGB" | b"RGB" => {
            let len = pixels.checked_mul(3)?;
            let buf = data.get(..len)?.to_vec();
            ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buf).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" => {
            let buf = data.get(..pixels)?.to_vec();
            ImageBuffer::<Luma<u8>, _>::from_raw(width, height, buf).map(DynamicImage::ImageLuma8)
        }
        _ => {
            trace!(
                "Could not decode image: data_len={}, color_space={}",
                data.len(),
                String::from_utf8_lossy(color_space)
            );
            None
        }
    }
}

impl PdfSplitter for PdfDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn write_pages(&self, pages: &[usize], path: &Path) -> Result<()> {
        if pages.is_empty() {
            return Err(PdfError::NoPages);
        }

        let total = self.page_count;
        let mut keep = BTreeSet::new();
        for &page in pages {
            if page >= total {
                return Err(PdfError::InvalidPage(page));
            }
            keep.insert(page);
        }

        let remove: Vec<u32> = (0..total)
            .filter(|page| !keep.contains(page))
            .map(|page| self.page_number(page))
            .collect::<Result<_>>()?;

        let mut out = self.document.clone();
        out.delete_pages(&remove);
        out.prune_objects();
        out.renumber_objects();
        out.compress();

        out.save(path).map_err(|e| PdfError::Save {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!("Wrote {} pages to {}", keep.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures;

    #[test]
    fn test_open_missing_file() {
        let err = PdfDocument::open(Path::new("/nonexistent/batch.pdf")).err().unwrap();
        assert!(matches!(err, PdfError::Open { .. }));
        assert!(err.to_string().contains("/nonexistent/batch.pdf"));
    }

    #[test]
    fn test_open_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = PdfDocument::open(&path).err().unwrap();
        assert!(matches!(err, PdfError::Open { .. }));
    }

    #[test]
    fn test_page_text() {
        let data = fixtures::text_pdf(&["Bill date: Jan 5, 2024\n1234 5678 9012", "second page"]);
        let doc = PdfDocument::load(&data, Path::new("memory.pdf")).unwrap();

        assert_eq!(doc.page_count(), 2);
        let first = doc.page_text(0).unwrap();
        assert!(first.contains("Bill date: Jan 5, 2024"), "got {:?}", first);
        assert!(first.contains("1234 5678 9012"));
        assert!(doc.page_text(1).unwrap().contains("second page"));
        assert!(matches!(doc.page_text(2), Err(PdfError::InvalidPage(2))));
    }

    #[test]
    fn test_page_images() {
        let data = fixtures::scanned_pdf(2);
        let doc = PdfDocument::load(&data, Path::new("scan.pdf")).unwrap();

        let images = doc.page_images(1).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!((images[0].width(), images[0].height()), (4, 2));
    }

    #[test]
    fn test_write_pages_keeps_selection() {
        let data = fixtures::text_pdf(&["page zero", "page one", "page two", "page three"]);
        let doc = PdfDocument::load(&data, Path::new("memory.pdf")).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("subset.pdf");
        doc.write_pages(&[3, 1, 1], &out).unwrap();

        let written = PdfDocument::open(&out).unwrap();
        assert_eq!(written.page_count(), 2);
        assert!(written.page_text(0).unwrap().contains("page one"));
        assert!(written.page_text(1).unwrap().contains("page three"));

        // Source is untouched.
        assert_eq!(doc.page_count(), 4);
    }

    #[test]
    fn test_write_pages_from_long_document() {
        let labels: Vec<String> = (0..40).map(|i| format!("sheet {:02}", i)).collect();
        let lines: Vec<&str> = labels.iter().map(String::as_str).collect();
        let doc = PdfDocument::load(&fixtures::text_pdf(&lines), Path::new("long.pdf")).unwrap();
        assert_eq!(doc.page_count(), 40);

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("subset.pdf");
        doc.write_pages(&[39, 0, 17], &out).unwrap();

        let written = PdfDocument::open(&out).unwrap();
        assert_eq!(written.page_count(), 3);
        assert!(written.page_text(0).unwrap().contains("sheet 00"));
        assert!(written.page_text(1).unwrap().contains("sheet 17"));
        assert!(written.page_text(2).unwrap().contains("sheet 39"));
    }

    #[test]
    fn test_write_pages_rejects_bad_input() {
        let data = fixtures::text_pdf(&["only page"]);
        let doc = PdfDocument::load(&data, Path::new("memory.pdf")).unwrap();
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            doc.write_pages(&[], &dir.path().join("a.pdf")),
            Err(PdfError::NoPages)
        ));
        assert!(matches!(
            doc.write_pages(&[1], &dir.path().join("b.pdf")),
            Err(PdfError::InvalidPage(1))
        ));
        assert!(matches!(
            doc.write_pages(&[0], &dir.path().join("missing").join("c.pdf")),
            Err(PdfError::Save { .. })
        ));
    }
}

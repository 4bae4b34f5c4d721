//! Multi-page PDF assembly from decoded page bitmaps

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::DynamicImage;
use printpdf::{Image, ImageTransform, Mm, PdfDocument};
use tracing::debug;

use crate::error::{PagebindError, Result};

/// Serializes an ordered sequence of bitmaps into a single PDF document,
/// one image per page. Page dimensions are derived from pixel dimensions
/// at the configured resolution.
pub struct PdfAssembler {
    dpi: f32,
}

impl PdfAssembler {
    /// Create a new assembler rendering pages at the given resolution
    pub fn new(dpi: f32) -> Self {
        Self { dpi }
    }

    /// Write `pages` to `output` as a multi-page PDF, overwriting any
    /// existing file. Returns the size of the written file in bytes.
    ///
    /// The page list must be non-empty; callers decide what an empty
    /// folder means, not the encoder.
    pub fn write_pdf(&self, title: &str, pages: &[DynamicImage], output: &Path) -> Result<u64> {
        let first = pages.first().ok_or_else(|| {
            PagebindError::invalid_parameters("Cannot assemble a PDF from zero pages")
        })?;

        debug!("Assembling {} pages into {:?}", pages.len(), output);

        let (doc, first_page, first_layer) = PdfDocument::new(
            title,
            self.page_dimension(first.width()),
            self.page_dimension(first.height()),
            "Page",
        );

        let layer = doc.get_page(first_page).get_layer(first_layer);
        Image::from_dynamic_image(first).add_to_layer(layer, self.transform());

        for page in &pages[1..] {
            let (page_idx, layer_idx) = doc.add_page(
                self.page_dimension(page.width()),
                self.page_dimension(page.height()),
                "Page",
            );
            let layer = doc.get_page(page_idx).get_layer(layer_idx);
            Image::from_dynamic_image(page).add_to_layer(layer, self.transform());
        }

        let file = File::create(output)
            .map_err(|e| PagebindError::pdf_write(output.to_path_buf(), e.to_string()))?;
        doc.save(&mut BufWriter::new(file))
            .map_err(|e| PagebindError::pdf_write(output.to_path_buf(), e.to_string()))?;

        let written = std::fs::metadata(output)?.len();
        debug!("Wrote {:?} ({} bytes)", output, written);
        Ok(written)
    }

    /// Convert a pixel extent to physical page size at the assembler's DPI
    fn page_dimension(&self, pixels: u32) -> Mm {
        Mm(pixels as f32 * 25.4 / self.dpi)
    }

    /// Placement for a full-bleed page image: origin, no scaling, our DPI
    fn transform(&self) -> ImageTransform {
        ImageTransform {
            dpi: Some(self.dpi),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use tempfile::TempDir;

    fn solid_page(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([value, value, value]),
        ))
    }

    #[test]
    fn test_write_pdf_produces_pdf_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("ch1.pdf");
        let pages = vec![solid_page(8, 12, 40), solid_page(8, 12, 200)];

        let assembler = PdfAssembler::new(96.0);
        let written = assembler.write_pdf("ch1", &pages, &output).unwrap();

        assert!(output.exists());
        assert!(written > 0);

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_write_pdf_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("ch1.pdf");
        std::fs::write(&output, b"stale contents").unwrap();

        let assembler = PdfAssembler::new(96.0);
        let pages = vec![solid_page(4, 4, 0)];
        assembler.write_pdf("ch1", &pages, &output).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_write_pdf_rejects_empty_page_list() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("empty.pdf");

        let assembler = PdfAssembler::new(96.0);
        let result = assembler.write_pdf("empty", &[], &output);

        assert!(matches!(
            result,
            Err(PagebindError::InvalidParameters { .. })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_page_dimension_scales_with_dpi() {
        let at_96 = PdfAssembler::new(96.0).page_dimension(960);
        let at_300 = PdfAssembler::new(300.0).page_dimension(960);
        assert!((at_96.0 - 254.0).abs() < 0.01);
        assert!(at_300.0 < at_96.0);
    }
}

//! Document export: bitmap onto a single A4-portrait PDF page.
//!
//! The layout is rasterized at twice the CSS resolution, scaled to the page
//! width and anchored at the top-left corner. Content taller than one page is
//! clipped; there is no pagination.

use image::ImageFormat;
use log::{info, warn};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::sync::Arc;

use super::common::output_filename;
use super::engine::Rasterizer;
use super::{LetterError, LetterLayout};

pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;
pub const RASTER_SCALE: f32 = 2.0;

const POINTS_PER_MM: f32 = 72.0 / 25.4;
const IMAGE_NAME: &str = "Im0";

/// Where the bitmap lands on the page, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub image_width_mm: f32,
    pub image_height_mm: f32,
    /// Printed size of one source pixel.
    pub pixel_mm: f32,
}

impl PageGeometry {
    /// A4 portrait page; image spans the full width and keeps its aspect ratio.
    pub fn a4_for_bitmap(width_px: u32, height_px: u32) -> Self {
        let pixel_mm = A4_WIDTH_MM / width_px as f32;
        Self {
            page_width_mm: A4_WIDTH_MM,
            page_height_mm: A4_HEIGHT_MM,
            image_width_mm: A4_WIDTH_MM,
            image_height_mm: height_px as f32 * pixel_mm,
            pixel_mm,
        }
    }

    /// True when the image is taller than the page and gets clipped.
    ///
    /// An A4 layout rasterized at whole pixels lands up to one pixel past
    /// 297mm; that rounding does not count as overflow.
    pub fn overflows(&self) -> bool {
        self.image_height_mm - self.page_height_mm > self.pixel_mm
    }
}

/// Result of a successful export.
#[derive(Debug)]
pub struct ExportedDocument {
    pub filename: String,
    pub pdf: Vec<u8>,
    pub geometry: PageGeometry,
}

#[derive(Clone)]
pub struct DocumentExporter {
    rasterizer: Arc<dyn Rasterizer>,
}

impl DocumentExporter {
    pub fn new(rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self { rasterizer }
    }

    /// Rasterize `layout` and write it as a one-page PDF.
    ///
    /// Nothing is returned unless every step succeeds.
    pub fn export(&self, layout: &LetterLayout) -> Result<ExportedDocument, LetterError> {
        let png = self.rasterizer.rasterize(layout, RASTER_SCALE)?;
        let bitmap = image::load_from_memory_with_format(&png, ImageFormat::Png)
            .map_err(|e| LetterError::DecodeBitmap(e.to_string()))?
            .to_rgb8();

        let (width, height) = bitmap.dimensions();
        if width == 0 || height == 0 {
            return Err(LetterError::EmptyBitmap);
        }

        let geometry = PageGeometry::a4_for_bitmap(width, height);
        if geometry.overflows() {
            warn!(
                "{} for {} is {:.1}mm tall and will be clipped to one A4 page",
                layout.kind.slug(),
                layout.subject,
                geometry.image_height_mm
            );
        }

        let pdf = write_single_page_pdf(bitmap.as_raw(), width, height, &geometry)?;
        let filename = output_filename(&layout.subject, layout.kind);
        info!("Exported {} ({} bytes)", filename, pdf.len());

        Ok(ExportedDocument {
            filename,
            pdf,
            geometry,
        })
    }
}

fn pt(mm: f32) -> Object {
    Object::Real(mm * POINTS_PER_MM)
}

/// Write an RGB8 bitmap as the only content of a single page.
fn write_single_page_pdf(
    rgb: &[u8],
    width: u32,
    height: u32,
    geometry: &PageGeometry,
) -> Result<Vec<u8>, LetterError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(i64::from(width)),
            "Height" => Object::Integer(i64::from(height)),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => Object::Integer(8),
        },
        rgb.to_vec(),
    );
    let image_id = doc.add_object(image);

    // PDF space starts bottom-left; shift the image so its top edge meets the page top.
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    pt(geometry.image_width_mm),
                    Object::Integer(0),
                    Object::Integer(0),
                    pt(geometry.image_height_mm),
                    Object::Integer(0),
                    pt(geometry.page_height_mm - geometry.image_height_mm),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content
        .encode()
        .map_err(|e| LetterError::Pdf(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! {
            IMAGE_NAME => image_id,
        },
    });

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            pt(geometry.page_width_mm),
            pt(geometry.page_height_mm),
        ],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| LetterError::Pdf(e.to_string()))?;
    Ok(buffer)
}

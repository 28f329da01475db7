//! Printable badge generation for approved attendees.
//!
//! Renders a QR code and the holder's details onto a fixed 80x50 mm
//! single-page PDF, uploads it to the `badges` bucket and persists the
//! public URL back onto the submission row.

use std::sync::Arc;

use domain::models::Submission;
use persistence::repositories::SubmissionRepository;
use printpdf::{
    BuiltinFont, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px,
};
use qrcode::{Color, QrCode};
use thiserror::Error;
use tracing::info;

use crate::middleware::metrics::record_badge_generated;
use crate::services::storage::StorageService;

const BADGE_WIDTH_MM: f32 = 80.0;
const BADGE_HEIGHT_MM: f32 = 50.0;
/// Physical side of the printed QR square.
const QR_SIDE_MM: f32 = 32.0;
/// Pixels per module. The raster is produced at a multiple of its
/// logical size so the code stays crisp at print resolution.
const QR_MODULE_SCALE: u32 = 8;
/// Quiet zone around the code, in modules.
const QR_QUIET_ZONE: u32 = 4;

/// Errors that can occur while producing a badge.
#[derive(Debug, Error)]
pub enum BadgeError {
    #[error("QR encoding failed: {0}")]
    Qr(String),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("Badge upload failed: {0}")]
    Upload(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Badge generator shared through application state.
#[derive(Clone)]
pub struct BadgeService {
    storage: Arc<StorageService>,
    submissions: SubmissionRepository,
}

impl BadgeService {
    pub fn new(storage: Arc<StorageService>, submissions: SubmissionRepository) -> Self {
        Self {
            storage,
            submissions,
        }
    }

    /// Render, upload and persist a badge for the submission.
    ///
    /// Always produces a fresh PDF and overwrites `badge_url`, so the
    /// same call serves both first-time generation and regeneration.
    pub async fn generate_for(&self, submission: &Submission) -> Result<String, BadgeError> {
        let pdf = render_badge_pdf(submission)?;
        let filename = format!("badge-{}.pdf", submission.attendance_id.to_lowercase());
        let stored = self
            .storage
            .store("badges", &filename, &pdf)
            .await
            .map_err(|e| BadgeError::Upload(e.to_string()))?;
        self.submissions
            .set_badge_url(submission.id, &stored.url)
            .await?;
        record_badge_generated();
        info!(
            submission_id = submission.id,
            attendance_id = %submission.attendance_id,
            url = %stored.url,
            "Badge generated"
        );
        Ok(stored.url)
    }
}

/// Render the single-page badge PDF in memory.
pub fn render_badge_pdf(submission: &Submission) -> Result<Vec<u8>, BadgeError> {
    let payload = serde_json::json!({
        "attendance_id": submission.attendance_id,
        "full_name": submission.full_name,
        "phone": submission.phone,
        "email": submission.email,
        "attendee_type": submission.attendee_type,
    })
    .to_string();
    let code = QrCode::new(payload.as_bytes()).map_err(|e| BadgeError::Qr(e.to_string()))?;
    let (pixels, side) = rasterize_qr(&code, QR_MODULE_SCALE, QR_QUIET_ZONE);

    let (doc, page, layer) = PdfDocument::new(
        format!("Badge {}", submission.attendance_id),
        Mm(BADGE_WIDTH_MM),
        Mm(BADGE_HEIGHT_MM),
        "Layer 1",
    );
    let layer = doc.get_page(page).get_layer(layer);

    // Builtin fonts are WinAnsi encoded; characters outside it degrade.
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| BadgeError::Pdf(e.to_string()))?;
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| BadgeError::Pdf(e.to_string()))?;

    layer.use_text(&submission.full_name, 12.0, Mm(4.0), Mm(36.0), &bold);
    layer.use_text(&submission.attendance_id, 11.0, Mm(4.0), Mm(27.0), &regular);
    layer.use_text(&submission.attendee_type, 9.0, Mm(4.0), Mm(19.0), &regular);

    // Greyscale raster on an opaque white background, sized to QR_SIDE_MM
    // through the dpi so the print never scales it blurry.
    let qr_image = Image::from(ImageXObject {
        width: Px(side as usize),
        height: Px(side as usize),
        color_space: ColorSpace::Greyscale,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data: pixels,
        image_filter: None,
        clipping_bbox: None,
    });
    let dpi = side as f32 * 25.4 / QR_SIDE_MM;
    qr_image.add_to_layer(
        layer,
        ImageTransform {
            translate_x: Some(Mm(BADGE_WIDTH_MM - QR_SIDE_MM - 4.0)),
            translate_y: Some(Mm((BADGE_HEIGHT_MM - QR_SIDE_MM) / 2.0)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );

    doc.save_to_bytes().map_err(|e| BadgeError::Pdf(e.to_string()))
}

/// Expand the QR matrix into an 8-bit greyscale square.
///
/// Returns the pixel buffer and its side length. White is 0xFF so the
/// exported image carries no transparency.
fn rasterize_qr(code: &QrCode, scale: u32, quiet_zone: u32) -> (Vec<u8>, u32) {
    let modules = code.width() as u32;
    let side = (modules + 2 * quiet_zone) * scale;
    let mut pixels = vec![0xFFu8; (side as usize) * (side as usize)];
    let colors = code.to_colors();
    for y in 0..modules {
        for x in 0..modules {
            if colors[(y * modules + x) as usize] == Color::Dark {
                let px0 = (x + quiet_zone) * scale;
                let py0 = (y + quiet_zone) * scale;
                for dy in 0..scale {
                    let row_start = ((py0 + dy) * side + px0) as usize;
                    for dx in 0..scale as usize {
                        pixels[row_start + dx] = 0x00;
                    }
                }
            }
        }
    }
    (pixels, side)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use domain::models::Status;

    use super::*;

    fn submission() -> Submission {
        Submission {
            id: 7,
            full_name: "Minh Tran".to_string(),
            email: "minh@example.com".to_string(),
            phone: Some("0912345678".to_string()),
            dob: None,
            workplace: Some("City Hospital".to_string()),
            address: None,
            attendee_type: "Delegate".to_string(),
            cme: true,
            gala_dinner: false,
            payment_amount: 1_500_000.0,
            payment_image_url: None,
            status: Status::Approved,
            registration_time: Utc::now(),
            attendance_id: "REG-0007".to_string(),
            badge_url: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_badge_pdf_produces_pdf_bytes() {
        let bytes = render_badge_pdf(&submission()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1024);
    }

    #[test]
    fn test_rasterize_qr_dimensions_and_quiet_zone() {
        let code = QrCode::new(b"REG-0007").unwrap();
        let (pixels, side) = rasterize_qr(&code, 4, 2);
        let modules = code.width() as u32;
        assert_eq!(side, (modules + 4) * 4);
        assert_eq!(pixels.len(), (side * side) as usize);
        // Quiet zone stays white.
        assert_eq!(pixels[0], 0xFF);
        // Top-left finder pattern begins dark right after the quiet zone.
        let first_module = (2 * 4 * side + 2 * 4) as usize;
        assert_eq!(pixels[first_module], 0x00);
    }

    #[test]
    fn test_rasterize_qr_is_opaque_black_and_white() {
        let code = QrCode::new(b"payload").unwrap();
        let (pixels, _) = rasterize_qr(&code, 2, 1);
        assert!(pixels.iter().all(|&p| p == 0x00 || p == 0xFF));
        assert!(pixels.contains(&0x00));
        assert!(pixels.contains(&0xFF));
    }
}

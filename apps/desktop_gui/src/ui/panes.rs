//! Passive display panes for the original and processed images.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use eframe::egui;
use shared::domain::ImageReference;

/// One image panel. Renders whatever reference it is given, or a
/// placeholder. Holds no submission state; the texture is only a decoded
/// cache of the current reference.
pub struct DisplayPane {
    title: &'static str,
    reference: Option<ImageReference>,
    texture: Option<egui::TextureHandle>,
    decode_error: Option<String>,
}

impl DisplayPane {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            reference: None,
            texture: None,
            decode_error: None,
        }
    }

    pub fn reference(&self) -> Option<&ImageReference> {
        self.reference.as_ref()
    }

    /// Replaces the displayed reference and drops the stale texture.
    pub fn set_reference(&mut self, reference: ImageReference) {
        self.reference = Some(reference);
        self.texture = None;
        self.decode_error = None;
    }

    /// Raw image bytes of the current reference, for save/copy actions.
    pub fn image_bytes(&self) -> Option<Vec<u8>> {
        let reference = self.reference.as_ref()?;
        data_uri_bytes(reference).ok()
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new(self.title).strong());
            ui.separator();

            if self.reference.is_some() {
                if self.texture.is_none() && self.decode_error.is_none() {
                    self.load_texture(ui.ctx());
                }
                if let Some(texture) = &self.texture {
                    let size = texture.size_vec2();
                    let scale = (ui.available_width() / size.x).min(1.0);
                    ui.add(egui::Image::new((texture.id(), size * scale)));
                } else if let Some(error) = &self.decode_error {
                    ui.colored_label(ui.visuals().error_fg_color, error);
                }
            } else {
                ui.vertical_centered(|ui| {
                    ui.add_space(24.0);
                    ui.label("No image");
                    ui.weak("Upload and process to preview");
                    ui.add_space(24.0);
                });
            }
        });
    }

    fn load_texture(&mut self, ctx: &egui::Context) {
        let Some(reference) = &self.reference else {
            return;
        };
        match decode_reference_rgba(reference) {
            Ok((rgba, width, height)) => {
                let color_image = egui::ColorImage::from_rgba_unmultiplied([width, height], &rgba);
                self.texture = Some(ctx.load_texture(
                    format!("pane:{}", self.title),
                    color_image,
                    egui::TextureOptions::LINEAR,
                ));
            }
            Err(err) => {
                tracing::warn!(pane = self.title, error = %err, "failed to decode image reference");
                self.decode_error = Some(err);
            }
        }
    }
}

/// Decodes the base64 payload of a data URI.
pub fn data_uri_bytes(reference: &ImageReference) -> Result<Vec<u8>, String> {
    let raw = reference.as_str();
    let payload = raw
        .split_once(";base64,")
        .map(|(_, payload)| payload)
        .ok_or_else(|| "not a base64 data URI".to_string())?;
    STANDARD
        .decode(payload)
        .map_err(|err| format!("invalid base64 payload: {err}"))
}

fn decode_reference_rgba(reference: &ImageReference) -> Result<(Vec<u8>, usize, usize), String> {
    let bytes = data_uri_bytes(reference)?;
    let decoded = image::load_from_memory(&bytes).map_err(|err| err.to_string())?;
    let rgba = decoded.to_rgba8();
    let (width, height) = (rgba.width() as usize, rgba.height() as usize);
    Ok((rgba.into_raw(), width, height))
}

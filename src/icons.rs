use eframe::egui;
use resvg::{tiny_skia, usvg};
use thiserror::Error;

const SETTINGS_SVG: &[u8] = include_bytes!("../assets/icons/settings.svg");
const ERROR_SVG: &[u8] = include_bytes!("../assets/icons/error.svg");
const APP_SVG: &[u8] = include_bytes!("../assets/icons/runbox.svg");

const BUTTON_ICON_SIZE: u32 = 48;
const APP_ICON_SIZE: u32 = 256;

#[derive(Debug, Error)]
pub enum IconError {
    #[error("Could not load {name} image: {reason}")]
    IconLoadFailed { name: &'static str, reason: String },
}

pub struct RasterIcon {
    pixmap: tiny_skia::Pixmap,
}

impl RasterIcon {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_rgba_premultiplied(
            [self.width() as usize, self.height() as usize],
            self.pixmap.data(),
        )
    }

    /// Window icons take straight (non-premultiplied) alpha.
    pub fn to_icon_data(&self) -> egui::IconData {
        let rgba = self
            .pixmap
            .pixels()
            .iter()
            .flat_map(|px| {
                let c = px.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        egui::IconData {
            rgba,
            width: self.width(),
            height: self.height(),
        }
    }
}

pub fn render_svg(name: &'static str, svg: &[u8], size: u32) -> Result<RasterIcon, IconError> {
    let failed = |reason: String| IconError::IconLoadFailed { name, reason };

    let tree = usvg::Tree::from_data(svg, &usvg::Options::default())
        .map_err(|err| failed(err.to_string()))?;
    let mut pixmap = tiny_skia::Pixmap::new(size, size)
        .ok_or_else(|| failed(format!("invalid icon size {size}")))?;
    let src_size = tree.size().to_int_size();
    let sx = size as f32 / src_size.width() as f32;
    let sy = size as f32 / src_size.height() as f32;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );
    Ok(RasterIcon { pixmap })
}

/// Every icon the UI draws, rasterized once at startup.
pub struct IconSet {
    pub settings: RasterIcon,
    pub error: RasterIcon,
    pub app: RasterIcon,
}

impl IconSet {
    pub fn load() -> Result<Self, IconError> {
        Ok(Self {
            settings: render_svg("settings", SETTINGS_SVG, BUTTON_ICON_SIZE)?,
            error: render_svg("error", ERROR_SVG, BUTTON_ICON_SIZE)?,
            app: render_svg("application", APP_SVG, APP_ICON_SIZE)?,
        })
    }
}

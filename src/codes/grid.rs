//! Module grid rendering
//!
//! 2D symbols (QR, Data Matrix) are reduced to a grid of dark/light modules,
//! then drawn as PNG or SVG with a quiet zone of `border` modules on each side.

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::fmt::Write;
use std::io::Cursor;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Dark/light modules of a 2D symbol, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGrid {
    width: u32,
    height: u32,
    modules: Vec<bool>,
}

impl ModuleGrid {
    /// Build a grid from row-major modules (`true` = dark)
    pub fn new(width: u32, height: u32, modules: Vec<bool>) -> Self {
        debug_assert_eq!(modules.len(), (width * height) as usize);
        Self {
            width,
            height,
            modules,
        }
    }

    #[cfg(test)]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[cfg(test)]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Module at (x, y); anything outside the symbol is light
    pub fn is_dark(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return false;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let idx = (y as u64 * u64::from(self.width) + x as u64) as usize;
        self.modules[idx]
    }

    /// Raster size in pixels for `scale` and `border`
    pub fn png_dimensions(&self, scale: u32, border: u32) -> (u32, u32) {
        let scale = scale.max(1);
        (
            (self.width + 2 * border).saturating_mul(scale),
            (self.height + 2 * border).saturating_mul(scale),
        )
    }

    /// Rasterise as 8-bit greyscale PNG, `scale` pixels per module
    pub fn to_png(&self, scale: u32, border: u32) -> Result<Vec<u8>, image::ImageError> {
        let (img_width, img_height) = self.png_dimensions(scale, border);
        let scale = scale.max(1);
        let border = i64::from(border);

        let img = GrayImage::from_fn(img_width, img_height, |px, py| {
            let x = i64::from(px / scale) - border;
            let y = i64::from(py / scale) - border;
            if self.is_dark(x, y) {
                DARK
            } else {
                LIGHT
            }
        });
        encode_png(img)
    }

    /// Serialise as SVG; coordinates are in modules, the outer size in pixels
    pub fn to_svg(&self, scale: u32, border: u32) -> String {
        let scale = scale.max(1);
        let dim_w = self.width + 2 * border;
        let dim_h = self.height + 2 * border;

        let mut path = String::new();
        for y in 0..self.height {
            let mut x = 0;
            while x < self.width {
                if !self.is_dark(i64::from(x), i64::from(y)) {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < self.width && self.is_dark(i64::from(x), i64::from(y)) {
                    x += 1;
                }
                let run = x - start;
                if !path.is_empty() {
                    path.push(' ');
                }
                let _ = write!(path, "M{},{}h{run}v1h-{run}z", start + border, y + border);
            }
        }

        let mut svg = String::new();
        svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {dim_w} {dim_h}\" shape-rendering=\"crispEdges\">",
            dim_w * scale,
            dim_h * scale,
        );
        svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");
        let _ = writeln!(svg, "<path d=\"{path}\" fill=\"#000000\"/>");
        svg.push_str("</svg>\n");
        svg
    }
}

/// Encode a greyscale image as PNG bytes
pub fn encode_png(img: GrayImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(img).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3x2 grid:
    // # . #
    // # # .
    fn sample() -> ModuleGrid {
        ModuleGrid::new(3, 2, vec![true, false, true, true, true, false])
    }

    #[test]
    fn test_is_dark_outside_is_light() {
        let grid = sample();
        assert!(grid.is_dark(0, 0));
        assert!(!grid.is_dark(1, 0));
        assert!(!grid.is_dark(-1, 0));
        assert!(!grid.is_dark(3, 1));
        assert!(!grid.is_dark(0, 2));
    }

    #[test]
    fn test_png_geometry() {
        let png = sample().to_png(4, 2).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_luma8();
        assert_eq!(img.width(), (3 + 4) * 4);
        assert_eq!(img.height(), (2 + 4) * 4);
        // quiet zone
        assert_eq!(img.get_pixel(0, 0), &LIGHT);
        assert_eq!(img.get_pixel(7, 7), &LIGHT);
        // first module starts after 2 border modules of 4px
        assert_eq!(img.get_pixel(8, 8), &DARK);
        assert_eq!(img.get_pixel(11, 11), &DARK);
        assert_eq!(img.get_pixel(12, 8), &LIGHT);
    }

    #[test]
    fn test_svg_runs() {
        let svg = sample().to_svg(10, 1);
        assert!(svg.contains("width=\"50\" height=\"40\""));
        assert!(svg.contains("viewBox=\"0 0 5 4\""));
        assert!(svg.contains("M1,1h1v1h-1z M3,1h1v1h-1z M1,2h2v1h-2z"));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_png_dimensions_match_output() {
        let grid = sample();
        assert_eq!(grid.png_dimensions(4, 2), (28, 24));
        assert_eq!(grid.png_dimensions(0, 0), (3, 2));
    }

    #[test]
    fn test_zero_border() {
        let png = sample().to_png(1, 0).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_luma8();
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(img.get_pixel(2, 1), &LIGHT);
        assert_eq!(img.get_pixel(2, 0), &DARK);
    }
}

//! 1D barcode encoding and rendering
//!
//! Bar patterns come from `barcoders`; sizes are physical (millimetres) and
//! derived from the request's `scale`, with `scale = 8` as the reference size.

use super::grid::encode_png;
use super::{CodeError, Symbology};
use barcoders::sym::code128::Code128;
use barcoders::sym::code39::Code39;
use barcoders::sym::ean13::EAN13;
use barcoders::sym::tf::TF;
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{GrayImage, Luma};
use std::fmt::Write;

/// Raster resolution used to convert millimetres to pixels
const DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

/// Human-readable line, in millimetres
const FONT_SIZE_MM: f64 = 3.5;
const TEXT_GAP_MM: f64 = 1.5;

/// Bitmap glyph cell, in font pixels
const GLYPH_CELL: u32 = 8;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Code 128 character set B selector
const CODE128_SET_B: char = '\u{0181}';

/// Writer options translated from a code request
#[derive(Debug, Clone, PartialEq)]
pub struct LinearOptions {
    /// Narrow bar width in millimetres
    pub module_width: f64,
    /// Bar height in millimetres
    pub module_height: f64,
    /// Quiet zone on each side, in modules
    pub quiet_zone: u32,
    pub write_text: bool,
}

impl LinearOptions {
    pub fn new(scale: u32, border: u32, show_text: bool) -> Self {
        let factor = f64::from(scale) / 8.0;
        Self {
            module_width: f64::max(0.2, 0.2 * factor),
            module_height: 15.0 * factor,
            quiet_zone: border,
            write_text: show_text,
        }
    }
}

/// Encoded bar pattern plus the text printed under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bars {
    /// One entry per module, 1 = bar
    pub modules: Vec<u8>,
    pub text: String,
}

/// Encode `data` with a 1D symbology
pub fn encode(symbology: Symbology, data: &str) -> Result<Bars, CodeError> {
    let fail = |e: barcoders::error::Error| CodeError::encoding(symbology, e);

    let (modules, text) = match symbology {
        Symbology::Code128 => {
            // Anything outside printable ASCII would be read as a set switch
            if let Some(c) = data.chars().find(|c| !matches!(*c, ' '..='~')) {
                return Err(CodeError::encoding(
                    symbology,
                    format!("character {c:?} is not printable ASCII"),
                ));
            }
            let payload = format!("{CODE128_SET_B}{data}");
            (Code128::new(payload).map_err(fail)?.encode(), data.to_string())
        }
        Symbology::Code39 => {
            let payload = data.to_uppercase();
            let code = Code39::with_checksum(&payload).map_err(fail)?;
            let text = format!("{payload}{}", code39_check_char(&payload));
            (code.encode(), text)
        }
        Symbology::Ean13 => {
            let digits = leading_digits(symbology, data, 12)?;
            let text = format!("{digits}{}", ean_check_digit(digits));
            (EAN13::new(digits).map_err(fail)?.encode(), text)
        }
        Symbology::Upca => {
            // UPC-A is EAN-13 with number system 0
            let digits = leading_digits(symbology, data, 11)?;
            let ean = format!("0{digits}");
            let text = format!("{digits}{}", ean_check_digit(&ean));
            (EAN13::new(&ean).map_err(fail)?.encode(), text)
        }
        Symbology::Itf => {
            let payload = if data.len() % 2 == 1 {
                format!("0{data}")
            } else {
                data.to_string()
            };
            (TF::interleaved(&payload).map_err(fail)?.encode(), payload)
        }
        Symbology::Qr | Symbology::DataMatrix => {
            return Err(CodeError::encoding(symbology, "not a 1D symbology"));
        }
    };

    Ok(Bars { modules, text })
}

/// First `count` digits of `data`; the check digit is always recomputed
fn leading_digits(symbology: Symbology, data: &str, count: usize) -> Result<&str, CodeError> {
    data.get(..count).ok_or_else(|| {
        CodeError::encoding(symbology, format!("at least {count} digits required, got {}", data.len()))
    })
}

/// GS1 mod-10 check digit over the 12 leading digits of an EAN-13
fn ean_check_digit(digits: &str) -> u32 {
    let sum: u32 = digits
        .chars()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d } else { d * 3 })
        .sum();
    (10 - sum % 10) % 10
}

/// Modulo-43 check character over an already validated Code 39 payload
fn code39_check_char(payload: &str) -> char {
    const ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";
    let sum: usize = payload.chars().filter_map(|c| ALPHABET.find(c)).sum();
    ALPHABET.chars().nth(sum % 43).unwrap_or('0')
}

fn mm_to_px(mm: f64) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let px = (mm * DPI / MM_PER_INCH).round() as u32;
    px.max(1)
}

/// Pixel layout of a rasterised 1D symbol
struct PngLayout {
    module_px: u32,
    bar_height: u32,
    /// Left edge of the first quiet-zone module
    bar_left: u32,
    /// Font pixel size and top edge of the text line, when drawn
    text: Option<(u32, u32)>,
    width: u32,
    height: u32,
}

impl PngLayout {
    fn new(bars: &Bars, options: &LinearOptions) -> Self {
        let module_px = mm_to_px(options.module_width);
        let bar_height = mm_to_px(options.module_height);
        let modules = u32::try_from(bars.modules.len()).unwrap_or(u32::MAX);
        let bars_width = modules
            .saturating_add(2 * options.quiet_zone)
            .saturating_mul(module_px);

        if !options.write_text || bars.text.is_empty() {
            return Self {
                module_px,
                bar_height,
                bar_left: 0,
                text: None,
                width: bars_width,
                height: bar_height,
            };
        }

        let font_px = (mm_to_px(FONT_SIZE_MM) / GLYPH_CELL).max(1);
        let gap = mm_to_px(TEXT_GAP_MM);
        let chars = u32::try_from(bars.text.chars().count()).unwrap_or(u32::MAX);
        let text_width = chars.saturating_mul(GLYPH_CELL * font_px);
        let width = bars_width.max(text_width);
        Self {
            module_px,
            bar_height,
            bar_left: (width - bars_width) / 2,
            text: Some((font_px, bar_height + gap)),
            width,
            height: bar_height + 2 * gap + GLYPH_CELL * font_px,
        }
    }
}

/// Raster size in pixels, text line included
pub fn png_dimensions(bars: &Bars, options: &LinearOptions) -> (u32, u32) {
    let layout = PngLayout::new(bars, options);
    (layout.width, layout.height)
}

/// Rasterise bars as PNG, with the text line centred under them
pub fn to_png(bars: &Bars, options: &LinearOptions) -> Result<Vec<u8>, image::ImageError> {
    let layout = PngLayout::new(bars, options);
    let mut img = GrayImage::from_pixel(layout.width, layout.height, LIGHT);

    let first_bar = layout.bar_left + options.quiet_zone * layout.module_px;
    for (i, _) in bars.modules.iter().enumerate().filter(|&(_, &m)| m == 1) {
        #[allow(clippy::cast_possible_truncation)]
        let x0 = first_bar + i as u32 * layout.module_px;
        for x in x0..x0 + layout.module_px {
            for y in 0..layout.bar_height {
                img.put_pixel(x, y, DARK);
            }
        }
    }

    if let Some((font_px, top)) = layout.text {
        let cell = GLYPH_CELL * font_px;
        #[allow(clippy::cast_possible_truncation)]
        let text_width = bars.text.chars().count() as u32 * cell;
        let left = (layout.width - text_width) / 2;
        for (i, c) in bars.text.chars().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            draw_glyph(&mut img, c, left + i as u32 * cell, top, font_px);
        }
    }

    encode_png(img)
}

/// Draw one 8x8 glyph scaled by `font_px`; unknown characters are left blank
fn draw_glyph(img: &mut GrayImage, c: char, left: u32, top: u32, font_px: u32) {
    let Some(rows) = BASIC_FONTS.get(c) else {
        return;
    };
    for (row, bits) in (0u32..).zip(rows) {
        for col in 0..GLYPH_CELL {
            if bits & (1 << col) == 0 {
                continue;
            }
            let x0 = left + col * font_px;
            let y0 = top + row * font_px;
            for y in y0..y0 + font_px {
                for x in x0..x0 + font_px {
                    img.put_pixel(x, y, DARK);
                }
            }
        }
    }
}

/// Render bars as SVG in millimetres, with the optional text line
pub fn to_svg(bars: &Bars, options: &LinearOptions) -> String {
    let mw = options.module_width;
    let bar_height = options.module_height;
    #[allow(clippy::cast_precision_loss)]
    let total_modules = (bars.modules.len() as u64 + 2 * u64::from(options.quiet_zone)) as f64;
    let width = total_modules * mw;
    let height = if options.write_text {
        bar_height + TEXT_GAP_MM + FONT_SIZE_MM + TEXT_GAP_MM
    } else {
        bar_height
    };

    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{width:.3}mm\" height=\"{height:.3}mm\" viewBox=\"0 0 {width:.3} {height:.3}\" shape-rendering=\"crispEdges\">"
    );
    svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");
    svg.push_str("<g fill=\"#000000\">\n");

    let mut i = 0;
    while i < bars.modules.len() {
        if bars.modules[i] != 1 {
            i += 1;
            continue;
        }
        let start = i;
        while i < bars.modules.len() && bars.modules[i] == 1 {
            i += 1;
        }
        #[allow(clippy::cast_precision_loss)]
        let x = (start as u64 + u64::from(options.quiet_zone)) as f64 * mw;
        #[allow(clippy::cast_precision_loss)]
        let w = (i - start) as f64 * mw;
        let _ = writeln!(
            svg,
            "<rect x=\"{x:.3}\" y=\"0\" width=\"{w:.3}\" height=\"{bar_height:.3}\"/>"
        );
    }
    svg.push_str("</g>\n");

    if options.write_text {
        let baseline = bar_height + TEXT_GAP_MM + FONT_SIZE_MM;
        let _ = writeln!(
            svg,
            "<text x=\"{:.3}\" y=\"{baseline:.3}\" font-family=\"monospace\" font-size=\"{FONT_SIZE_MM}\" text-anchor=\"middle\" fill=\"#000000\">{}</text>",
            width / 2.0,
            escape_xml(&bars.text),
        );
    }
    svg.push_str("</svg>\n");
    svg
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

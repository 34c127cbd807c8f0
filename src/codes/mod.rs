//! Code generation module
//!
//! Turns a validated [`CodeRequest`] into image bytes by dispatching to the
//! encoder for its symbology family:
//! - QR codes through `qrcode`
//! - 1D barcodes through `barcoders`
//! - Data Matrix through `datamatrix` (optional capability)
//!
//! Module grids are rasterised or serialised to SVG in [`grid`].

mod datamatrix;
mod grid;
mod linear;
mod qr;

pub use linear::LinearOptions;

use crate::config::Capabilities;
use hyper::StatusCode;
use std::fmt;
use thiserror::Error;

/// Supported symbologies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    Qr,
    Code128,
    Code39,
    Ean13,
    Upca,
    Itf,
    DataMatrix,
}

/// Symbology families, each backed by one encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Qr,
    DataMatrix,
    Linear,
}

impl Symbology {
    /// Parse the `type` query value
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "qr" => Some(Self::Qr),
            "code128" => Some(Self::Code128),
            "code39" => Some(Self::Code39),
            "ean13" => Some(Self::Ean13),
            "upca" => Some(Self::Upca),
            "itf" => Some(Self::Itf),
            "datamatrix" => Some(Self::DataMatrix),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Qr => "qr",
            Self::Code128 => "code128",
            Self::Code39 => "code39",
            Self::Ean13 => "ean13",
            Self::Upca => "upca",
            Self::Itf => "itf",
            Self::DataMatrix => "datamatrix",
        }
    }

    pub const fn family(self) -> Family {
        match self {
            Self::Qr => Family::Qr,
            Self::DataMatrix => Family::DataMatrix,
            Self::Code128 | Self::Code39 | Self::Ean13 | Self::Upca | Self::Itf => Family::Linear,
        }
    }

    /// Symbologies whose payload must be decimal digits
    pub const fn digits_only(self) -> bool {
        matches!(self, Self::Ean13 | Self::Upca)
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
}

impl OutputFormat {
    /// Parse the `fmt` query value
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
        }
    }
}

/// A single, validated code generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRequest {
    pub data: String,
    pub symbology: Symbology,
    pub format: OutputFormat,
    pub show_text: bool,
    pub micro_qr: bool,
    /// Pixels per module (QR) or module size factor (1D)
    pub scale: u32,
    /// Quiet zone width in modules
    pub border: u32,
}

/// Encoded image ready to be sent
#[derive(Debug, Clone)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
}

impl Rendered {
    pub const fn media_type(&self) -> &'static str {
        self.format.media_type()
    }
}

/// Code generation failures
#[derive(Error, Debug)]
pub enum CodeError {
    #[error("{} requires digits only", .0.name().to_uppercase())]
    DigitsOnly(Symbology),

    #[error("cannot encode data as {symbology}: {reason}")]
    Encoding { symbology: Symbology, reason: String },

    #[error("DataMatrix requires the 'datamatrix' renderer, which is not available on this server")]
    DataMatrixUnavailable,

    #[error("DataMatrix currently available as PNG only")]
    PngOnly,

    #[error("output of {width}x{height} pixels exceeds the limit of {max_pixels}")]
    TooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

impl CodeError {
    pub fn encoding(symbology: Symbology, reason: impl fmt::Display) -> Self {
        Self::Encoding {
            symbology,
            reason: reason.to_string(),
        }
    }

    /// HTTP status this failure maps to
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::DigitsOnly(_) | Self::Encoding { .. } | Self::TooLarge { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::DataMatrixUnavailable => StatusCode::NOT_IMPLEMENTED,
            Self::PngOnly => StatusCode::NOT_ACCEPTABLE,
            Self::Image(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Generate the image for a request
///
/// Stateless: identical requests always produce identical bytes. PNG output
/// larger than `max_pixels` is refused before any pixel is allocated.
pub fn generate(
    request: &CodeRequest,
    capabilities: &Capabilities,
    max_pixels: u64,
) -> Result<Rendered, CodeError> {
    let bytes = match request.symbology.family() {
        Family::Qr => {
            let grid = qr::encode(&request.data, request.micro_qr)?;
            match request.format {
                OutputFormat::Png => {
                    check_pixels(grid.png_dimensions(request.scale, request.border), max_pixels)?;
                    grid.to_png(request.scale, request.border)?
                }
                OutputFormat::Svg => grid.to_svg(request.scale, request.border).into_bytes(),
            }
        }
        Family::DataMatrix => {
            if !capabilities.datamatrix {
                return Err(CodeError::DataMatrixUnavailable);
            }
            if request.format == OutputFormat::Svg {
                return Err(CodeError::PngOnly);
            }
            datamatrix::render_png(&request.data, max_pixels)?
        }
        Family::Linear => {
            if request.symbology.digits_only() && !is_digits(&request.data) {
                return Err(CodeError::DigitsOnly(request.symbology));
            }
            let options = LinearOptions::new(request.scale, request.border, request.show_text);
            let bars = linear::encode(request.symbology, &request.data)?;
            match request.format {
                OutputFormat::Png => {
                    check_pixels(linear::png_dimensions(&bars, &options), max_pixels)?;
                    linear::to_png(&bars, &options)?
                }
                OutputFormat::Svg => linear::to_svg(&bars, &options).into_bytes(),
            }
        }
    };

    Ok(Rendered {
        bytes,
        format: request.format,
    })
}

fn check_pixels((width, height): (u32, u32), max_pixels: u64) -> Result<(), CodeError> {
    if u64::from(width) * u64::from(height) > max_pixels {
        return Err(CodeError::TooLarge {
            width,
            height,
            max_pixels,
        });
    }
    Ok(())
}

fn is_digits(data: &str) -> bool {
    !data.is_empty() && data.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
    const MAX_PIXELS: u64 = 16_777_216;

    fn request(data: &str, symbology: Symbology, format: OutputFormat) -> CodeRequest {
        CodeRequest {
            data: data.to_string(),
            symbology,
            format,
            show_text: true,
            micro_qr: false,
            scale: 8,
            border: 2,
        }
    }

    fn run(req: &CodeRequest, datamatrix: bool) -> Result<Rendered, CodeError> {
        generate(req, &Capabilities { datamatrix }, MAX_PIXELS)
    }

    fn decode_qr(png: &[u8]) -> String {
        let img = image::load_from_memory(png).unwrap().to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            img.width() as usize,
            img.height() as usize,
            |x, y| img.get_pixel(x as u32, y as u32).0[0],
        );
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1);
        grids[0].decode().unwrap().1
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(Symbology::parse("ean13"), Some(Symbology::Ean13));
        assert_eq!(Symbology::parse("datamatrix"), Some(Symbology::DataMatrix));
        assert_eq!(Symbology::parse("bogus"), None);
        assert_eq!(Symbology::parse("QR"), None);
        assert_eq!(OutputFormat::parse("svg"), Some(OutputFormat::Svg));
        assert_eq!(OutputFormat::parse("jpg"), None);
    }

    #[test]
    fn test_families() {
        assert_eq!(Symbology::Qr.family(), Family::Qr);
        assert_eq!(Symbology::DataMatrix.family(), Family::DataMatrix);
        for s in [
            Symbology::Code128,
            Symbology::Code39,
            Symbology::Ean13,
            Symbology::Upca,
            Symbology::Itf,
        ] {
            assert_eq!(s.family(), Family::Linear);
        }
    }

    #[test]
    fn test_qr_media_types_match_content() {
        let png = run(&request("hello", Symbology::Qr, OutputFormat::Png), false).unwrap();
        assert_eq!(png.media_type(), "image/png");
        assert!(png.bytes.starts_with(PNG_MAGIC));

        let svg = run(&request("hello", Symbology::Qr, OutputFormat::Svg), false).unwrap();
        assert_eq!(svg.media_type(), "image/svg+xml");
        let text = String::from_utf8(svg.bytes).unwrap();
        assert!(text.contains("<svg"));
        assert!(text.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_qr_png_decodes_to_input() {
        for data in ["hello", "https://example.com/?a=1&b=two", "0123456789"] {
            let mut req = request(data, Symbology::Qr, OutputFormat::Png);
            req.border = 4;
            let png = run(&req, false).unwrap();
            assert_eq!(decode_qr(&png.bytes), data);
        }
    }

    #[test]
    fn test_ean13_digits() {
        let ok = run(&request("1234567890123", Symbology::Ean13, OutputFormat::Png), false).unwrap();
        assert!(ok.bytes.starts_with(PNG_MAGIC));

        let err = run(&request("abc", Symbology::Ean13, OutputFormat::Png), false).unwrap_err();
        assert!(matches!(err, CodeError::DigitsOnly(Symbology::Ean13)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "EAN13 requires digits only");
    }

    #[test]
    fn test_upca_digits() {
        let err = run(&request("12a45678901", Symbology::Upca, OutputFormat::Svg), false).unwrap_err();
        assert_eq!(err.to_string(), "UPCA requires digits only");
    }

    #[test]
    fn test_datamatrix_unavailable() {
        let err = run(&request("hello", Symbology::DataMatrix, OutputFormat::Png), false).unwrap_err();
        assert!(matches!(err, CodeError::DataMatrixUnavailable));
        assert_eq!(err.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn test_datamatrix_svg_rejected() {
        let err = run(&request("anything", Symbology::DataMatrix, OutputFormat::Svg), true).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_ACCEPTABLE);
    }

    #[cfg(feature = "datamatrix")]
    #[test]
    fn test_datamatrix_png() {
        let out = run(&request("hello", Symbology::DataMatrix, OutputFormat::Png), true).unwrap();
        assert!(out.bytes.starts_with(PNG_MAGIC));
    }

    #[test]
    fn test_idempotent_output() {
        for (symbology, format) in [
            (Symbology::Qr, OutputFormat::Png),
            (Symbology::Qr, OutputFormat::Svg),
            (Symbology::Code128, OutputFormat::Png),
            (Symbology::Code128, OutputFormat::Svg),
        ] {
            let req = request("HELLO-42", symbology, format);
            let a = run(&req, false).unwrap();
            let b = run(&req, false).unwrap();
            assert_eq!(a.bytes, b.bytes, "{symbology} {format:?}");
        }
    }

    #[test]
    fn test_encoder_rejection_is_bad_request() {
        let err = run(&request("12345", Symbology::Ean13, OutputFormat::Svg), false).unwrap_err();
        assert!(matches!(err, CodeError::Encoding { .. }));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_oversized_qr_png_refused() {
        let mut req = request(&"x".repeat(2000), Symbology::Qr, OutputFormat::Png);
        req.scale = 32;
        req.border = 64;
        let err = run(&req, false).unwrap_err();
        assert!(matches!(err, CodeError::TooLarge { max_pixels: MAX_PIXELS, .. }));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        // vector output allocates no raster
        req.format = OutputFormat::Svg;
        assert!(run(&req, false).is_ok());
    }

    #[test]
    fn test_oversized_linear_png_refused() {
        let mut req = request(&"A".repeat(4000), Symbology::Code128, OutputFormat::Png);
        req.scale = 32;
        let err = run(&req, false).unwrap_err();
        assert!(matches!(err, CodeError::TooLarge { .. }));

        req.scale = 8;
        req.data = "A".repeat(20);
        assert!(run(&req, false).is_ok());
    }

    #[test]
    fn test_pixel_limit_is_inclusive() {
        assert!(check_pixels((4096, 4096), MAX_PIXELS).is_ok());
        assert!(check_pixels((4097, 4096), MAX_PIXELS).is_err());
    }

    #[test]
    fn test_is_digits() {
        assert!(is_digits("0123456789"));
        assert!(!is_digits(""));
        assert!(!is_digits("12 3"));
        assert!(!is_digits("١٢٣"));
    }
}

//! QR code encoding
//!
//! Error correction is fixed at Medium. Micro QR uses the smallest of M2..M4
//! that fits (M1 has no Medium level).

use super::grid::ModuleGrid;
use super::{CodeError, Symbology};
use qrcode::{Color, EcLevel, QrCode, Version};

const EC_LEVEL: EcLevel = EcLevel::M;
const MICRO_VERSIONS: [i16; 3] = [2, 3, 4];

/// Encode `data` as a QR (or Micro QR) module grid
pub fn encode(data: &str, micro: bool) -> Result<ModuleGrid, CodeError> {
    let code = if micro {
        encode_micro(data)?
    } else {
        QrCode::with_error_correction_level(data.as_bytes(), EC_LEVEL)
            .map_err(|e| CodeError::encoding(Symbology::Qr, e))?
    };

    #[allow(clippy::cast_possible_truncation)]
    let width = code.width() as u32;
    let modules = code
        .to_colors()
        .into_iter()
        .map(|c| c == Color::Dark)
        .collect();
    Ok(ModuleGrid::new(width, width, modules))
}

fn encode_micro(data: &str) -> Result<QrCode, CodeError> {
    MICRO_VERSIONS
        .iter()
        .find_map(|&v| QrCode::with_version(data.as_bytes(), Version::Micro(v), EC_LEVEL).ok())
        .ok_or_else(|| CodeError::encoding(Symbology::Qr, "data too long for Micro QR"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_version_1() {
        let grid = encode("hello", false).unwrap();
        assert_eq!(grid.width(), 21);
        assert_eq!(grid.height(), 21);
        // finder pattern corners
        assert!(grid.is_dark(0, 0));
        assert!(grid.is_dark(20, 0));
        assert!(grid.is_dark(0, 20));
    }

    #[test]
    fn test_micro_is_smaller() {
        let grid = encode("12345", true).unwrap();
        assert!(grid.width() < 21);
        assert_eq!((grid.width() - 9) % 2, 0);
        assert!(grid.is_dark(0, 0));
    }

    #[test]
    fn test_micro_overflow() {
        let data = "x".repeat(64);
        let err = encode(&data, true).unwrap_err();
        assert!(matches!(err, CodeError::Encoding { symbology: Symbology::Qr, .. }));
    }

    #[test]
    fn test_regular_overflow() {
        let data = "x".repeat(4000);
        assert!(encode(&data, false).is_err());
    }
}

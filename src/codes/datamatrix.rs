//! Data Matrix rendering
//!
//! Raster only, fixed module size and quiet zone. Available when the crate is
//! built with the `datamatrix` feature.

use super::CodeError;

/// Pixels per module
#[cfg(feature = "datamatrix")]
const MODULE_PX: u32 = 5;
/// Quiet zone in modules
#[cfg(feature = "datamatrix")]
const QUIET_ZONE: u32 = 1;

/// Encode `data` as a Data Matrix PNG
#[cfg(feature = "datamatrix")]
pub fn render_png(data: &str, max_pixels: u64) -> Result<Vec<u8>, CodeError> {
    use super::grid::ModuleGrid;
    use super::{check_pixels, Symbology};
    use datamatrix::{DataMatrix, SymbolList};

    let code = DataMatrix::encode(data.as_bytes(), SymbolList::default())
        .map_err(|e| CodeError::encoding(Symbology::DataMatrix, format!("{e:?}")))?;
    let bitmap = code.bitmap();

    #[allow(clippy::cast_possible_truncation)]
    let (width, height) = (bitmap.width() as u32, bitmap.height() as u32);
    let mut modules = vec![false; bitmap.width() * bitmap.height()];
    for (x, y) in bitmap.pixels() {
        modules[y * bitmap.width() + x] = true;
    }

    let grid = ModuleGrid::new(width, height, modules);
    check_pixels(grid.png_dimensions(MODULE_PX, QUIET_ZONE), max_pixels)?;
    Ok(grid.to_png(MODULE_PX, QUIET_ZONE)?)
}

#[cfg(not(feature = "datamatrix"))]
pub fn render_png(data: &str, max_pixels: u64) -> Result<Vec<u8>, CodeError> {
    let _ = (data, max_pixels);
    Err(CodeError::DataMatrixUnavailable)
}

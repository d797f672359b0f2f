//! Fitting rectangular items onto sheets and plates.
//!
//! A fit is the number of whole items that tile a larger rectangle in
//! a simple grid, trying the item both as given and turned through 90
//! degrees.  No mixed layouts are attempted.

use crate::models::{Dimensions, FitResult, Orientation};

/// Faces printed per press sheet.
pub const SIDES_PER_SHEET: u32 = 2;

/// Whole items in a grid, or `None` when the count does not fit a `u32`.
fn grid_count(outer: Dimensions, inner: Dimensions) -> Option<u32> {
    let across = whole_count((outer.breadth / inner.breadth).floor())?;
    let down = whole_count((outer.length / inner.length).floor())?;
    across.checked_mul(down)
}

fn whole_count(value: f64) -> Option<u32> {
    if value.is_finite() && value >= 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

/// Best grid fit of `inner` on `outer`.
///
/// Returns `None` when either rectangle has a non-positive or
/// non-finite side, or when either orientation's count is too large to
/// represent.  A tie between the two orientations is reported as
/// [`Orientation::Normal`].
pub fn fit(outer: Dimensions, inner: Dimensions) -> Option<FitResult> {
    if !outer.is_usable() || !inner.is_usable() {
        return None;
    }
    let normal = grid_count(outer, inner)?;
    let rotated = grid_count(outer, inner.rotated())?;
    Some(if rotated > normal {
        FitResult {
            units_per_sheet: rotated,
            orientation: Orientation::Rotated,
        }
    } else {
        FitResult {
            units_per_sheet: normal,
            orientation: Orientation::Normal,
        }
    })
}

/// Page sides of `item` per press sheet.  A sheet is printed on both
/// faces, so the grid fit is doubled.
pub fn sheet_fit(sheet: Dimensions, item: Dimensions) -> Option<FitResult> {
    let fit = fit(sheet, item)?;
    Some(FitResult {
        units_per_sheet: fit.units_per_sheet.checked_mul(SIDES_PER_SHEET)?,
        ..fit
    })
}

/// Items per printing plate.  Plates image one face, so this is the
/// plain grid fit.
pub fn plate_fit(plate: Dimensions, item: Dimensions) -> Option<FitResult> {
    fit(plate, item)
}

//! Data models for the Press Estimator.
//!
//! The `models` module defines the job description submitted by the
//! cost-calculation form ([`JobSpec`]) and the breakdown returned for it
//! ([`CostBreakdown`] and its display form [`CostDisplay`]).  All of
//! them derive `Serialize` and `Deserialize` with camelCase field names
//! so they can travel over HTTP unchanged.

use crate::form;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A rectangle in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub breadth: f64,
}

impl Dimensions {
    pub fn new(length: f64, breadth: f64) -> Self {
        Self { length, breadth }
    }

    /// Whether both sides are finite and strictly positive.  Only such
    /// rectangles take part in fit calculations.
    pub fn is_usable(&self) -> bool {
        self.length.is_finite() && self.breadth.is_finite() && self.length > 0.0 && self.breadth > 0.0
    }

    /// The same rectangle turned through 90 degrees.
    pub fn rotated(&self) -> Self {
        Self::new(self.breadth, self.length)
    }
}

/// How the item was laid out to obtain a fit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Normal,
    Rotated,
}

/// The number of items that fit on a sheet or plate and the
/// orientation that achieved it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitResult {
    pub units_per_sheet: u32,
    pub orientation: Orientation,
}

/// Number of sheets in the bundle a paper is bought in.
///
/// Prices are quoted per 500-sheet ream; smaller packages scale the
/// price down by a fixed divisor.  Unrecognised values are treated as a
/// full ream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageSize {
    #[default]
    Ream,
    HalfReam,
    QuarterReam,
}

impl PackageSize {
    pub fn from_sheets(sheets: u32) -> Self {
        match sheets {
            250 => PackageSize::HalfReam,
            125 => PackageSize::QuarterReam,
            _ => PackageSize::Ream,
        }
    }

    pub fn sheets(self) -> u32 {
        match self {
            PackageSize::Ream => 500,
            PackageSize::HalfReam => 250,
            PackageSize::QuarterReam => 125,
        }
    }

    /// Divisor applied to a full-ream price.
    pub fn divisor(self) -> f64 {
        match self {
            PackageSize::Ream => 1.0,
            PackageSize::HalfReam => 2.0,
            PackageSize::QuarterReam => 4.0,
        }
    }
}

impl Serialize for PackageSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.sheets())
    }
}

impl<'de> Deserialize<'de> for PackageSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(form::whole(deserializer)?
            .map(PackageSize::from_sheets)
            .unwrap_or_default())
    }
}

/// The finished size of one item.  Custom sides take precedence over
/// the selected standard paper size, axis by axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemSize {
    pub paper_size: String,
    #[serde(deserialize_with = "form::decimal")]
    pub length: Option<f64>,
    #[serde(deserialize_with = "form::decimal")]
    pub breadth: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaperSelection {
    #[serde(rename = "type")]
    pub paper_type: String,
    #[serde(deserialize_with = "form::whole")]
    pub thickness_gsm: Option<u32>,
    pub package_size: PackageSize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlateSelection {
    #[serde(rename = "size")]
    pub plate_size: String,
    pub ink_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetSelection {
    #[serde(rename = "size")]
    pub sheet_size: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BindingSelection {
    #[serde(rename = "type")]
    pub binding_type: String,
    /// A rate typed over the catalog rate on the form.
    #[serde(deserialize_with = "form::decimal")]
    pub custom_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaminationSelection {
    #[serde(rename = "type")]
    pub lamination_type: String,
}

/// Everything the cost-calculation form has collected so far.
///
/// A `JobSpec` is rebuilt from the form on every edit.  Any field may
/// still be missing; the engine computes what it can and leaves the
/// rest as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobSpec {
    #[serde(deserialize_with = "form::whole")]
    pub pages: Option<u32>,
    #[serde(deserialize_with = "form::whole")]
    pub quantity: Option<u32>,
    pub item: ItemSize,
    pub inner_paper: PaperSelection,
    pub outer_paper: PaperSelection,
    pub plate: PlateSelection,
    pub sheet: SheetSelection,
    pub binding: BindingSelection,
    pub inner_lamination: LaminationSelection,
    pub outer_lamination: LaminationSelection,
}

/// Rates picked up from the catalog for the current selections.  An
/// unresolved selection contributes a rate of zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRates {
    pub inner_paper_per_kg: f64,
    pub outer_paper_per_kg: f64,
    pub plate: f64,
    pub ink: f64,
    pub binding: f64,
    pub inner_lamination: f64,
    pub outer_lamination: f64,
}

/// The full result of an estimate.
///
/// Every figure is an `Option`: `None` means the figure cannot be
/// computed from what has been entered so far, which is different from
/// a figure that was computed to zero.  Use [`CostBreakdown::display`]
/// to obtain the zero-filled values shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub item: Option<Dimensions>,
    pub sheet: Option<Dimensions>,
    pub plate: Option<Dimensions>,
    /// Page sides per press sheet (both faces counted).
    pub sheet_fit: Option<FitResult>,
    /// Items per plate.
    pub plate_fit: Option<FitResult>,
    pub total_reams: Option<u64>,
    pub ream_sheets: Option<u64>,
    pub total_sheets: Option<f64>,
    pub total_packets: Option<u64>,
    pub plates_needed: Option<u64>,
    pub ream_weight: Option<u64>,
    pub rates: ResolvedRates,
    pub inner_paper_cost: Option<f64>,
    pub outer_paper_cost: Option<f64>,
    pub lamination_cost: Option<f64>,
    pub binding_cost: Option<f64>,
    /// Cost of the plates with the selected ink.
    pub plate_cost: Option<f64>,
    pub printing_cost: Option<f64>,
    pub total_cost: Option<f64>,
    pub total_with_margin: Option<f64>,
    /// Catalog kinds whose selection was made but not found.
    pub unresolved: Vec<String>,
}

impl CostBreakdown {
    /// Normalise for presentation: missing figures become zero and
    /// money is shown in whole units, rounded down.
    pub fn display(&self) -> CostDisplay {
        let money = |line: Option<f64>| line.map(f64::floor).unwrap_or(0.0);
        CostDisplay {
            paper_fit: self.sheet_fit.map(|fit| fit.units_per_sheet).unwrap_or(0),
            plate_fit: self.plate_fit.map(|fit| fit.units_per_sheet).unwrap_or(0),
            total_reams: self.total_reams.unwrap_or(0),
            ream_sheets: self.ream_sheets.unwrap_or(0),
            total_sheets: self.total_sheets.unwrap_or(0.0),
            total_packets: self.total_packets.unwrap_or(0),
            plates_needed: self.plates_needed.unwrap_or(0),
            ream_weight: self.ream_weight.unwrap_or(0),
            inner_paper_cost: money(self.inner_paper_cost),
            outer_paper_cost: money(self.outer_paper_cost),
            lamination_cost: money(self.lamination_cost),
            binding_cost: money(self.binding_cost),
            plate_cost: money(self.plate_cost),
            printing_cost: money(self.printing_cost),
            total_cost: money(self.total_cost),
            total_with_margin: money(self.total_with_margin),
        }
    }
}

/// A [`CostBreakdown`] ready to be rendered.  Never contains `NaN`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostDisplay {
    pub paper_fit: u32,
    pub plate_fit: u32,
    pub total_reams: u64,
    pub ream_sheets: u64,
    pub total_sheets: f64,
    pub total_packets: u64,
    pub plates_needed: u64,
    pub ream_weight: u64,
    pub inner_paper_cost: f64,
    pub outer_paper_cost: f64,
    pub lamination_cost: f64,
    pub binding_cost: f64,
    pub plate_cost: f64,
    pub printing_cost: f64,
    pub total_cost: f64,
    pub total_with_margin: f64,
}

/// Response body for an estimate request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    pub breakdown: CostBreakdown,
    pub display: CostDisplay,
}

impl From<CostBreakdown> for EstimateResponse {
    fn from(breakdown: CostBreakdown) -> Self {
        let display = breakdown.display();
        Self { breakdown, display }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_spec_reads_partial_form() {
        let job: JobSpec = serde_json::from_value(json!({
            "pages": "",
            "quantity": "1000",
            "innerPaper": {"type": "Maplitho", "thicknessGsm": "", "packageSize": "250"},
            "plate": {"size": "Large", "inkType": "CMYK"}
        }))
        .unwrap();
        assert_eq!(job.pages, None);
        assert_eq!(job.quantity, Some(1000));
        assert_eq!(job.inner_paper.paper_type, "Maplitho");
        assert_eq!(job.inner_paper.thickness_gsm, None);
        assert_eq!(job.inner_paper.package_size, PackageSize::HalfReam);
        assert_eq!(job.outer_paper.package_size, PackageSize::Ream);
        assert_eq!(job.plate.ink_type, "CMYK");
        assert!(job.sheet.sheet_size.is_empty());
    }

    #[test]
    fn test_package_size_serialises_as_sheet_count() {
        let value = serde_json::to_value(PackageSize::QuarterReam).unwrap();
        assert_eq!(value, json!(125));
        let parsed: PackageSize = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(parsed, PackageSize::Ream);
    }

    #[test]
    fn test_display_zero_fills_and_floors() {
        let breakdown = CostBreakdown {
            inner_paper_cost: Some(18.58),
            outer_paper_cost: None,
            total_sheets: None,
            ..Default::default()
        };
        let display = breakdown.display();
        assert_eq!(display.inner_paper_cost, 18.0);
        assert_eq!(display.outer_paper_cost, 0.0);
        assert_eq!(display.total_sheets, 0.0);
        assert_eq!(display.paper_fit, 0);
    }
}

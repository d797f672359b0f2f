//! Print-cost estimation engine.
//!
//! The `engine` module turns a [`JobSpec`] and a [`Catalog`] into a
//! [`CostBreakdown`].  Each pricing rule is exposed as its own function
//! so it can be checked in isolation; [`estimate`] resolves the
//! selections once and feeds the rules.  [`estimate_batch`] uses the
//! [`rayon`] crate to price independent jobs across CPU cores.
//!
//! Rules never fail.  A rule whose inputs are missing, or whose
//! arithmetic would produce `NaN` or infinity, yields `None` and the
//! remaining rules carry on.

use crate::catalog::{Catalog, LaminationType, PaperType, PlateSize, SheetSize};
use crate::geometry;
use crate::models::{CostBreakdown, Dimensions, FitResult, JobSpec, PackageSize, ResolvedRates};
use rayon::prelude::*;
use tracing::trace;

/// Markup applied to the summed line items.
pub const MARGIN_FACTOR: f64 = 1.2;
/// Allowance for spoilage added to sheet and ream counts.
pub const WASTAGE: f64 = 0.05;
pub const SHEETS_PER_REAM: u64 = 500;
/// Cover sheets are sold in packets of this many.
pub const SHEETS_PER_PACKET: f64 = 100.0;
/// Cover faces printed per copy.
pub const COVER_SIDES: f64 = 4.0;
/// Converts packing value x gsm x price per kg into a ream price.
pub const PAPER_PRICE_DIVISOR: f64 = 3100.0;
/// Ink process that needs one plate per colour separation.
pub const FOUR_COLOUR_INK: &str = "CMYK";
pub const FOUR_COLOUR_PLATES: u64 = 4;

fn finite(value: f64) -> Option<f64> {
    Some(value).filter(|v| v.is_finite())
}

fn count(value: f64) -> Option<u64> {
    finite(value).filter(|v| *v >= 0.0).map(|v| v as u64)
}

/// Reams of inner paper for the run, with wastage, rounded up.
///
/// `paper_fit` is the number of page sides per sheet (see
/// [`geometry::sheet_fit`]).
pub fn total_reams(pages: u32, quantity: u32, paper_fit: u32) -> Option<u64> {
    let page_sides = f64::from(pages) * f64::from(quantity);
    let base = (page_sides / f64::from(paper_fit) / SHEETS_PER_REAM as f64).floor();
    count((WASTAGE * base + base).ceil())
}

/// Sheets of inner paper for the run including wastage, unrounded.
pub fn total_sheets(pages: u32, quantity: u32, paper_fit: u32) -> Option<f64> {
    let page_sides = f64::from(pages) * f64::from(quantity);
    let fit = f64::from(paper_fit);
    finite(page_sides / fit + WASTAGE * page_sides / fit)
}

/// Packets of cover stock for the run.
pub fn total_packets(quantity: u32, paper_fit: u32) -> Option<u64> {
    let sheets = (COVER_SIDES * f64::from(quantity) / f64::from(paper_fit)).ceil();
    count((sheets / SHEETS_PER_PACKET).ceil())
}

/// Price of one full ream of the given stock on the given sheet.
fn ream_price(sheet_value: f64, thickness_gsm: u32, rate_per_kg: f64) -> f64 {
    sheet_value * f64::from(thickness_gsm) * rate_per_kg / PAPER_PRICE_DIVISOR
}

/// Cost of the inner pages' paper.
pub fn inner_paper_cost(
    sheet_value: f64,
    thickness_gsm: u32,
    rate_per_kg: f64,
    total_reams: u64,
    package: PackageSize,
) -> Option<f64> {
    let cost = ream_price(sheet_value, thickness_gsm, rate_per_kg) * total_reams as f64;
    finite(cost / package.divisor())
}

/// Cost of the cover paper.  A packet is priced at half a ream.
pub fn outer_paper_cost(
    sheet_value: f64,
    thickness_gsm: u32,
    rate_per_kg: f64,
    total_packets: u64,
    package: PackageSize,
) -> Option<f64> {
    let cost = ream_price(sheet_value, thickness_gsm, rate_per_kg) / 2.0 * total_packets as f64;
    finite(cost / package.divisor())
}

/// Weight figure of a ream: packing value times thickness, rounded up.
pub fn ream_weight(sheet_value: f64, thickness_gsm: u32) -> Option<u64> {
    count((sheet_value * f64::from(thickness_gsm)).ceil())
}

/// Plates required to print `pages`, one set per colour for CMYK.
pub fn plates_needed(pages: u32, plate_fit: u32, ink_type: &str) -> Option<u64> {
    let plates = count((f64::from(pages) / f64::from(plate_fit)).ceil())?;
    Some(if ink_type == FOUR_COLOUR_INK {
        plates.checked_mul(FOUR_COLOUR_PLATES)?
    } else {
        plates
    })
}

/// Lamination is charged on the half-sheet area for every copy.
pub fn lamination_cost(rate: f64, sheet: Dimensions, quantity: u32) -> Option<f64> {
    finite(rate * (sheet.length / 2.0) * (sheet.breadth / 2.0) * f64::from(quantity))
}

pub fn binding_cost(rate: f64, quantity: u32) -> Option<f64> {
    finite((rate * f64::from(quantity)).ceil())
}

/// Sum of the line items, each rounded down first.  `None` as soon as
/// any line is not computable.
pub fn total_cost(lines: &[Option<f64>]) -> Option<f64> {
    lines.iter().try_fold(0.0, |sum, line| line.map(|cost| sum + cost.floor()))
}

pub fn with_margin(total: f64) -> f64 {
    (total * MARGIN_FACTOR).floor()
}

/// Selections resolved against the catalog for one estimate.
struct Resolved<'a> {
    item: Option<Dimensions>,
    sheet: Option<&'a SheetSize>,
    plate: Option<&'a PlateSize>,
    inner_paper: Option<&'a PaperType>,
    outer_paper: Option<&'a PaperType>,
    inner_lamination: Option<&'a LaminationType>,
    outer_lamination: Option<&'a LaminationType>,
    binding_rate: Option<f64>,
    unresolved: Vec<String>,
}

impl<'a> Resolved<'a> {
    fn new(job: &'a JobSpec, catalog: &'a Catalog) -> Self {
        let mut unresolved = Vec::new();
        let mut note = |label: &str, selection: &str, found: bool| {
            if !found && !selection.is_empty() {
                unresolved.push(label.to_string());
            }
        };

        let standard = catalog.paper_size(&job.item.paper_size);
        note("paper size", &job.item.paper_size, standard.is_some());
        // A custom side of zero counts as not entered.
        let custom = |side: Option<f64>| side.filter(|v| *v != 0.0);
        let length = custom(job.item.length).or(standard.map(|s| s.paper_length));
        let breadth = custom(job.item.breadth).or(standard.map(|s| s.paper_breadth));
        let item = length.zip(breadth).map(|(l, b)| Dimensions::new(l, b));

        let sheet = catalog.sheet_size(&job.sheet.sheet_size);
        note("sheet size", &job.sheet.sheet_size, sheet.is_some());
        let plate = catalog.plate(&job.plate.plate_size);
        note("plate", &job.plate.plate_size, plate.is_some());
        let inner_paper = catalog.paper(&job.inner_paper.paper_type);
        note("inner paper", &job.inner_paper.paper_type, inner_paper.is_some());
        let outer_paper = catalog.paper(&job.outer_paper.paper_type);
        note("outer paper", &job.outer_paper.paper_type, outer_paper.is_some());
        let inner_lamination = catalog.lamination(&job.inner_lamination.lamination_type);
        note(
            "inner lamination",
            &job.inner_lamination.lamination_type,
            inner_lamination.is_some(),
        );
        let outer_lamination = catalog.lamination(&job.outer_lamination.lamination_type);
        note(
            "outer lamination",
            &job.outer_lamination.lamination_type,
            outer_lamination.is_some(),
        );
        let binding = catalog.binding(&job.binding.binding_type);
        note("binding", &job.binding.binding_type, binding.is_some());
        // Ink names only drive the plate multiplier; check them when an
        // ink catalog is loaded at all.
        if !catalog.inks.is_empty() {
            note("ink", &job.plate.ink_type, catalog.ink(&job.plate.ink_type).is_some());
        }
        let binding_rate = job.binding.custom_rate.or(binding.map(|b| b.rate));

        Self {
            item,
            sheet,
            plate,
            inner_paper,
            outer_paper,
            inner_lamination,
            outer_lamination,
            binding_rate,
            unresolved,
        }
    }

    fn rates(&self) -> ResolvedRates {
        ResolvedRates {
            inner_paper_per_kg: self.inner_paper.map(|p| p.rate).unwrap_or(0.0),
            outer_paper_per_kg: self.outer_paper.map(|p| p.rate).unwrap_or(0.0),
            plate: self.plate.map(|p| p.plate_rate).unwrap_or(0.0),
            ink: self.plate.map(|p| p.ink_rate).unwrap_or(0.0),
            binding: self.binding_rate.unwrap_or(0.0),
            inner_lamination: self.inner_lamination.map(|l| l.rate).unwrap_or(0.0),
            outer_lamination: self.outer_lamination.map(|l| l.rate).unwrap_or(0.0),
        }
    }

    fn sheet_fit(&self) -> Option<FitResult> {
        geometry::sheet_fit(self.sheet?.dimensions(), self.item?)
    }

    fn plate_fit(&self) -> Option<FitResult> {
        geometry::plate_fit(self.plate?.dimensions(), self.item?)
    }
}

/// Price a job.
///
/// Unresolved rate selections (paper, binding, lamination) price at
/// zero.  Missing numbers and unresolved sizes leave the lines that
/// depend on them as `None`.
pub fn estimate(job: &JobSpec, catalog: &Catalog) -> CostBreakdown {
    let resolved = Resolved::new(job, catalog);
    let rates = resolved.rates();
    let pages = job.pages;
    let quantity = job.quantity;
    let sheet_value = resolved.sheet.map(|s| s.value);

    let sheet_fit = resolved.sheet_fit();
    let plate_fit = resolved.plate_fit();
    let paper_fit = sheet_fit.map(|fit| fit.units_per_sheet);

    let reams = pages
        .zip(quantity)
        .zip(paper_fit)
        .and_then(|((p, q), fit)| total_reams(p, q, fit));
    let sheets = pages
        .zip(quantity)
        .zip(paper_fit)
        .and_then(|((p, q), fit)| total_sheets(p, q, fit));
    let packets = quantity
        .zip(paper_fit)
        .and_then(|(q, fit)| total_packets(q, fit));
    let plates = pages
        .zip(plate_fit)
        .and_then(|(p, fit)| plates_needed(p, fit.units_per_sheet, &job.plate.ink_type));

    let inner_paper_cost = sheet_value
        .zip(job.inner_paper.thickness_gsm)
        .zip(reams)
        .and_then(|((value, gsm), reams)| {
            inner_paper_cost(
                value,
                gsm,
                rates.inner_paper_per_kg,
                reams,
                job.inner_paper.package_size,
            )
        });
    let outer_paper_cost = sheet_value
        .zip(job.outer_paper.thickness_gsm)
        .zip(packets)
        .and_then(|((value, gsm), packets)| {
            outer_paper_cost(
                value,
                gsm,
                rates.outer_paper_per_kg,
                packets,
                job.outer_paper.package_size,
            )
        });
    let lamination_cost = resolved
        .sheet
        .zip(quantity)
        .and_then(|(sheet, q)| lamination_cost(rates.inner_lamination, sheet.dimensions(), q));
    let binding_cost = quantity.and_then(|q| binding_cost(rates.binding, q));
    let printing_cost = plates.and_then(|n| finite(n as f64 * rates.plate));
    let plate_cost = plates.and_then(|n| finite(n as f64 * rates.ink));

    let total = total_cost(&[
        inner_paper_cost,
        outer_paper_cost,
        lamination_cost,
        binding_cost,
        printing_cost,
        plate_cost,
    ]);

    trace!(
        pages = ?pages,
        quantity = ?quantity,
        paper_fit = ?paper_fit,
        total = ?total,
        "estimated job"
    );

    CostBreakdown {
        item: resolved.item,
        sheet: resolved.sheet.map(SheetSize::dimensions),
        plate: resolved.plate.map(PlateSize::dimensions),
        sheet_fit,
        plate_fit,
        total_reams: reams,
        ream_sheets: reams.and_then(|r| r.checked_mul(SHEETS_PER_REAM)),
        total_sheets: sheets,
        total_packets: packets,
        plates_needed: plates,
        ream_weight: sheet_value
            .zip(job.inner_paper.thickness_gsm)
            .and_then(|(value, gsm)| ream_weight(value, gsm)),
        rates,
        inner_paper_cost,
        outer_paper_cost,
        lamination_cost,
        binding_cost,
        plate_cost,
        printing_cost,
        total_cost: total,
        total_with_margin: total.map(with_margin),
        unresolved: resolved.unresolved,
    }
}

/// Price many independent jobs against the same catalog.  Results are
/// returned in input order.
pub fn estimate_batch(jobs: Vec<JobSpec>, catalog: &Catalog) -> Vec<CostBreakdown> {
    jobs.into_par_iter()
        .map(|job| estimate(&job, catalog))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CostDisplay;

    #[test]
    fn test_reams_include_wastage_and_round_up() {
        // floor(100000 / 20 / 500) = 10, ceil(10.5) = 11
        assert_eq!(total_reams(100, 1000, 20), Some(11));
        // floor(100000 / 40 / 500) = 5, ceil(5.25) = 6
        assert_eq!(total_reams(100, 1000, 40), Some(6));
        // under one ream rounds down to nothing
        assert_eq!(total_reams(10, 10, 40), Some(0));
    }

    #[test]
    fn test_reams_never_decrease_with_more_page_sides() {
        let mut previous = 0;
        for quantity in (0..20_000).step_by(250) {
            let reams = total_reams(96, quantity, 16).unwrap();
            assert!(reams >= previous, "quantity {quantity}");
            previous = reams;
        }
    }

    #[test]
    fn test_zero_fit_makes_counts_uncomputable() {
        assert_eq!(total_reams(100, 1000, 0), None);
        assert_eq!(total_sheets(100, 1000, 0), None);
        assert_eq!(total_packets(1000, 0), None);
        assert_eq!(plates_needed(100, 0, "CMYK"), None);
    }

    #[test]
    fn test_inner_paper_cost_follows_ream_price() {
        let cost = inner_paper_cost(1.2, 100, 80.0, 11, PackageSize::Ream).unwrap();
        assert!((cost - 9600.0 / 3100.0 * 11.0).abs() < 1e-9);
        assert!((cost - 34.0645).abs() < 1e-3);
    }

    #[test]
    fn test_smaller_packages_divide_the_price() {
        let full = inner_paper_cost(1.2, 100, 80.0, 11, PackageSize::Ream).unwrap();
        let half = inner_paper_cost(1.2, 100, 80.0, 11, PackageSize::HalfReam).unwrap();
        let quarter = inner_paper_cost(1.2, 100, 80.0, 11, PackageSize::QuarterReam).unwrap();
        assert!((full - half * 2.0).abs() < 1e-9);
        assert!((full - quarter * 4.0).abs() < 1e-9);

        let outer_full = outer_paper_cost(1.2, 250, 120.0, 3, PackageSize::Ream).unwrap();
        let outer_half = outer_paper_cost(1.2, 250, 120.0, 3, PackageSize::HalfReam).unwrap();
        assert!((outer_full - outer_half * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_outer_paper_is_half_a_ream_per_packet() {
        let cost = outer_paper_cost(1.2, 250, 120.0, 1, PackageSize::Ream).unwrap();
        assert!((cost - 36000.0 / 3100.0 / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_packets_cover_four_faces_per_copy() {
        // ceil(4000 / 40) = 100 sheets, one packet
        assert_eq!(total_packets(1000, 40), Some(1));
        // ceil(4004 / 40) = 101 sheets, two packets
        assert_eq!(total_packets(1001, 40), Some(2));
    }

    #[test]
    fn test_cmyk_quadruples_plates() {
        assert_eq!(plates_needed(100, 9, "Single Colour"), Some(12));
        assert_eq!(plates_needed(100, 9, "CMYK"), Some(48));
        assert_eq!(plates_needed(100, 9, ""), Some(12));
        assert_eq!(plates_needed(100, 9, "cmyk"), Some(12));
    }

    #[test]
    fn test_lamination_uses_half_sheet_sides() {
        let cost = lamination_cost(0.5, Dimensions::new(20.0, 30.0), 1000).unwrap();
        assert_eq!(cost, 75_000.0);
    }

    #[test]
    fn test_binding_rounds_up() {
        assert_eq!(binding_cost(12.5, 1000), Some(12_500.0));
        assert_eq!(binding_cost(0.33, 10), Some(4.0));
    }

    #[test]
    fn test_ream_weight_rounds_up() {
        assert_eq!(ream_weight(1.5, 100), Some(150));
        assert_eq!(ream_weight(1.25, 90), Some(113));
    }

    #[test]
    fn test_total_floors_each_line_and_needs_all_of_them() {
        let lines = [Some(18.58), Some(5.8), Some(75_000.0), Some(12_500.0), Some(24_000.0), Some(14_400.0)];
        assert_eq!(total_cost(&lines), Some(125_923.0));
        assert_eq!(total_cost(&[Some(1.9), None]), None);
        assert_eq!(total_cost(&[]), Some(0.0));
    }

    #[test]
    fn test_margin_is_twenty_percent_rounded_down() {
        for total in [125_923.0, 4_999.0, 17.0, 1_234_567.0] {
            assert_eq!(with_margin(total), (total * 1.2).floor());
        }
        assert_eq!(with_margin(125_923.0), 151_107.0);
        assert_eq!(with_margin(0.0), 0.0);
    }

    #[test]
    fn test_empty_job_against_empty_catalog_is_all_zero() {
        let breakdown = estimate(&JobSpec::default(), &Catalog::default());
        assert_eq!(breakdown.total_cost, None);
        assert!(breakdown.unresolved.is_empty());
        let display = breakdown.display();
        assert_eq!(display, CostDisplay::default());
    }
}

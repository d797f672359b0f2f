//! Rate catalogs and selection lookup.
//!
//! The `catalog` module defines the records the ERP serves for each
//! kind of material (papers, plates, sheet sizes, standard paper sizes,
//! bindings, laminations and inks), the [`CatalogEntry`] trait used to
//! resolve a selected name to its record, and helpers for loading the
//! whole catalog from a directory of JSON files.
//!
//! Field names follow the REST payloads exactly (camelCase) so the
//! same files can be produced by dumping the existing endpoints.

use crate::error::{EstimatorError, Result};
use crate::models::Dimensions;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, trace, warn};

/// Step between consecutive paper thickness options, in gsm.
pub const THICKNESS_STEP: usize = 10;

/// A named option in one of the catalogs.
///
/// Every catalog kind is keyed by a display name chosen from a drop
/// down.  `KIND` is used in log output and in the list of unresolved
/// selections reported with an estimate.
pub trait CatalogEntry {
    const KIND: &'static str;

    fn name(&self) -> &str;
}

/// Resolve `selection` against `entries`.
///
/// An empty selection means the user has not chosen yet and resolves
/// to `None` without scanning.  Unknown names also resolve to `None`;
/// callers degrade the affected cost lines instead of failing.
pub fn lookup<'a, T: CatalogEntry>(entries: &'a [T], selection: &str) -> Option<&'a T> {
    if selection.is_empty() {
        return None;
    }
    let found = entries.iter().find(|entry| entry.name() == selection);
    if found.is_none() {
        trace!(kind = T::KIND, selection, "selection not found in catalog");
    }
    found
}

/// A paper stock with its allowed thickness range and price per kg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperType {
    pub paper_type: String,
    /// Lightest offered thickness in gsm.
    pub min_thickness: u32,
    /// Heaviest offered thickness in gsm.
    pub max_thickness: u32,
    /// Price per kilogram.
    pub rate: f64,
}

impl PaperType {
    /// Thickness options offered for this paper, from `min_thickness`
    /// up to `max_thickness` in steps of ten gsm.  Empty when the range
    /// is inverted.
    pub fn thickness_options(&self) -> Vec<u32> {
        (self.min_thickness..=self.max_thickness)
            .step_by(THICKNESS_STEP)
            .collect()
    }
}

impl CatalogEntry for PaperType {
    const KIND: &'static str = "paper";

    fn name(&self) -> &str {
        &self.paper_type
    }
}

/// A printing plate size with the cost of the plate and of inking it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateSize {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate_id: Option<i64>,
    pub plate_size: String,
    pub plate_length: f64,
    pub plate_breadth: f64,
    pub plate_rate: f64,
    pub ink_rate: f64,
}

impl PlateSize {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.plate_length, self.plate_breadth)
    }
}

impl CatalogEntry for PlateSize {
    const KIND: &'static str = "plate";

    fn name(&self) -> &str {
        &self.plate_size
    }
}

/// A press sheet size.  `value` is the packing multiplier used when
/// converting thickness and price per kg into a ream price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSize {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_size_id: Option<i64>,
    pub sheet_size: String,
    pub sheet_length: f64,
    pub sheet_breadth: f64,
    pub value: f64,
}

impl SheetSize {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.sheet_length, self.sheet_breadth)
    }
}

impl CatalogEntry for SheetSize {
    const KIND: &'static str = "sheet size";

    fn name(&self) -> &str {
        &self.sheet_size
    }
}

/// A standard finished size (A4, A5, ...) a job can inherit its
/// dimensions from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperSize {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_size_id: Option<i64>,
    pub paper_size: String,
    pub paper_length: f64,
    pub paper_breadth: f64,
}

impl CatalogEntry for PaperSize {
    const KIND: &'static str = "paper size";

    fn name(&self) -> &str {
        &self.paper_size
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingType {
    pub binding_type: String,
    /// Price per bound copy.
    pub rate: f64,
}

impl CatalogEntry for BindingType {
    const KIND: &'static str = "binding";

    fn name(&self) -> &str {
        &self.binding_type
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaminationType {
    pub lamination_type: String,
    /// Price per square inch of half sheet.
    pub rate: f64,
}

impl CatalogEntry for LaminationType {
    const KIND: &'static str = "lamination";

    fn name(&self) -> &str {
        &self.lamination_type
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InkType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ink_id: Option<i64>,
    pub ink_type: String,
}

impl CatalogEntry for InkType {
    const KIND: &'static str = "ink";

    fn name(&self) -> &str {
        &self.ink_type
    }
}

/// Every catalog the estimator reads from.  Fetched once by the caller
/// and treated as read-only while estimating.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Catalog {
    pub papers: Vec<PaperType>,
    pub plates: Vec<PlateSize>,
    pub sheet_sizes: Vec<SheetSize>,
    pub paper_sizes: Vec<PaperSize>,
    pub bindings: Vec<BindingType>,
    pub laminations: Vec<LaminationType>,
    pub inks: Vec<InkType>,
}

impl Catalog {
    pub fn paper(&self, name: &str) -> Option<&PaperType> {
        lookup(&self.papers, name)
    }

    pub fn plate(&self, name: &str) -> Option<&PlateSize> {
        lookup(&self.plates, name)
    }

    pub fn sheet_size(&self, name: &str) -> Option<&SheetSize> {
        lookup(&self.sheet_sizes, name)
    }

    pub fn paper_size(&self, name: &str) -> Option<&PaperSize> {
        lookup(&self.paper_sizes, name)
    }

    pub fn binding(&self, name: &str) -> Option<&BindingType> {
        lookup(&self.bindings, name)
    }

    pub fn lamination(&self, name: &str) -> Option<&LaminationType> {
        lookup(&self.laminations, name)
    }

    pub fn ink(&self, name: &str) -> Option<&InkType> {
        lookup(&self.inks, name)
    }

    /// Thickness options for the named paper type, or `None` when the
    /// paper type is not in the catalog.
    pub fn thickness_options(&self, paper_type: &str) -> Option<Vec<u32>> {
        self.paper(paper_type).map(PaperType::thickness_options)
    }

    /// Total number of entries across all catalogs.
    pub fn len(&self) -> usize {
        self.papers.len()
            + self.plates.len()
            + self.sheet_sizes.len()
            + self.paper_sizes.len()
            + self.bindings.len()
            + self.laminations.len()
            + self.inks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The REST layer wraps every list in `{ "data": [...] }`; dumps made
/// by hand are usually bare arrays.  Both are accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Envelope { data: Vec<T> },
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Envelope { data } => data,
            Listing::Bare(items) => items,
        }
    }
}

/// Parse a single catalog listing from JSON text.
pub fn parse_listing<T: DeserializeOwned>(json: &str) -> serde_json::Result<Vec<T>> {
    serde_json::from_str::<Listing<T>>(json).map(Listing::into_vec)
}

/// Read one listing file.  A missing file is an empty listing.
fn read_listing<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.is_file() {
        debug!(path = %path.display(), "catalog file absent, using empty listing");
        return Ok(Vec::new());
    }
    let data = std::fs::read_to_string(path).map_err(|source| EstimatorError::CatalogIo {
        path: path.to_path_buf(),
        source,
    })?;
    parse_listing(&data).map_err(|source| EstimatorError::CatalogParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`read_listing`] but a malformed file is logged and skipped so
/// one bad export does not take every other catalog down with it.
fn read_listing_tolerant<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Vec<T>> {
    match read_listing(&dir.join(file)) {
        Ok(items) => {
            debug!(file, count = items.len(), "loaded catalog listing");
            Ok(items)
        }
        Err(err @ EstimatorError::CatalogParse { .. }) => {
            warn!(file, error = %err, "skipping unparsable catalog listing");
            Ok(Vec::new())
        }
        Err(err) => Err(err),
    }
}

/// Load all catalogs from a directory.
///
/// The directory is expected to contain `papers.json`, `plates.json`,
/// `sheetSizes.json`, `paperSizes.json`, `bindings.json`,
/// `laminations.json` and `inks.json`.  Missing files and unparsable
/// files yield empty listings; an unreadable file is an error.  A path
/// that is not a directory yields an empty catalog.
pub fn load_catalog_from_dir(path: &Path) -> Result<Catalog> {
    if !path.is_dir() {
        warn!(path = %path.display(), "catalog directory not found, starting with an empty catalog");
        return Ok(Catalog::default());
    }
    Ok(Catalog {
        papers: read_listing_tolerant(path, "papers.json")?,
        plates: read_listing_tolerant(path, "plates.json")?,
        sheet_sizes: read_listing_tolerant(path, "sheetSizes.json")?,
        paper_sizes: read_listing_tolerant(path, "paperSizes.json")?,
        bindings: read_listing_tolerant(path, "bindings.json")?,
        laminations: read_listing_tolerant(path, "laminations.json")?,
        inks: read_listing_tolerant(path, "inks.json")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings() -> Vec<BindingType> {
        vec![
            BindingType {
                binding_type: "Perfect".into(),
                rate: 12.5,
            },
            BindingType {
                binding_type: "Saddle Stitch".into(),
                rate: 4.0,
            },
        ]
    }

    #[test]
    fn test_lookup_finds_exact_name() {
        let entries = bindings();
        let found = lookup(&entries, "Saddle Stitch").unwrap();
        assert_eq!(found.rate, 4.0);
    }

    #[test]
    fn test_lookup_is_soft_for_empty_and_unknown_selections() {
        let entries = bindings();
        assert!(lookup(&entries, "").is_none());
        assert!(lookup(&entries, "perfect").is_none());
        assert!(lookup::<BindingType>(&[], "Perfect").is_none());
    }

    #[test]
    fn test_thickness_options_step_by_ten() {
        let paper = PaperType {
            paper_type: "Maplitho".into(),
            min_thickness: 60,
            max_thickness: 100,
            rate: 80.0,
        };
        assert_eq!(paper.thickness_options(), vec![60, 70, 80, 90, 100]);

        let uneven = PaperType {
            max_thickness: 95,
            ..paper.clone()
        };
        assert_eq!(uneven.thickness_options(), vec![60, 70, 80, 90]);

        let inverted = PaperType {
            min_thickness: 120,
            ..paper
        };
        assert!(inverted.thickness_options().is_empty());
    }

    #[test]
    fn test_listing_accepts_envelope_and_bare_arrays() {
        let wrapped: Vec<LaminationType> =
            parse_listing(r#"{"data": [{"laminationType": "Matte", "rate": 0.5}]}"#).unwrap();
        let bare: Vec<LaminationType> =
            parse_listing(r#"[{"laminationType": "Matte", "rate": 0.5}]"#).unwrap();
        assert_eq!(wrapped, bare);
        assert_eq!(bare[0].lamination_type, "Matte");
    }

    #[test]
    fn test_plate_listing_keeps_rest_field_names() {
        let plates: Vec<PlateSize> = parse_listing(
            r#"[{"plateId": 3, "plateSize": "Large", "plateLength": 15, "plateBreadth": 20, "plateRate": 500, "inkRate": 300}]"#,
        )
        .unwrap();
        assert_eq!(plates[0].plate_id, Some(3));
        assert_eq!(plates[0].dimensions(), Dimensions::new(15.0, 20.0));
    }
}

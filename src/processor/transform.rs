//! Per-file transformation into the master schema.
//!
//! Every source record becomes one output row: filename-derived period
//! columns, block code and WUA derivations, the constant parameter name
//! and the copied indicator value and class.

use super::reader::{SourceFeature, SourceLayer};
use crate::constants::{PARAMETER_EQUITY, REQUIRED_FIELDS, columns, source_fields};
use crate::error::{EquityError, Result};
use crate::fields::{
    field_to_f64, field_to_string, normalize_wua, split_block_code, stringify_field,
};
use crate::geometry::encode_wkb;
use crate::models::FilenameToken;

use polars::prelude::*;
use shapefile::dbase::FieldValue;
use std::path::Path;
use tracing::debug;

/// Derived attributes of a single output row
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub wua: String,
    pub lateral: Option<String>,
    pub bank: Option<String>,
    pub value: Option<f64>,
    pub classification: Option<String>,
}

fn required_field<'a>(
    feature: &'a SourceFeature,
    name: &str,
    index: usize,
    path: &Path,
) -> Result<&'a FieldValue> {
    feature
        .attributes
        .get(name)
        .ok_or_else(|| EquityError::MissingField {
            path: path.to_path_buf(),
            field: name.to_string(),
            record: index,
        })
}

/// Derive the row attributes of one source record
pub fn derive_row(feature: &SourceFeature, index: usize, path: &Path) -> Result<DerivedRow> {
    let field = |name: &str| required_field(feature, name, index, path);

    let (lateral, bank) = split_block_code(&stringify_field(field(source_fields::BLOCK_NAME)?));
    let wua = normalize_wua(&stringify_field(field(source_fields::WUA)?));
    let value = field_to_f64(field(source_fields::CV_UNIF)?);
    let classification = field_to_string(field(source_fields::UNIF_CLS)?);

    Ok(DerivedRow {
        wua,
        lateral,
        bank: bank.map(|b| b.to_string()),
        value,
        classification,
    })
}

/// Fail when the attribute table lacks a required field, even without records
fn check_fields(layer: &SourceLayer) -> Result<()> {
    for required in REQUIRED_FIELDS {
        if !layer.fields.iter().any(|field| field.as_str() == *required) {
            return Err(EquityError::MissingColumn {
                path: layer.path.clone(),
                field: required.to_string(),
            });
        }
    }
    Ok(())
}

/// Transform one loaded layer into a frame with the master schema
pub fn transform_layer(layer: &SourceLayer, token: &FilenameToken) -> Result<DataFrame> {
    check_fields(layer)?;

    let rows = layer
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| derive_row(feature, index, &layer.path))
        .collect::<Result<Vec<_>>>()?;

    let height = rows.len();
    let mut wua = Vec::with_capacity(height);
    let mut lateral = Vec::with_capacity(height);
    let mut bank = Vec::with_capacity(height);
    let mut value = Vec::with_capacity(height);
    let mut classification = Vec::with_capacity(height);

    for row in rows {
        wua.push(row.wua);
        lateral.push(row.lateral);
        bank.push(row.bank);
        value.push(row.value);
        classification.push(row.classification);
    }

    let wkb = layer
        .features
        .iter()
        .map(|f| f.geometry.as_ref().map(encode_wkb).transpose())
        .collect::<Result<Vec<_>>>()?;
    let geometry = BinaryChunked::from_iter_options(
        columns::GEOMETRY.into(),
        wkb.iter().map(|g| g.as_deref()),
    );

    let frame = DataFrame::new(vec![
        Column::new(columns::WUA.into(), wua),
        Column::new(columns::LATERAL.into(), lateral),
        Column::new(columns::BANK.into(), bank),
        Column::new(columns::YEAR.into(), vec![token.year; height]),
        Column::new(columns::PARAMETER.into(), vec![PARAMETER_EQUITY; height]),
        Column::new(
            columns::SEASON.into(),
            vec![token.season.as_str(); height],
        ),
        Column::new(
            columns::MONTH_NAME.into(),
            vec![token.month_name.as_str(); height],
        ),
        Column::new(columns::MONTH.into(), vec![token.month_number(); height]),
        Column::new(columns::VALUE.into(), value),
        Column::new(columns::CLASSIFICATION.into(), classification),
        Column::from(geometry.into_series()),
    ])?;

    debug!(
        "Transformed {} rows from {} ({})",
        frame.height(),
        layer.path.display(),
        token
    );

    Ok(frame)
}

use thiserror::Error;

use super::model::{CellValue, Column, Table};

// ---------------------------------------------------------------------------
// Column names shared with the analysis pipeline
// ---------------------------------------------------------------------------

pub const ID: &str = "id";
pub const LATITUDE: &str = "reclat";
pub const LONGITUDE: &str = "reclong";
pub const CLUSTER_LABEL: &str = "cluster_kmeans";
pub const YEAR: &str = "year";
pub const MASS: &str = "mass";
pub const ISOLATION_SCORE: &str = "iso_anomaly_score";
pub const RECONSTRUCTION_ERROR: &str = "ae_recon_error";

/// Required columns of one artifact file.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactSchema {
    pub artifact: &'static str,
    pub required: &'static [&'static str],
}

pub const CLUSTER_SCHEMA: ArtifactSchema = ArtifactSchema {
    artifact: "clustering results",
    required: &[ID, LATITUDE, LONGITUDE, CLUSTER_LABEL],
};

pub const ANOMALY_SCHEMA: ArtifactSchema = ArtifactSchema {
    artifact: "anomaly scores",
    required: &[ID, YEAR, MASS, ISOLATION_SCORE, RECONSTRUCTION_ERROR],
};

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("{artifact} are missing required column '{column}'")]
    MissingColumn {
        artifact: &'static str,
        column: &'static str,
    },
    #[error("column '{column}' must be numeric, found {found}")]
    NonNumeric { column: &'static str, found: String },
}

impl ArtifactSchema {
    /// Fail on the first required column the table lacks.
    pub fn check(&self, table: &Table) -> Result<(), SchemaError> {
        match self.required.iter().find(|c| table.column(c).is_none()) {
            Some(&column) => Err(SchemaError::MissingColumn {
                artifact: self.artifact,
                column,
            }),
            None => Ok(()),
        }
    }

    /// Look up a required column, reporting it by name when absent.
    pub fn column<'t>(&self, table: &'t Table, column: &'static str) -> Result<&'t Column, SchemaError> {
        table.column(column).ok_or(SchemaError::MissingColumn {
            artifact: self.artifact,
            column,
        })
    }

    /// A required numeric column as optional floats (`None` = missing cell).
    pub fn numeric(&self, table: &Table, column: &'static str) -> Result<Vec<Option<f64>>, SchemaError> {
        let col = self.column(table, column)?;
        col.values
            .iter()
            .map(|v| match v {
                CellValue::Integer(_) | CellValue::Float(_) | CellValue::Null => Ok(v.as_f64()),
                other => Err(SchemaError::NonNumeric {
                    column,
                    found: format!("'{other}'"),
                }),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Typed rows extracted from the artifacts
// ---------------------------------------------------------------------------

/// One observation with a usable position on the cluster map.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterPoint {
    pub id: CellValue,
    pub lat: f64,
    pub lon: f64,
    pub label: CellValue,
}

/// Rows of the clustering artifact that have both coordinates.
pub fn cluster_points(table: &Table) -> Result<Vec<ClusterPoint>, SchemaError> {
    let schema = CLUSTER_SCHEMA;
    schema.check(table)?;

    let ids = &schema.column(table, ID)?.values;
    let labels = &schema.column(table, CLUSTER_LABEL)?.values;
    let lats = schema.numeric(table, LATITUDE)?;
    let lons = schema.numeric(table, LONGITUDE)?;

    Ok((0..table.len())
        .filter_map(|row| {
            Some(ClusterPoint {
                id: ids[row].clone(),
                lat: lats[row]?,
                lon: lons[row]?,
                label: labels[row].clone(),
            })
        })
        .collect())
}

/// One observation of the anomaly artifact with both scores present.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyPoint {
    pub id: CellValue,
    pub year: CellValue,
    pub mass: CellValue,
    pub isolation_score: f64,
    pub reconstruction_error: f64,
}

pub fn anomaly_points(table: &Table) -> Result<Vec<AnomalyPoint>, SchemaError> {
    let schema = ANOMALY_SCHEMA;
    schema.check(table)?;

    let ids = &schema.column(table, ID)?.values;
    let years = &schema.column(table, YEAR)?.values;
    let masses = &schema.column(table, MASS)?.values;
    let iso = schema.numeric(table, ISOLATION_SCORE)?;
    let recon = schema.numeric(table, RECONSTRUCTION_ERROR)?;

    Ok((0..table.len())
        .filter_map(|row| {
            Some(AnomalyPoint {
                id: ids[row].clone(),
                year: years[row].clone(),
                mass: masses[row].clone(),
                isolation_score: iso[row]?,
                reconstruction_error: recon[row]?,
            })
        })
        .collect())
}

//! FILENAME: core/pivot-engine/src/table.rs
//! Pivot Table - The flattened output of a pivot.
//!
//! A `Table` is an ordered list of named columns and an ordered list of
//! rows. Besides its display cells every row keeps its category key (the
//! category positions of the row dimensions), which is what makes a table
//! reversible and lets the spatial join find a row's geographic code
//! without parsing labels back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;

use cube::{CubeMetadata, Dimension, Granularity, Period, Roles, Unit};

use crate::definition::PivotFormat;

/// Category positions of a row, one per row dimension.
pub type RowKey = SmallVec<[usize; 8]>;

// ============================================================================
// CELLS AND COLUMNS
// ============================================================================

/// Display value of one table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// No data. Missing observations stay here rather than becoming zero.
    Empty,
    Number(f64),
    Text(String),
    /// A typed time label (only when date conversion is requested).
    Period(Period),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_period(&self) -> Option<&Period> {
        match self {
            CellValue::Period(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<Option<f64>> for CellValue {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(n) => CellValue::Number(n),
            None => CellValue::Empty,
        }
    }
}

impl From<&CellValue> for Value {
    fn from(cell: &CellValue) -> Self {
        match cell {
            CellValue::Empty => Value::Null,
            CellValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Period(p) if p.granularity == Granularity::Year => {
                Value::from(p.year())
            }
            CellValue::Period(p) => Value::String(p.to_string()),
        }
    }
}

/// What a column holds. Indices refer to `Table::dimensions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Category labels of a dimension.
    Dimension(usize),
    /// Category codes of a dimension.
    DimensionId(usize),
    /// Observations. `category` is the promoted category, `None` in long format.
    Value { category: Option<usize> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Column {
            name: name.into(),
            kind,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self.kind, ColumnKind::Value { .. })
    }

    /// The dimension this column describes, if it is a label or ID column.
    pub fn dimension(&self) -> Option<usize> {
        match self.kind {
            ColumnKind::Dimension(d) | ColumnKind::DimensionId(d) => Some(d),
            ColumnKind::Value { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub key: RowKey,
    pub cells: Vec<CellValue>,
}

// ============================================================================
// TABLE
// ============================================================================

/// A pivoted table plus the cube structure it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub(crate) format: PivotFormat,
    pub(crate) dimensions: Vec<Dimension>,
    pub(crate) roles: Roles,
    /// Cube indices of the dimensions that vary along rows, in cube order.
    pub(crate) row_dimensions: Vec<usize>,
    /// Cube index of the dimension promoted to columns (wide/tidy).
    pub(crate) promoted: Option<usize>,
    pub(crate) columns: Vec<Column>,
    pub(crate) rows: Vec<Row>,
    pub(crate) metadata: CubeMetadata,
}

impl Table {
    pub fn format(&self) -> PivotFormat {
        self.format
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell of the named column in row `row`.
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    /// All dimensions of the source cube, in cube order.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    pub fn row_dimensions(&self) -> &[usize] {
        &self.row_dimensions
    }

    pub fn promoted_dimension(&self) -> Option<usize> {
        self.promoted
    }

    pub fn metadata(&self) -> &CubeMetadata {
        &self.metadata
    }

    /// Units per statistic category, carried at table level.
    pub fn units(&self) -> &[(String, Unit)] {
        &self.metadata.units
    }

    /// Category code of dimension `dimension` (a cube index) in row `row`.
    /// `None` if the row does not exist or the dimension does not vary by row.
    pub fn category_code(&self, row: usize, dimension: usize) -> Option<&str> {
        let slot = self.row_dimensions.iter().position(|&d| d == dimension)?;
        let position = *self.rows.get(row)?.key.get(slot)?;
        self.dimensions
            .get(dimension)?
            .categories
            .get(position)
            .map(|c| c.code.as_str())
    }

    /// Removes the label and ID columns of a dimension, found by code or
    /// label. Row keys are kept, so the table stays reversible.
    /// Returns whether anything was removed.
    pub fn drop_columns_for(&mut self, dimension: &str) -> bool {
        let Some(index) = self
            .dimensions
            .iter()
            .position(|d| d.code == dimension || d.label == dimension)
        else {
            return false;
        };

        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| c.dimension() != Some(index))
            .collect();
        if keep.iter().all(|&k| k) {
            return false;
        }

        let mut flags = keep.iter();
        self.columns.retain(|_| *flags.next().unwrap_or(&true));
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.cells.retain(|_| *flags.next().unwrap_or(&true));
        }
        true
    }

    /// Rows as ordered JSON objects, column name to scalar.
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(&row.cells)
                    .map(|(col, cell)| (col.name.clone(), Value::from(cell)))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_cells_serialise_as_null() {
        assert_eq!(Value::from(&CellValue::from(None)), Value::Null);
        assert_eq!(Value::from(&CellValue::from(Some(0.0))), serde_json::json!(0.0));
        assert_eq!(Value::from(&CellValue::text("Cork")), serde_json::json!("Cork"));
    }

    #[test]
    fn periods_serialise_by_granularity() {
        let cell = |label: &str| CellValue::Period(Period::parse(label).unwrap());
        assert_eq!(Value::from(&cell("2022")), serde_json::json!(2022));
        assert_eq!(Value::from(&cell("2022Q4")), serde_json::json!("2022Q4"));
        assert_eq!(Value::from(&cell("2022M07")), serde_json::json!("2022-07"));
        assert_eq!(Value::from(&cell("2022W01")), serde_json::json!("2022-01-03"));
    }

    #[test]
    fn column_kind_reports_dimension() {
        assert_eq!(Column::new("County", ColumnKind::Dimension(2)).dimension(), Some(2));
        assert_eq!(Column::new("County ID", ColumnKind::DimensionId(2)).dimension(), Some(2));
        assert!(Column::new("value", ColumnKind::Value { category: None }).is_value());
    }
}

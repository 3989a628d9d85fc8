//! FILENAME: core/pivot-engine/src/engine.rs
//! Pivot Engine - Flattens a cube into a table and back.
//!
//! Algorithm:
//! 1. Pick the promoted dimension (none for long, time for wide, statistic for tidy)
//! 2. Lay out one label column (plus optional ID column) per remaining dimension,
//!    in cube order, followed by the value column(s)
//! 3. Walk every combination of the remaining dimensions in flat-array order;
//!    each combination is one row, and its value cells are read through the
//!    cube's strides
//!
//! With `convert_dates`, label cells of the time dimension are typed as
//! periods when it stays a row dimension (long and tidy).
//!
//! Because rows are enumerated by the same radix that addresses the value
//! array, row and column order is fully determined by the cube.

use rustc_hash::FxHashSet;

use cube::{log_debug, Cube, Observation, Period, RadixIndex};

use crate::definition::{IdColumns, PivotFormat, PivotOptions, ID_COLUMN_SUFFIX, VALUE_COLUMN};
use crate::error::{PivotError, Result};
use crate::table::{CellValue, Column, ColumnKind, Row, RowKey, Table};

// ============================================================================
// PIVOT
// ============================================================================

/// Flattens `cube` into the layout described by `options`.
pub fn pivot(cube: &Cube, options: &PivotOptions) -> Result<Table> {
    let promoted = match options.format {
        PivotFormat::Long => None,
        PivotFormat::Wide => Some(cube.roles().time.ok_or(PivotError::NoTimeDimension)?),
        PivotFormat::Tidy => Some(
            cube.roles()
                .statistic
                .ok_or(PivotError::NoStatisticDimension)?,
        ),
    };

    let dimensions = cube.dimensions();
    let row_dimensions: Vec<usize> = (0..dimensions.len())
        .filter(|&d| Some(d) != promoted)
        .collect();
    let id_dimensions = resolve_id_columns(cube, &options.ids)?;

    // Column layout
    let mut columns = Vec::new();
    for &d in &row_dimensions {
        let label = &dimensions[d].label;
        columns.push(Column::new(label.clone(), ColumnKind::Dimension(d)));
        if id_dimensions.contains(&d) {
            columns.push(Column::new(
                format!("{}{}", label, ID_COLUMN_SUFFIX),
                ColumnKind::DimensionId(d),
            ));
        }
    }
    let value_categories: Vec<Option<usize>> = match promoted {
        None => {
            columns.push(Column::new(VALUE_COLUMN, ColumnKind::Value { category: None }));
            vec![None]
        }
        Some(p) => {
            let labels: Vec<(&str, &str)> = dimensions[p]
                .categories
                .iter()
                .map(|c| (c.label.as_str(), c.code.as_str()))
                .collect();
            let taken: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
            let names = unique_names(&taken, &labels);
            for (c, name) in names.into_iter().enumerate() {
                columns.push(Column::new(name, ColumnKind::Value { category: Some(c) }));
            }
            (0..labels.len()).map(Some).collect()
        }
    };

    let time_cells: Option<(usize, Vec<CellValue>)> = match cube.roles().time {
        Some(t) if options.convert_dates && promoted != Some(t) => {
            let dim = &dimensions[t];
            let cells = dim
                .categories
                .iter()
                .map(|c| time_cell(&dim.label, &c.label))
                .collect();
            Some((t, cells))
        }
        _ => None,
    };

    // Rows
    let strides = cube.radix().strides();
    let row_sizes: Vec<usize> = row_dimensions.iter().map(|&d| dimensions[d].len()).collect();
    let row_radix = RadixIndex::new(&row_sizes)
        .ok_or_else(|| PivotError::IncompleteTable("row dimensions overflow".to_string()))?;
    let values = cube.values();

    let mut rows = Vec::with_capacity(row_radix.len());
    for positions in row_radix.tuples() {
        let mut cells = Vec::with_capacity(columns.len());
        let mut base = 0;
        for (&d, &pos) in row_dimensions.iter().zip(&positions) {
            let category = &dimensions[d].categories[pos];
            match &time_cells {
                Some((t, typed)) if *t == d => cells.push(typed[pos].clone()),
                _ => cells.push(CellValue::text(category.label.clone())),
            }
            if id_dimensions.contains(&d) {
                cells.push(CellValue::text(category.code.clone()));
            }
            base += pos * strides[d];
        }
        for &category in &value_categories {
            let offset = match (promoted, category) {
                (Some(p), Some(c)) => base + c * strides[p],
                _ => base,
            };
            cells.push(CellValue::from(values[offset]));
        }
        rows.push(Row {
            key: RowKey::from_vec(positions),
            cells,
        });
    }

    log_debug!(
        "PIVOT",
        "pivoted format={} rows={} columns={}",
        options.format,
        rows.len(),
        columns.len()
    );

    Ok(Table {
        format: options.format,
        dimensions: dimensions.to_vec(),
        roles: *cube.roles(),
        row_dimensions,
        promoted,
        columns,
        rows,
        metadata: cube.metadata().clone(),
    })
}

/// A time label as a period, or as text when it has no calendar reading.
fn time_cell(dimension_label: &str, label: &str) -> CellValue {
    Period::parse_time_label(dimension_label, label)
        .map(CellValue::Period)
        .unwrap_or_else(|| CellValue::text(label))
}

/// Cube indices of the dimensions that get an ID column.
fn resolve_id_columns(cube: &Cube, ids: &IdColumns) -> Result<FxHashSet<usize>> {
    let dimensions = cube.dimensions();
    match ids {
        IdColumns::None => Ok(FxHashSet::default()),
        IdColumns::All => Ok((0..dimensions.len()).collect()),
        IdColumns::SpatialOnly => Ok(cube.roles().geographic.into_iter().collect()),
        IdColumns::Only(names) => {
            let mut selected = FxHashSet::default();
            let mut unknown = Vec::new();
            for name in names {
                match dimensions
                    .iter()
                    .position(|d| d.label == *name || d.code == *name)
                {
                    Some(d) => {
                        selected.insert(d);
                    }
                    None => unknown.push(name.clone()),
                }
            }
            if !unknown.is_empty() {
                return Err(PivotError::UnknownIdColumn {
                    requested: unknown,
                    valid: dimensions.iter().map(|d| d.label.clone()).collect(),
                });
            }
            Ok(selected)
        }
    }
}

/// Column names for promoted categories: the label, or "label (code)" when
/// that name is already taken by an earlier column. A numeric suffix is
/// appended until the name is unique.
fn unique_names(existing: &[&str], categories: &[(&str, &str)]) -> Vec<String> {
    let mut taken: FxHashSet<String> = existing.iter().map(|s| s.to_string()).collect();
    categories
        .iter()
        .map(|&(label, code)| {
            let mut name = label.to_string();
            if taken.contains(&name) {
                name = format!("{} ({})", label, code);
            }
            let base = name.clone();
            let mut n = 2;
            while taken.contains(&name) {
                name = format!("{} {}", base, n);
                n += 1;
            }
            taken.insert(name.clone());
            name
        })
        .collect()
}

// ============================================================================
// RECONSTRUCTION
// ============================================================================

/// Rebuilds the flat value array of the source cube from a table.
///
/// Works for every format: each value cell is addressed by its row key plus,
/// for wide/tidy, the promoted category of its column. Fails if a cell is
/// addressed twice or any cell of the cube is never addressed.
pub fn reconstruct_values(table: &Table) -> Result<Vec<Observation>> {
    let sizes: Vec<usize> = table.dimensions.iter().map(|d| d.len()).collect();
    let radix = RadixIndex::new(&sizes)
        .ok_or_else(|| PivotError::IncompleteTable("dimension sizes overflow".to_string()))?;

    let value_columns: Vec<(usize, Option<usize>)> = table
        .columns
        .iter()
        .enumerate()
        .filter_map(|(i, c)| match c.kind {
            ColumnKind::Value { category } => Some((i, category)),
            _ => None,
        })
        .collect();
    if value_columns.is_empty() && !radix.is_empty() {
        return Err(PivotError::IncompleteTable("table has no value column".to_string()));
    }

    let mut slots: Vec<Option<Observation>> = vec![None; radix.len()];
    let mut tuple = vec![0; sizes.len()];
    for (r, row) in table.rows.iter().enumerate() {
        if row.key.len() != table.row_dimensions.len() {
            return Err(PivotError::IncompleteTable(format!(
                "row {} has a key of length {}, expected {}",
                r,
                row.key.len(),
                table.row_dimensions.len()
            )));
        }
        for (&d, &pos) in table.row_dimensions.iter().zip(&row.key) {
            tuple[d] = pos;
        }
        for &(col, category) in &value_columns {
            if let (Some(p), Some(c)) = (table.promoted, category) {
                tuple[p] = c;
            }
            let offset = radix.encode(&tuple).ok_or_else(|| {
                PivotError::IncompleteTable(format!("row {} addresses a cell outside the cube", r))
            })?;
            let observation = match row.cells.get(col) {
                Some(CellValue::Number(n)) => Some(*n),
                Some(CellValue::Empty) => None,
                _ => {
                    return Err(PivotError::IncompleteTable(format!(
                        "row {} has no numeric cell in column {}",
                        r, col
                    )))
                }
            };
            if slots[offset].replace(observation).is_some() {
                return Err(PivotError::IncompleteTable(format!(
                    "cell {} is addressed more than once",
                    offset
                )));
            }
        }
    }

    let missing = slots.iter().filter(|s| s.is_none()).count();
    if missing > 0 {
        return Err(PivotError::IncompleteTable(format!(
            "{} of {} cells are not covered by any row",
            missing,
            slots.len()
        )));
    }
    Ok(slots.into_iter().flatten().collect())
}

/// Rebuilds the source cube from a table.
pub fn reconstruct_cube(table: &Table) -> Result<Cube> {
    let values = reconstruct_values(table)?;
    Ok(Cube::new(
        table.dimensions.clone(),
        values,
        table.roles,
        table.metadata.clone(),
    )?)
}

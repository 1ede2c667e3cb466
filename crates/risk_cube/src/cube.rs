//! The result cube container.
//!
//! A [`ResultCube`] is a schema-typed, append-only table of
//! `(metadata tuple, value)` rows. The schema is fixed at construction
//! and every appended row is validated against it before it is stored.

use std::cmp::Ordering;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::CubeError;
use crate::schema::{CubeValue, Schema};

/// One row of a cube: metadata aligned to the schema plus a numeric value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Row {
    pub(crate) metadata: Vec<CubeValue>,
    pub(crate) value: f64,
}

impl Row {
    /// Metadata values in schema order.
    #[inline]
    pub fn metadata(&self) -> &[CubeValue] {
        &self.metadata
    }

    /// Numeric value of the row.
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Schema-typed, append-only table of risk results.
///
/// # Examples
///
/// ```
/// use risk_cube::{CubeValue, ResultCube, Schema};
///
/// let schema = Schema::builder().string("TradeId").string("Metric").build().unwrap();
/// let mut cube = ResultCube::new(schema);
///
/// cube.add_row(vec!["T1".into(), "Delta".into()], 1_000.0).unwrap();
/// cube.add_row(vec!["T2".into(), "Delta".into()], -250.0).unwrap();
///
/// assert_eq!(cube.len(), 2);
/// assert_eq!(cube.sum_of_all_rows(), 750.0);
///
/// // Wrong arity is rejected before anything is appended
/// assert!(cube.add_row(vec!["T3".into()], 1.0).is_err());
/// assert_eq!(cube.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResultCube {
    schema: Arc<Schema>,
    rows: Vec<Row>,
}

impl ResultCube {
    /// Creates an empty cube with the given schema.
    pub fn new(schema: Schema) -> Self {
        Self::with_shared_schema(Arc::new(schema))
    }

    /// Creates an empty cube sharing an existing schema.
    pub fn with_shared_schema(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Creates an empty cube without columns.
    pub fn empty() -> Self {
        Self::new(Schema::empty())
    }

    /// The cube schema.
    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Shared handle to the schema.
    #[inline]
    pub fn shared_schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    /// Rows in insertion (or last sort) order.
    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the cube has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends one row after validating it against the schema.
    ///
    /// Repeated identical metadata produces repeated rows.
    pub fn add_row(&mut self, metadata: Vec<CubeValue>, value: f64) -> Result<(), CubeError> {
        self.schema.validate(&metadata)?;
        self.rows.push(Row { metadata, value });
        Ok(())
    }

    /// Appends every row of a cube with an identical schema.
    pub fn extend_from(&mut self, other: &ResultCube) -> Result<(), CubeError> {
        self.ensure_same_schema(other)?;
        self.rows.extend(other.rows.iter().cloned());
        Ok(())
    }

    /// Position of a named column.
    pub fn column_index(&self, name: &str) -> Result<usize, CubeError> {
        self.schema
            .index_of(name)
            .ok_or_else(|| CubeError::ColumnNotFound(name.to_string()))
    }

    /// Metadata value of a row in a named column.
    pub fn value_at(&self, row: usize, column: &str) -> Result<Option<&CubeValue>, CubeError> {
        let idx = self.column_index(column)?;
        Ok(self.rows.get(row).map(|r| &r.metadata[idx]))
    }

    /// Returns a new cube with rows matching all predicates
    /// (or, when `exclude` is set, rows that do not match).
    ///
    /// # Examples
    ///
    /// ```
    /// use risk_cube::{ResultCube, Schema};
    ///
    /// let schema = Schema::builder().string("Metric").build().unwrap();
    /// let mut cube = ResultCube::new(schema);
    /// cube.add_row(vec!["Delta".into()], 1.0).unwrap();
    /// cube.add_row(vec!["Gamma".into()], 2.0).unwrap();
    ///
    /// let deltas = cube.filter(&[("Metric", "Delta".into())], false).unwrap();
    /// assert_eq!(deltas.len(), 1);
    ///
    /// let others = cube.filter(&[("Metric", "Delta".into())], true).unwrap();
    /// assert_eq!(others.rows()[0].value(), 2.0);
    /// ```
    pub fn filter(
        &self,
        predicates: &[(&str, CubeValue)],
        exclude: bool,
    ) -> Result<ResultCube, CubeError> {
        let resolved = predicates
            .iter()
            .map(|(name, value)| Ok((self.column_index(name)?, value)))
            .collect::<Result<Vec<_>, CubeError>>()?;

        let rows = self
            .rows
            .iter()
            .filter(|row| {
                let matched = resolved
                    .iter()
                    .all(|(idx, value)| &row.metadata[*idx] == *value);
                matched != exclude
            })
            .cloned()
            .collect();

        Ok(ResultCube {
            schema: Arc::clone(&self.schema),
            rows,
        })
    }

    /// Stable sort by the given columns, in priority order.
    pub fn sort_by_columns(&mut self, columns: &[&str]) -> Result<(), CubeError> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>, CubeError>>()?;

        self.rows.sort_by(|a, b| {
            indices
                .iter()
                .map(|&i| a.metadata[i].cmp(&b.metadata[i]))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        Ok(())
    }

    /// Drops every row whose value is exactly zero.
    pub fn retain_non_zero(&mut self) {
        self.rows.retain(|r| r.value != 0.0);
    }

    /// Returns a cube with every value transformed.
    pub fn map_values<F>(&self, f: F) -> ResultCube
    where
        F: Fn(f64) -> f64,
    {
        ResultCube {
            schema: Arc::clone(&self.schema),
            rows: self
                .rows
                .iter()
                .map(|r| Row {
                    metadata: r.metadata.clone(),
                    value: f(r.value),
                })
                .collect(),
        }
    }

    /// Sum of all row values.
    pub fn sum_of_all_rows(&self) -> f64 {
        self.rows.iter().map(|r| r.value).sum()
    }

    pub(crate) fn ensure_same_schema(&self, other: &ResultCube) -> Result<(), CubeError> {
        if Arc::ptr_eq(&self.schema, &other.schema) || self.schema == other.schema {
            Ok(())
        } else {
            Err(CubeError::SchemaMismatch(format!(
                "{} columns vs {} columns",
                self.schema.len(),
                other.schema.len()
            )))
        }
    }

    pub(crate) fn from_parts(schema: Arc<Schema>, rows: Vec<Row>) -> Self {
        Self { schema, rows }
    }
}

//! Cube schema and typed metadata values.
//!
//! This module provides:
//! - [`ColumnType`]: Semantic type of a metadata column
//! - [`CubeValue`]: A typed metadata value
//! - [`Column`]: Named, typed column
//! - [`Schema`]: Ordered set of columns with unique names

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::CubeError;

/// Semantic type of a metadata column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColumnType {
    /// Free-form text (identifiers, labels, tags).
    String,
    /// Floating-point number.
    Number,
    /// Calendar date.
    Date,
}

impl ColumnType {
    /// Value used to pad rows that lack this column after a merge.
    ///
    /// # Examples
    ///
    /// ```
    /// use risk_cube::{ColumnType, CubeValue};
    ///
    /// assert_eq!(ColumnType::String.default_value(), CubeValue::from(""));
    /// assert_eq!(ColumnType::Number.default_value(), CubeValue::Number(0.0));
    /// ```
    pub fn default_value(&self) -> CubeValue {
        match self {
            ColumnType::String => CubeValue::String(String::new()),
            ColumnType::Number => CubeValue::Number(0.0),
            ColumnType::Date => CubeValue::Date(NaiveDate::default()),
        }
    }

    /// Lower-case type name.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed metadata value stored in a cube row.
///
/// Values are totally ordered: within a type strings compare
/// lexicographically, numbers by [`f64::total_cmp`] and dates
/// chronologically; across types the order is string < number < date.
/// Equality and hashing agree with that ordering, so `-0.0` and `0.0`
/// are distinct keys.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CubeValue {
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Date value.
    Date(NaiveDate),
}

impl CubeValue {
    /// Returns the column type this value belongs to.
    #[inline]
    pub fn column_type(&self) -> ColumnType {
        match self {
            CubeValue::String(_) => ColumnType::String,
            CubeValue::Number(_) => ColumnType::Number,
            CubeValue::Date(_) => ColumnType::Date,
        }
    }

    /// Returns the text if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CubeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number if this is a numeric value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CubeValue::Number(x) => Some(*x),
            _ => None,
        }
    }

    /// Returns the date if this is a date value.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CubeValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl PartialEq for CubeValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CubeValue {}

impl PartialOrd for CubeValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CubeValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CubeValue::String(a), CubeValue::String(b)) => a.cmp(b),
            (CubeValue::Number(a), CubeValue::Number(b)) => a.total_cmp(b),
            (CubeValue::Date(a), CubeValue::Date(b)) => a.cmp(b),
            _ => self.column_type().cmp(&other.column_type()),
        }
    }
}

impl Hash for CubeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.column_type().hash(state);
        match self {
            CubeValue::String(s) => s.hash(state),
            CubeValue::Number(x) => x.to_bits().hash(state),
            CubeValue::Date(d) => d.hash(state),
        }
    }
}

impl fmt::Display for CubeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CubeValue::String(s) => f.write_str(s),
            CubeValue::Number(x) => write!(f, "{}", x),
            CubeValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for CubeValue {
    fn from(s: &str) -> Self {
        CubeValue::String(s.to_string())
    }
}

impl From<String> for CubeValue {
    fn from(s: String) -> Self {
        CubeValue::String(s)
    }
}

impl From<f64> for CubeValue {
    fn from(x: f64) -> Self {
        CubeValue::Number(x)
    }
}

impl From<NaiveDate> for CubeValue {
    fn from(d: NaiveDate) -> Self {
        CubeValue::Date(d)
    }
}

/// A named, typed metadata column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Column {
    name: String,
    column_type: ColumnType,
}

impl Column {
    /// Creates a new column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    /// Column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column type.
    #[inline]
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }
}

/// Ordered list of uniquely named columns.
///
/// # Examples
///
/// ```
/// use risk_cube::{ColumnType, Schema};
///
/// let schema = Schema::builder()
///     .string("TradeId")
///     .string("Metric")
///     .date("PillarDate")
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.len(), 3);
/// assert_eq!(schema.index_of("Metric"), Some(1));
/// assert_eq!(schema.columns()[2].column_type(), ColumnType::Date);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Creates a schema, rejecting duplicate column names.
    pub fn new(columns: Vec<Column>) -> Result<Self, CubeError> {
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(CubeError::DuplicateColumn(col.name.clone()));
            }
        }
        Ok(Self { columns })
    }

    /// Creates a schema without columns.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Starts a schema builder.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Columns in order.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns a copy of this schema with one more column appended.
    pub fn with_column(&self, column: Column) -> Result<Self, CubeError> {
        if self.index_of(column.name()).is_some() {
            return Err(CubeError::DuplicateColumn(column.name));
        }
        let mut columns = self.columns.clone();
        columns.push(column);
        Ok(Self { columns })
    }

    /// Checks a metadata tuple against the schema.
    pub fn validate(&self, metadata: &[CubeValue]) -> Result<(), CubeError> {
        if metadata.len() != self.columns.len() {
            return Err(CubeError::ArityMismatch {
                expected: self.columns.len(),
                actual: metadata.len(),
            });
        }
        for (col, value) in self.columns.iter().zip(metadata) {
            if value.column_type() != col.column_type {
                return Err(CubeError::TypeMismatch {
                    column: col.name.clone(),
                    expected: col.column_type,
                    actual: value.column_type(),
                });
            }
        }
        Ok(())
    }
}

/// Fluent builder for [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    columns: Vec<Column>,
}

impl SchemaBuilder {
    /// Appends a string column.
    pub fn string(self, name: impl Into<String>) -> Self {
        self.column(name, ColumnType::String)
    }

    /// Appends a number column.
    pub fn number(self, name: impl Into<String>) -> Self {
        self.column(name, ColumnType::Number)
    }

    /// Appends a date column.
    pub fn date(self, name: impl Into<String>) -> Self {
        self.column(name, ColumnType::Date)
    }

    /// Appends a column of the given type.
    pub fn column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push(Column::new(name, column_type));
        self
    }

    /// Builds the schema.
    pub fn build(self) -> Result<Schema, CubeError> {
        Schema::new(self.columns)
    }
}

//! Cube algebra: difference, merge, and pivot.
//!
//! These operations never mutate their inputs; each returns a new cube.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cube::{ResultCube, Row};
use crate::error::CubeError;
use crate::schema::{Column, CubeValue, Schema};

/// Aggregation applied by [`ResultCube::pivot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Aggregation {
    /// Sum of values.
    Sum,
    /// Number of rows.
    Count,
    /// Smallest value.
    Min,
    /// Largest value.
    Max,
    /// Arithmetic mean of values.
    Mean,
}

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: usize,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            sum: 0.0,
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn finish(&self, aggregation: Aggregation) -> f64 {
        match aggregation {
            Aggregation::Sum => self.sum,
            Aggregation::Count => self.count as f64,
            Aggregation::Min => self.min,
            Aggregation::Max => self.max,
            Aggregation::Mean => self.sum / self.count as f64,
        }
    }
}

impl ResultCube {
    /// Keyed difference `self − other`.
    ///
    /// Each row of `self` is matched with a row of `other` carrying identical
    /// metadata (duplicates are matched in occurrence order). Unmatched rows
    /// on either side are differenced against an implicit zero; leftover rows
    /// of `other` are appended after the rows of `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use risk_cube::{ResultCube, Schema};
    ///
    /// let schema = Schema::builder().string("TradeId").build().unwrap();
    /// let mut today = ResultCube::new(schema.clone());
    /// today.add_row(vec!["T1".into()], 10.0).unwrap();
    /// today.add_row(vec!["T2".into()], 5.0).unwrap();
    ///
    /// let mut yesterday = ResultCube::new(schema);
    /// yesterday.add_row(vec!["T2".into()], 4.0).unwrap();
    /// yesterday.add_row(vec!["T3".into()], 1.0).unwrap();
    ///
    /// let diff = today.difference(&yesterday).unwrap();
    /// let values: Vec<f64> = diff.rows().iter().map(|r| r.value()).collect();
    /// assert_eq!(values, vec![10.0, 1.0, -1.0]);
    /// ```
    pub fn difference(&self, other: &ResultCube) -> Result<ResultCube, CubeError> {
        self.ensure_same_schema(other)?;

        let mut index: HashMap<&[CubeValue], VecDeque<usize>> = HashMap::new();
        for (i, row) in other.rows().iter().enumerate() {
            index.entry(row.metadata()).or_default().push_back(i);
        }

        let mut used = vec![false; other.len()];
        let mut rows = Vec::with_capacity(self.len().max(other.len()));
        for row in self.rows() {
            let matched = index
                .get_mut(row.metadata())
                .and_then(|queue| queue.pop_front());
            let other_value = match matched {
                Some(j) => {
                    used[j] = true;
                    other.rows()[j].value()
                }
                None => 0.0,
            };
            rows.push(Row {
                metadata: row.metadata.clone(),
                value: row.value() - other_value,
            });
        }

        for (j, row) in other.rows().iter().enumerate() {
            if !used[j] {
                rows.push(Row {
                    metadata: row.metadata.clone(),
                    value: -row.value(),
                });
            }
        }

        Ok(ResultCube::from_parts(self.shared_schema(), rows))
    }

    /// Positional difference `self − other`.
    ///
    /// Both cubes must have the same schema, the same number of rows and the
    /// same metadata in the same order. Any violation fails loudly rather
    /// than producing misaligned differences.
    pub fn quick_difference(&self, other: &ResultCube) -> Result<ResultCube, CubeError> {
        self.ensure_same_schema(other)?;
        if self.len() != other.len() {
            return Err(CubeError::DimensionMismatch {
                left: self.len(),
                right: other.len(),
            });
        }

        let rows = self
            .rows()
            .iter()
            .zip(other.rows())
            .enumerate()
            .map(|(i, (a, b))| {
                if a.metadata() != b.metadata() {
                    return Err(CubeError::RowOrderMismatch { row: i });
                }
                Ok(Row {
                    metadata: a.metadata.clone(),
                    value: a.value() - b.value(),
                })
            })
            .collect::<Result<Vec<_>, CubeError>>()?;

        Ok(ResultCube::from_parts(self.shared_schema(), rows))
    }

    /// Returns a copy of this cube with constant columns set on every row.
    ///
    /// A tag naming a new column appends that column. A tag naming an
    /// existing column overwrites it only when `override_existing` is set;
    /// otherwise the call fails with [`CubeError::DuplicateColumn`].
    pub fn with_constant_columns(
        &self,
        constants: &[(&str, CubeValue)],
        override_existing: bool,
    ) -> Result<ResultCube, CubeError> {
        let mut schema = self.schema().clone();
        let mut assignments: Vec<(usize, &CubeValue)> = Vec::with_capacity(constants.len());

        for (name, value) in constants {
            match schema.index_of(name) {
                Some(idx) => {
                    if !override_existing {
                        return Err(CubeError::DuplicateColumn(name.to_string()));
                    }
                    let column = &schema.columns()[idx];
                    if column.column_type() != value.column_type() {
                        return Err(CubeError::TypeMismatch {
                            column: name.to_string(),
                            expected: column.column_type(),
                            actual: value.column_type(),
                        });
                    }
                    assignments.push((idx, value));
                }
                None => {
                    schema = schema.with_column(Column::new(*name, value.column_type()))?;
                    assignments.push((schema.len() - 1, value));
                }
            }
        }

        let width = schema.len();
        let rows = self
            .rows()
            .iter()
            .map(|row| {
                let mut metadata = row.metadata.clone();
                metadata.resize(width, CubeValue::Number(0.0));
                for (idx, value) in &assignments {
                    metadata[*idx] = (*value).clone();
                }
                Row {
                    metadata,
                    value: row.value(),
                }
            })
            .collect();

        Ok(ResultCube::from_parts(Arc::new(schema), rows))
    }

    /// Unions the rows of `other`, tagged with constant columns, into a new
    /// cube.
    ///
    /// The result schema is the columns of `self` followed by any columns of
    /// the tagged `other` that `self` lacks. Rows missing a column are padded
    /// with [`ColumnType::default_value`](crate::ColumnType::default_value).
    /// A column present on both sides must have the same type.
    ///
    /// # Examples
    ///
    /// ```
    /// use risk_cube::{ResultCube, Schema};
    ///
    /// let schema = Schema::builder().string("TradeId").build().unwrap();
    /// let mut vega = ResultCube::new(schema);
    /// vega.add_row(vec!["T1".into()], 42.0).unwrap();
    ///
    /// let report = ResultCube::empty()
    ///     .merge(&vega, &[("MetricGroup", "Vega".into())], false)
    ///     .unwrap();
    ///
    /// assert_eq!(report.schema().len(), 2);
    /// assert_eq!(report.value_at(0, "MetricGroup").unwrap().unwrap().as_str(), Some("Vega"));
    /// ```
    pub fn merge(
        &self,
        other: &ResultCube,
        constants: &[(&str, CubeValue)],
        override_existing: bool,
    ) -> Result<ResultCube, CubeError> {
        let tagged = other.with_constant_columns(constants, override_existing)?;

        let mut columns: Vec<Column> = self.schema().columns().to_vec();
        for col in tagged.schema().columns() {
            match self.schema().index_of(col.name()) {
                Some(idx) => {
                    let existing = &self.schema().columns()[idx];
                    if existing.column_type() != col.column_type() {
                        return Err(CubeError::SchemaMismatch(format!(
                            "column '{}' is {} on one side and {} on the other",
                            col.name(),
                            existing.column_type(),
                            col.column_type()
                        )));
                    }
                }
                None => columns.push(col.clone()),
            }
        }
        let schema = Schema::new(columns)?;

        let rows_self = realign(self, &schema);
        let rows_other = realign(&tagged, &schema);
        let rows = rows_self.chain(rows_other).collect();

        Ok(ResultCube::from_parts(Arc::new(schema), rows))
    }

    /// Collapses rows by the given group-by columns.
    ///
    /// The result has one row per distinct key, ordered by key, with the
    /// group-by columns as its schema.
    ///
    /// # Examples
    ///
    /// ```
    /// use risk_cube::{Aggregation, ResultCube, Schema};
    ///
    /// let schema = Schema::builder().string("TradeId").string("Pillar").build().unwrap();
    /// let mut cube = ResultCube::new(schema);
    /// cube.add_row(vec!["T1".into(), "1Y".into()], 1.0).unwrap();
    /// cube.add_row(vec!["T1".into(), "2Y".into()], 2.0).unwrap();
    /// cube.add_row(vec!["T2".into(), "1Y".into()], 5.0).unwrap();
    ///
    /// let by_trade = cube.pivot(&["TradeId"], Aggregation::Sum).unwrap();
    /// assert_eq!(by_trade.len(), 2);
    /// assert_eq!(by_trade.rows()[0].value(), 3.0);
    /// ```
    pub fn pivot(
        &self,
        group_by: &[&str],
        aggregation: Aggregation,
    ) -> Result<ResultCube, CubeError> {
        let indices = group_by
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>, CubeError>>()?;

        let mut groups: BTreeMap<Vec<CubeValue>, Accumulator> = BTreeMap::new();
        for row in self.rows() {
            let key: Vec<CubeValue> = indices.iter().map(|&i| row.metadata[i].clone()).collect();
            groups
                .entry(key)
                .or_insert_with(Accumulator::new)
                .push(row.value());
        }

        let schema = Schema::new(
            indices
                .iter()
                .map(|&i| self.schema().columns()[i].clone())
                .collect(),
        )?;
        let rows = groups
            .into_iter()
            .map(|(metadata, acc)| Row {
                metadata,
                value: acc.finish(aggregation),
            })
            .collect();

        Ok(ResultCube::from_parts(Arc::new(schema), rows))
    }
}

/// Re-maps the rows of `cube` onto `target`, padding absent columns.
fn realign<'a>(cube: &'a ResultCube, target: &'a Schema) -> impl Iterator<Item = Row> + 'a {
    let mapping: Vec<Option<usize>> = target
        .columns()
        .iter()
        .map(|c| cube.schema().index_of(c.name()))
        .collect();

    cube.rows().iter().map(move |row| Row {
        metadata: mapping
            .iter()
            .zip(target.columns())
            .map(|(src, col)| match src {
                Some(i) => row.metadata[*i].clone(),
                None => col.column_type().default_value(),
            })
            .collect(),
        value: row.value(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn trade_cube(rows: &[(&str, &str, f64)]) -> ResultCube {
        let schema = Schema::builder()
            .string("TradeId")
            .string("PillarLabel")
            .build()
            .unwrap();
        let mut cube = ResultCube::new(schema);
        for (t, p, v) in rows {
            cube.add_row(vec![(*t).into(), (*p).into()], *v).unwrap();
        }
        cube
    }

    #[test]
    fn test_quick_difference_of_self_is_zero() {
        let cube = trade_cube(&[("T1", "1Y", 3.5), ("T2", "2Y", -1.25)]);
        let diff = cube.quick_difference(&cube).unwrap();
        assert_eq!(diff.len(), 2);
        assert!(diff.rows().iter().all(|r| r.value() == 0.0));
    }

    #[test]
    fn test_quick_difference_dimension_mismatch() {
        let a = trade_cube(&[("T1", "1Y", 1.0), ("T2", "1Y", 1.0)]);
        let b = trade_cube(&[("T1", "1Y", 1.0)]);
        let err = a.quick_difference(&b).unwrap_err();
        assert_eq!(err, CubeError::DimensionMismatch { left: 2, right: 1 });
        assert!(err.to_string().contains("Dimensions do not match"));
    }

    #[test]
    fn test_quick_difference_row_order_mismatch() {
        let a = trade_cube(&[("T1", "1Y", 1.0), ("T2", "1Y", 1.0)]);
        let b = trade_cube(&[("T2", "1Y", 1.0), ("T1", "1Y", 1.0)]);
        assert_eq!(
            a.quick_difference(&b).unwrap_err(),
            CubeError::RowOrderMismatch { row: 0 }
        );
    }

    #[test]
    fn test_quick_difference_values() {
        let bumped = trade_cube(&[("T1", "1Y", 101.0), ("T2", "1Y", 50.0)]);
        let base = trade_cube(&[("T1", "1Y", 100.0), ("T2", "1Y", 52.0)]);
        let diff = bumped.quick_difference(&base).unwrap();
        assert_relative_eq!(diff.rows()[0].value(), 1.0);
        assert_relative_eq!(diff.rows()[1].value(), -2.0);
    }

    #[test]
    fn test_difference_with_duplicates_in_order() {
        let a = trade_cube(&[("T1", "1Y", 5.0), ("T1", "1Y", 7.0)]);
        let b = trade_cube(&[("T1", "1Y", 1.0)]);
        let diff = a.difference(&b).unwrap();
        let values: Vec<f64> = diff.rows().iter().map(|r| r.value()).collect();
        assert_eq!(values, vec![4.0, 7.0]);
    }

    #[test]
    fn test_difference_requires_same_schema() {
        let a = trade_cube(&[("T1", "1Y", 5.0)]);
        let b = ResultCube::new(Schema::builder().string("TradeId").build().unwrap());
        assert!(matches!(a.difference(&b), Err(CubeError::SchemaMismatch(_))));
    }

    #[test]
    fn test_with_constant_columns_override() {
        let cube = trade_cube(&[("T1", "1Y", 5.0)]);
        let tagged = cube
            .with_constant_columns(&[("Metric", "Delta".into())], false)
            .unwrap();
        assert_eq!(tagged.schema().len(), 3);

        let dup = tagged.with_constant_columns(&[("Metric", "Charm".into())], false);
        assert_eq!(
            dup.unwrap_err(),
            CubeError::DuplicateColumn("Metric".to_string())
        );

        let renamed = tagged
            .with_constant_columns(&[("Metric", "Charm".into())], true)
            .unwrap();
        assert_eq!(
            renamed.value_at(0, "Metric").unwrap(),
            Some(&CubeValue::from("Charm"))
        );

        let wrong_type = tagged.with_constant_columns(&[("Metric", 1.0.into())], true);
        assert!(matches!(wrong_type, Err(CubeError::TypeMismatch { .. })));
    }

    #[test]
    fn test_merge_pads_missing_columns() {
        let deltas = trade_cube(&[("T1", "1Y", 5.0)]);
        let report = ResultCube::empty()
            .merge(&deltas, &[("MetricGroup", "Delta".into())], false)
            .unwrap();

        let schema = Schema::builder().string("TradeId").number("Notional").build().unwrap();
        let mut other = ResultCube::new(schema);
        other.add_row(vec!["T2".into(), 1e6.into()], 9.0).unwrap();

        let merged = report
            .merge(&other, &[("MetricGroup", "Notional".into())], false)
            .unwrap();
        let names: Vec<&str> = merged.schema().columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["TradeId", "PillarLabel", "MetricGroup", "Notional"]);
        assert_eq!(merged.len(), 2);
        assert_eq!(
            merged.value_at(0, "Notional").unwrap(),
            Some(&CubeValue::Number(0.0))
        );
        assert_eq!(
            merged.value_at(1, "PillarLabel").unwrap(),
            Some(&CubeValue::from(""))
        );
    }

    #[test]
    fn test_merge_rejects_conflicting_types() {
        let a = trade_cube(&[("T1", "1Y", 5.0)]);
        let schema = Schema::builder().number("TradeId").build().unwrap();
        let b = ResultCube::new(schema);
        assert!(matches!(a.merge(&b, &[], false), Err(CubeError::SchemaMismatch(_))));
    }

    #[test]
    fn test_pivot_aggregations() {
        let cube = trade_cube(&[
            ("T1", "1Y", 1.0),
            ("T1", "2Y", 3.0),
            ("T2", "1Y", -2.0),
        ]);
        let sum = cube.pivot(&["TradeId"], Aggregation::Sum).unwrap();
        assert_eq!(sum.rows()[0].value(), 4.0);
        assert_eq!(sum.rows()[1].value(), -2.0);

        let count = cube.pivot(&["PillarLabel"], Aggregation::Count).unwrap();
        assert_eq!(count.rows()[0].value(), 2.0);

        let min = cube.pivot(&["TradeId"], Aggregation::Min).unwrap();
        assert_eq!(min.rows()[0].value(), 1.0);

        let max = cube.pivot(&["TradeId"], Aggregation::Max).unwrap();
        assert_eq!(max.rows()[0].value(), 3.0);

        let mean = cube.pivot(&["TradeId"], Aggregation::Mean).unwrap();
        assert_relative_eq!(mean.rows()[0].value(), 2.0);

        let total = cube.pivot(&[], Aggregation::Sum).unwrap();
        assert_eq!(total.len(), 1);
        assert_eq!(total.rows()[0].value(), cube.sum_of_all_rows());
    }
}

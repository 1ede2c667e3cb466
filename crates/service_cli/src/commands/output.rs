//! Cube rendering: aligned text table or CSV.

use std::io::Write;

use clap::ValueEnum;
use risk_cube::{CubeValue, ResultCube};
use serde_json::{Map, Value};

use crate::Result;

/// Header of the value column.
const VALUE_HEADER: &str = "Value";

/// How a cube is written out.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Column-aligned text
    Table,
    /// Comma-separated values with a header row
    Csv,
    /// Array of row objects keyed by column name
    Json,
}

fn header(cube: &ResultCube) -> Vec<String> {
    cube.schema()
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .chain(std::iter::once(VALUE_HEADER.to_string()))
        .collect()
}

fn records(cube: &ResultCube) -> Vec<Vec<String>> {
    cube.rows()
        .iter()
        .map(|row| {
            row.metadata()
                .iter()
                .map(|v| v.to_string())
                .chain(std::iter::once(format!("{:.6}", row.value())))
                .collect()
        })
        .collect()
}

/// Writes `cube` to `out` in the given format.
pub fn write_cube<W: Write>(cube: &ResultCube, format: OutputFormat, out: W) -> Result<()> {
    match format {
        OutputFormat::Table => write_table(cube, out),
        OutputFormat::Csv => write_csv(cube, out),
        OutputFormat::Json => write_json(cube, out),
    }
}

fn json_value(value: &CubeValue) -> Value {
    match value {
        CubeValue::Number(x) => Value::from(*x),
        other => Value::from(other.to_string()),
    }
}

fn write_json<W: Write>(cube: &ResultCube, mut out: W) -> Result<()> {
    let columns = cube.schema().columns();
    let rows: Vec<Value> = cube
        .rows()
        .iter()
        .map(|row| {
            let mut object: Map<String, Value> = columns
                .iter()
                .zip(row.metadata())
                .map(|(c, v)| (c.name().to_string(), json_value(v)))
                .collect();
            object.insert(VALUE_HEADER.to_string(), Value::from(row.value()));
            Value::Object(object)
        })
        .collect();
    serde_json::to_writer_pretty(&mut out, &rows)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn write_csv<W: Write>(cube: &ResultCube, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(header(cube))?;
    for record in records(cube) {
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_table<W: Write>(cube: &ResultCube, mut out: W) -> Result<()> {
    let header = header(cube);
    let records = records(cube);

    let mut widths: Vec<usize> = header.iter().map(String::len).collect();
    for record in &records {
        for (w, cell) in widths.iter_mut().zip(record) {
            *w = (*w).max(cell.len());
        }
    }

    // Value column is right-aligned.
    let last = widths.len() - 1;
    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                if i == last {
                    format!("{:>width$}", cell, width = *w)
                } else {
                    format!("{:<width$}", cell, width = *w)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    writeln!(out, "{}", render(&header))?;
    let rule: usize = widths.iter().sum::<usize>() + 2 * last;
    writeln!(out, "{}", "-".repeat(rule))?;
    for record in &records {
        writeln!(out, "{}", render(record))?;
    }
    writeln!(out, "({} rows)", records.len())?;
    out.flush()?;
    Ok(())
}

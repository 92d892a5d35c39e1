//! Tabular helpers over polars [`DataFrame`]s.
//!
//! Every table that flows through the pipeline holds nullable `String`
//! columns: cells stay exactly as the provider sent them until they are
//! written to a sheet, where numeric-looking text becomes a number.

use std::collections::{HashMap, HashSet};

use polars::prelude::*;
use serde_json::{Map, Value};

use crate::error::{DataError, Result};

/// Literal the upstream API uses for "no value".
pub const NONE_LITERAL: &str = "None";

/// Declarative source-to-normalized column name mapping.
///
/// Columns listed in the map are renamed; any other column passes through
/// under its source name.
#[derive(Clone, Copy, Debug)]
pub struct FieldMap {
    pairs: &'static [(&'static str, &'static str)],
}

impl FieldMap {
    /// Creates a field map from `(source, normalized)` pairs.
    #[must_use]
    pub const fn new(pairs: &'static [(&'static str, &'static str)]) -> Self {
        Self { pairs }
    }

    /// The normalized name for a known source field.
    #[must_use]
    pub fn get(&self, source: &str) -> Option<&'static str> {
        self.pairs
            .iter()
            .find(|(from, _)| *from == source)
            .map(|(_, to)| *to)
    }

    /// The normalized name, or `source` itself when the field is unknown.
    #[must_use]
    pub fn normalize<'a>(&self, source: &'a str) -> &'a str {
        self.get(source).unwrap_or(source)
    }

    /// All `(source, normalized)` pairs.
    #[must_use]
    pub const fn pairs(&self) -> &'static [(&'static str, &'static str)] {
        self.pairs
    }

    /// Number of known fields.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if the map has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

type StringColumn = (String, Vec<Option<String>>);

/// Renders a JSON value as cell text. `null` has no text.
#[must_use]
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Converts cell text into the JSON value written to a sheet.
///
/// Integers and finite decimals in canonical form become numbers; anything
/// else (dates, tickers, zero-padded codes) stays text.
#[must_use]
pub fn text_to_cell(text: &str) -> Value {
    if let Ok(i) = text.parse::<i64>() {
        if i.to_string() == text {
            return Value::from(i);
        }
        return Value::String(text.to_string());
    }

    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let zero_padded = unsigned.len() > 1
        && unsigned.starts_with('0')
        && unsigned.as_bytes()[1].is_ascii_digit();
    let plain = unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.');

    match text.parse::<f64>() {
        Ok(f) if f.is_finite() && plain && !zero_padded => serde_json::Number::from_f64(f)
            .map_or_else(|| Value::String(text.to_string()), Value::Number),
        _ => Value::String(text.to_string()),
    }
}

fn string_columns(df: &DataFrame) -> Result<Vec<StringColumn>> {
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();

    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let series = df
            .column(&name)?
            .as_materialized_series()
            .cast(&DataType::String)?;
        let values = series
            .str()?
            .into_iter()
            .map(|v| v.map(ToString::to_string))
            .collect();
        columns.push((name, values));
    }
    Ok(columns)
}

fn from_string_columns(columns: Vec<StringColumn>) -> Result<DataFrame> {
    let columns: Vec<Column> = columns
        .into_iter()
        .map(|(name, values)| Column::new(name.into(), values))
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Builds a table with one row per record.
///
/// Columns appear in first-seen key order across all records; a key absent
/// from a record yields a null cell.
pub fn records_to_dataframe(records: &[Map<String, Value>]) -> Result<DataFrame> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut columns: Vec<StringColumn> = Vec::new();

    for (row, record) in records.iter().enumerate() {
        for (key, value) in record {
            let position = *index.entry(key.as_str()).or_insert_with(|| {
                columns.push((key.clone(), vec![None; records.len()]));
                columns.len() - 1
            });
            columns[position].1[row] = value_to_text(value);
        }
    }

    from_string_columns(columns)
}

/// Renames every column known to `fields`; other columns are left as-is.
pub fn rename_columns(df: &mut DataFrame, fields: &FieldMap) -> Result<()> {
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();

    for name in names {
        if let Some(normalized) = fields.get(&name) {
            if normalized != name {
                df.rename(&name, normalized.into())?;
            }
        }
    }
    Ok(())
}

/// Replaces every null cell and every literal `"None"` with `fill`.
pub fn fill_missing(df: &DataFrame, fill: &str) -> Result<DataFrame> {
    let columns = string_columns(df)?
        .into_iter()
        .map(|(name, values)| {
            let values = values
                .into_iter()
                .map(|v| match v {
                    Some(s) if s != NONE_LITERAL => Some(s),
                    _ => Some(fill.to_string()),
                })
                .collect();
            (name, values)
        })
        .collect();
    from_string_columns(columns)
}

/// Adds (or replaces) a column holding `value` on every row.
pub fn with_constant_column(df: &DataFrame, name: &str, value: &str) -> Result<DataFrame> {
    let mut df = df.clone();
    let column = Column::new(name.into(), vec![value.to_string(); df.height()]);
    df.with_column(column)?;
    Ok(df)
}

/// Stacks `bottom` under `top`, aligning columns by name.
///
/// The result has `top`'s columns in order followed by columns only `bottom`
/// has; cells a side lacks are null.
pub fn concat_by_name(top: &DataFrame, bottom: &DataFrame) -> Result<DataFrame> {
    let top_height = top.height();
    let bottom_height = bottom.height();
    let mut top_columns = string_columns(top)?;
    let mut bottom_columns: Vec<Option<StringColumn>> =
        string_columns(bottom)?.into_iter().map(Some).collect();

    for (name, values) in &mut top_columns {
        let matching = bottom_columns
            .iter_mut()
            .find(|c| c.as_ref().is_some_and(|(n, _)| n == name))
            .and_then(Option::take);
        match matching {
            Some((_, bottom_values)) => values.extend(bottom_values),
            None => values.extend(std::iter::repeat_n(None, bottom_height)),
        }
    }

    for (name, bottom_values) in bottom_columns.into_iter().flatten() {
        let mut values = vec![None; top_height];
        values.extend(bottom_values);
        top_columns.push((name, values));
    }

    from_string_columns(top_columns)
}

/// Drops rows whose `subset` key repeats, keeping each key's last row.
///
/// Surviving rows keep their relative order.
pub fn drop_duplicates_keep_last(df: &DataFrame, subset: &[&str]) -> Result<DataFrame> {
    let columns = string_columns(df)?;
    let mut keys = Vec::with_capacity(subset.len());
    for name in subset {
        let values = columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values)
            .ok_or_else(|| DataError::Parse(format!("column not found: {name}")))?;
        keys.push(values);
    }

    let height = df.height();
    let mut seen: HashSet<Vec<Option<&str>>> = HashSet::with_capacity(height);
    let mut keep = vec![false; height];
    for row in (0..height).rev() {
        let key: Vec<Option<&str>> = keys.iter().map(|values| values[row].as_deref()).collect();
        keep[row] = seen.insert(key);
    }

    let mask = BooleanChunked::new("keep".into(), keep);
    Ok(df.filter(&mask)?)
}

/// Keeps the rows whose `column` value satisfies `predicate`.
pub fn filter_rows<F>(df: &DataFrame, column: &str, predicate: F) -> Result<DataFrame>
where
    F: Fn(Option<&str>) -> bool,
{
    let series = df
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let keep: Vec<bool> = series.str()?.into_iter().map(predicate).collect();
    let mask = BooleanChunked::new("keep".into(), keep);
    Ok(df.filter(&mask)?)
}

/// Distinct non-empty values of `column` in first-seen order.
pub fn unique_values(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let series = df
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for value in series.str()?.into_iter().flatten() {
        if seen.insert(value) {
            values.push(value.to_string());
        }
    }
    Ok(values)
}

/// Renders a table as sheet rows: the header row, then one row per record.
///
/// Null cells are written as empty strings.
pub fn dataframe_to_rows(df: &DataFrame) -> Result<Vec<Vec<Value>>> {
    let columns = string_columns(df)?;
    let mut rows = Vec::with_capacity(df.height() + 1);
    rows.push(
        columns
            .iter()
            .map(|(name, _)| Value::String(name.clone()))
            .collect(),
    );
    for row in 0..df.height() {
        rows.push(
            columns
                .iter()
                .map(|(_, values)| match &values[row] {
                    Some(text) => text_to_cell(text),
                    None => Value::String(String::new()),
                })
                .collect(),
        );
    }
    Ok(rows)
}

fn cell_text(cell: Option<&Value>) -> Option<String> {
    cell.and_then(value_to_text).filter(|text| !text.is_empty())
}

/// Parses sheet rows into a table using the first row as the header.
///
/// Fully empty rows are skipped and short rows are padded with nulls.
/// Columns with a blank header are ignored. A repeated header keeps its
/// first position and takes the cells of its last occurrence.
pub fn rows_to_dataframe(rows: &[Vec<Value>]) -> Result<DataFrame> {
    let Some((header, body)) = rows.split_first() else {
        return Ok(DataFrame::empty());
    };

    let mut names: Vec<(String, usize)> = Vec::new();
    for (j, cell) in header.iter().enumerate() {
        let Some(name) = cell_text(Some(cell)) else {
            continue;
        };
        match names.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = j,
            None => names.push((name, j)),
        }
    }

    let records: Vec<&Vec<Value>> = body
        .iter()
        .filter(|row| row.iter().any(|cell| cell_text(Some(cell)).is_some()))
        .collect();

    let columns = names
        .into_iter()
        .map(|(name, j)| {
            let values = records.iter().map(|row| cell_text(row.get(j))).collect();
            (name, values)
        })
        .collect();

    from_string_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cell(df: &DataFrame, column: &str, row: usize) -> Result<Option<String>> {
        let series = df
            .column(column)?
            .as_materialized_series()
            .cast(&DataType::String)?;
        Ok(series.str()?.get(row).map(ToString::to_string))
    }

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn frame(columns: &[(&str, &[Option<&str>])]) -> DataFrame {
        DataFrame::new(
            columns
                .iter()
                .map(|(name, values)| {
                    let values: Vec<Option<String>> =
                        values.iter().map(|v| v.map(ToString::to_string)).collect();
                    Column::new((*name).into(), values)
                })
                .collect(),
        )
        .unwrap()
    }

    const FIELDS: FieldMap = FieldMap::new(&[
        ("totalAssets", "total_assets"),
        ("inventory", "inventory"),
    ]);

    #[test]
    fn test_field_map_passthrough() {
        assert_eq!(FIELDS.normalize("totalAssets"), "total_assets");
        assert_eq!(FIELDS.normalize("inventory"), "inventory");
        assert_eq!(FIELDS.normalize("brandNewField"), "brandNewField");
        assert_eq!(FIELDS.len(), 2);
    }

    #[test]
    fn test_records_union_of_keys() {
        let records = vec![
            record(json!({"a": "1", "b": null})),
            record(json!({"a": "2", "c": "x"})),
        ];
        let df = records_to_dataframe(&records).unwrap();

        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(df.height(), 2);
        assert_eq!(cell(&df, "b", 0).unwrap(), None);
        assert_eq!(cell(&df, "c", 0).unwrap(), None);
        assert_eq!(cell(&df, "c", 1).unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_records_empty() {
        let df = records_to_dataframe(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 0);
    }

    #[test]
    fn test_rename_and_fill() {
        let records = vec![record(json!({
            "totalAssets": "1000",
            "inventory": "None",
            "extra": null,
        }))];
        let mut df = records_to_dataframe(&records).unwrap();
        rename_columns(&mut df, &FIELDS).unwrap();
        let df = fill_missing(&df, "0").unwrap();

        assert_eq!(cell(&df, "total_assets", 0).unwrap().as_deref(), Some("1000"));
        assert_eq!(cell(&df, "inventory", 0).unwrap().as_deref(), Some("0"));
        assert_eq!(cell(&df, "extra", 0).unwrap().as_deref(), Some("0"));
    }

    #[test]
    fn test_text_to_cell() {
        assert_eq!(text_to_cell("1000"), json!(1000));
        assert_eq!(text_to_cell("-42"), json!(-42));
        assert_eq!(text_to_cell("0"), json!(0));
        assert_eq!(text_to_cell("150.25"), json!(150.25));
        assert_eq!(text_to_cell("2024-01-31"), json!("2024-01-31"));
        assert_eq!(text_to_cell("0700"), json!("0700"));
        assert_eq!(text_to_cell("USD"), json!("USD"));
        assert_eq!(text_to_cell("NaN"), json!("NaN"));
        assert_eq!(text_to_cell("inf"), json!("inf"));
        assert_eq!(text_to_cell(""), json!(""));
    }

    #[test]
    fn test_concat_aligns_by_name() {
        let top = frame(&[("date", &[Some("2024-01-31")]), ("value", &[Some("148")])]);
        let bottom = frame(&[
            ("value", &[Some("150")]),
            ("date", &[Some("2024-02-29")]),
            ("symbol", &[Some("AAPL")]),
        ]);
        let df = concat_by_name(&top, &bottom).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
        assert_eq!(cell(&df, "date", 1).unwrap().as_deref(), Some("2024-02-29"));
        assert_eq!(cell(&df, "value", 1).unwrap().as_deref(), Some("150"));
        assert_eq!(cell(&df, "symbol", 0).unwrap(), None);
    }

    #[test]
    fn test_drop_duplicates_keeps_last() {
        let df = frame(&[
            ("date", &[Some("2024-01-31"), Some("2024-01-31"), Some("2024-01-31")]),
            ("symbol", &[Some("AAPL"), Some("MSFT"), Some("AAPL")]),
            ("value", &[Some("148"), Some("400"), Some("150")]),
        ]);
        let df = drop_duplicates_keep_last(&df, &["date", "symbol"]).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(cell(&df, "symbol", 0).unwrap().as_deref(), Some("MSFT"));
        assert_eq!(cell(&df, "symbol", 1).unwrap().as_deref(), Some("AAPL"));
        assert_eq!(cell(&df, "value", 1).unwrap().as_deref(), Some("150"));
    }

    #[test]
    fn test_drop_duplicates_missing_column() {
        let df = frame(&[("date", &[Some("2024-01-31")])]);
        assert!(drop_duplicates_keep_last(&df, &["symbol"]).is_err());
    }

    #[test]
    fn test_unique_values_first_seen_order() {
        let df = frame(&[("Symbol", &[Some("MSFT"), Some("AAPL"), None, Some("MSFT")])]);
        assert_eq!(unique_values(&df, "Symbol").unwrap(), vec!["MSFT", "AAPL"]);
        assert!(unique_values(&df, "Ticker").is_err());
    }

    #[test]
    fn test_sheet_rows() {
        let df = frame(&[
            ("date", &[Some("2024-01-31"), None]),
            ("value", &[Some("150.5"), Some("0")]),
        ]);
        let rows = dataframe_to_rows(&df).unwrap();
        assert_eq!(
            rows,
            vec![
                vec![json!("date"), json!("value")],
                vec![json!("2024-01-31"), json!(150.5)],
                vec![json!(""), json!(0)],
            ]
        );
    }

    #[test]
    fn test_rows_to_dataframe() {
        let rows = vec![
            vec![json!("Symbol"), json!("Name"), json!("")],
            vec![json!("AAPL"), json!("Apple")],
            vec![json!(""), json!("")],
            vec![json!(700), json!(""), json!("ignored")],
        ];
        let df = rows_to_dataframe(&rows).unwrap();

        assert_eq!(df.width(), 2);
        assert_eq!(df.height(), 2);
        assert_eq!(cell(&df, "Symbol", 1).unwrap().as_deref(), Some("700"));
        assert_eq!(cell(&df, "Name", 1).unwrap(), None);
        assert_eq!(rows_to_dataframe(&[]).unwrap().height(), 0);
    }

    #[test]
    fn test_rows_with_blank_and_repeated_headers() {
        let rows = vec![
            vec![json!("Symbol"), json!(""), json!(""), json!("Notes"), json!("Symbol")],
            vec![json!("AAPL"), json!("x"), json!(""), json!("core"), json!("MSFT")],
        ];
        let df = rows_to_dataframe(&rows).unwrap();

        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["Symbol", "Notes"]);
        assert_eq!(df.height(), 1);
        assert_eq!(cell(&df, "Symbol", 0).unwrap().as_deref(), Some("MSFT"));
        assert_eq!(cell(&df, "Notes", 0).unwrap().as_deref(), Some("core"));
    }
}

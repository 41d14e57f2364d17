// Descriptive statistics for the dataset preview.
//
// Numeric columns get count / mean / std / min / quartiles / max. When a table
// has no numeric column at all, text columns are summarised instead with
// count / unique / top / freq.

use std::collections::HashMap;

use super::model::{CellValue, Table};

pub const NUMERIC_STATS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];
pub const OBJECT_STATS: [&str; 4] = ["count", "unique", "top", "freq"];

/// A statistics table: one row per statistic, one column per described column.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub stat_names: Vec<&'static str>,
    pub columns: Vec<String>,
    /// `rows[stat][column]`
    pub rows: Vec<Vec<CellValue>>,
}

/// Summarise every numeric column, or every column if none is numeric.
pub fn describe(table: &Table) -> Summary {
    let numeric: Vec<_> = table.columns.iter().filter(|c| c.is_numeric()).collect();

    if !numeric.is_empty() {
        let per_column: Vec<Vec<CellValue>> = numeric
            .iter()
            .map(|c| {
                let values: Vec<f64> = c.values.iter().filter_map(CellValue::as_f64).collect();
                numeric_stats(&values)
            })
            .collect();
        return Summary {
            stat_names: NUMERIC_STATS.to_vec(),
            columns: numeric.iter().map(|c| c.name.clone()).collect(),
            rows: transpose(per_column, NUMERIC_STATS.len()),
        };
    }

    let per_column: Vec<Vec<CellValue>> = table
        .columns
        .iter()
        .map(|c| object_stats(&c.values))
        .collect();
    Summary {
        stat_names: OBJECT_STATS.to_vec(),
        columns: table.column_names(),
        rows: transpose(per_column, OBJECT_STATS.len()),
    }
}

fn transpose(per_column: Vec<Vec<CellValue>>, n_stats: usize) -> Vec<Vec<CellValue>> {
    (0..n_stats)
        .map(|stat| per_column.iter().map(|col| col[stat].clone()).collect())
        .collect()
}

fn numeric_stats(values: &[f64]) -> Vec<CellValue> {
    let count = values.len() as f64;
    if values.is_empty() {
        let mut out = vec![CellValue::Float(0.0)];
        out.extend(std::iter::repeat(CellValue::Float(f64::NAN)).take(NUMERIC_STATS.len() - 1));
        return out;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = values.iter().sum::<f64>() / count;
    [
        count,
        mean,
        sample_std(values, mean),
        sorted[0],
        quantile(&sorted, 0.25),
        quantile(&sorted, 0.50),
        quantile(&sorted, 0.75),
        sorted[sorted.len() - 1],
    ]
    .into_iter()
    .map(CellValue::Float)
    .collect()
}

/// Standard deviation with `n - 1` in the denominator; NaN below two values.
pub fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Linearly interpolated quantile of an ascending, non-empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn object_stats(values: &[CellValue]) -> Vec<CellValue> {
    let present: Vec<&CellValue> = values.iter().filter(|v| !v.is_missing()).collect();

    let mut counts: HashMap<&CellValue, usize> = HashMap::new();
    for v in &present {
        *counts.entry(*v).or_default() += 1;
    }

    // Most frequent value; ties go to the one seen first.
    let mut top: Option<(&CellValue, usize)> = None;
    for v in &present {
        let n = counts[*v];
        if top.map_or(true, |(_, best)| n > best) {
            top = Some((*v, n));
        }
    }

    let (top, freq) = match top {
        Some((v, n)) => (v.clone(), CellValue::Integer(n as i64)),
        None => (CellValue::Null, CellValue::Null),
    };
    vec![
        CellValue::Integer(present.len() as i64),
        CellValue::Integer(counts.len() as i64),
        top,
        freq,
    ]
}

/// Fixed six-decimal rendering so repeated renders are byte-identical.
pub fn format_stat(value: &CellValue) -> String {
    match value {
        CellValue::Float(v) if v.is_nan() => "NaN".to_string(),
        CellValue::Float(v) => format!("{v:.6}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn floats(summary: &Summary, column: usize) -> Vec<f64> {
        summary
            .rows
            .iter()
            .map(|row| match row[column] {
                CellValue::Float(v) => v,
                ref other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    #[test]
    fn numeric_summary_matches_dataframe_conventions() {
        let table = Table::new(vec![
            Column::new("name", vec![CellValue::String("x".into()); 4]),
            Column::new(
                "mass",
                vec![
                    CellValue::Integer(1),
                    CellValue::Integer(2),
                    CellValue::Integer(3),
                    CellValue::Integer(4),
                ],
            ),
        ]);

        let summary = describe(&table);
        assert_eq!(summary.columns, ["mass"]);
        assert_eq!(summary.stat_names, NUMERIC_STATS);

        let stats = floats(&summary, 0);
        assert_eq!(stats[0], 4.0);
        assert_eq!(stats[1], 2.5);
        assert!((stats[2] - 1.2909944487).abs() < 1e-9);
        assert_eq!(stats[3], 1.0);
        assert_eq!(stats[4], 1.75);
        assert_eq!(stats[5], 2.5);
        assert_eq!(stats[6], 3.25);
        assert_eq!(stats[7], 4.0);
    }

    #[test]
    fn missing_values_are_not_counted() {
        let table = Table::new(vec![Column::new(
            "year",
            vec![CellValue::Float(1880.0), CellValue::Null, CellValue::Float(f64::NAN)],
        )]);

        let stats = floats(&describe(&table), 0);
        assert_eq!(stats[0], 1.0);
        assert_eq!(stats[1], 1880.0);
        assert!(stats[2].is_nan());
    }

    #[test]
    fn missing_markers_in_csv_keep_columns_numeric() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meteor_data.csv");
        std::fs::write(
            &path,
            "name,mass,year\nAachen,21,1880\nAarhus,NA,1951\nAbee,107000,N/A\n",
        )
        .unwrap();
        let table = crate::data::loader::load_file(&path).unwrap();

        let summary = describe(&table);
        assert_eq!(summary.stat_names, NUMERIC_STATS);
        assert_eq!(summary.columns, ["mass", "year"]);

        let mass = floats(&summary, 0);
        assert_eq!(mass[0], 2.0);
        assert_eq!(mass[1], 53510.5);
        let year = floats(&summary, 1);
        assert_eq!(year[0], 2.0);
        assert_eq!(year[3], 1880.0);
        assert_eq!(year[7], 1951.0);
    }

    #[test]
    fn text_only_tables_get_an_object_summary() {
        let table = Table::new(vec![Column::new(
            "fall",
            vec![
                CellValue::String("Found".into()),
                CellValue::String("Fell".into()),
                CellValue::String("Fell".into()),
                CellValue::String("Found".into()),
                CellValue::Null,
            ],
        )]);

        let summary = describe(&table);
        assert_eq!(summary.stat_names, OBJECT_STATS);
        let col: Vec<&CellValue> = summary.rows.iter().map(|r| &r[0]).collect();
        assert_eq!(col[0], &CellValue::Integer(4));
        assert_eq!(col[1], &CellValue::Integer(2));
        assert_eq!(col[2], &CellValue::String("Found".into()));
        assert_eq!(col[3], &CellValue::Integer(2));
    }

    #[test]
    fn formatting_is_stable() {
        let table = Table::new(vec![Column::new(
            "mass",
            vec![CellValue::Float(0.1), CellValue::Float(0.2), CellValue::Float(0.7)],
        )]);
        let render = |s: &Summary| -> Vec<String> {
            s.rows.iter().flatten().map(format_stat).collect()
        };

        let first = render(&describe(&table));
        let second = render(&describe(&table));
        assert_eq!(first, second);
        assert_eq!(first[0], "3.000000");
    }
}

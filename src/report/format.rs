//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline stays free of console side effects
//! - output changes are localized (important for snapshot tests)

use crate::domain::{COL_DATE, COL_FORECAST, COL_INFLATION, COL_POPULATION, COL_RATE, COL_UNEMPLOYED};
use crate::fit::ForecastRun;
use crate::io::ingest::{MissingReport, RawTable};
use crate::report::ColumnSummary;

/// Dump the raw dataset as an aligned table.
///
/// With `limit`, only the first and last `limit / 2` rows are shown.
pub fn format_dataset(table: &RawTable, limit: Option<usize>) -> String {
    let mut out = String::new();
    out.push_str("=== Unemployment dataset ===\n");

    let widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            table
                .rows
                .iter()
                .map(|r| r.cells.get(i).and_then(|c| c.as_deref()).map_or(3, str::len))
                .max()
                .unwrap_or(0)
                .max(h.len())
        })
        .collect();

    let mut header = format!("{:>5}", "");
    for (h, w) in table.headers.iter().zip(&widths) {
        header.push_str(&format!("  {h:>w$}"));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    let n = table.rows.len();
    let shown: Vec<usize> = match limit {
        Some(limit) if n > limit => {
            let half = (limit / 2).max(1);
            (0..half).chain(n - half..n).collect()
        }
        _ => (0..n).collect(),
    };

    let mut prev = None;
    for i in shown {
        if prev.is_some_and(|p: usize| i > p + 1) {
            out.push_str("  ...\n");
        }
        let row = &table.rows[i];
        let mut line = format!("{i:>5}");
        for (c, w) in widths.iter().enumerate() {
            let cell = row.cells.get(c).and_then(|v| v.as_deref()).unwrap_or("NaN");
            line.push_str(&format!("  {cell:>w$}"));
        }
        out.push_str(line.trim_end());
        out.push('\n');
        prev = Some(i);
    }
    out.push_str(&format!("[{} rows x {} columns]\n", n, table.headers.len()));
    out
}

/// Per-column non-null counts and the cleaning outcome.
pub fn format_missing_report(missing: &MissingReport) -> String {
    let mut out = String::new();
    out.push_str("Missing values per column:\n");
    let width = missing.per_column.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
    for (name, count) in &missing.per_column {
        out.push_str(&format!(
            "  {name:<width$}  missing={count:<4} non-null={}\n",
            missing.rows_read - count
        ));
    }
    out.push_str(&format!(
        "Rows: read={} dropped={} kept={}\n",
        missing.rows_read,
        missing.rows_dropped,
        missing.rows_read - missing.rows_dropped
    ));
    out
}

/// The descriptive-statistics table.
pub fn format_summary_table(summaries: &[ColumnSummary]) -> String {
    let mut out = String::new();
    out.push_str("=== Summary report ===\n");
    out.push_str(
        format!(
            "{:<24} {:>6} {:>18} {:>18} {:>18} {:>18} {:>18} {:>18} {:>18}\n",
            "variable", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<24} {:-<6} {:-<18} {:-<18} {:-<18} {:-<18} {:-<18} {:-<18} {:-<18}\n",
            "", "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for s in summaries {
        out.push_str(
            format!(
                "{:<24} {:>6} {:>18.2} {:>18.2} {:>18.2} {:>18.2} {:>18.2} {:>18.2} {:>18.2}\n",
                truncate(&s.name, 24),
                s.count,
                s.mean,
                s.std,
                s.min,
                s.q25,
                s.median,
                s.q75,
                s.max
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Plain-language reading of each summarized column.
pub fn format_explanations(summaries: &[ColumnSummary]) -> String {
    let mut out = String::new();
    out.push_str("=== What the summary says ===\n");

    for s in summaries {
        let style = ValueStyle::for_column(&s.name);
        out.push_str(&format!("\n{}:\n", s.name));
        out.push_str(&format!("- Count: {} observations\n", s.count));
        out.push_str(&format!("- Mean: {}\n", style.fmt(s.mean)));
        // Std is a spread, not a level: never percent-suffixed.
        out.push_str(&format!("- Std deviation: {:.2}\n", s.std));
        out.push_str(&format!("- Minimum: {}\n", style.fmt(s.min)));
        out.push_str(&format!("- 25th percentile: {}\n", style.fmt(s.q25)));
        out.push_str(&format!("- Median: {}\n", style.fmt(s.median)));
        out.push_str(&format!("- 75th percentile: {}\n", style.fmt(s.q75)));
        out.push_str(&format!("- Maximum: {}\n", style.fmt(s.max)));
    }
    out
}

/// Model diagnostics plus the forecast table.
pub fn format_forecast(run: &ForecastRun) -> String {
    let m = &run.model;
    let mut out = String::new();

    out.push_str(&format!(
        "=== ARIMA{} on annual {} (n={}) ===\n",
        m.order, COL_RATE, m.n_obs
    ));
    out.push_str(&format!("- trend: {:?}\n", m.trend));
    out.push_str(&format!("- ar   : {}\n", fmt_vec(&m.ar)));
    if m.trend.has_constant() {
        out.push_str(&format!("- const: {:.6}\n", m.constant));
    }
    out.push_str(&format!(
        "- sigma2={:.6} loglik={:.3} AIC={:.3} BIC={:.3} (n_eff={})\n",
        m.sigma2, m.log_likelihood, m.aic, m.bic, m.n_eff
    ));

    if let (Some(first), Some(last)) = (run.points.first(), run.points.last()) {
        out.push_str(&format!(
            "\n=== Forecast {} to {} ===\n",
            first.date.format("%Y-%m"),
            last.date.format("%Y-%m")
        ));
    }
    out.push_str(
        format!(
            "{:>3}  {:<10}  {:>32}  {:>10}  {:>10}  {:>10}\n",
            "", COL_DATE, COL_FORECAST, "std_err", "lo95", "hi95"
        )
        .trim_end(),
    );
    out.push('\n');
    for (i, p) in run.points.iter().enumerate() {
        out.push_str(
            format!(
                "{:>3}  {:<10}  {:>32.6}  {:>10.4}  {:>10.4}  {:>10.4}\n",
                i,
                p.date.to_string(),
                p.value,
                p.std_err,
                p.lower,
                p.upper
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Group an integer with thousands separators: `1234567` -> `1,234,567`.
pub fn group_thousands(v: i64) -> String {
    let digits = v.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if v < 0 { format!("-{out}") } else { out }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueStyle {
    Percent,
    HeadCount,
    Plain,
}

impl ValueStyle {
    fn for_column(name: &str) -> Self {
        match name {
            COL_RATE | COL_INFLATION => ValueStyle::Percent,
            COL_POPULATION | COL_UNEMPLOYED => ValueStyle::HeadCount,
            _ => ValueStyle::Plain,
        }
    }

    fn fmt(self, v: f64) -> String {
        if !v.is_finite() {
            return "n/a".to_string();
        }
        match self {
            ValueStyle::Percent => format!("{v:.2}%"),
            ValueStyle::HeadCount => group_thousands(v.trunc() as i64),
            ValueStyle::Plain => format!("{v:.2}"),
        }
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::COL_YEAR;
    use crate::io::ingest::read_table;
    use crate::report::describe;

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(5_300_000_000), "5,300,000,000");
        assert_eq!(group_thousands(-12_345), "-12,345");
    }

    #[test]
    fn explanations_use_column_units() {
        let rate = describe(COL_RATE, &[5.0, 6.0]);
        let pop = describe(COL_POPULATION, &[5.3e9, 5.4e9]);
        let txt = format_explanations(&[rate, pop]);
        assert!(txt.contains("- Mean: 5.50%"));
        assert!(txt.contains("- Minimum: 5,300,000,000"));
        assert!(txt.contains("- Count: 2 observations"));
    }

    #[test]
    fn dataset_dump_elides_middle_rows() {
        let mut csv = String::from("Date,Unemployment Rate (%),Population,Inflation Rate (%)\n");
        for y in 1991..2001 {
            csv.push_str(&format!("{y}-12-31,5.0,5.3B,\n"));
        }
        let table = read_table(csv.as_bytes()).unwrap();
        let txt = format_dataset(&table, Some(4));
        assert!(txt.contains("1991-12-31"));
        assert!(txt.contains("2000-12-31"));
        assert!(!txt.contains("1995-12-31"));
        assert!(txt.contains("  ...\n"));
        assert!(txt.contains("NaN"));
        assert!(txt.ends_with("[10 rows x 4 columns]\n"));
    }

    #[test]
    fn summary_table_has_one_line_per_column() {
        let rows = vec![describe(COL_RATE, &[5.0, 6.0]), describe(COL_YEAR, &[1991.0, 1992.0])];
        let txt = format_summary_table(&rows);
        assert_eq!(txt.lines().count(), 5);
        assert!(txt.lines().nth(3).unwrap().starts_with(COL_RATE));
    }
}

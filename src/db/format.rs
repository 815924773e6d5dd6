use std::fmt::Write;

use super::result::ResultSet;

/// Separator line emitted after every row.
pub const ROW_SEPARATOR: &str = "──";

/// Render a result set as chat text.
///
/// Each row becomes one `〔column〕value` line per column, in the order the
/// backend reported the columns, followed by a separator line. Rows keep
/// cursor order. An empty result renders as the empty string.
pub fn format_result_set(rs: &ResultSet) -> String {
    let mut out = String::new();
    for row in rs.rows() {
        for (column, value) in rs.columns().iter().zip(row) {
            // Writing to a String cannot fail.
            let _ = writeln!(out, "〔{}〕{}", column, value);
        }
        out.push_str(ROW_SEPARATOR);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::result::Value;

    fn result_set(columns: &[&str], rows: Vec<Vec<Value>>) -> ResultSet {
        let mut rs = ResultSet::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            rs.push_row(row).unwrap();
        }
        rs
    }

    #[test]
    fn test_formats_rows_with_null_marker() {
        let rs = result_set(
            &["id", "name"],
            vec![
                vec![Value::Int(1), Value::from("a")],
                vec![Value::Int(2), Value::Null],
            ],
        );
        assert_eq!(
            format_result_set(&rs),
            "〔id〕1\n〔name〕a\n──\n〔id〕2\n〔name〕NULL\n──\n"
        );
    }

    #[test]
    fn test_empty_result_is_empty_string() {
        assert_eq!(format_result_set(&ResultSet::default()), "");
        assert_eq!(format_result_set(&result_set(&["id"], vec![])), "");
    }

    #[test]
    fn test_keeps_backend_column_order_and_duplicates() {
        let rs = result_set(
            &["zeta", "alpha", "zeta"],
            vec![vec![Value::Bool(true), Value::Float(1.5), Value::Int(7)]],
        );
        assert_eq!(
            format_result_set(&rs),
            "〔zeta〕true\n〔alpha〕1.5\n〔zeta〕7\n──\n"
        );
    }

    #[test]
    fn test_is_pure() {
        let rs = result_set(&["n"], vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
        assert_eq!(format_result_set(&rs), format_result_set(&rs));
    }
}

pub mod error;
pub mod fingerprint;
pub mod schema;
pub mod table;

pub use error::{PipelineError, Result};
pub use fingerprint::Fingerprint;
pub use schema::Schema;
pub use table::{CellValue, Row, Table};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn key_string_canonicalizes_integral_numbers() {
        assert_eq!(CellValue::Number(2023.0).key_string(), "2023");
        assert_eq!(CellValue::Number(10.4).key_string(), "10.4");
        assert_eq!(CellValue::Missing.key_string(), "");
        assert_eq!(CellValue::text("SEATTLE").key_string(), "SEATTLE");
    }

    #[test]
    fn push_row_fills_missing_columns() {
        let mut table = Table::new(vec!["STATE".into(), "CITY".into()]).expect("table");
        table
            .push_row(Row::new().with("STATE", CellValue::text("WA")))
            .expect("push");
        assert_eq!(table.rows()[0].get("CITY"), Some(&CellValue::Missing));
    }

    #[test]
    fn push_row_rejects_unknown_columns() {
        let mut table = Table::new(vec!["STATE".into()]).expect("table");
        let err = table
            .push_row(Row::new().with("BASE", CellValue::Number(1.0)))
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { column } if column == "BASE"));
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let err = Table::new(vec!["A".into(), "A".into()]).unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateColumn { .. }));
    }

    #[test]
    fn schema_value_constraints() {
        let mut allowed = BTreeMap::new();
        allowed.insert("LEVEL".to_string(), vec!["1-APPRENTICE".to_string()]);
        let schema = Schema::new(vec!["LEVEL".into()], allowed).expect("schema");
        assert!(schema.permits_value("LEVEL", &CellValue::text("1-APPRENTICE")));
        assert!(!schema.permits_value("LEVEL", &CellValue::text("9-UNKNOWN")));
        assert!(schema.permits_value("LEVEL", &CellValue::Missing));
        assert!(schema.permits_value("STATE", &CellValue::text("WA")));
    }

    #[test]
    fn table_serializes() {
        let mut table = Table::new(vec!["YEAR".into(), "BASE".into()]).expect("table");
        table
            .push_values(vec![CellValue::Number(2023.0), CellValue::Number(39.5)])
            .expect("push");
        let json = serde_json::to_string(&table).expect("serialize table");
        let round: Table = serde_json::from_str(&json).expect("deserialize table");
        assert_eq!(round, table);
    }
}

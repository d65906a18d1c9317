use std::collections::BTreeMap;

use pgshape_core::{Column, ForeignKey, Table};

use super::queries::{RawColumn, RawForeignKey, RawTable};

pub fn map_tables(raw: Vec<RawTable>) -> Vec<Table> {
    raw.into_iter()
        .map(|table| Table {
            schema: table.schema,
            name: table.name,
            insertable: table.insertable,
        })
        .collect()
}

/// Split a comma-joined enum aggregate into labels; no aggregate means no labels.
pub fn parse_enum_labels(aggregate: Option<&str>) -> Vec<String> {
    aggregate
        .map(|labels| labels.split(',').map(str::to_string).collect())
        .unwrap_or_default()
}

pub fn map_column(raw: RawColumn) -> Column {
    Column {
        enum_values: parse_enum_labels(raw.enum_labels.as_deref()),
        schema: raw.schema,
        table: raw.table,
        name: raw.name,
        position: raw.position,
        nullable: raw.nullable,
        col_type: raw.col_type,
        updatable: raw.updatable,
        max_len: raw.max_len,
        precision: raw.precision,
        foreign_key: None,
        default_value: raw.default_value,
    }
}

/// Fold FK rows into a map keyed by referencing column.
///
/// Rows arrive ordered by column name; a column referenced by several
/// constraints keeps the last row seen.
pub fn fold_foreign_keys(raw: Vec<RawForeignKey>) -> BTreeMap<String, ForeignKey> {
    raw.into_iter().fold(BTreeMap::new(), |mut map, fk| {
        map.insert(
            fk.column,
            ForeignKey {
                referenced_table: fk.referenced_table,
                referenced_column: fk.referenced_column,
            },
        );
        map
    })
}

/// Map raw column rows and attach references by column name, in ordinal order.
pub fn assemble_columns(
    raw: Vec<RawColumn>,
    foreign_keys: &BTreeMap<String, ForeignKey>,
) -> Vec<Column> {
    let mut columns: Vec<Column> = raw
        .into_iter()
        .map(|raw| {
            let mut column = map_column(raw);
            column.foreign_key = foreign_keys.get(&column.name).cloned();
            column
        })
        .collect();
    columns.sort_by_key(|column| column.position);
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_column(name: &str, position: i32) -> RawColumn {
        RawColumn {
            schema: "app".to_string(),
            table: "orders".to_string(),
            name: name.to_string(),
            position,
            nullable: true,
            col_type: "integer".to_string(),
            updatable: true,
            max_len: None,
            precision: Some(32),
            default_value: None,
            enum_labels: None,
        }
    }

    fn raw_fk(column: &str, table: &str, referenced: &str) -> RawForeignKey {
        RawForeignKey {
            column: column.to_string(),
            referenced_table: table.to_string(),
            referenced_column: referenced.to_string(),
        }
    }

    #[test]
    fn enum_labels_round_trip_in_order() {
        let labels = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let joined = labels.join(",");
        assert_eq!(joined, "a,b,c");
        assert_eq!(parse_enum_labels(Some(&joined)), labels);
    }

    #[test]
    fn missing_enum_aggregate_is_empty() {
        assert!(parse_enum_labels(None).is_empty());
    }

    #[test]
    fn enum_aggregate_becomes_column_values() {
        let mut raw = raw_column("status", 3);
        raw.col_type = "USER-DEFINED".to_string();
        raw.enum_labels = Some("pending,shipped,delivered".to_string());

        let column = map_column(raw);
        assert_eq!(column.enum_values, vec!["pending", "shipped", "delivered"]);
        assert!(column.foreign_key.is_none());
    }

    #[test]
    fn no_foreign_keys_leaves_columns_unreferenced() {
        let fks = fold_foreign_keys(Vec::new());
        assert!(fks.is_empty());

        let columns = assemble_columns(vec![raw_column("id", 1), raw_column("total", 2)], &fks);
        assert!(columns.iter().all(|column| column.foreign_key.is_none()));
    }

    #[test]
    fn attaches_reference_only_to_matching_column() {
        let fks = fold_foreign_keys(vec![raw_fk("customer_id", "customers", "id")]);
        let columns = assemble_columns(
            vec![
                raw_column("id", 1),
                raw_column("customer_id", 2),
                raw_column("total", 3),
            ],
            &fks,
        );

        let referenced: Vec<(&str, Option<&ForeignKey>)> = columns
            .iter()
            .map(|column| (column.name.as_str(), column.foreign_key.as_ref()))
            .collect();
        assert_eq!(
            referenced,
            vec![
                ("id", None),
                (
                    "customer_id",
                    Some(&ForeignKey {
                        referenced_table: "customers".to_string(),
                        referenced_column: "id".to_string(),
                    })
                ),
                ("total", None),
            ]
        );
    }

    #[test]
    fn later_foreign_key_row_wins_for_same_column() {
        let fks = fold_foreign_keys(vec![
            raw_fk("owner_id", "accounts", "id"),
            raw_fk("owner_id", "users", "id"),
        ]);

        assert_eq!(fks.len(), 1);
        assert_eq!(fks["owner_id"].referenced_table, "users");
    }

    #[test]
    fn columns_come_out_in_ordinal_order() {
        let columns = assemble_columns(
            vec![
                raw_column("total", 3),
                raw_column("id", 1),
                raw_column("customer_id", 2),
            ],
            &BTreeMap::new(),
        );

        let positions: Vec<i32> = columns.iter().map(|column| column.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(columns[0].name, "id");
    }

    #[test]
    fn maps_tables_one_to_one() {
        let tables = map_tables(vec![
            RawTable {
                schema: "app".to_string(),
                name: "active_users".to_string(),
                insertable: false,
            },
            RawTable {
                schema: "app".to_string(),
                name: "users".to_string(),
                insertable: true,
            },
        ]);

        assert_eq!(tables.len(), 2);
        assert!(!tables[0].insertable);
        assert_eq!(tables[1].name, "users");
    }
}

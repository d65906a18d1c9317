use sqlx::PgConnection;

use pgshape_core::{Error, Result};

fn db_error(err: sqlx::Error) -> Error {
    Error::Db(err.to_string())
}

pub struct RawTable {
    pub schema: String,
    pub name: String,
    pub insertable: bool,
}

pub async fn list_tables(conn: &mut PgConnection, schema: &str) -> Result<Vec<RawTable>> {
    let rows = sqlx::query_as::<_, (String, String, bool)>(
        r#"
        select
          t.table_schema::text,
          t.table_name::text,
          (t.is_insertable_into = 'YES'
            or coalesce(v.is_trigger_insertable_into = 'YES', false))
        from information_schema.tables as t
        left join information_schema.views as v
          on v.table_schema = t.table_schema
         and v.table_name = t.table_name
        where t.table_schema::text = $1
        order by t.table_name
        "#,
    )
    .bind(schema)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error)?;

    Ok(rows
        .into_iter()
        .map(|(schema, name, insertable)| RawTable {
            schema,
            name,
            insertable,
        })
        .collect())
}

pub struct RawColumn {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub position: i32,
    pub nullable: bool,
    pub col_type: String,
    pub updatable: bool,
    pub max_len: Option<i32>,
    pub precision: Option<i32>,
    pub default_value: Option<String>,
    /// Comma-joined enum labels; `None` when the column type is not an enum.
    pub enum_labels: Option<String>,
}

type ColumnRow = (
    String,
    String,
    String,
    i32,
    bool,
    String,
    bool,
    Option<i32>,
    Option<i32>,
    Option<String>,
    Option<String>,
);

pub async fn list_columns(
    conn: &mut PgConnection,
    schema: &str,
    table: &str,
) -> Result<Vec<RawColumn>> {
    let rows = sqlx::query_as::<_, ColumnRow>(
        r#"
        select
          info.table_schema::text,
          info.table_name::text,
          info.column_name::text,
          info.ordinal_position::int4,
          info.is_nullable = 'YES',
          info.data_type::text,
          info.is_updatable = 'YES',
          info.character_maximum_length::int4,
          info.numeric_precision::int4,
          info.column_default::text,
          array_to_string(enum_info.labels, ',')
        from information_schema.columns as info
        left outer join (
          select
            n.nspname as type_schema,
            t.typname as type_name,
            array_agg(e.enumlabel order by e.enumsortorder) as labels
          from pg_type t
          join pg_enum e on e.enumtypid = t.oid
          join pg_namespace n on n.oid = t.typnamespace
          group by n.nspname, t.typname
        ) as enum_info
          on enum_info.type_schema::text = info.udt_schema::text
         and enum_info.type_name::text = info.udt_name::text
        where info.table_schema::text = $1
          and info.table_name::text = $2
        order by info.ordinal_position
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error)?;

    Ok(rows
        .into_iter()
        .map(
            |(
                schema,
                table,
                name,
                position,
                nullable,
                col_type,
                updatable,
                max_len,
                precision,
                default_value,
                enum_labels,
            )| RawColumn {
                schema,
                table,
                name,
                position,
                nullable,
                col_type,
                updatable,
                max_len,
                precision,
                default_value,
                enum_labels,
            },
        )
        .collect())
}

pub async fn list_primary_key(
    conn: &mut PgConnection,
    schema: &str,
    table: &str,
) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        select kcu.column_name::text
        from information_schema.table_constraints as tc
        join information_schema.key_column_usage as kcu
          on kcu.constraint_name = tc.constraint_name
         and kcu.table_name = tc.table_name
         and kcu.table_schema = tc.table_schema
        where tc.constraint_type = 'PRIMARY KEY'
          and kcu.table_schema::text = $1
          and kcu.table_name::text = $2
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error)
}

pub struct RawForeignKey {
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

pub async fn list_foreign_keys(
    conn: &mut PgConnection,
    schema: &str,
    table: &str,
) -> Result<Vec<RawForeignKey>> {
    let rows = sqlx::query_as::<_, (String, String, String)>(
        r#"
        select
          kcu.column_name::text,
          ccu.table_name::text,
          ccu.column_name::text
        from information_schema.table_constraints as tc
        join information_schema.key_column_usage as kcu
          on kcu.constraint_name = tc.constraint_name
         and kcu.constraint_schema = tc.constraint_schema
         and kcu.table_name = tc.table_name
        join information_schema.constraint_column_usage as ccu
          on ccu.constraint_name = tc.constraint_name
         and ccu.constraint_schema = tc.constraint_schema
        where tc.constraint_type = 'FOREIGN KEY'
          and tc.table_schema::text = $1
          and tc.table_name::text = $2
        order by kcu.column_name
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error)?;

    Ok(rows
        .into_iter()
        .map(|(column, referenced_table, referenced_column)| RawForeignKey {
            column,
            referenced_table,
            referenced_column,
        })
        .collect())
}

pub async fn procedure_exists(conn: &mut PgConnection, schema: &str, name: &str) -> Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        select exists (
          select 1
          from pg_catalog.pg_namespace n
          join pg_catalog.pg_proc p on p.pronamespace = n.oid
          where n.nspname::text = $1
            and p.proname::text = $2
        )
        "#,
    )
    .bind(schema)
    .bind(name)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_error)
}

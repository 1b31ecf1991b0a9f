//! In-memory SQLite search index for executing compiled queries.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, ToSql, params};
use rust_decimal::prelude::ToPrimitive;

use helios_sql_search::CompiledQuery;
use helios_sql_search::types::Literal;

const SCHEMA: &str = r#"
CREATE TABLE Resource (
    ResourcePK INTEGER NOT NULL,
    Version INTEGER NOT NULL,
    ResourceTypePK INTEGER NOT NULL,
    Id TEXT NOT NULL,
    LastUpdated TEXT NOT NULL,
    RawResource TEXT NOT NULL,
    PRIMARY KEY (ResourcePK, Version)
);

CREATE TABLE TokenSearchParam (
    ResourcePK INTEGER NOT NULL,
    SearchParamPK INTEGER NOT NULL,
    System TEXT,
    Code TEXT,
    TextHash INTEGER,
    CompositeCorrelationId INTEGER
);

CREATE TABLE StringSearchParam (
    ResourcePK INTEGER NOT NULL,
    SearchParamPK INTEGER NOT NULL,
    Value TEXT,
    CompositeCorrelationId INTEGER
);

CREATE TABLE NumberSearchParam (
    ResourcePK INTEGER NOT NULL,
    SearchParamPK INTEGER NOT NULL,
    Number REAL,
    CompositeCorrelationId INTEGER
);

CREATE TABLE DateSearchParam (
    ResourcePK INTEGER NOT NULL,
    SearchParamPK INTEGER NOT NULL,
    StartTime TEXT,
    EndTime TEXT,
    CompositeCorrelationId INTEGER
);

CREATE TABLE QuantitySearchParam (
    ResourcePK INTEGER NOT NULL,
    SearchParamPK INTEGER NOT NULL,
    System TEXT,
    Code TEXT,
    Quantity REAL,
    CompositeCorrelationId INTEGER
);

CREATE TABLE ReferenceSearchParam (
    ResourcePK INTEGER NOT NULL,
    SearchParamPK INTEGER NOT NULL,
    BaseUriPK INTEGER,
    ReferenceResourceTypePK INTEGER,
    ReferenceResourceId TEXT,
    CompositeCorrelationId INTEGER
);

CREATE TABLE UriSearchParam (
    ResourcePK INTEGER NOT NULL,
    SearchParamPK INTEGER NOT NULL,
    Uri TEXT,
    CompositeCorrelationId INTEGER
);

CREATE TABLE TokenText (
    Hash INTEGER PRIMARY KEY,
    Text TEXT NOT NULL
);

CREATE TABLE Uri (
    UriPK INTEGER PRIMARY KEY,
    Uri TEXT NOT NULL
);
"#;

/// Formats a date the way literals are bound.
pub fn date(value: &str) -> String {
    format!("{}T00:00:00+00:00", value)
}

/// Parses `YYYY-MM-DD` into a UTC datetime at midnight.
pub fn utc(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&date(value))
        .expect("valid date")
        .with_timezone(&Utc)
}

fn to_sql_value(literal: &Literal) -> Value {
    match literal {
        Literal::String(s) => Value::Text(s.clone()),
        Literal::Integer(i) => Value::Integer(*i),
        Literal::Decimal(d) => Value::Real(d.to_f64().expect("decimal fits f64")),
        Literal::DateTime(dt) => Value::Text(dt.to_rfc3339()),
    }
}

/// A search index in an in-memory SQLite database.
pub struct TestDatabase {
    conn: Connection,
}

impl TestDatabase {
    /// Opens an empty index.
    pub fn new() -> Self {
        let conn = Connection::open_in_memory().expect("Failed to open SQLite database");
        conn.execute_batch(SCHEMA)
            .expect("Failed to initialize schema");
        Self { conn }
    }

    /// Inserts a resource version.
    pub fn insert_resource(&self, resource_pk: i64, version: i64, resource_type: i16, id: &str) {
        self.conn
            .execute(
                "INSERT INTO Resource (ResourcePK, Version, ResourceTypePK, Id, LastUpdated, RawResource)
                 VALUES (?1, ?2, ?3, ?4, '2024-01-01T00:00:00Z', '{}')",
                params![resource_pk, version, resource_type, id],
            )
            .expect("Failed to insert resource");
    }

    /// Inserts a token index row.
    pub fn insert_token(
        &self,
        resource_pk: i64,
        search_param: i16,
        system: Option<&str>,
        code: &str,
        text_hash: Option<i64>,
        correlation: Option<i64>,
    ) {
        self.conn
            .execute(
                "INSERT INTO TokenSearchParam (ResourcePK, SearchParamPK, System, Code, TextHash, CompositeCorrelationId)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![resource_pk, search_param, system, code, text_hash, correlation],
            )
            .expect("Failed to insert token");
    }

    /// Inserts token display text.
    pub fn insert_token_text(&self, hash: i64, text: &str) {
        self.conn
            .execute(
                "INSERT INTO TokenText (Hash, Text) VALUES (?1, ?2)",
                params![hash, text],
            )
            .expect("Failed to insert token text");
    }

    /// Inserts a string index row.
    pub fn insert_string(&self, resource_pk: i64, search_param: i16, value: &str) {
        self.conn
            .execute(
                "INSERT INTO StringSearchParam (ResourcePK, SearchParamPK, Value) VALUES (?1, ?2, ?3)",
                params![resource_pk, search_param, value],
            )
            .expect("Failed to insert string");
    }

    /// Inserts a date index row covering one day.
    pub fn insert_date(&self, resource_pk: i64, search_param: i16, day: &str) {
        self.conn
            .execute(
                "INSERT INTO DateSearchParam (ResourcePK, SearchParamPK, StartTime, EndTime) VALUES (?1, ?2, ?3, ?4)",
                params![resource_pk, search_param, date(day), date(day)],
            )
            .expect("Failed to insert date");
    }

    /// Inserts a quantity index row.
    pub fn insert_quantity(
        &self,
        resource_pk: i64,
        search_param: i16,
        quantity: f64,
        code: &str,
        correlation: Option<i64>,
    ) {
        self.conn
            .execute(
                "INSERT INTO QuantitySearchParam (ResourcePK, SearchParamPK, System, Code, Quantity, CompositeCorrelationId)
                 VALUES (?1, ?2, 'http://unitsofmeasure.org', ?3, ?4, ?5)",
                params![resource_pk, search_param, code, quantity, correlation],
            )
            .expect("Failed to insert quantity");
    }

    /// Inserts a local reference (no base URI).
    pub fn insert_reference(
        &self,
        resource_pk: i64,
        search_param: i16,
        target_type: i16,
        target_id: &str,
    ) {
        self.insert_reference_with_base(resource_pk, search_param, None, target_type, target_id);
    }

    /// Inserts a reference, optionally to an external base URI.
    pub fn insert_reference_with_base(
        &self,
        resource_pk: i64,
        search_param: i16,
        base_uri: Option<i64>,
        target_type: i16,
        target_id: &str,
    ) {
        self.conn
            .execute(
                "INSERT INTO ReferenceSearchParam (ResourcePK, SearchParamPK, BaseUriPK, ReferenceResourceTypePK, ReferenceResourceId)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![resource_pk, search_param, base_uri, target_type, target_id],
            )
            .expect("Failed to insert reference");
    }

    /// Interns a base URI.
    pub fn insert_uri(&self, uri_pk: i64, uri: &str) {
        self.conn
            .execute(
                "INSERT INTO Uri (UriPK, Uri) VALUES (?1, ?2)",
                params![uri_pk, uri],
            )
            .expect("Failed to insert uri");
    }

    /// Executes a compiled query, returning `(Id, Version)` in result order.
    pub fn search(&self, query: &CompiledQuery) -> Vec<(String, i64)> {
        let values: Vec<(String, Value)> = query
            .parameters
            .iter()
            .map(|p| (p.name.clone(), to_sql_value(&p.value)))
            .collect();
        let named: Vec<(&str, &dyn ToSql)> = values
            .iter()
            .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
            .collect();

        let mut stmt = self
            .conn
            .prepare(&query.sql)
            .unwrap_or_else(|e| panic!("Failed to prepare query: {}\n{}", e, query.sql));
        let rows = stmt
            .query_map(named.as_slice(), |row| {
                Ok((row.get::<_, String>(1)?, row.get::<_, i64>(2)?))
            })
            .expect("Failed to execute query");

        rows.collect::<Result<Vec<_>, _>>()
            .expect("Failed to read rows")
    }

    /// Executes a compiled query, returning the matching ids.
    pub fn search_ids(&self, query: &CompiledQuery) -> Vec<String> {
        self.search(query).into_iter().map(|(id, _)| id).collect()
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

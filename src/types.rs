//! Core data model types.
//!
//! Ingestion produces an in-memory [`DataSet`]: a [`Schema`] (ordered, typed [`Field`]s taken
//! from the file header) plus row-major [`Value`] storage. Ticket semantics are layered on top
//! through [`TicketField`], which maps each canonical field onto its header name so callers
//! resolve a column once and get a typed `Option<usize>` back instead of failing lookups.

use std::borrow::Cow;

use chrono::NaiveDateTime;

/// Sentinel substituted for missing values in every non-date column.
pub const NOT_INFORMED: &str = "Não informado";

/// Text rendering used for date values (CSV export, grouping, equality on text).
pub const DATETIME_TEXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Free text, kept exactly as read.
    Utf8,
    /// Calendar date/time. Missing stays [`Value::Null`].
    DateTime,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of fields describing the table's columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Build an all-text schema from header names.
    pub fn from_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            headers
                .into_iter()
                .map(|h| Field::new(h, DataType::Utf8))
                .collect(),
        )
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` when there are no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// True-missing value.
    Null,
    /// Text.
    Utf8(String),
    /// Parsed date/time.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Convenience constructor for text cells.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Utf8(s.into())
    }

    /// `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text form of the cell; `None` for [`Value::Null`].
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Utf8(s) => Some(Cow::Borrowed(s.as_str())),
            Self::DateTime(dt) => Some(Cow::Owned(dt.format(DATETIME_TEXT_FORMAT).to_string())),
        }
    }

    /// Text form with `Null` rendered as the empty string.
    pub fn to_text(&self) -> String {
        self.as_text().map(Cow::into_owned).unwrap_or_default()
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// The "awaiting input" table: no columns, no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// `true` when the table has no rows (with or without columns).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a canonical ticket field, if the table carries it.
    pub fn column(&self, field: TicketField) -> Option<usize> {
        self.schema.index_of(field.header())
    }

    /// Cell at `(row, col)`, if both are in range.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }
}

/// Canonical ticket fields and the header each one is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketField {
    /// Service order number (`OrdemDeServico`).
    OrderId,
    /// Equipment serial number (`NumeroSerie`).
    SerialNumber,
    /// Whether a part was used (`ComPeca`).
    HasPart,
    /// Ticket type (`TipoOS`); the "type" filter dimension.
    OrderType,
    /// Client identifier (`IdCliente`).
    ClientId,
    /// Client municipality (`Municipio`).
    Municipality,
    /// Region / state code (`Uf`); the "region" filter dimension.
    State,
    /// Free-text ticket status (`StatusDaOS`); the "status" filter dimension.
    Status,
    /// When the ticket was opened (`DataDeAbertura`).
    OpenedAt,
    /// First technician response (`DataPrimeiroAtendimento`); start of the duration.
    FirstResponseAt,
    /// When the ticket was closed (`DataDeFechamento`); end of the duration.
    ClosedAt,
    /// SLA-met token (`SLADeSolucaoAtendido`).
    SlaMet,
    /// Client remark (`ObservacaoDoCliente`).
    ClientRemark,
}

impl TicketField {
    /// Every field, in export column order.
    pub const ALL: [TicketField; 13] = [
        Self::OrderId,
        Self::SerialNumber,
        Self::HasPart,
        Self::OrderType,
        Self::ClientId,
        Self::Municipality,
        Self::State,
        Self::Status,
        Self::OpenedAt,
        Self::FirstResponseAt,
        Self::ClosedAt,
        Self::SlaMet,
        Self::ClientRemark,
    ];

    /// Columns coerced to dates by the normalizer.
    pub const NORMALIZED_DATES: [TicketField; 2] = [Self::OpenedAt, Self::ClosedAt];

    /// Header name of this field in the ticket export.
    pub fn header(self) -> &'static str {
        match self {
            Self::OrderId => "OrdemDeServico",
            Self::SerialNumber => "NumeroSerie",
            Self::HasPart => "ComPeca",
            Self::OrderType => "TipoOS",
            Self::ClientId => "IdCliente",
            Self::Municipality => "Municipio",
            Self::State => "Uf",
            Self::Status => "StatusDaOS",
            Self::OpenedAt => "DataDeAbertura",
            Self::FirstResponseAt => "DataPrimeiroAtendimento",
            Self::ClosedAt => "DataDeFechamento",
            Self::SlaMet => "SLADeSolucaoAtendido",
            Self::ClientRemark => "ObservacaoDoCliente",
        }
    }
}

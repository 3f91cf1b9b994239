use chrono::NaiveDateTime;

use crate::reports::ReportKind;

/// A single cell as read from a worksheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
    Bool(bool),
    Empty,
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
    Date,
}

impl ColumnKind {
    /// Numeric if every non-empty cell is a number, Date if every non-empty
    /// cell is a date, Text otherwise. An all-empty column counts as numeric.
    pub fn infer(values: &[Value]) -> Self {
        let mut cells = values.iter().filter(|v| !v.is_empty()).peekable();
        if cells.peek().is_none() {
            return ColumnKind::Numeric;
        }
        let mut numeric = true;
        let mut date = true;
        for v in cells {
            numeric &= matches!(v, Value::Number(_));
            date &= matches!(v, Value::Date(_));
        }
        if numeric {
            ColumnKind::Numeric
        } else if date {
            ColumnKind::Date
        } else {
            ColumnKind::Text
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Text => "text",
            ColumnKind::Date => "date",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        let kind = ColumnKind::infer(&values);
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn numbers(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, values.iter().map(|v| Value::Number(*v)).collect())
    }

    pub fn texts(name: impl Into<String>, values: &[&str]) -> Self {
        Self::new(name, values.iter().map(|v| Value::Text(v.to_string())).collect())
    }
}

/// Ordered, named columns aligned by row. `index` carries the source row
/// label of each row so filtered subsets keep their source positions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<Column>,
    pub index: Vec<usize>,
}

impl Table {
    /// Build from columns; shorter columns are padded with `Empty`.
    pub fn new(mut columns: Vec<Column>) -> Self {
        let rows = columns.iter().map(|c| c.values.len()).max().unwrap_or(0);
        for col in &mut columns {
            col.values.resize(rows, Value::Empty);
        }
        Self {
            columns,
            index: (0..rows).collect(),
        }
    }

    /// Build from a header row and row-major cell data.
    pub fn from_rows(header: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let mut data: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); header.len()];
        for row in rows {
            let mut cells = row.into_iter();
            for col in data.iter_mut() {
                col.push(cells.next().unwrap_or(Value::Empty));
            }
        }
        let columns = header
            .into_iter()
            .zip(data)
            .map(|(name, values)| Column::new(name, values))
            .collect();
        Self::new(columns)
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Numeric)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Names from `required` that this table does not have.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.column(name).is_none())
            .map(|name| name.to_string())
            .collect()
    }

    pub fn index_labels(&self) -> Vec<String> {
        self.index.iter().map(|i| i.to_string()).collect()
    }

    /// Append a column, replacing any existing column with the same name.
    pub fn with_column(mut self, mut column: Column) -> Self {
        column.values.resize(self.row_count(), Value::Empty);
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        self
    }

    /// Sub-table with the named columns in the given order; unknown names are dropped.
    pub fn select(&self, names: &[&str]) -> Table {
        Table {
            columns: names
                .iter()
                .filter_map(|n| self.column(n).cloned())
                .collect(),
            index: self.index.clone(),
        }
    }

    /// Keep rows where `keep(row_position)` is true.
    pub fn filter_rows(&self, keep: impl Fn(usize) -> bool) -> Table {
        let positions: Vec<usize> = (0..self.row_count()).filter(|&i| keep(i)).collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                kind: c.kind,
                values: positions.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        Table {
            columns,
            index: positions.iter().map(|&i| self.index[i]).collect(),
        }
    }
}

/// One named tab of a workbook with its report kind resolved at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub kind: ReportKind,
    pub table: Table,
}

impl Sheet {
    pub fn new(name: impl Into<String>, table: Table) -> Self {
        let name = name.into();
        let kind = ReportKind::from_sheet_name(&name);
        Self { name, kind, table }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }
}

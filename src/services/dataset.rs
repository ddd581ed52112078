use chrono::NaiveDate;
use std::collections::BTreeSet;

pub const COL_CLIENT: &str = "Código Cliente";
pub const COL_DATE: &str = "Data da Operação";
pub const COL_STRUCTURE: &str = "Ação da Estrutura";
pub const COL_COMMISSION: &str = "Comissão Gerada";
pub const COL_ADVISOR: &str = "Assessor";
pub const COL_STATUS: &str = "Status";

pub const COL_BMF: &str = "Comissão BMF";
pub const COL_BOV: &str = "Comissão BOV";
pub const COL_TOTAL_REVENUE: &str = "Receita Total";
pub const COL_ADVISOR_CODE: &str = "Código Assessor";
pub const COL_CHANNEL: &str = "Canal";
pub const COL_GROSS: &str = "Corretagem Bruta";
pub const COL_NET: &str = "Corretagem Líquida";
pub const COL_OFFICE: &str = "Receita Escritório";
pub const COL_DESK: &str = "Receita da Mesa";

/// Only fully executed operations are retained from the products sheet.
pub const STATUS_EXECUTED: &str = "Totalmente Executado";

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Date(NaiveDate),
    Empty,
}

impl Value {
    /// Raw string form, used for filter matching and option lists.
    pub fn as_text(&self) -> String {
        match self {
            Value::Number(n) => n.to_string(),
            Value::Text(s) => s.clone(),
            Value::Date(d) => d.to_string(),
            Value::Empty => String::new(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// An ordered, column-labelled table. Immutable after ingestion except for
/// the derived-column augmentation on the brokerage sheet; filtering always
/// produces a new, narrower dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.as_str() == name)
    }

    /// Required columns absent from this dataset, in required-list order.
    /// Empty means the schema is valid.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(|name| name.to_string())
            .collect()
    }

    /// Sorted, duplicate-free values observed in one column.
    pub fn distinct_values(&self, column: &str) -> Vec<String> {
        let Some(idx) = self.column_index(column) else {
            return Vec::new();
        };
        let values: BTreeSet<String> = self
            .rows
            .iter()
            .filter_map(|row| row.get(idx))
            .filter(|value| !matches!(value, Value::Empty))
            .map(Value::as_text)
            .collect();
        values.into_iter().collect()
    }

    pub fn sum_numeric(&self, column: &str) -> f64 {
        let Some(idx) = self.column_index(column) else {
            return 0.0;
        };
        self.rows
            .iter()
            .filter_map(|row| row.get(idx))
            .filter_map(Value::as_number)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    Produtos,
    Corretagem,
}

impl DatasetKind {
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "produtos" => Some(DatasetKind::Produtos),
            "corretagem" => Some(DatasetKind::Corretagem),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DatasetKind::Produtos => "Produtos Estruturados",
            DatasetKind::Corretagem => "Corretagem",
        }
    }

    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::Produtos => &[
                COL_CLIENT,
                COL_DATE,
                COL_STRUCTURE,
                COL_COMMISSION,
                COL_ADVISOR,
                COL_STATUS,
            ],
            DatasetKind::Corretagem => &[
                COL_CLIENT,
                COL_DATE,
                COL_BMF,
                COL_BOV,
                COL_TOTAL_REVENUE,
                COL_ADVISOR_CODE,
                COL_CHANNEL,
            ],
        }
    }

    pub fn filter_columns(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::Produtos => &[COL_ADVISOR, COL_CLIENT],
            DatasetKind::Corretagem => &[COL_ADVISOR_CODE, COL_CLIENT, COL_CHANNEL],
        }
    }

    pub fn currency_columns(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::Produtos => &[COL_COMMISSION],
            DatasetKind::Corretagem => &[
                COL_BMF,
                COL_BOV,
                COL_TOTAL_REVENUE,
                COL_GROSS,
                COL_NET,
                COL_OFFICE,
                COL_DESK,
            ],
        }
    }

    pub fn date_columns(&self) -> &'static [&'static str] {
        &[COL_DATE]
    }

    pub fn summary_column(&self) -> &'static str {
        match self {
            DatasetKind::Produtos => COL_COMMISSION,
            DatasetKind::Corretagem => COL_DESK,
        }
    }

    pub fn summary_label(&self) -> &'static str {
        match self {
            DatasetKind::Produtos => "Total Comissão Gerada",
            DatasetKind::Corretagem => "Total Receita da Mesa",
        }
    }

    pub fn export_stem(&self) -> &'static str {
        match self {
            DatasetKind::Produtos => "produtos_filtrados",
            DatasetKind::Corretagem => "corretagem_filtrada",
        }
    }
}

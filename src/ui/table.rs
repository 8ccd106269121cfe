use tabled::{settings::Style, Table, Tabled};

use crate::store::TableStat;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Table")]
    pub name: String,
    #[tabled(rename = "Rows")]
    pub rows: u64,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, name: &str, rows: u64) {
        self.rows.push(TableRow {
            name: name.to_string(),
            rows,
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

/// Rounded table of table names and row counts
pub fn tables_table(stats: &[TableStat]) -> String {
    let mut builder = TableBuilder::new();
    for stat in stats {
        builder.add_row(&stat.name, stat.rows);
    }
    builder.build()
}

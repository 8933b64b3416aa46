use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;

use crate::ast::quote::quote_ident;
use crate::ast::Expr;

/// Top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Projection and filter over one source
    ///
    /// # Example
    /// ```text
    /// SELECT * FROM records WHERE RNAME = 'chr1' AND POS > 100
    /// ```
    Select(SelectStatement),
}

impl Statement {
    pub fn as_select(&self) -> &SelectStatement {
        match self {
            Statement::Select(select) => select,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select(select) => write!(f, "{}", select),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub fields: Fields,
    pub source: Table,
    pub condition: Option<Expr>,
}

impl SelectStatement {
    /// Output column names: aliases first, then derived names with `_N`
    /// suffixes to keep every column distinct.
    pub fn column_names(&self) -> Vec<String> {
        let mut columns: Vec<Option<String>> =
            self.fields.iter().map(|field| field.alias.clone()).collect();
        let mut seen: HashMap<String, usize> = HashMap::new();
        for alias in columns.iter().flatten() {
            seen.insert(alias.clone(), 1);
        }

        for (column, field) in columns.iter_mut().zip(self.fields.iter()) {
            if column.is_some() {
                continue;
            }
            let mut name = field.expr.name();
            if let Some(&start) = seen.get(&name) {
                let mut count = start;
                loop {
                    let resolved = format!("{}_{}", name, count);
                    if !seen.contains_key(&resolved) {
                        seen.insert(name, count + 1);
                        name = resolved;
                        break;
                    }
                    count += 1;
                }
            }
            *seen.entry(name.clone()).or_insert(0) += 1;
            *column = Some(name);
        }

        columns.into_iter().flatten().collect()
    }
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM {}", self.fields, self.source)?;
        if let Some(condition) = &self.condition {
            write!(f, " WHERE {}", condition)?;
        }
        Ok(())
    }
}

/// One projected expression with an optional `AS` alias.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl Field {
    pub fn new(expr: Expr) -> Self {
        Field { expr, alias: None }
    }

    pub fn name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.expr.name(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {}", quote_ident(alias))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fields(pub Vec<Field>);

impl Fields {
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(Field::name).collect()
    }
}

impl Deref for Fields {
    type Target = [Field];

    fn deref(&self) -> &[Field] {
        &self.0
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}

/// Source named in `FROM`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote_ident(&self.name))
    }
}

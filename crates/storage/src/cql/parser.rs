//! Parser for the CQL subset understood by the in-memory store
//!
//! Supported statements:
//! - `CREATE KEYSPACE [IF NOT EXISTS] ks WITH replication = {...} [AND ...]`
//! - `CREATE TABLE [IF NOT EXISTS] [ks.]t (col type [PRIMARY KEY], ... [, PRIMARY KEY (col)])`
//! - `ALTER TABLE [ks.]t ADD col type`
//! - `INSERT INTO [ks.]t (col, ...) VALUES (?, ...)`

use std::collections::BTreeMap;

use eventsink_core::{Column, ColumnType, StoreError, StoreResult};

use super::lexer::{tokenize, Token};

/// Possibly keyspace-qualified table name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    /// Explicit keyspace, if qualified
    pub keyspace: Option<String>,
    /// Table name
    pub table: String,
}

/// A parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `CREATE KEYSPACE`
    CreateKeyspace {
        /// Keyspace name
        name: String,
        /// `IF NOT EXISTS` present
        if_not_exists: bool,
        /// Replication options
        replication: BTreeMap<String, String>,
    },
    /// `CREATE TABLE`
    CreateTable {
        /// Target table
        table: TableRef,
        /// `IF NOT EXISTS` present
        if_not_exists: bool,
        /// Columns in declared order
        columns: Vec<Column>,
        /// Primary key column
        primary_key: String,
    },
    /// `ALTER TABLE ... ADD`
    AlterTableAdd {
        /// Target table
        table: TableRef,
        /// Added column
        column: Column,
    },
    /// `INSERT INTO ... VALUES (?, ...)`
    Insert {
        /// Target table
        table: TableRef,
        /// Bound columns in marker order
        columns: Vec<String>,
    },
}

/// Parse a single statement; a trailing `;` is optional.
///
/// # Errors
///
/// Returns [`StoreError::Syntax`] for anything outside the subset.
pub fn parse(cql: &str) -> StoreResult<Statement> {
    let tokens = tokenize(cql)?;
    let mut parser = Parser { tokens, pos: 0 };
    let statement = parser.statement()?;
    parser.eat_symbol(';');
    if let Some(token) = parser.peek() {
        return Err(syntax(format!(
            "unexpected trailing input at '{}'",
            token.describe()
        )));
    }
    Ok(statement)
}

fn syntax(message: String) -> StoreError {
    StoreError::Syntax(message)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.peek().map_or(false, |t| t.is_keyword(kw)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, kw: &str) -> StoreResult<()> {
        if self.eat_keyword(kw) {
            Ok(())
        } else {
            Err(self.unexpected(&kw.to_ascii_uppercase()))
        }
    }

    fn eat_symbol(&mut self, symbol: char) -> bool {
        if self.peek() == Some(&Token::Symbol(symbol)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: char) -> StoreResult<()> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", symbol)))
        }
    }

    fn unexpected(&self, expected: &str) -> StoreError {
        match self.peek() {
            Some(token) => syntax(format!(
                "expected {} but found '{}'",
                expected,
                token.describe()
            )),
            None => syntax(format!("expected {} but input ended", expected)),
        }
    }

    fn identifier(&mut self) -> StoreResult<String> {
        match self.peek() {
            Some(Token::Ident { text, .. }) => {
                let text = text.clone();
                self.pos += 1;
                Ok(text)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn table_ref(&mut self) -> StoreResult<TableRef> {
        let first = self.identifier()?;
        if self.eat_symbol('.') {
            let table = self.identifier()?;
            Ok(TableRef {
                keyspace: Some(first),
                table,
            })
        } else {
            Ok(TableRef {
                keyspace: None,
                table: first,
            })
        }
    }

    fn if_not_exists(&mut self) -> StoreResult<bool> {
        if self.eat_keyword("if") {
            self.expect_keyword("not")?;
            self.expect_keyword("exists")?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn statement(&mut self) -> StoreResult<Statement> {
        if self.eat_keyword("create") {
            if self.eat_keyword("keyspace") {
                self.create_keyspace()
            } else if self.eat_keyword("table") {
                self.create_table()
            } else {
                Err(self.unexpected("KEYSPACE or TABLE"))
            }
        } else if self.eat_keyword("alter") {
            self.expect_keyword("table")?;
            self.alter_table()
        } else if self.eat_keyword("insert") {
            self.expect_keyword("into")?;
            self.insert()
        } else {
            Err(self.unexpected("CREATE, ALTER or INSERT"))
        }
    }

    fn create_keyspace(&mut self) -> StoreResult<Statement> {
        let if_not_exists = self.if_not_exists()?;
        let name = self.identifier()?;
        self.expect_keyword("with")?;

        let mut replication = BTreeMap::new();
        loop {
            let property = self.identifier()?;
            self.expect_symbol('=')?;
            if property == "replication" {
                replication = self.string_map()?;
            } else {
                // durable_writes and friends are accepted and ignored
                self.next();
            }
            if !self.eat_keyword("and") {
                break;
            }
        }

        if !replication.contains_key("class") {
            return Err(StoreError::Rejected(format!(
                "missing replication class for keyspace {}",
                name
            )));
        }

        Ok(Statement::CreateKeyspace {
            name,
            if_not_exists,
            replication,
        })
    }

    fn string_map(&mut self) -> StoreResult<BTreeMap<String, String>> {
        let mut map = BTreeMap::new();
        self.expect_symbol('{')?;
        if self.eat_symbol('}') {
            return Ok(map);
        }
        loop {
            let key = self.literal()?;
            self.expect_symbol(':')?;
            let value = self.literal()?;
            map.insert(key, value);
            if self.eat_symbol('}') {
                return Ok(map);
            }
            self.expect_symbol(',')?;
        }
    }

    fn literal(&mut self) -> StoreResult<String> {
        match self.peek() {
            Some(Token::Str(s)) | Some(Token::Number(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            _ => Err(self.unexpected("literal")),
        }
    }

    fn create_table(&mut self) -> StoreResult<Statement> {
        let if_not_exists = self.if_not_exists()?;
        let table = self.table_ref()?;
        self.expect_symbol('(')?;

        let mut columns = Vec::new();
        let mut primary_key: Option<String> = None;
        loop {
            if self.eat_keyword("primary") {
                self.expect_keyword("key")?;
                self.expect_symbol('(')?;
                let key = self.identifier()?;
                if self.peek() == Some(&Token::Symbol(',')) {
                    return Err(StoreError::Rejected(
                        "compound primary keys are not supported".to_string(),
                    ));
                }
                self.expect_symbol(')')?;
                if primary_key.replace(key).is_some() {
                    return Err(StoreError::Rejected(
                        "multiple primary keys declared".to_string(),
                    ));
                }
            } else {
                let name = self.identifier()?;
                let column_type = self.column_type()?;
                if self.eat_keyword("primary") {
                    self.expect_keyword("key")?;
                    if primary_key.replace(name.clone()).is_some() {
                        return Err(StoreError::Rejected(
                            "multiple primary keys declared".to_string(),
                        ));
                    }
                }
                if columns.iter().any(|c: &Column| c.name == name) {
                    return Err(StoreError::Rejected(format!(
                        "duplicate column {}",
                        name
                    )));
                }
                columns.push(Column::new(name, column_type));
            }
            if self.eat_symbol(')') {
                break;
            }
            self.expect_symbol(',')?;
        }

        let primary_key = primary_key.ok_or_else(|| {
            StoreError::Rejected(format!("no primary key declared for {}", table.table))
        })?;
        if !columns.iter().any(|c| c.name == primary_key) {
            return Err(StoreError::Rejected(format!(
                "unknown primary key column {}",
                primary_key
            )));
        }

        Ok(Statement::CreateTable {
            table,
            if_not_exists,
            columns,
            primary_key,
        })
    }

    fn column_type(&mut self) -> StoreResult<ColumnType> {
        let name = self.identifier()?;
        if !self.eat_symbol('<') {
            return Ok(ColumnType::scalar(&name));
        }
        let mut args = vec![self.column_type()?];
        while self.eat_symbol(',') {
            args.push(self.column_type()?);
        }
        self.expect_symbol('>')?;

        let mut args = args.into_iter();
        let column_type = match (name.as_str(), args.len()) {
            ("set", 1) => args.next().map(ColumnType::set_of),
            ("list", 1) => args.next().map(ColumnType::list_of),
            ("map", 2) => match (args.next(), args.next()) {
                (Some(k), Some(v)) => Some(ColumnType::map_of(k, v)),
                _ => None,
            },
            ("frozen", 1) => args.next(),
            _ => {
                let rendered: Vec<String> = args.map(|a| a.to_string()).collect();
                Some(ColumnType::Other(format!("{}<{}>", name, rendered.join(","))))
            }
        };
        column_type.ok_or_else(|| syntax(format!("malformed type arguments for {}", name)))
    }

    fn alter_table(&mut self) -> StoreResult<Statement> {
        let table = self.table_ref()?;
        self.expect_keyword("add")?;
        let name = self.identifier()?;
        let column_type = self.column_type()?;
        Ok(Statement::AlterTableAdd {
            table,
            column: Column::new(name, column_type),
        })
    }

    fn insert(&mut self) -> StoreResult<Statement> {
        let table = self.table_ref()?;
        self.expect_symbol('(')?;
        let mut columns = vec![self.identifier()?];
        while self.eat_symbol(',') {
            columns.push(self.identifier()?);
        }
        self.expect_symbol(')')?;

        self.expect_keyword("values")?;
        self.expect_symbol('(')?;
        let mut markers = 0usize;
        loop {
            match self.next() {
                Some(Token::Marker) => markers += 1,
                Some(other) => {
                    return Err(syntax(format!(
                        "only bind markers are supported in VALUES, found '{}'",
                        other.describe()
                    )))
                }
                None => return Err(syntax("expected '?' but input ended".to_string())),
            }
            if self.eat_symbol(')') {
                break;
            }
            self.expect_symbol(',')?;
        }

        if markers != columns.len() {
            return Err(StoreError::Rejected(format!(
                "{} columns but {} bind markers",
                columns.len(),
                markers
            )));
        }

        Ok(Statement::Insert { table, columns })
    }
}

//! Placeholder and identifier quoting rules per SQL backend family.
//!
//! A [`Dialect`] is a stateless `Copy` value passed explicitly at every
//! boundary — there is no process-wide default. It determines three things:
//! the placeholder token at a given index, the identifier quote pair, and
//! whether placeholder indices run sequentially through the statement.

use crate::error::{DbError, DbResult};
use std::fmt;
use std::fmt::Write;

/// The placeholder/quoting convention of a SQL backend family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    MySql,
    Postgres,
    Oracle,
    SqlServer,
    /// Positional `?` placeholders with double-quoted identifiers.
    #[default]
    Sqlite,
}

impl Dialect {
    /// Map a driver identifier to its dialect.
    ///
    /// Recognizes the alias spellings `oci8` (Oracle) and `mssql` (SQL Server).
    pub fn from_driver(driver: &str) -> Option<Self> {
        match driver {
            "mysql" => Some(Self::MySql),
            "postgres" => Some(Self::Postgres),
            "oracle" | "oci8" => Some(Self::Oracle),
            "sqlserver" | "mssql" => Some(Self::SqlServer),
            "sqlite3" | "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Whether placeholders consume a global running index.
    ///
    /// Numbered dialects render `$1, $2, ...`-style tokens; positional
    /// dialects repeat the same literal token for every placeholder.
    pub fn numbered(self) -> bool {
        matches!(self, Self::Postgres | Self::Oracle | Self::SqlServer)
    }

    /// Render the placeholder token at `index`.
    ///
    /// `index` is 1-based: the first placeholder of a statement is index 1.
    /// Positional dialects ignore the index.
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Self::MySql | Self::Sqlite => "?".to_string(),
            Self::Postgres => format!("${index}"),
            Self::Oracle => format!(":{index}"),
            Self::SqlServer => format!("@p{index}"),
        }
    }

    /// Render `count` comma-joined placeholder tokens starting at `start`.
    ///
    /// `start` is 1-based; a caller that already bound N arguments passes
    /// `N + 1`. Numbered dialects produce strictly increasing indices,
    /// positional dialects repeat the fixed token. A zero-length run is a
    /// usage error.
    pub fn placeholder_run(self, start: usize, count: usize) -> DbResult<String> {
        if count == 0 {
            return Err(DbError::Unsupported(
                "placeholder run of length zero".to_string(),
            ));
        }
        let mut out = String::new();
        for i in 0..count {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(&mut out, "{}", self.placeholder(start + i));
        }
        Ok(out)
    }

    /// Quote an identifier with the dialect's quote pair.
    pub fn quote(self, ident: &str) -> String {
        let (left, right) = self.quote_pair();
        format!("{left}{ident}{right}")
    }

    /// The left/right identifier quote characters.
    pub fn quote_pair(self) -> (char, char) {
        match self {
            Self::MySql => ('`', '`'),
            Self::SqlServer => ('[', ']'),
            Self::Postgres | Self::Oracle | Self::Sqlite => ('"', '"'),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
            Self::Oracle => "oracle",
            Self::SqlServer => "sqlserver",
            Self::Sqlite => "sqlite3",
        };
        f.write_str(name)
    }
}

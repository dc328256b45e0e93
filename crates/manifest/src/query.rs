//! Parameterized queries against the manifest.
//!
//! Query text uses named placeholder tokens delimited by colons on both sides
//! (`:file_id:`). Binding a value never touches the query text: when the query
//! runs, every token occurrence is swapped for a positional `?` parameter and
//! the bound values are handed to the driver separately. There is nothing to
//! escape, so quotes, backslashes, newlines and NUL bytes in values are inert.

use exn::ResultExt;
use futures::{StreamExt, TryStreamExt};
use sqlx::Sqlite;
use std::borrow::Cow;
use tracing::instrument;

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{Decoded, ManifestRecord, RecordRow};

/// Sentinel character that must delimit a placeholder token on both sides.
const TOKEN_DELIMITER: char = ':';

/// How many rows a query should materialize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchMode {
    /// At most one row.
    One,
    /// At most the given number of rows.
    Many(usize),
    /// Every matching row.
    All,
}

/// A value bound to a placeholder token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Param {
    Text(String),
    Integer(i64),
}
impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// Query text rewritten to positional parameters, with the values in the
/// order the driver expects them.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Compiled<'a> {
    pub(crate) sql: String,
    pub(crate) params: Vec<&'a Param>,
}

/// Apply compiled parameters, in order, to any sqlx query type.
macro_rules! bind_params {
    ($query:expr, $params:expr) => {{
        let mut query = $query;
        for param in $params {
            query = match param {
                Param::Text(value) => query.bind(value.as_str()),
                Param::Integer(value) => query.bind(*value),
            };
        }
        query
    }};
}
pub(crate) use bind_params;

/// A query with named placeholder tokens and the values bound to them.
///
/// # Examples
///
/// ```no_run
/// use unback_manifest::{Database, FetchMode, Query};
/// # async fn example(db: &Database) -> unback_manifest::error::Result<()> {
/// let records = Query::new("SELECT fileID, domain, relativePath, flags, file FROM files WHERE domain = :domain:")
///     .bind(":domain:", "HomeDomain")?
///     .execute(db, FetchMode::All)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Query {
    sql: Cow<'static, str>,
    bindings: Vec<(String, Param)>,
}

impl Query {
    pub fn new(sql: impl Into<Cow<'static, str>>) -> Self {
        let sql = sql.into();
        tracing::trace!(%sql, "loading query");
        Self { sql, bindings: Vec::new() }
    }

    /// Bind a value to a placeholder token.
    ///
    /// # Errors
    /// - [`UnsafeToken`](ErrorKind::UnsafeToken) if the token is not of the
    ///   form `:name:` (ASCII alphanumerics and underscores only).
    /// - [`UnknownToken`](ErrorKind::UnknownToken) if the token does not
    ///   appear in the query text.
    /// - [`DuplicateToken`](ErrorKind::DuplicateToken) if the token already
    ///   has a value.
    pub fn bind(mut self, token: impl Into<String>, value: impl Into<Param>) -> Result<Self> {
        let token = token.into();
        if !is_safe_token(&token) {
            exn::bail!(ErrorKind::UnsafeToken(token));
        }
        if !self.sql.contains(token.as_str()) {
            exn::bail!(ErrorKind::UnknownToken(token));
        }
        if self.bindings.iter().any(|(bound, _)| *bound == token) {
            exn::bail!(ErrorKind::DuplicateToken(token));
        }
        self.bindings.push((token, value.into()));
        Ok(self)
    }

    /// Rewrite every bound token occurrence to a positional `?` parameter.
    ///
    /// Where two tokens could match at the same offset, the longer one wins.
    pub(crate) fn compile(&self) -> Compiled<'_> {
        let mut sql = String::with_capacity(self.sql.len());
        let mut params = Vec::new();
        let mut rest: &str = &self.sql;
        loop {
            let next = self
                .bindings
                .iter()
                .filter_map(|(token, param)| rest.find(token.as_str()).map(|at| (at, token, param)))
                .min_by(|(a, ta, _), (b, tb, _)| a.cmp(b).then(tb.len().cmp(&ta.len())));
            match next {
                Some((at, token, param)) => {
                    sql.push_str(&rest[..at]);
                    sql.push('?');
                    params.push(param);
                    rest = &rest[at + token.len()..];
                },
                None => {
                    sql.push_str(rest);
                    break;
                },
            }
        }
        Compiled { sql, params }
    }

    /// Run the query and decode the rows as manifest records.
    ///
    /// The query must select `fileID, domain, relativePath, flags, file`.
    /// Each row is decoded on its own: a row with undecodable text comes back
    /// as an [`Undecodable`](crate::Undecodable) entry in place.
    ///
    /// # Errors
    /// Returns [`Query`](ErrorKind::Query) if the statement fails. A query
    /// that matches no rows is *not* an error, it returns an empty [`Vec`].
    #[instrument(level = "debug", skip_all, fields(mode = ?mode))]
    pub async fn execute(&self, db: &Database, mode: FetchMode) -> Result<Vec<Decoded>> {
        let compiled = self.compile();
        let query = bind_params!(sqlx::query_as::<Sqlite, RecordRow>(&compiled.sql), compiled.params);
        let rows: Vec<RecordRow> = match mode {
            FetchMode::One => query.fetch_optional(db.pool()).await.map(|row| row.into_iter().collect()),
            FetchMode::Many(limit) => query.fetch(db.pool()).take(limit).try_collect().await,
            FetchMode::All => query.fetch_all(db.pool()).await,
        }
        .or_raise(|| ErrorKind::Query)?;
        Ok(rows.into_iter().map(ManifestRecord::try_from).collect())
    }
}

fn is_safe_token(token: &str) -> bool {
    token
        .strip_prefix(TOKEN_DELIMITER)
        .and_then(|t| t.strip_suffix(TOKEN_DELIMITER))
        .is_some_and(|name| !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{Fixture, Row};
    use rstest::rstest;

    const SELECT: &str = "SELECT fileID, domain, relativePath, flags, file FROM files";

    #[rstest]
    #[case(":domain:")]
    #[case(":file_id:")]
    #[case(":a1:")]
    fn test_safe_tokens(#[case] token: &str) {
        assert!(is_safe_token(token));
    }

    #[rstest]
    #[case("domain")]
    #[case(":domain")]
    #[case("domain:")]
    #[case("::")]
    #[case(":")]
    #[case(":do main:")]
    #[case(":dom'ain:")]
    #[case(":a:b:")]
    fn test_unsafe_tokens(#[case] token: &str) {
        assert!(!is_safe_token(token));
        let err = Query::new(format!("{SELECT} WHERE domain = {token}")).bind(token, "x").unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsafeToken(_)));
        assert!(err.is_usage_error());
    }

    #[test]
    fn test_unknown_token() {
        let err = Query::new(SELECT).bind(":domain:", "x").unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnknownToken(_)));
    }

    #[test]
    fn test_duplicate_token() {
        let query = Query::new(format!("{SELECT} WHERE domain = :domain:")).bind(":domain:", "a").unwrap();
        let err = query.bind(":domain:", "b").unwrap_err();
        assert!(matches!(&*err, ErrorKind::DuplicateToken(_)));
    }

    #[test]
    fn test_compile_positional() {
        let query = Query::new("SELECT * FROM files WHERE domain = :domain: AND flags = :flags: OR domain = :domain:")
            .bind(":flags:", 1_i64)
            .unwrap()
            .bind(":domain:", "HomeDomain")
            .unwrap();
        let compiled = query.compile();
        assert_eq!(compiled.sql, "SELECT * FROM files WHERE domain = ? AND flags = ? OR domain = ?");
        let home = Param::from("HomeDomain");
        assert_eq!(compiled.params, vec![&home, &Param::Integer(1), &home]);
    }

    #[test]
    fn test_compile_prefers_longest_token() {
        let query = Query::new("SELECT :a_b: , :a:")
            .bind(":a:", 1_i64)
            .unwrap()
            .bind(":a_b:", 2_i64)
            .unwrap();
        let compiled = query.compile();
        assert_eq!(compiled.sql, "SELECT ? , ?");
        assert_eq!(compiled.params, vec![&Param::Integer(2), &Param::Integer(1)]);
    }

    #[rstest]
    #[case("x' OR '1'='1")]
    #[case("x\\' OR 1=1 --")]
    #[case("x\"; DROP TABLE files; --")]
    #[case("line\nbreak")]
    #[case("carriage\rreturn")]
    #[case("nul\0byte")]
    #[tokio::test]
    async fn test_values_cannot_alter_query(#[case] hostile: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = Fixture::new()
            .row(Row::file("aa01", "HomeDomain", "a.txt"))
            .row(Row::file("bb02", hostile, "b.txt"))
            .write(dir.path())
            .await
            .unwrap();
        let db = Database::connect(&path).await.unwrap();
        let records = Query::new(format!("{SELECT} WHERE domain = :domain:"))
            .bind(":domain:", hostile)
            .unwrap()
            .execute(&db, FetchMode::All)
            .await
            .unwrap();
        // Exactly the one row whose domain *is* the hostile string.
        assert_eq!(records.len(), 1);
        let record = records[0].as_ref().unwrap();
        assert_eq!(record.file_id, "bb02");
        assert_eq!(record.domain_group, hostile);
        db.close().await;
    }

    #[rstest]
    #[case(FetchMode::One, 1)]
    #[case(FetchMode::Many(2), 2)]
    #[case(FetchMode::Many(10), 3)]
    #[case(FetchMode::All, 3)]
    #[tokio::test]
    async fn test_fetch_modes(#[case] mode: FetchMode, #[case] expected: usize) {
        let dir = tempfile::tempdir().unwrap();
        let path = Fixture::new()
            .row(Row::file("aa01", "HomeDomain", "a.txt"))
            .row(Row::file("bb02", "HomeDomain", "b.txt"))
            .row(Row::file("cc03", "HomeDomain", "c.txt"))
            .write(dir.path())
            .await
            .unwrap();
        let db = Database::connect(&path).await.unwrap();
        let records = Query::new(SELECT).execute(&db, mode).await.unwrap();
        assert_eq!(records.len(), expected);
        db.close().await;
    }

    #[tokio::test]
    async fn test_zero_rows_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = Fixture::new().write(dir.path()).await.unwrap();
        let db = Database::connect(&path).await.unwrap();
        let records = Query::new(SELECT).execute(&db, FetchMode::All).await.unwrap();
        assert!(records.is_empty());
        let records = Query::new(SELECT).execute(&db, FetchMode::One).await.unwrap();
        assert!(records.is_empty());
        db.close().await;
    }

    #[tokio::test]
    async fn test_undecodable_row_does_not_fail_query() {
        let dir = tempfile::tempdir().unwrap();
        let path = Fixture::new()
            .row(Row::file("aa01", "HomeDomain", "bad.txt"))
            .row(Row::file("bb02", "HomeDomain", "good.txt"))
            .sql("UPDATE Files SET relativePath = CAST(X'66FF6F2E747874' AS TEXT) WHERE fileID = 'aa01'")
            .write(dir.path())
            .await
            .unwrap();
        let db = Database::connect(&path).await.unwrap();
        let records = Query::new(SELECT).execute(&db, FetchMode::All).await.unwrap();
        assert_eq!(records.len(), 2);
        let err = records[0].as_ref().unwrap_err();
        assert_eq!(err.file_id, "aa01");
        assert_eq!(err.column, "relativePath");
        assert_eq!(records[1].as_ref().unwrap().relative_path, "good.txt");
        db.close().await;
    }

    #[tokio::test]
    async fn test_failed_query_is_distinguishable() {
        let dir = tempfile::tempdir().unwrap();
        let path = Fixture::new().write(dir.path()).await.unwrap();
        let db = Database::connect(&path).await.unwrap();
        let err = Query::new("SELECT nonsense FROM nowhere").execute(&db, FetchMode::All).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Query));
        db.close().await;
    }
}

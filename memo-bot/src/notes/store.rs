use rusqlite::params;
use sea_query::{Expr, Iden, LikeExpr, Order, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_rusqlite::RusqliteBinder;

use crate::{
    db::{self, DB},
    Error, Result,
};

use super::{ExportGroups, NoteEntry, OwnerId, ValidationError};

#[derive(Iden)]
enum Notes {
    Table,
    Id,
    OwnerId,
    Tag,
    Content,
}

enum Filter {
    All,
    Tag(String),
    Keyword(String),
}

/// Per-owner note storage. Every operation is scoped to a single `owner_id`.
#[derive(Clone)]
pub struct NoteStore {
    db: DB,
}

impl NoteStore {
    pub fn new(db: DB) -> Self {
        Self { db }
    }

    pub async fn save(&self, owner_id: OwnerId, tag: &str, content: &str) -> Result<()> {
        if tag.trim().is_empty() {
            return Err(ValidationError::MissingTag.into());
        }
        if content.trim().is_empty() {
            return Err(ValidationError::EmptyContent.into());
        }

        let (tag, content) = (tag.to_owned(), content.to_owned());
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO notes (owner_id, tag, content) VALUES (?1, ?2, ?3)",
                    params![owner_id, tag, content],
                )?;
                Ok(())
            })
            .await
            .map_err(db::Error::from)
            .map_err(Error::from)
    }

    /// All notes of the owner in insertion order.
    pub async fn list(&self, owner_id: OwnerId) -> Result<Vec<NoteEntry>> {
        self.select(owner_id, Filter::All).await
    }

    pub async fn list_by_tag(&self, owner_id: OwnerId, tag: &str) -> Result<Vec<String>> {
        let notes = self.select(owner_id, Filter::Tag(tag.to_owned())).await?;
        Ok(notes.into_iter().map(|note| note.content).collect())
    }

    /// Case-insensitive substring match on the note content. `%` and `_` in the
    /// keyword match literally.
    pub async fn search(&self, owner_id: OwnerId, keyword: &str) -> Result<Vec<NoteEntry>> {
        self.select(owner_id, Filter::Keyword(keyword.to_owned())).await
    }

    pub async fn delete_by_tag(&self, owner_id: OwnerId, tag: &str) -> Result<usize> {
        let tag = tag.to_owned();
        self.db
            .call(move |conn| {
                let deleted = conn.execute(
                    "DELETE FROM notes WHERE owner_id = ?1 AND tag = ?2",
                    params![owner_id, tag],
                )?;
                Ok(deleted)
            })
            .await
            .map_err(db::Error::from)
            .map_err(Error::from)
    }

    pub async fn delete_all(&self, owner_id: OwnerId) -> Result<usize> {
        self.db
            .call(move |conn| Ok(conn.execute("DELETE FROM notes WHERE owner_id = ?1", params![owner_id])?))
            .await
            .map_err(db::Error::from)
            .map_err(Error::from)
    }

    pub async fn export_all(&self, owner_id: OwnerId) -> Result<ExportGroups> {
        let mut groups = ExportGroups::new();
        for NoteEntry { tag, content } in self.list(owner_id).await? {
            groups.entry(tag).or_default().push(content);
        }
        Ok(groups)
    }

    pub async fn ping(&self) -> Result<()> {
        self.db
            .call(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?))
            .await
            .map(|_| ())
            .map_err(db::Error::from)
            .map_err(Error::from)
    }

    async fn select(&self, owner_id: OwnerId, filter: Filter) -> Result<Vec<NoteEntry>> {
        let (sql, values) = select_notes(owner_id, filter).build_rusqlite(SqliteQueryBuilder);

        self.db
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let notes = stmt
                    .query_map(&*values.as_params(), |row| NoteEntry::try_from(row))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(notes)
            })
            .await
            .map_err(db::Error::from)
            .map_err(Error::from)
    }
}

fn select_notes(owner_id: OwnerId, filter: Filter) -> SelectStatement {
    let mut query = Query::select();
    query
        .columns([Notes::Tag, Notes::Content])
        .from(Notes::Table)
        .and_where(Expr::col(Notes::OwnerId).eq(owner_id));

    match filter {
        Filter::All => {}
        Filter::Tag(tag) => {
            query.and_where(Expr::col(Notes::Tag).eq(tag));
        }
        Filter::Keyword(keyword) => {
            let pattern = format!("%{}%", escape_like(&keyword));
            query.and_where(Expr::col(Notes::Content).like(LikeExpr::new(pattern).escape('\\')));
        }
    }

    query.order_by(Notes::Id, Order::Asc);
    query
}

fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

use crate::schema::todos;
use chrono::NaiveDateTime;
use diesel::{AsChangeset, Identifiable, Insertable, Queryable};
use serde::Serialize;

/// Represents a todo item in the database
#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Identifiable)]
#[diesel(table_name = todos)]
pub struct Todo {
    /// Unique identifier assigned by the database
    pub id: i32,
    /// Short title, never empty
    pub title: String,
    /// Optional free form description
    pub description: Option<String>,
    /// Whether the todo has been done
    pub completed: bool,
    /// Optional deadline (UTC)
    pub deadline_at: Option<NaiveDateTime>,
    /// Timestamp when the todo was created (UTC)
    pub created_at: NaiveDateTime,
    /// Timestamp when the todo was last updated (UTC)
    pub updated_at: NaiveDateTime,
}

/// Client supplied fields of a todo about to be created
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TodoDraft {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub deadline_at: Option<NaiveDateTime>,
}

/// Row written by `TodoRepository::insert`
#[derive(Debug, Insertable)]
#[diesel(table_name = todos)]
pub(crate) struct NewTodo<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub completed: bool,
    pub deadline_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Partial update of a todo.
///
/// `None` leaves a column untouched. For nullable columns `Some(None)`
/// clears the value.
#[derive(Debug, Clone, PartialEq, Default, AsChangeset)]
#[diesel(table_name = todos)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub deadline_at: Option<Option<NaiveDateTime>>,
}

/// Restrictions applied by `TodoRepository::list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TodoFilter {
    /// Only todos with this completion flag
    pub completed: Option<bool>,
    /// Only todos whose deadline is at most this many days from now
    pub window_days: Option<u64>,
}

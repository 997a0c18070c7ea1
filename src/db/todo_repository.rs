use crate::db::models::{NewTodo, Todo, TodoChanges, TodoDraft, TodoFilter};
use crate::errors::Error;
use crate::schema::todos;
use crate::utils::time;
use chrono::TimeDelta;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sqlite::SqliteConnection;

/// Repository for managing todo records in the SQLite database
pub struct TodoRepository<'a> {
    /// Database connection
    pub conn: &'a mut SqliteConnection,
}

impl<'a> TodoRepository<'a> {
    /// Creates a new TodoRepository instance
    ///
    /// # Arguments
    ///
    /// * `conn` - Mutable reference to SQLite database connection
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        TodoRepository { conn }
    }

    /// Retrieves all todos matching the filter, in insertion order
    ///
    /// An empty filter returns every todo. The window restriction keeps only
    /// todos that have a deadline no later than now plus `window_days`.
    ///
    /// # Errors
    ///
    /// Returns an Error if database operations fail
    pub fn list(&mut self, filter: &TodoFilter) -> Result<Vec<Todo>, Error> {
        let mut query = todos::table.into_boxed();

        if let Some(done) = filter.completed {
            query = query.filter(todos::completed.eq(done));
        }

        if let Some(days) = filter.window_days {
            query = match time::window_end(time::now(), days) {
                Some(limit) => query.filter(todos::deadline_at.le(limit)),
                // bound past year 9999: every deadline qualifies
                None => query.filter(todos::deadline_at.is_not_null()),
            };
        }

        let found = query.order(todos::id.asc()).load::<Todo>(self.conn)?;
        Ok(found)
    }

    /// Retrieves a single todo by primary key
    ///
    /// # Returns
    ///
    /// `None` if no todo has this id
    ///
    /// # Errors
    ///
    /// Returns an Error if database operations fail
    pub fn get(&mut self, todo_id: i32) -> Result<Option<Todo>, Error> {
        let found = todos::table
            .find(todo_id)
            .first::<Todo>(self.conn)
            .optional()?;
        Ok(found)
    }

    /// Inserts a new todo and returns the stored row
    ///
    /// The id and both timestamps are assigned here.
    ///
    /// # Errors
    ///
    /// Returns an Error if database operations fail
    pub fn insert(&mut self, draft: &TodoDraft) -> Result<Todo, Error> {
        let now = time::now();
        let new_todo = NewTodo {
            title: &draft.title,
            description: draft.description.as_deref(),
            completed: draft.completed,
            deadline_at: draft.deadline_at,
            created_at: now,
            updated_at: now,
        };

        let created = self.conn.transaction::<_, DieselError, _>(|conn| {
            diesel::insert_into(todos::table)
                .values(&new_todo)
                .execute(conn)?;

            // the write lock is held until commit, so the newest row is ours
            todos::table.order(todos::id.desc()).first::<Todo>(conn)
        })?;

        Ok(created)
    }

    /// Applies a partial update and returns the updated row
    ///
    /// `updated_at` is always refreshed, even when `changes` is empty.
    ///
    /// # Returns
    ///
    /// `None` if no todo has this id
    ///
    /// # Errors
    ///
    /// Returns an Error if database operations fail
    pub fn update(&mut self, todo_id: i32, changes: &TodoChanges) -> Result<Option<Todo>, Error> {
        let updated = self.conn.transaction::<_, DieselError, _>(|conn| {
            let Some(existing) = todos::table
                .find(todo_id)
                .first::<Todo>(conn)
                .optional()?
            else {
                return Ok(None);
            };

            // updated_at never moves backwards, even on a coarse clock
            let stamp = time::now().max(existing.updated_at + TimeDelta::microseconds(1));

            diesel::update(todos::table.find(todo_id))
                .set((changes, todos::updated_at.eq(stamp)))
                .execute(conn)?;

            todos::table.find(todo_id).first::<Todo>(conn).optional()
        })?;

        Ok(updated)
    }

    /// Deletes a todo by primary key
    ///
    /// # Returns
    ///
    /// The removed row, or `None` if no todo had this id
    ///
    /// # Errors
    ///
    /// Returns an Error if database operations fail
    pub fn delete(&mut self, todo_id: i32) -> Result<Option<Todo>, Error> {
        let removed = self.conn.transaction::<_, DieselError, _>(|conn| {
            let existing = todos::table
                .find(todo_id)
                .first::<Todo>(conn)
                .optional()?;

            if existing.is_some() {
                diesel::delete(todos::table.find(todo_id)).execute(conn)?;
            }
            Ok(existing)
        })?;

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, IN_MEMORY_DATABASE_URL};
    use crate::db::Database;
    use chrono::NaiveDate;

    fn memory_database() -> Database {
        Database::connect(IN_MEMORY_DATABASE_URL, &DatabaseConfig::default()).unwrap()
    }

    fn draft(title: &str) -> TodoDraft {
        TodoDraft {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_insert_assigns_id_and_timestamps() {
        let database = memory_database();
        let mut conn = database.get_conn().unwrap();
        let mut repo = TodoRepository::new(&mut conn);

        let first = repo.insert(&draft("first")).unwrap();
        let second = repo.insert(&draft("second")).unwrap();

        assert!(second.id > first.id);
        assert_eq!(first.title, "first");
        assert_eq!(first.description, None);
        assert!(!first.completed);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[test]
    fn test_get_missing() {
        let database = memory_database();
        let mut conn = database.get_conn().unwrap();
        let mut repo = TodoRepository::new(&mut conn);

        assert_eq!(repo.get(42).unwrap(), None);
    }

    #[test]
    fn test_list_filters() {
        let database = memory_database();
        let mut conn = database.get_conn().unwrap();
        let mut repo = TodoRepository::new(&mut conn);

        let soon = time::now() + TimeDelta::days(2);
        let later = time::now() + TimeDelta::days(30);

        repo.insert(&TodoDraft {
            title: "soon".to_string(),
            deadline_at: Some(soon),
            ..Default::default()
        })
        .unwrap();
        repo.insert(&TodoDraft {
            title: "later".to_string(),
            completed: true,
            deadline_at: Some(later),
            ..Default::default()
        })
        .unwrap();
        repo.insert(&draft("whenever")).unwrap();

        let titles = |todos: Vec<Todo>| todos.into_iter().map(|t| t.title).collect::<Vec<_>>();

        let all = repo.list(&TodoFilter::default()).unwrap();
        assert_eq!(titles(all), vec!["soon", "later", "whenever"]);

        let done = repo
            .list(&TodoFilter {
                completed: Some(true),
                window_days: None,
            })
            .unwrap();
        assert_eq!(titles(done), vec!["later"]);

        let week = repo
            .list(&TodoFilter {
                completed: None,
                window_days: Some(7),
            })
            .unwrap();
        assert_eq!(titles(week), vec!["soon"]);

        let open_this_month = repo
            .list(&TodoFilter {
                completed: Some(false),
                window_days: Some(60),
            })
            .unwrap();
        assert_eq!(titles(open_this_month), vec!["soon"]);

        let forever = repo
            .list(&TodoFilter {
                completed: None,
                window_days: Some(u64::MAX),
            })
            .unwrap();
        assert_eq!(titles(forever), vec!["soon", "later"]);
    }

    #[test]
    fn test_update_merges_fields() {
        let database = memory_database();
        let mut conn = database.get_conn().unwrap();
        let mut repo = TodoRepository::new(&mut conn);

        let deadline = NaiveDate::from_ymd_opt(2030, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let created = repo
            .insert(&TodoDraft {
                title: "write report".to_string(),
                description: Some("quarterly".to_string()),
                completed: false,
                deadline_at: Some(deadline),
            })
            .unwrap();

        let updated = repo
            .update(
                created.id,
                &TodoChanges {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert!(updated.completed);
        assert_eq!(updated.title, "write report");
        assert_eq!(updated.description.as_deref(), Some("quarterly"));
        assert_eq!(updated.deadline_at, Some(deadline));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);

        let cleared = repo
            .update(
                created.id,
                &TodoChanges {
                    description: Some(None),
                    deadline_at: Some(None),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.deadline_at, None);
        assert!(cleared.completed);
    }

    #[test]
    fn test_update_missing() {
        let database = memory_database();
        let mut conn = database.get_conn().unwrap();
        let mut repo = TodoRepository::new(&mut conn);

        let changes = TodoChanges {
            title: Some("nope".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.update(7, &changes).unwrap(), None);
    }

    #[test]
    fn test_delete_reports_existence() {
        let database = memory_database();
        let mut conn = database.get_conn().unwrap();
        let mut repo = TodoRepository::new(&mut conn);

        let created = repo.insert(&draft("temporary")).unwrap();

        let removed = repo.delete(created.id).unwrap();
        assert_eq!(removed, Some(created.clone()));
        assert_eq!(repo.get(created.id).unwrap(), None);
        assert_eq!(repo.delete(created.id).unwrap(), None);
    }
}

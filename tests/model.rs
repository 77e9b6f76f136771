//! Priority and task tables against a database file on disk.

use chrono::{Duration, Local, NaiveDate};
use tempfile::TempDir;
use todo_store::core::priority::{HIGH, LOW, MEDIUM};
use todo_store::{Connection, DbPath, Error, PriorityTable, Table, TaskTable, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct TestDb {
    _dir: TempDir,
    path: DbPath,
}

impl TestDb {
    fn new() -> Self {
        init_tracing();
        let dir = TempDir::new().unwrap();
        let path = DbPath::new(dir.path().join("test.sqlite3"));
        Self { _dir: dir, path }
    }

    fn open(&self) -> Connection {
        Connection::open(&self.path).unwrap()
    }
}

fn days_from_today(days: i64) -> NaiveDate {
    Local::now().date_naive() + Duration::days(days)
}

fn name_of(conn: &Connection, code: i64) -> String {
    let rows = conn
        .execute("select name from TodoPriority where code=?;", &[&code])
        .unwrap();
    rows[0].get("name").and_then(Value::as_str).unwrap().to_string()
}

#[test]
fn test_priority_table_exists() {
    let db = TestDb::new();
    let conn = db.open();
    let table = PriorityTable::new(&conn).unwrap();
    assert!(conn.table_exists(table.name()).unwrap());
}

#[test]
fn test_priority_create_sql() {
    let db = TestDb::new();
    let conn = db.open();
    let table = PriorityTable::new(&conn).unwrap();
    let sql = "create table TodoPriority(\n\
               \tcode integer primary key not null,\n\
               \tname text not null,\n\
               \tcreated timestamp default (datetime('now', 'localtime'))\n\
               );";
    assert_eq!(table.create_sql(), sql);
}

#[test]
fn test_priority_defaults() {
    let db = TestDb::new();
    let conn = db.open();
    let table = PriorityTable::new(&conn).unwrap();

    assert_eq!(table.count().unwrap(), 3);
    assert_eq!(name_of(&conn, LOW), "Low");
    assert_eq!(name_of(&conn, MEDIUM), "Medium");
    assert_eq!(name_of(&conn, HIGH), "High");
}

#[test]
fn test_priority_created_is_timestamp() {
    let db = TestDb::new();
    let conn = db.open();
    PriorityTable::new(&conn).unwrap();

    let rows = conn
        .execute("select created from TodoPriority where code=?;", &[&LOW])
        .unwrap();
    let created = rows[0].get("created").and_then(Value::as_timestamp).unwrap();
    assert_eq!(created.date(), Local::now().date_naive());
}

#[test]
fn test_reopen_does_not_reseed() {
    let db = TestDb::new();
    {
        let mut conn = db.open();
        PriorityTable::new(&conn).unwrap();
        TaskTable::new(&conn).unwrap();
        conn.close().unwrap();
    }

    let conn = db.open();
    let priorities = PriorityTable::new(&conn).unwrap();
    let tasks = TaskTable::new(&conn).unwrap();
    assert_eq!(priorities.count().unwrap(), 3);
    assert_eq!(tasks.count().unwrap(), 0);
}

struct TaskFixture {
    db: TestDb,
    conn: Connection,
}

impl TaskFixture {
    fn new() -> Self {
        let db = TestDb::new();
        let conn = db.open();
        {
            PriorityTable::new(&conn).unwrap();
            let tasks = TaskTable::new(&conn).unwrap();
            for (name, priority, days) in [
                ("Low Test", LOW, 2),
                ("Medium Test", MEDIUM, 3),
                ("High Test", HIGH, 4),
            ] {
                conn.execute(
                    "insert into TodoTask (name, priority, deadline) values(?, ?, ?)",
                    &[&name, &priority, &days_from_today(days)],
                )
                .unwrap();
            }
            assert_eq!(tasks.count().unwrap(), 3);
        }
        Self { db, conn }
    }

    fn row(&self, id: i64) -> todo_store::Record {
        let mut rows = self
            .conn
            .execute("select * from TodoTask where id=?;", &[&id])
            .unwrap();
        rows.remove(0)
    }
}

#[test]
fn test_task_tables_exist() {
    let fx = TaskFixture::new();
    assert!(fx.conn.table_exists("TodoPriority").unwrap());
    assert!(fx.conn.table_exists("TodoTask").unwrap());
}

#[test]
fn test_task_create_sql() {
    let fx = TaskFixture::new();
    let tasks = TaskTable::new(&fx.conn).unwrap();
    let sql = "create table TodoTask(\n\
               \tid integer primary key autoincrement not null,\n\
               \tname text not null,\n\
               \tpriority integer references TodoPriority(code) default 2,\n\
               \tdeadline date not null default (date('now', 'localtime')),\n\
               \tstatus integer default 0,\n\
               \tcompleted timestamp,\n\
               \tcreated timestamp default (datetime('now', 'localtime'))\n\
               );";
    assert_eq!(tasks.create_sql(), sql);
}

#[test]
fn test_task_index_exists() {
    let fx = TaskFixture::new();
    let tasks = TaskTable::new(&fx.conn).unwrap();
    assert!(tasks.indices().contains("status"));
}

#[test]
fn test_task_records() {
    let fx = TaskFixture::new();
    let tasks = TaskTable::new(&fx.conn).unwrap();
    assert_eq!(tasks.count().unwrap(), 3);
}

#[test]
fn test_task_rows_round_trip() {
    let fx = TaskFixture::new();
    for (id, name, priority, days) in [
        (1, "Low Test", LOW, 2),
        (2, "Medium Test", MEDIUM, 3),
        (3, "High Test", HIGH, 4),
    ] {
        let row = fx.row(id);
        assert_eq!(row.get("name"), Some(&Value::Text(name.to_string())));
        assert_eq!(row.get("priority"), Some(&Value::Integer(priority)));
        assert_eq!(row.get("deadline"), Some(&Value::Date(days_from_today(days))));
        assert_eq!(row.get("status"), Some(&Value::Integer(0)));
        assert_eq!(row.get("completed"), Some(&Value::Null));
    }
}

#[test]
fn test_typed_rows_match_inserted_values() {
    let fx = TaskFixture::new();
    let tasks = TaskTable::new(&fx.conn).unwrap();
    let all = tasks.all().unwrap();

    let summary: Vec<(i64, &str, Option<i64>, NaiveDate)> = all
        .iter()
        .map(|t| (t.id, t.name.as_str(), t.priority, t.deadline))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, "Low Test", Some(LOW), days_from_today(2)),
            (2, "Medium Test", Some(MEDIUM), days_from_today(3)),
            (3, "High Test", Some(HIGH), days_from_today(4)),
        ]
    );
}

#[test]
fn test_task_integrity() {
    let fx = TaskFixture::new();
    let err = fx
        .conn
        .execute(
            "insert into TodoTask (name, priority, deadline) values(?, ?, ?)",
            &[&"Highest Test", &4i64, &days_from_today(4)],
        )
        .unwrap_err();
    assert!(matches!(err, Error::Integrity(_)));

    let tasks = TaskTable::new(&fx.conn).unwrap();
    assert_eq!(tasks.count().unwrap(), 3);
}

#[test]
fn test_duplicate_priority_code() {
    let fx = TaskFixture::new();
    let err = fx
        .conn
        .execute(
            "insert into TodoPriority (code, name) values(?, ?)",
            &[&HIGH, &"Higher"],
        )
        .unwrap_err();
    assert!(err.is_integrity());
}

#[test]
fn test_done_state_survives_reopen() {
    let mut fx = TaskFixture::new();
    {
        let tasks = TaskTable::new(&fx.conn).unwrap();
        tasks.mark_done(2, todo_store::core::task::STATUS_DONE).unwrap();
    }
    fx.conn.close().unwrap();

    let conn = fx.db.open();
    let tasks = TaskTable::new(&conn).unwrap();
    let done = tasks.get(2).unwrap().unwrap();
    assert!(!done.is_open());
    assert!(done.completed.is_some());
    assert_eq!(tasks.with_status(0).unwrap().len(), 2);
}

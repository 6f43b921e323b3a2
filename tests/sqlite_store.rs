#[path = "../src/db.rs"]
mod db;
#[path = "../src/store.rs"]
mod store;

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use store::{SqliteStore, TableStore};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

#[test]
fn open_db_is_idempotent() {
    let workspace = temp_dir("coursed-db-idempotent");
    {
        let conn = db::open_db(&workspace).expect("first open");
        conn.execute("INSERT INTO rooms(name, capacity) VALUES('A1', 20)", [])
            .expect("insert room");
    }
    let conn = db::open_db(&workspace).expect("second open");
    let store = SqliteStore::new(&conn);
    assert_eq!(store.count_rows("rooms").expect("count"), 1);
    assert!(workspace.join(db::DB_FILE).is_file());

    drop(conn);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn rows_map_sqlite_values_to_json() {
    let workspace = temp_dir("coursed-db-values");
    let conn = db::open_db(&workspace).expect("open db");
    conn.execute(
        "INSERT INTO students(id, full_name, status) VALUES(1, 'Citra', 'active')",
        [],
    )
    .expect("insert student");
    conn.execute(
        "INSERT INTO payments(id, student_id, amount, status, paid_at)
         VALUES(10, 1, 250000.5, 'paid', '2026-01-05T09:00:00Z')",
        [],
    )
    .expect("insert payment");
    conn.execute(
        "INSERT INTO payment_transactions(payment_id, amount, method, receipt)
         VALUES(10, 250000.5, NULL, x'010203')",
        [],
    )
    .expect("insert transaction");

    let store = SqliteStore::new(&conn);
    let rows = store.read_rows("payment_transactions").expect("read");
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row["id"], 1);
    assert_eq!(row["payment_id"], 10);
    assert_eq!(row["amount"], 250000.5);
    assert!(row["method"].is_null());
    assert_eq!(row["receipt"], "AQID");

    let payments = store.read_rows("payments").expect("read payments");
    assert_eq!(payments[0]["paid_at"], "2026-01-05T09:00:00Z");
    assert_eq!(payments[0]["status"], "paid");

    // Column order follows the table definition.
    let keys: Vec<&str> = row
        .as_object()
        .expect("row object")
        .keys()
        .map(|k| k.as_str())
        .collect();
    assert_eq!(
        keys,
        vec!["id", "payment_id", "amount", "method", "reference", "receipt", "created_at"]
    );

    drop(conn);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn rows_come_back_in_insertion_order() {
    let workspace = temp_dir("coursed-db-order");
    let conn = db::open_db(&workspace).expect("open db");
    for name in ["Zed", "Amir", "Mei"] {
        conn.execute("INSERT INTO teachers(full_name) VALUES(?)", [name])
            .expect("insert teacher");
    }
    let store = SqliteStore::new(&conn);
    let names: Vec<String> = store
        .read_rows("teachers")
        .expect("read")
        .iter()
        .filter_map(|r| r["full_name"].as_str().map(String::from))
        .collect();
    assert_eq!(names, vec!["Zed", "Amir", "Mei"]);

    drop(conn);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn unknown_or_unsafe_table_names_fail() {
    let workspace = temp_dir("coursed-db-names");
    let conn = db::open_db(&workspace).expect("open db");
    let store = SqliteStore::new(&conn);

    let e = store
        .read_rows("students; DROP TABLE students")
        .expect_err("rejected name");
    assert!(e.to_string().contains("invalid table name"));
    assert!(store.read_rows("").is_err());
    assert!(store.read_rows("no_such_table").is_err());
    assert!(store.count_rows("no_such_table").is_err());
    assert_eq!(store.count_rows("students").expect("students still there"), 0);

    drop(conn);
    let _ = std::fs::remove_dir_all(workspace);
}

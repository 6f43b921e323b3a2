use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE: &str = "course.sqlite3";

const SCHEMA: &[&str] = &[
    // core
    "CREATE TABLE IF NOT EXISTS students(
        id INTEGER PRIMARY KEY,
        full_name TEXT NOT NULL,
        email TEXT,
        phone TEXT,
        birth_date TEXT,
        photo_url TEXT,
        status TEXT NOT NULL DEFAULT 'active',
        created_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS teachers(
        id INTEGER PRIMARY KEY,
        full_name TEXT NOT NULL,
        email TEXT,
        phone TEXT,
        photo_url TEXT,
        hourly_rate REAL,
        created_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS courses(
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        level TEXT,
        description TEXT,
        created_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS rooms(
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        capacity INTEGER
    )",
    "CREATE TABLE IF NOT EXISTS classes(
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        course_id INTEGER,
        teacher_id INTEGER,
        room_id INTEGER,
        schedule TEXT,
        start_date TEXT,
        end_date TEXT,
        FOREIGN KEY(course_id) REFERENCES courses(id),
        FOREIGN KEY(teacher_id) REFERENCES teachers(id),
        FOREIGN KEY(room_id) REFERENCES rooms(id)
    )",
    "CREATE TABLE IF NOT EXISTS course_pricing(
        id INTEGER PRIMARY KEY,
        course_id INTEGER NOT NULL,
        label TEXT NOT NULL,
        amount REAL NOT NULL,
        currency TEXT NOT NULL DEFAULT 'IDR',
        FOREIGN KEY(course_id) REFERENCES courses(id)
    )",
    "CREATE TABLE IF NOT EXISTS meetings(
        id INTEGER PRIMARY KEY,
        class_id INTEGER NOT NULL,
        meeting_no INTEGER NOT NULL,
        held_on TEXT,
        topic TEXT,
        FOREIGN KEY(class_id) REFERENCES classes(id)
    )",
    "CREATE TABLE IF NOT EXISTS payments(
        id INTEGER PRIMARY KEY,
        student_id INTEGER NOT NULL,
        class_id INTEGER,
        amount REAL NOT NULL,
        status TEXT NOT NULL,
        due_date TEXT,
        paid_at TEXT,
        FOREIGN KEY(student_id) REFERENCES students(id),
        FOREIGN KEY(class_id) REFERENCES classes(id)
    )",
    "CREATE TABLE IF NOT EXISTS payment_transactions(
        id INTEGER PRIMARY KEY,
        payment_id INTEGER NOT NULL,
        amount REAL NOT NULL,
        method TEXT,
        reference TEXT,
        receipt BLOB,
        created_at TEXT,
        FOREIGN KEY(payment_id) REFERENCES payments(id)
    )",
    "CREATE TABLE IF NOT EXISTS certificate_templates(
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        background_url TEXT,
        layout TEXT
    )",
    "CREATE TABLE IF NOT EXISTS certificates(
        id INTEGER PRIMARY KEY,
        student_id INTEGER NOT NULL,
        template_id INTEGER,
        certificate_no TEXT NOT NULL,
        issued_on TEXT,
        file_url TEXT,
        FOREIGN KEY(student_id) REFERENCES students(id),
        FOREIGN KEY(template_id) REFERENCES certificate_templates(id)
    )",
    "CREATE TABLE IF NOT EXISTS users(
        id INTEGER PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL,
        teacher_id INTEGER,
        FOREIGN KEY(teacher_id) REFERENCES teachers(id)
    )",
    // relations
    "CREATE TABLE IF NOT EXISTS class_students(
        class_id INTEGER NOT NULL,
        student_id INTEGER NOT NULL,
        enrolled_at TEXT,
        PRIMARY KEY(class_id, student_id),
        FOREIGN KEY(class_id) REFERENCES classes(id),
        FOREIGN KEY(student_id) REFERENCES students(id)
    )",
    "CREATE TABLE IF NOT EXISTS teacher_attendance(
        id INTEGER PRIMARY KEY,
        meeting_id INTEGER NOT NULL,
        teacher_id INTEGER NOT NULL,
        status TEXT NOT NULL,
        note TEXT,
        FOREIGN KEY(meeting_id) REFERENCES meetings(id),
        FOREIGN KEY(teacher_id) REFERENCES teachers(id)
    )",
    "CREATE TABLE IF NOT EXISTS student_attendance(
        id INTEGER PRIMARY KEY,
        meeting_id INTEGER NOT NULL,
        student_id INTEGER NOT NULL,
        status TEXT NOT NULL,
        note TEXT,
        FOREIGN KEY(meeting_id) REFERENCES meetings(id),
        FOREIGN KEY(student_id) REFERENCES students(id)
    )",
    "CREATE TABLE IF NOT EXISTS teacher_courses(
        teacher_id INTEGER NOT NULL,
        course_id INTEGER NOT NULL,
        PRIMARY KEY(teacher_id, course_id),
        FOREIGN KEY(teacher_id) REFERENCES teachers(id),
        FOREIGN KEY(course_id) REFERENCES courses(id)
    )",
    // system
    "CREATE TABLE IF NOT EXISTS announcements(
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        published_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS employee_attendance(
        id INTEGER PRIMARY KEY,
        user_id INTEGER NOT NULL,
        check_in TEXT,
        check_out TEXT,
        FOREIGN KEY(user_id) REFERENCES users(id)
    )",
    // content
    "CREATE TABLE IF NOT EXISTS hero_sections(
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        subtitle TEXT,
        image_url TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS facilities(
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        image_url TEXT
    )",
    "CREATE TABLE IF NOT EXISTS testimonials(
        id INTEGER PRIMARY KEY,
        author TEXT NOT NULL,
        quote TEXT NOT NULL,
        avatar_url TEXT,
        rating INTEGER
    )",
    "CREATE TABLE IF NOT EXISTS gallery_images(
        id INTEGER PRIMARY KEY,
        caption TEXT,
        image_url TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS location_info(
        id INTEGER PRIMARY KEY,
        address TEXT NOT NULL,
        latitude REAL,
        longitude REAL,
        opening_hours TEXT
    )",
    "CREATE TABLE IF NOT EXISTS landing_courses(
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        summary TEXT,
        image_url TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS blog_posts(
        id INTEGER PRIMARY KEY,
        slug TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        cover_image_url TEXT,
        published_at TEXT
    )",
];

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    for stmt in SCHEMA {
        conn.execute(stmt, [])?;
    }

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_payments_student ON payments(student_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_student_attendance_meeting ON student_attendance(meeting_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_teacher_attendance_meeting ON teacher_attendance(meeting_id)",
        [],
    )?;

    Ok(conn)
}

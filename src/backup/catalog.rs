use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableGroup {
    Core,
    Relation,
    System,
    Content,
}

/// One exported table: the key it appears under in the snapshot, the store
/// table it is read from, and the columns that reference binary assets.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub key: &'static str,
    pub table: &'static str,
    pub group: TableGroup,
    pub asset_columns: &'static [&'static str],
}

const fn spec(
    key: &'static str,
    table: &'static str,
    group: TableGroup,
    asset_columns: &'static [&'static str],
) -> TableSpec {
    TableSpec {
        key,
        table,
        group,
        asset_columns,
    }
}

/// Every table included in a backup, in export order.
pub const TABLES: &[TableSpec] = &[
    spec("students", "students", TableGroup::Core, &["photo_url"]),
    spec("teachers", "teachers", TableGroup::Core, &["photo_url"]),
    spec("classes", "classes", TableGroup::Core, &[]),
    spec("courses", "courses", TableGroup::Core, &[]),
    spec("coursePricing", "course_pricing", TableGroup::Core, &[]),
    spec("meetings", "meetings", TableGroup::Core, &[]),
    spec("payments", "payments", TableGroup::Core, &[]),
    spec(
        "paymentTransactions",
        "payment_transactions",
        TableGroup::Core,
        &[],
    ),
    spec("certificates", "certificates", TableGroup::Core, &["file_url"]),
    spec(
        "certificateTemplates",
        "certificate_templates",
        TableGroup::Core,
        &["background_url"],
    ),
    spec("users", "users", TableGroup::Core, &[]),
    spec("rooms", "rooms", TableGroup::Core, &[]),
    spec("classStudents", "class_students", TableGroup::Relation, &[]),
    spec(
        "teacherAttendance",
        "teacher_attendance",
        TableGroup::Relation,
        &[],
    ),
    spec(
        "studentAttendance",
        "student_attendance",
        TableGroup::Relation,
        &[],
    ),
    spec("teacherCourses", "teacher_courses", TableGroup::Relation, &[]),
    spec("announcements", "announcements", TableGroup::System, &[]),
    spec(
        "employeeAttendance",
        "employee_attendance",
        TableGroup::System,
        &[],
    ),
    spec("heroSections", "hero_sections", TableGroup::Content, &["image_url"]),
    spec("facilities", "facilities", TableGroup::Content, &["image_url"]),
    spec("testimonials", "testimonials", TableGroup::Content, &["avatar_url"]),
    spec("galleryImages", "gallery_images", TableGroup::Content, &["image_url"]),
    spec("locationInfo", "location_info", TableGroup::Content, &[]),
    spec(
        "landingCourses",
        "landing_courses",
        TableGroup::Content,
        &["image_url"],
    ),
    spec("blogPosts", "blog_posts", TableGroup::Content, &["cover_image_url"]),
];

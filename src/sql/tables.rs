//! Static descriptors of the four library tables. Column order is the order
//! of `SELECT`/`RETURNING` lists.

use super::{ColumnDef, TableDef};

pub static BOOKS: TableDef = TableDef {
    name: "books",
    columns: &[
        ColumnDef { name: "id", pg_type: "uuid" },
        ColumnDef { name: "owner_id", pg_type: "text" },
        ColumnDef { name: "title", pg_type: "text" },
        ColumnDef { name: "author", pg_type: "text" },
        ColumnDef { name: "year", pg_type: "int4" },
        ColumnDef { name: "genre", pg_type: "text" },
        ColumnDef { name: "page_count", pg_type: "int4" },
        ColumnDef { name: "isbn", pg_type: "text" },
        ColumnDef { name: "synopsis", pg_type: "text" },
        ColumnDef { name: "cover", pg_type: "text" },
        ColumnDef { name: "created_at", pg_type: "timestamptz" },
    ],
};

pub static SHELVES: TableDef = TableDef {
    name: "shelves",
    columns: &[
        ColumnDef { name: "id", pg_type: "uuid" },
        ColumnDef { name: "owner_id", pg_type: "text" },
        ColumnDef { name: "book_id", pg_type: "uuid" },
        ColumnDef { name: "status", pg_type: "text" },
        ColumnDef { name: "added_at", pg_type: "timestamptz" },
        ColumnDef { name: "started_at", pg_type: "timestamptz" },
        ColumnDef { name: "finished_at", pg_type: "timestamptz" },
        ColumnDef { name: "current_page", pg_type: "int4" },
        ColumnDef { name: "updated_at", pg_type: "timestamptz" },
    ],
};

pub static REVIEWS: TableDef = TableDef {
    name: "reviews",
    columns: &[
        ColumnDef { name: "id", pg_type: "uuid" },
        ColumnDef { name: "owner_id", pg_type: "text" },
        ColumnDef { name: "book_id", pg_type: "uuid" },
        ColumnDef { name: "rating", pg_type: "int4" },
        ColumnDef { name: "text", pg_type: "text" },
        ColumnDef { name: "visibility", pg_type: "text" },
        ColumnDef { name: "created_at", pg_type: "timestamptz" },
        ColumnDef { name: "updated_at", pg_type: "timestamptz" },
    ],
};

pub static GOALS: TableDef = TableDef {
    name: "goals",
    columns: &[
        ColumnDef { name: "id", pg_type: "uuid" },
        ColumnDef { name: "owner_id", pg_type: "text" },
        ColumnDef { name: "year", pg_type: "int4" },
        ColumnDef { name: "target_books", pg_type: "int4" },
        ColumnDef { name: "target_pages", pg_type: "int4" },
        ColumnDef { name: "status", pg_type: "text" },
        ColumnDef { name: "created_at", pg_type: "timestamptz" },
        ColumnDef { name: "updated_at", pg_type: "timestamptz" },
    ],
};

//! Contract - canonical names shared by the store, the provider and callers
//!
//! Content URIs:
//! - `content://me.theofrancisco.android.bookstore/books` (collection)
//! - `content://me.theofrancisco.android.bookstore/books/7` (single item)

use crate::uri::ContentUri;

/// Authority every content URI of this store is rooted at
pub const CONTENT_AUTHORITY: &str = "me.theofrancisco.android.bookstore";

/// URI scheme
pub const SCHEME: &str = "content";

/// Path segment naming the books collection
pub const PATH_BOOKS: &str = "books";

/// Database file name
pub const DATABASE_NAME: &str = "bstore.db";

/// Current schema version. Bump together with a new migration step.
pub const DATABASE_VERSION: u32 = 2;

/// Backing table
pub const TABLE_NAME: &str = "books";

pub const COLUMN_ID: &str = "_id";
pub const COLUMN_NAME: &str = "name";
pub const COLUMN_QUANTITY: &str = "quantity";
pub const COLUMN_PRICE: &str = "buy_price";
pub const COLUMN_SUPPLIER: &str = "supplier";
pub const COLUMN_SUPPLIER_PH: &str = "supplier_ph";

/// Every column, in table order
pub const ALL_COLUMNS: &[&str] = &[
    COLUMN_ID,
    COLUMN_NAME,
    COLUMN_QUANTITY,
    COLUMN_PRICE,
    COLUMN_SUPPLIER,
    COLUMN_SUPPLIER_PH,
];

/// MIME type of a response holding a list of items
pub const CONTENT_LIST_TYPE: &str = "vnd.android.cursor.dir/me.theofrancisco.android.bookstore/books";

/// MIME type of a response holding a single item
pub const CONTENT_ITEM_TYPE: &str = "vnd.android.cursor.item/me.theofrancisco.android.bookstore/books";

/// The collection URI for all books
pub fn content_uri() -> ContentUri {
    ContentUri::collection(CONTENT_AUTHORITY)
}

/// Whether `column` names a column of the books table
pub fn is_known_column(column: &str) -> bool {
    ALL_COLUMNS.contains(&column)
}

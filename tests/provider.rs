use bookstore::contract::{
    COLUMN_NAME, COLUMN_PRICE, COLUMN_QUANTITY, COLUMN_SUPPLIER, COLUMN_SUPPLIER_PH, DATABASE_VERSION,
    content_uri,
};
use bookstore::{ContentUri, ContentValues, Error, ItemPatch, ItemProvider, ItemRepository, NewItem, SqliteStore};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn book(name: &str, price: f64, quantity: i64, supplier: &str, phone: &str) -> ContentValues {
    let mut values = ContentValues::new();
    values
        .put(COLUMN_NAME, name)
        .put(COLUMN_PRICE, price)
        .put(COLUMN_QUANTITY, quantity)
        .put(COLUMN_SUPPLIER, supplier)
        .put(COLUMN_SUPPLIER_PH, phone);
    values
}

#[test]
fn store_opens_lazily() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bstore.db");

    let store = SqliteStore::new(&path);
    assert!(!path.exists());

    assert_eq!(store.count().unwrap(), 0);
    assert!(path.exists());
    assert_eq!(store.version().unwrap(), DATABASE_VERSION);
}

#[test]
fn store_creates_missing_directory_on_first_use() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".bookstore").join("bstore.db");

    let provider = ItemProvider::new(SqliteStore::new(&path));
    provider.get_type(&content_uri()).unwrap();
    assert!(!path.parent().unwrap().exists());

    assert!(provider.list(None).unwrap().is_empty());
    assert!(path.exists());
}

#[test]
fn items_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bstore.db");

    let uri = {
        let provider = ItemProvider::open(&path).unwrap();
        provider
            .insert(&content_uri(), &book("A", 10.0, 2, "S1", "111"))
            .unwrap()
    };

    let provider = ItemProvider::open(&path).unwrap();
    let cursor = provider.query(&uri, None, None, None).unwrap();
    let items = cursor.to_items().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "A");
    assert_eq!(items[0].supplier_ph, "111");
}

#[test]
fn full_item_lifecycle_through_uris() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ItemProvider::open(&dir.path().join("bstore.db")).unwrap();
    let books = content_uri();

    let first = provider.insert(&books, &book("A", 10.0, 2, "S1", "111")).unwrap();
    let second = provider.insert(&books, &book("B", 5.0, 0, "S2", "222")).unwrap();
    assert_ne!(first, second);
    assert_eq!(provider.query(&books, None, None, None).unwrap().len(), 2);

    let mut values = ContentValues::new();
    values.put(COLUMN_NAME, "B (2nd edition)").put(COLUMN_QUANTITY, 4);
    assert_eq!(provider.update(&second, &values, None).unwrap(), 1);

    let mut cursor = provider.query(&second, Some(&[COLUMN_NAME, COLUMN_QUANTITY]), None, None).unwrap();
    assert!(cursor.move_to_next());
    assert_eq!(cursor.get_str(COLUMN_NAME).unwrap(), "B (2nd edition)");
    assert_eq!(cursor.get_i64(COLUMN_QUANTITY).unwrap(), 4);

    assert_eq!(provider.delete(&first, None).unwrap(), 1);
    assert_eq!(provider.delete(&first, None).unwrap(), 0);
    assert!(provider.query(&first, None, None, None).unwrap().is_empty());
    assert_eq!(provider.query(&books, None, None, None).unwrap().len(), 1);
}

#[test]
fn typed_and_uri_surfaces_agree() {
    let provider = ItemProvider::open_in_memory().unwrap();
    let uri = provider
        .insert_item(&NewItem::new("Dune", 9.99, 3, "Chilton", "555-0100"))
        .unwrap();
    let id = uri.parse_id().unwrap();

    assert_eq!(uri, ContentUri::item(id));
    assert_eq!(provider.update_item(id, &ItemPatch::default().buy_price(7.5)).unwrap(), 1);

    let cursor = provider.query(&uri, None, None, None).unwrap();
    assert_eq!(cursor.to_items().unwrap()[0], provider.get(id).unwrap().unwrap());

    assert!(matches!(
        provider.update_item(id, &ItemPatch::default().name("")),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(provider.delete_item(id).unwrap(), 1);
    assert_eq!(provider.delete_item(id).unwrap(), 0);
}

#[test]
fn observer_on_another_thread_sees_insert() {
    let provider = Arc::new(Mutex::new(ItemProvider::open_in_memory().unwrap()));
    let subscription = provider.lock().unwrap().register_observer(&content_uri(), true);

    let writer = {
        let provider = provider.clone();
        std::thread::spawn(move || {
            provider
                .lock()
                .unwrap()
                .insert(&content_uri(), &book("A", 1.0, 1, "S", "1"))
                .unwrap()
        })
    };

    let event = subscription.wait(Duration::from_secs(5)).expect("change event");
    assert_eq!(event.uri, content_uri());
    writer.join().unwrap();
    assert!(subscription.try_next().is_none());
}

#[test]
fn item_observer_hears_delete_all() {
    let provider = ItemProvider::open_in_memory().unwrap();
    let uri = provider
        .insert(&content_uri(), &book("A", 1.0, 1, "S", "1"))
        .unwrap();
    let subscription = provider.register_observer(&uri, false);

    assert_eq!(provider.delete_all().unwrap(), 1);
    assert_eq!(subscription.drain().len(), 1);
    assert_eq!(provider.delete_all().unwrap(), 0);
    assert_eq!(subscription.pending(), 0);
}

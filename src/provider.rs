//! Item provider - the single entry point for data operations
//!
//! Requests are addressed by content URI:
//! - `content://<authority>/books` resolves to the whole collection
//! - `content://<authority>/books/<id>` resolves to one item
//!
//! URI operations are thin adapters over the typed ones, which talk to an
//! [`ItemRepository`] and notify observers after every committed mutation.

use std::path::Path;
use crate::contract::{CONTENT_AUTHORITY, CONTENT_ITEM_TYPE, CONTENT_LIST_TYPE};
use crate::cursor::Cursor;
use crate::item::{Item, ItemPatch, NewItem};
use crate::notify::{ChangeNotifier, Subscription};
use crate::storage::{ItemRepository, ListQuery, Selection, SortOrder, SqliteStore};
use crate::uri::{ContentUri, Resource};
use crate::values::ContentValues;
use crate::{Error, Result};

/// Resolves content URIs to repository calls and manages change notification.
pub struct ItemProvider<R = SqliteStore> {
    repo: R,
    notifier: ChangeNotifier,
    authority: String,
    content_uri: ContentUri,
}

impl ItemProvider<SqliteStore> {
    /// Provider over a database file, opened on first use
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(SqliteStore::open(path)?))
    }

    /// Provider over an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(SqliteStore::open_in_memory()?))
    }
}

impl<R: ItemRepository> ItemProvider<R> {
    /// Create a provider serving the default authority
    pub fn new(repo: R) -> Self {
        Self::with_authority(repo, CONTENT_AUTHORITY)
    }

    pub fn with_authority(repo: R, authority: impl Into<String>) -> Self {
        let authority = authority.into();
        Self {
            repo,
            notifier: ChangeNotifier::new(),
            content_uri: ContentUri::collection(authority.clone()),
            authority,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// The collection URI this provider serves
    pub fn content_uri(&self) -> &ContentUri {
        &self.content_uri
    }

    pub fn item_uri(&self, id: i64) -> ContentUri {
        self.content_uri.with_appended_id(id)
    }

    /// Watch `uri` for changes. Drop the subscription to stop.
    pub fn register_observer(&self, uri: &ContentUri, notify_for_descendants: bool) -> Subscription {
        self.notifier.register(uri.clone(), notify_for_descendants)
    }

    fn match_uri(&self, uri: &ContentUri) -> Result<Resource> {
        let resource = uri.resolve(&self.authority)?;
        tracing::debug!("Resolved {} to {:?}", uri, resource);
        Ok(resource)
    }

    /// Collection requests keep the caller's filter; item requests are pinned to their id
    fn selection_for(&self, uri: &ContentUri, resource: Resource, filter: Option<Selection>) -> Selection {
        match resource {
            Resource::Collection => filter.unwrap_or(Selection::All),
            Resource::Item(id) => {
                if filter.is_some() {
                    tracing::warn!("Ignoring filter on item URI {}", uri);
                }
                Selection::Id(id)
            }
        }
    }

    // ========== URI Operations ==========

    /// Query the rows addressed by `uri`.
    ///
    /// `projection` limits and orders the returned columns (all when
    /// `None`), `order` is `<column> [ASC|DESC]`. A missing item yields an
    /// empty cursor. The cursor is subscribed to changes on `uri`.
    pub fn query(
        &self,
        uri: &ContentUri,
        projection: Option<&[&str]>,
        filter: Option<Selection>,
        order: Option<&str>,
    ) -> Result<Cursor> {
        let resource = self.match_uri(uri)?;
        let mut query = ListQuery::all().with_selection(self.selection_for(uri, resource, filter));
        if let Some(order) = order {
            query = query.with_order(SortOrder::parse(order)?);
        }

        let items = self.repo.list(&query)?;
        let cursor = Cursor::from_items(&items, projection)?;
        Ok(cursor.with_subscription(self.notifier.register(uri.clone(), false)))
    }

    /// Insert a new item into the collection and return its URI
    pub fn insert(&self, uri: &ContentUri, values: &ContentValues) -> Result<ContentUri> {
        match self.match_uri(uri)? {
            Resource::Collection => {}
            Resource::Item(_) => {
                return Err(Error::Unsupported(format!("Insertion is not supported for {}", uri)));
            }
        }

        let item = NewItem::try_from(values)?;
        self.insert_item(&item)
    }

    /// Update the rows addressed by `uri`, returning how many changed
    pub fn update(&self, uri: &ContentUri, values: &ContentValues, filter: Option<Selection>) -> Result<usize> {
        let resource = self.match_uri(uri)?;
        let patch = ItemPatch::try_from(values)?;
        if patch.is_empty() {
            return Ok(0);
        }

        let selection = self.selection_for(uri, resource, filter);
        self.update_selection(uri, &selection, &patch)
    }

    /// Delete the rows addressed by `uri`, returning how many were removed
    pub fn delete(&self, uri: &ContentUri, filter: Option<Selection>) -> Result<usize> {
        let resource = self.match_uri(uri)?;
        let selection = self.selection_for(uri, resource, filter);
        self.delete_selection(uri, &selection)
    }

    /// MIME type of the data behind `uri`
    pub fn get_type(&self, uri: &ContentUri) -> Result<&'static str> {
        match self.match_uri(uri)? {
            Resource::Collection => Ok(CONTENT_LIST_TYPE),
            Resource::Item(_) => Ok(CONTENT_ITEM_TYPE),
        }
    }

    // ========== Typed Operations ==========

    pub fn get(&self, id: i64) -> Result<Option<Item>> {
        self.repo.get(id)
    }

    pub fn list(&self, order: Option<SortOrder>) -> Result<Vec<Item>> {
        let query = ListQuery {
            selection: None,
            order,
        };
        self.repo.list(&query)
    }

    /// Insert `item` and return its URI.
    ///
    /// A storage failure is logged and surfaced as [`Error::InsertFailed`].
    pub fn insert_item(&self, item: &NewItem) -> Result<ContentUri> {
        item.validate()?;

        let id = self.repo.insert(item).map_err(|e| {
            tracing::error!("Failed to insert row for {}: {}", self.content_uri, e);
            Error::InsertFailed(format!("{} ({})", self.content_uri, e))
        })?;

        self.notifier.notify(&self.content_uri);
        Ok(self.item_uri(id))
    }

    pub fn update_item(&self, id: i64, patch: &ItemPatch) -> Result<usize> {
        patch.validate()?;
        if patch.is_empty() {
            return Ok(0);
        }
        self.update_selection(&self.item_uri(id), &Selection::Id(id), patch)
    }

    pub fn delete_item(&self, id: i64) -> Result<usize> {
        self.delete_selection(&self.item_uri(id), &Selection::Id(id))
    }

    /// Remove every item
    pub fn delete_all(&self) -> Result<usize> {
        let uri = self.content_uri.clone();
        self.delete_selection(&uri, &Selection::All)
    }

    fn update_selection(&self, uri: &ContentUri, selection: &Selection, patch: &ItemPatch) -> Result<usize> {
        let rows = self.repo.update(selection, patch)?;
        if rows > 0 {
            self.notifier.notify(uri);
        }
        Ok(rows)
    }

    fn delete_selection(&self, uri: &ContentUri, selection: &Selection) -> Result<usize> {
        let rows = self.repo.delete(selection)?;
        if rows > 0 {
            self.notifier.notify(uri);
        }
        Ok(rows)
    }
}

//! Resolution of addresses into concrete storage targets.

use tracing::debug;

use crate::error::InventoryError;
use crate::schema::{Address, ContentType, DEFAULT_AUTHORITY, DEFAULT_PATH};
use crate::selection::{Predicate, Selection};

const SCHEME: &str = "content://";

/// Matches textual addresses against one authority and collection path.
///
/// Built once at startup and handed to the [`Router`]; it never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressMatcher {
    authority: String,
    path: String,
}

impl AddressMatcher {
    pub fn new(authority: impl Into<String>, path: impl Into<String>) -> Self {
        Self { authority: authority.into(), path: path.into().trim_matches('/').to_owned() }
    }

    pub fn authority(&self) -> &str { &self.authority }

    pub fn path(&self) -> &str { &self.path }

    /// Matches `<path>`, `<path>/<id>`, and either form prefixed with `content://<authority>/`.
    pub fn match_address(&self, raw: &str) -> Option<Address> {
        let rest = match raw.strip_prefix(SCHEME) {
            Some(rest) => rest.strip_prefix(self.authority.as_str())?.strip_prefix('/')?,
            None => raw.strip_prefix('/').unwrap_or(raw),
        };

        let tail = rest.strip_prefix(self.path.as_str())?;
        if tail.is_empty() {
            return Some(Address::Collection);
        }
        let id = tail.strip_prefix('/')?;
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        id.parse().ok().map(Address::Item)
    }

    /// Renders an address in the `content://` form this matcher accepts
    pub fn render(&self, address: &Address) -> String {
        match address {
            Address::Collection => format!("{}{}/{}", SCHEME, self.authority, self.path),
            Address::Item(id) => format!("{}{}/{}/{}", SCHEME, self.authority, self.path, id),
        }
    }
}

impl Default for AddressMatcher {
    fn default() -> Self { Self::new(DEFAULT_AUTHORITY, DEFAULT_PATH) }
}

/// Stateless mapping from an address to the rows an operation targets
#[derive(Debug, Clone, Default)]
pub struct Router {
    matcher: AddressMatcher,
}

impl Router {
    pub fn new(matcher: AddressMatcher) -> Self { Self { matcher } }

    pub fn matcher(&self) -> &AddressMatcher { &self.matcher }

    /// Parses a textual address, failing with `UnsupportedAddress` for anything the matcher rejects.
    pub fn resolve(&self, raw: &str) -> Result<Address, InventoryError> {
        self.matcher.match_address(raw).ok_or_else(|| InventoryError::UnsupportedAddress(raw.to_owned()))
    }

    /// The selection an operation on `address` runs against.
    ///
    /// A collection keeps the caller's filter and sort. An item always targets
    /// `id = ?`; the caller's filter and sort are dropped.
    pub fn route(&self, address: &Address, selection: Selection) -> Selection {
        match address {
            Address::Collection => selection,
            Address::Item(id) => {
                if selection != Selection::all() {
                    debug!("Router: discarding caller selection {:?} for item {}", selection, id);
                }
                Selection::filter(Predicate::id(*id))
            }
        }
    }

    /// The filter alone, for update and delete
    pub fn route_predicate(&self, address: &Address, predicate: Predicate) -> Predicate {
        self.route(address, Selection::filter(predicate)).predicate
    }

    pub fn describe(&self, address: &Address) -> ContentType { address.content_type() }

    /// MIME-style content type for an address
    pub fn mime_type(&self, address: &Address) -> String { address.content_type().mime(&self.matcher.authority, &self.matcher.path) }
}

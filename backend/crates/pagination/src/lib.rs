//! Opaque cursor and page envelope primitives shared by list endpoints.
//!
//! Cursors wrap an ordering key in URL-safe base64 so clients can resume a
//! listing without learning how the server orders rows. The envelope pairs a
//! page of items with the cursor and links needed to fetch the next page.

mod cursor;
mod envelope;

pub use cursor::{Cursor, CursorError};
pub use envelope::{DEFAULT_LIMIT, MAX_LIMIT, Page, PageLinks, PageRequest, PageRequestError};

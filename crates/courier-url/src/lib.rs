//! URL model and percent-encoding for Courier.
//!
//! - `codec` - RFC 3986 percent-encoding over configurable safe sets
//! - `table_map` - insertion-ordered map allowing duplicate keys
//! - `path` / `query` - decoded path segments and query parameters
//! - `builder` - a full URL composed from independent components

#![warn(missing_docs)]

pub mod builder;
pub mod charset;
pub mod codec;
pub mod error;
pub mod path;
pub mod query;
pub mod table_map;

pub use builder::UrlBuilder;
pub use charset::Charset;
pub use codec::{profiles, PercentCodec};
pub use error::{UrlError, UrlResult};
pub use path::UrlPath;
pub use query::UrlQuery;
pub use table_map::TableMap;

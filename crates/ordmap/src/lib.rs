//! Insertion-ordered, string-keyed map with query-string serialization
//!
//! This crate provides:
//! - [`OrderedMap`]: a string-keyed map that preserves key insertion order
//!   across copy, merge, traversal, and extraction
//! - [`Value`]: the heterogeneous value model entries hold (null, bool,
//!   number, string, array, nested map)
//! - Query-string serialization and parsing with bracket paths for nested
//!   structure, plus serde interop
//!
//! ```
//! use ordmap::ordmap;
//!
//! let fruits = ordmap! {
//!     "apple" => vec!["red", "yellow"],
//!     "lemon" => vec!["green", "yellow"],
//! };
//! assert_eq!(
//!     fruits.to_query_string(),
//!     "apple[0]=red&apple[1]=yellow&lemon[0]=green&lemon[1]=yellow"
//! );
//! ```

pub mod map;
pub mod query;
pub mod value;

mod de;
mod ser;

pub use map::OrderedMap;
pub use query::QueryError;
pub use value::{Value, ValueArray};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build an [`OrderedMap`] from literal entries, in the order written.
///
/// ```
/// use ordmap::{ordmap, Value};
///
/// let map = ordmap! {
///     "a" => 1,
///     "b" => "two",
///     "c" => ordmap! { "nested" => true },
/// };
/// assert_eq!(map["a"], Value::Number(1.0));
/// ```
#[macro_export]
macro_rules! ordmap {
    () => {
        $crate::OrderedMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::OrderedMap::new();
        $( map.set($key, $value); )+
        map
    }};
}

//! Trellis - headless selection and grid logic over an element tree.
//!
//! Trellis implements the decision logic behind composite widgets: which
//! elements become selected and focused in response to pointer and keyboard
//! input, and how tabular data is ordered, hidden, and column-reordered.
//! It renders nothing; it reads and writes attribute conventions on an
//! [`element::ElementTree`] and reports every state change through deferred
//! signals, so any front end that follows the same conventions can drive it.
//!
//! # Architecture
//!
//! - [`element`] - the element tree and the attribute conventions
//! - [`composite`] - the shared selection engine and its role adapters
//!   (list box, tree, menu, tab list, radio group)
//! - [`grid`] - the grid engine built on row selection
//! - [`events`] - keyboard/pointer input types
//!
//! # Example
//!
//! ```
//! use trellis::composite::roles::{ItemSpec, ListBox};
//! use trellis::element::ElementTree;
//! use trellis::events::{Key, KeyInput};
//!
//! fn main() -> trellis::Result<()> {
//!     let mut tree = ElementTree::new();
//!     let items = vec![ItemSpec::new("a", "Alpha"), ItemSpec::new("b", "Beta")];
//!     let mut list = ListBox::from_items(&mut tree, &items, false)?;
//!
//!     list.engine().selection_changed.connect(|change| {
//!         println!("selected: {:?}", change.labels);
//!     });
//!     list.key_input(&mut tree, &KeyInput::plain(Key::ArrowDown));
//!     trellis_core::dispatch::drain();
//!     Ok(())
//! }
//! ```

pub mod composite;
pub mod element;
pub mod error;
pub mod events;
pub mod grid;
pub mod prelude;

pub use error::{ConfigError, Result};

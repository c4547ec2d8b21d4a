//! Dataset access: views over individual fields, their index ranges, and the page
//! sources they read from.

pub mod collection_view;
pub mod column;
pub mod element;
pub mod entry;
pub mod erased_view;
pub mod field;
pub mod index_range;
pub mod memory_source;
pub mod page;
pub mod page_source;
pub mod reader;
pub mod value;
pub mod view;

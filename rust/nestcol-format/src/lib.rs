//! Dataset metadata definitions: identifiers, field types, and the descriptor catalog
//! that maps field names to their on-disk identifiers.

pub mod basic_type;
pub mod descriptor;
pub mod descriptor_builder;
pub mod ids;
#[cfg(test)]
mod tests;

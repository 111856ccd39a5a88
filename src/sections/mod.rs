//! One module per container section family, the typed layer between the
//! header and the raw stream.
//!
//! Every module exposes the same operation family: `offset` (pure offset
//! arithmetic over the header), `parse` (decode at a pre-positioned stream),
//! `read` (header + seek + parse convenience), `write` (serialize in
//! canonical order, header untouched) and `byte_size` (the section's size
//! formula, used by the writer to recompute header fields).

pub mod georesource;
pub mod keyframes;
pub mod materials;
pub mod names;
pub mod sectors;

pub use georesource::Georesource;
pub use keyframes::{Animation, AnimationMap, KeyMarker, KeyNode, KeyNodeEntry};
pub use materials::{Material, MaterialMap};
pub use names::NameSection;
pub use sectors::Sector;

//! # lasmeta
//!
//! Lecture des métadonnées d'en-tête des fichiers LAS/LAZ.
//!
//! ## Features
//!
//! - En-tête seul: les points ne sont jamais décodés
//! - Support LAZ via le crate `las` (feature `laz`)
//! - Décomposition du CRS embarqué (OGC WKT 1/2, GeoKeyDirectory GeoTIFF)
//!   en sous-systèmes projeté / géographique / vertical
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lasmeta::open_header;
//! use std::path::Path;
//!
//! let header = open_header(Path::new("tile_001.laz"))?;
//! println!("{}: {} points", header.filename, header.point_count);
//!
//! for sub in header.crs.sub_crs_list() {
//!     println!("{:?} EPSG:{:?}", sub.kind, sub.to_epsg());
//! }
//! ```

pub mod crs;
pub mod error;
pub mod reader;
pub mod types;

pub use crs::{CrsDescriptor, CrsKind, CrsSource, SubCrs};
pub use error::LasMetaError;
pub use reader::open_header;
pub use types::{HeaderRecord, Triple};

use std::path::Path;

/// Extensions reconnues (comparaison insensible à la casse)
pub const POINT_CLOUD_EXTENSIONS: &[&str] = &["las", "laz"];

/// Indique si le chemin porte une extension LAS/LAZ
pub fn has_point_cloud_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            POINT_CLOUD_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

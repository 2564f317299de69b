//! Décomposition des descripteurs CRS embarqués dans les VLR
//!
//! Un fichier LAS déclare son système de coordonnées soit en OGC WKT
//! (VLR `LASF_Projection` / 2112), soit via un GeoKeyDirectory GeoTIFF
//! (VLR `LASF_Projection` / 34735). Les deux sont ramenés à la même
//! représentation: une liste ordonnée de sous-systèmes, chacun typé
//! (projeté, géographique, vertical) avec son code EPSG éventuel.
//!
//! Le WKT est prioritaire quand les deux sont présents.

pub mod geotiff;
pub mod wkt;

use serde::Serialize;
use tracing::warn;

use crate::LasMetaError;

/// User ID des VLR de projection
pub const PROJECTION_USER_ID: &str = "LASF_Projection";

/// Record ID du VLR OGC WKT (coordinate system)
pub const WKT_RECORD_ID: u16 = 2112;

/// Record ID du VLR GeoKeyDirectoryTag
pub const GEOKEY_RECORD_ID: u16 = 34735;

/// Origine du descripteur CRS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CrsSource {
    /// Aucun VLR de projection exploitable
    None,
    /// VLR OGC WKT
    Wkt,
    /// VLR GeoKeyDirectory
    GeoTiff,
}

/// Nature d'un sous-système
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CrsKind {
    Projected,
    Geographic,
    Vertical,
    /// Géocentrique, local, ingénierie...
    Other,
}

/// Un sous-système d'un CRS (éventuellement composé)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubCrs {
    pub kind: CrsKind,

    /// Nom déclaré (WKT uniquement)
    pub name: Option<String>,

    /// Code EPSG, absent si non déclaré ou défini par l'utilisateur
    pub epsg: Option<u32>,
}

impl SubCrs {
    pub fn new(kind: CrsKind, epsg: Option<u32>) -> Self {
        Self {
            kind,
            name: None,
            epsg,
        }
    }

    pub fn is_projected(&self) -> bool {
        self.kind == CrsKind::Projected
    }

    pub fn is_geographic(&self) -> bool {
        self.kind == CrsKind::Geographic
    }

    pub fn is_vertical(&self) -> bool {
        self.kind == CrsKind::Vertical
    }

    pub fn to_epsg(&self) -> Option<u32> {
        self.epsg
    }
}

/// Descripteur CRS brut, décomposé en sous-systèmes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrsDescriptor {
    pub source: CrsSource,
    pub sub_crs: Vec<SubCrs>,
}

impl Default for CrsDescriptor {
    fn default() -> Self {
        Self::empty()
    }
}

/// Vue minimale d'un VLR, indépendante du crate `las`
#[derive(Debug, Clone, Copy)]
pub struct RawVlr<'a> {
    pub user_id: &'a str,
    pub record_id: u16,
    pub data: &'a [u8],
}

impl<'a> RawVlr<'a> {
    fn is_projection(&self, record_id: u16) -> bool {
        self.record_id == record_id
            && self.user_id.trim_end_matches('\0').trim() == PROJECTION_USER_ID
    }
}

impl CrsDescriptor {
    /// Descripteur sans aucun sous-système
    pub fn empty() -> Self {
        Self {
            source: CrsSource::None,
            sub_crs: Vec::new(),
        }
    }

    /// Construit un descripteur à partir de sous-systèmes déjà connus
    pub fn from_parts(source: CrsSource, sub_crs: Vec<SubCrs>) -> Self {
        Self { source, sub_crs }
    }

    pub fn is_empty(&self) -> bool {
        self.sub_crs.is_empty()
    }

    pub fn sub_crs_list(&self) -> &[SubCrs] {
        &self.sub_crs
    }

    /// Parse un WKT (WKT1 ou WKT2)
    pub fn from_wkt(text: &str) -> Result<Self, LasMetaError> {
        let root = wkt::parse(text)?;
        Ok(Self::from_parts(CrsSource::Wkt, wkt::decompose(&root)))
    }

    /// Parse le contenu binaire d'un VLR GeoKeyDirectory
    pub fn from_geokeys(data: &[u8]) -> Result<Self, LasMetaError> {
        let keys = geotiff::parse_directory(data)?;
        Ok(Self::from_parts(CrsSource::GeoTiff, geotiff::decompose(&keys)))
    }

    /// Parse le contenu binaire d'un VLR WKT (chaîne terminée par NUL)
    pub fn from_wkt_bytes(data: &[u8]) -> Result<Self, LasMetaError> {
        let end = memchr::memchr(0, data).unwrap_or(data.len());
        let text = simdutf8::basic::from_utf8(&data[..end])
            .map_err(|_| LasMetaError::malformed_crs("wkt", "payload is not valid UTF-8"))?;
        Self::from_wkt(text)
    }

    /// Extrait le descripteur depuis l'ensemble des VLR/EVLR d'un fichier.
    ///
    /// Ne retourne jamais d'erreur: un VLR illisible est signalé en warning
    /// et traité comme absent.
    pub fn from_vlrs<'a, I>(vlrs: I) -> Self
    where
        I: IntoIterator<Item = RawVlr<'a>>,
    {
        let mut wkt_vlr = None;
        let mut geokey_vlr = None;

        for vlr in vlrs {
            if wkt_vlr.is_none() && vlr.is_projection(WKT_RECORD_ID) {
                wkt_vlr = Some(vlr);
            } else if geokey_vlr.is_none() && vlr.is_projection(GEOKEY_RECORD_ID) {
                geokey_vlr = Some(vlr);
            }
        }

        if let Some(vlr) = wkt_vlr {
            match Self::from_wkt_bytes(vlr.data) {
                Ok(descriptor) => return descriptor,
                Err(e) => warn!(error = %e, "Ignoring WKT coordinate system record"),
            }
        }

        if let Some(vlr) = geokey_vlr {
            match Self::from_geokeys(vlr.data) {
                Ok(descriptor) => return descriptor,
                Err(e) => warn!(error = %e, "Ignoring GeoKeyDirectory record"),
            }
        }

        Self::empty()
    }
}

//! Géométries typées par système de coordonnées
//!
//! Une `Shape<Wgs84>` est en degrés (lon, lat), une `Shape<ConusAlbers>` en mètres
//! dans une projection à aires égales. Les calculs d'aire et d'intersection
//! n'existent que pour la seconde : mélanger les deux ne compile pas.

use std::fmt;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};

use geo::{Area, BooleanOps, BoundingRect, Coord, MultiPolygon, Polygon, Rect};

use crate::error::GeometryError;

/// Système de coordonnées de référence connu à la compilation
pub trait Crs: Copy + fmt::Debug + Send + Sync + 'static {
    /// Code EPSG
    const EPSG: u32;
    /// Nom lisible
    const NAME: &'static str;
}

/// WGS84 géographique (EPSG:4326), coordonnées (longitude, latitude) en degrés
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wgs84;

impl Crs for Wgs84 {
    const EPSG: u32 = 4326;
    const NAME: &'static str = "WGS 84";
}

/// NAD83 / Conus Albers (EPSG:5070), à aires égales, en mètres
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConusAlbers;

impl Crs for ConusAlbers {
    const EPSG: u32 = 5070;
    const NAME: &'static str = "NAD83 / Conus Albers";
}

/// Surface (multi)polygonale étiquetée par son CRS
pub struct Shape<C: Crs> {
    inner: MultiPolygon<f64>,
    _crs: PhantomData<C>,
}

/// Changement de CRS, seul moyen de passer d'une `Shape` à une autre
pub trait Projection {
    type Source: Crs;
    type Target: Crs;
    type Error;

    /// Projette un sommet de `Source` vers `Target`
    fn project_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>, Self::Error>;
}

impl<C: Crs> Shape<C> {
    // étiquetage brut, réservé au crate : l'extérieur passe par les
    // constructeurs nommés ou par `project`
    pub(crate) fn new(inner: MultiPolygon<f64>) -> Self {
        Self {
            inner,
            _crs: PhantomData,
        }
    }

    /// Code EPSG du CRS porté par le type
    pub fn epsg(&self) -> u32 {
        C::EPSG
    }

    pub fn as_multi_polygon(&self) -> &MultiPolygon<f64> {
        &self.inner
    }

    pub fn into_multi_polygon(self) -> MultiPolygon<f64> {
        self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.0.is_empty()
    }

    /// Nombre total de sommets (tous anneaux confondus)
    pub fn vertex_count(&self) -> usize {
        self.inner
            .iter()
            .map(|p| {
                p.exterior().0.len() + p.interiors().iter().map(|r| r.0.len()).sum::<usize>()
            })
            .sum()
    }

    /// Emprise, dans le CRS de la géométrie
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.inner.bounding_rect()
    }

    /// Reprojette chaque sommet, le CRS cible est celui de la projection
    pub fn project<P>(&self, projection: &P) -> Result<Shape<P::Target>, P::Error>
    where
        P: Projection<Source = C>,
    {
        map_multi_polygon(&self.inner, |c| projection.project_coord(c)).map(Shape::new)
    }
}

impl Shape<Wgs84> {
    /// Surface en degrés (longitude, latitude)
    pub fn from_degrees(inner: MultiPolygon<f64>) -> Self {
        Self::new(inner)
    }

    /// Polygone simple en degrés (longitude, latitude)
    pub fn from_polygon(polygon: Polygon<f64>) -> Self {
        Self::new(MultiPolygon::new(vec![polygon]))
    }
}

/// Transforme chaque sommet d'un multipolygone, anneaux intérieurs compris
pub fn map_multi_polygon<E, F>(mp: &MultiPolygon<f64>, mut f: F) -> Result<MultiPolygon<f64>, E>
where
    F: FnMut(Coord<f64>) -> Result<Coord<f64>, E>,
{
    let mut polygons = Vec::with_capacity(mp.0.len());
    for poly in mp.iter() {
        let exterior = poly
            .exterior()
            .coords()
            .map(|c| f(*c))
            .collect::<Result<Vec<_>, E>>()?;
        let mut interiors = Vec::with_capacity(poly.interiors().len());
        for ring in poly.interiors() {
            interiors.push(ring.coords().map(|c| f(*c)).collect::<Result<Vec<_>, E>>()?.into());
        }
        polygons.push(Polygon::new(exterior.into(), interiors));
    }
    Ok(MultiPolygon::new(polygons))
}

impl Shape<ConusAlbers> {
    /// Surface dont les sommets sont déjà en mètres EPSG:5070
    pub fn from_projected(inner: MultiPolygon<f64>) -> Self {
        Self::new(inner)
    }

    /// Aire en mètres carrés
    pub fn area_m2(&self) -> f64 {
        self.inner.unsigned_area()
    }

    /// Intersection de deux surfaces projetées
    pub fn intersection(&self, other: &Shape<ConusAlbers>) -> Result<Shape<ConusAlbers>, GeometryError> {
        // le balayage de geo peut paniquer sur des entrées quasi dégénérées
        catch_unwind(AssertUnwindSafe(|| self.inner.intersection(&other.inner)))
            .map(Shape::new)
            .map_err(|_| GeometryError::BooleanOp)
    }
}

impl<C: Crs> Clone for Shape<C> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone())
    }
}

impl<C: Crs> PartialEq for Shape<C> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<C: Crs> fmt::Debug for Shape<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("crs", &C::NAME)
            .field("polygons", &self.inner.0.len())
            .field("vertices", &self.vertex_count())
            .finish()
    }
}

/// Conversion des coordonnées source vers WGS84 (degrés)
///
/// Le chargeur ne connaît que cette interface ; la mathématique des projections
/// vit côté application.
pub trait ToGeographic: Sync {
    /// EPSG des coordonnées d'entrée
    fn source_epsg(&self) -> u32;

    /// Convertit (x, y) en (longitude, latitude) en degrés
    fn to_geographic(&self, x: f64, y: f64) -> Result<(f64, f64), GeometryError>;
}

/// Pas de conversion : la source est déjà en EPSG:4326
#[derive(Debug, Clone, Copy, Default)]
pub struct AlreadyGeographic;

impl ToGeographic for AlreadyGeographic {
    fn source_epsg(&self) -> u32 {
        Wgs84::EPSG
    }

    fn to_geographic(&self, x: f64, y: f64) -> Result<(f64, f64), GeometryError> {
        Ok((x, y))
    }
}

//! Projection NAD83 / Conus Albers (EPSG:5070)
//!
//! Albers Equal-Area Conic avec 2 parallèles standards. Les aires mesurées
//! dans le plan sont les aires vraies sur l'ellipsoïde, d'où son usage pour
//! tous les calculs de fraction de surface.

use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::OnceLock;

use super::ellipsoid::GRS80;
use super::Geographic;

/// Paramètres EPSG:5070
struct ConusParams {
    /// Longitude origine
    lon0: f64,
    /// Latitude origine
    lat0: f64,
    /// Premier parallèle standard
    lat1: f64,
    /// Deuxième parallèle standard
    lat2: f64,
}

impl Default for ConusParams {
    fn default() -> Self {
        Self {
            lon0: (-96.0_f64).to_radians(), // 96°W
            lat0: 23.0_f64.to_radians(),    // 23°N
            lat1: 29.5_f64.to_radians(),    // 29.5°N
            lat2: 45.5_f64.to_radians(),    // 45.5°N
        }
    }
}

/// Projection d'Albers sur l'ellipsoïde, constantes précalculées
#[derive(Debug, Clone, Copy)]
pub struct AlbersEqualArea {
    a: f64,
    e: f64,
    e2: f64,
    lon0: f64,
    /// Constante du cône
    n: f64,
    c: f64,
    rho0: f64,
    /// q au pôle
    qp: f64,
}

/// Projection EPSG:5070 partagée
pub fn conus_albers() -> &'static AlbersEqualArea {
    static CONUS: OnceLock<AlbersEqualArea> = OnceLock::new();
    CONUS.get_or_init(AlbersEqualArea::conus)
}

impl AlbersEqualArea {
    /// NAD83 / Conus Albers (sans faux est ni faux nord)
    pub fn conus() -> Self {
        let p = ConusParams::default();
        Self::new(GRS80::A, GRS80::E, p.lon0, p.lat0, p.lat1, p.lat2)
    }

    fn new(a: f64, e: f64, lon0: f64, lat0: f64, lat1: f64, lat2: f64) -> Self {
        let e2 = e * e;
        let m1 = m(lat1, e2);
        let m2 = m(lat2, e2);
        let q0 = q(lat0, e, e2);
        let q1 = q(lat1, e, e2);
        let q2 = q(lat2, e, e2);

        let n = (m1 * m1 - m2 * m2) / (q2 - q1);
        let c = m1 * m1 + n * q1;
        let rho0 = a * (c - n * q0).sqrt() / n;

        Self {
            a,
            e,
            e2,
            lon0,
            n,
            c,
            rho0,
            qp: q(FRAC_PI_2, e, e2),
        }
    }

    /// Géographique (radians) → plan (mètres)
    pub fn forward(&self, geo: Geographic) -> (f64, f64) {
        let theta = self.n * normalize_lon(geo.lon - self.lon0);
        let rho = self.a * (self.c - self.n * q(geo.lat, self.e, self.e2)).max(0.0).sqrt() / self.n;

        (rho * theta.sin(), self.rho0 - rho * theta.cos())
    }

    /// Plan (mètres) → géographique (radians)
    ///
    /// Les points hors du domaine de la projection sont ramenés au pôle le plus proche.
    pub fn inverse(&self, x: f64, y: f64) -> Geographic {
        let dy = self.rho0 - y;
        let rho = x.hypot(dy);
        let theta = x.atan2(dy);
        let q_val = ((self.c - rho * rho * self.n * self.n / (self.a * self.a)) / self.n)
            .clamp(-self.qp, self.qp);

        Geographic::new(self.lon0 + theta / self.n, self.latitude_from_q(q_val))
    }

    /// Convergence des méridiens en radians : angle entre le nord vrai et le nord du quadrillage
    ///
    /// Un gisement (nord du quadrillage) s'obtient par `azimut vrai - convergence`.
    pub fn convergence(&self, lon: f64) -> f64 {
        self.n * normalize_lon(lon - self.lon0)
    }

    /// Latitude depuis q (itératif)
    fn latitude_from_q(&self, q_val: f64) -> f64 {
        if (q_val.abs() - self.qp).abs() < 1e-12 {
            return FRAC_PI_2.copysign(q_val);
        }

        let (e, e2) = (self.e, self.e2);
        let mut lat = (q_val / 2.0).asin();

        for _ in 0..15 {
            let sin_lat = lat.sin();
            let es = e * sin_lat;
            let one_minus = 1.0 - es * es;
            let delta = one_minus * one_minus / (2.0 * lat.cos())
                * (q_val / (1.0 - e2) - sin_lat / one_minus
                    + (1.0 / (2.0 * e)) * ((1.0 - es) / (1.0 + es)).ln());
            lat += delta;

            if delta.abs() < 1e-14 {
                break;
            }
        }
        lat
    }
}

/// Fonction q de Snyder (aire authalique)
fn q(lat: f64, e: f64, e2: f64) -> f64 {
    let sin_lat = lat.sin();
    let es = e * sin_lat;
    (1.0 - e2) * (sin_lat / (1.0 - es * es) - (1.0 / (2.0 * e)) * ((1.0 - es) / (1.0 + es)).ln())
}

fn m(lat: f64, e2: f64) -> f64 {
    lat.cos() / (1.0 - e2 * lat.sin().powi(2)).sqrt()
}

/// Ramène un écart de longitude dans [-π, π]
fn normalize_lon(dlon: f64) -> f64 {
    (dlon + PI).rem_euclid(2.0 * PI) - PI
}

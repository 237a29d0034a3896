// src/common/geo.rs

/// Raio médio da Terra em quilômetros.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distância de grande círculo (fórmula de haversine) entre dois pontos.
///
/// Entradas em graus, saída em quilômetros. Não valida as coordenadas:
/// um `NaN` na entrada se propaga para o resultado.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        for (lat, lng) in [(52.2297, 21.0122), (0.0, 0.0), (-33.86, 151.2), (89.9, -179.9)] {
            assert_eq!(distance_km(lat, lng, lat, lng), 0.0);
        }
    }

    #[test]
    fn is_symmetric() {
        let (a, b) = ((52.2297, 21.0122), (50.0647, 19.9450));
        let ab = distance_km(a.0, a.1, b.0, b.1);
        let ba = distance_km(b.0, b.1, a.0, a.1);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn warsaw_short_hop() {
        let d = distance_km(52.2297, 21.0122, 52.2310, 21.0140);
        assert!(d > 0.18 && d < 0.20, "distância inesperada: {d}");
    }

    #[test]
    fn one_degree_of_latitude() {
        // 2πR / 360
        let d = distance_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.195).abs() < 0.01);
    }

    #[test]
    fn nan_propagates() {
        assert!(distance_km(f64::NAN, 0.0, 1.0, 1.0).is_nan());
    }
}

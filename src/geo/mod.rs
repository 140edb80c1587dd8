use crate::models::order::Coordinate;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub fn haversine_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_M * central_angle
}

#[cfg(test)]
mod tests {
    use super::haversine_meters;
    use crate::models::order::Coordinate;

    #[test]
    fn zero_distance_for_same_point() {
        let p = Coordinate::new(32.9697, -96.80322);
        assert!(haversine_meters(&p, &p) < 1e-6);
    }

    #[test]
    fn dallas_to_san_antonio_is_around_420_km() {
        let dallas = Coordinate::new(32.9697, -96.80322);
        let san_antonio = Coordinate::new(29.46786, -98.53506);

        let distance = haversine_meters(&dallas, &san_antonio);
        assert!((distance - 423_000.0).abs() < 10_000.0, "got {distance}");
    }
}

//! # 거리 계산 유틸리티
//!
//! 위도/경도 좌표 사이의 대원 거리(great-circle distance)를 하버사인(haversine)
//! 공식으로 계산합니다. "내 주변 장소" 정렬에 사용됩니다.

/// 지구 평균 반지름 (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// 좌표가 유효한 범위인지 확인합니다 (위도 -90..=90, 경도 -180..=180).
pub fn is_valid_coordinate(lat: f64, lng: f64) -> bool {
    lat.is_finite() && lng.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}

/// 두 좌표 사이의 거리를 km 단위로 반환합니다.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// 소수점 둘째 자리까지 반올림 (응답 표시용)
pub fn round_km(distance: f64) -> f64 {
    (distance * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        assert_eq!(haversine_km(37.5665, 126.9780, 37.5665, 126.9780), 0.0);
    }

    #[test]
    fn seoul_to_busan_is_about_325km() {
        // 서울시청 → 부산시청
        let d = haversine_km(37.5665, 126.9780, 35.1796, 129.0756);
        assert!((d - 325.0).abs() < 5.0, "distance was {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = haversine_km(33.4996, 126.5312, 37.5665, 126.9780);
        let b = haversine_km(37.5665, 126.9780, 33.4996, 126.5312);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(is_valid_coordinate(37.5, 127.0));
        assert!(!is_valid_coordinate(91.0, 127.0));
        assert!(!is_valid_coordinate(37.5, -181.0));
        assert!(!is_valid_coordinate(f64::NAN, 0.0));
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round_km(1.23456), 1.23);
        assert_eq!(round_km(0.005), 0.01);
    }
}

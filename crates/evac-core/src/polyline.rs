//! Google Encoded Polyline Algorithm Format.
//!
//! Each coordinate is stored as a delta from the previous one, scaled by 1e5,
//! zig-zag encoded and split into 5-bit chunks offset by 63. A chunk with the
//! 0x20 bit set is followed by another chunk of the same value.

use crate::models::Coordinate;

const PRECISION: f64 = 1e5;
const CHUNK_OFFSET: i64 = 63;
const CONTINUATION: i64 = 0x20;
const CHUNK_MASK: i64 = 0x1f;
const MAX_LAT_E5: i64 = 90 * 100_000;
const MAX_LON_E5: i64 = 180 * 100_000;

/// Decode an encoded polyline into coordinates.
///
/// Decoding stops at the first truncated or invalid value, or at a running
/// position outside ±90°/±180°; everything decoded before it is returned.
pub fn decode(encoded: &str) -> Vec<Coordinate> {
    let bytes = encoded.as_bytes();
    let mut index = 0usize;
    let mut lat = 0i64;
    let mut lon = 0i64;
    let mut points = Vec::new();

    while index < bytes.len() {
        let Some(dlat) = next_value(bytes, &mut index) else {
            break;
        };
        let Some(dlon) = next_value(bytes, &mut index) else {
            break;
        };
        let (Some(next_lat), Some(next_lon)) = (lat.checked_add(dlat), lon.checked_add(dlon)) else {
            break;
        };
        if next_lat.abs() > MAX_LAT_E5 || next_lon.abs() > MAX_LON_E5 {
            break;
        }
        lat = next_lat;
        lon = next_lon;
        points.push(Coordinate::new(lat as f64 / PRECISION, lon as f64 / PRECISION));
    }

    points
}

fn next_value(bytes: &[u8], index: &mut usize) -> Option<i64> {
    let mut result = 0i64;
    let mut shift = 0u32;

    loop {
        let byte = *bytes.get(*index)?;
        *index += 1;
        let chunk = byte as i64 - CHUNK_OFFSET;
        // Anything below '?' or a shift past 64 bits is corrupt input.
        if !(0..64).contains(&chunk) || shift > 60 {
            return None;
        }
        result |= (chunk & CHUNK_MASK) << shift;
        shift += 5;
        if chunk & CONTINUATION == 0 {
            break;
        }
    }

    Some(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}

/// Encode coordinates at 5-decimal precision.
pub fn encode(points: &[Coordinate]) -> String {
    let mut output = String::new();
    let mut prev_lat = 0i64;
    let mut prev_lon = 0i64;

    for point in points {
        let lat = (point.lat * PRECISION).round() as i64;
        let lon = (point.lon * PRECISION).round() as i64;
        push_value(&mut output, lat - prev_lat);
        push_value(&mut output, lon - prev_lon);
        prev_lat = lat;
        prev_lon = lon;
    }

    output
}

fn push_value(output: &mut String, value: i64) {
    let mut zigzag = if value < 0 { !(value << 1) } else { value << 1 };
    while zigzag >= CONTINUATION {
        let chunk = (CONTINUATION | (zigzag & CHUNK_MASK)) + CHUNK_OFFSET;
        output.push(chunk as u8 as char);
        zigzag >>= 5;
    }
    output.push((zigzag + CHUNK_OFFSET) as u8 as char);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // Reference vector from the published algorithm description.
    const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn reference_points() -> Vec<Coordinate> {
        vec![
            Coordinate::new(38.5, -120.2),
            Coordinate::new(40.7, -120.95),
            Coordinate::new(43.252, -126.453),
        ]
    }

    fn assert_close(actual: &[Coordinate], expected: &[Coordinate]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a.lat - e.lat).abs() < 1e-9, "{a:?} != {e:?}");
            assert!((a.lon - e.lon).abs() < 1e-9, "{a:?} != {e:?}");
        }
    }

    #[test]
    fn decodes_reference_vector() {
        assert_close(&decode(REFERENCE), &reference_points());
    }

    #[test]
    fn encodes_reference_vector() {
        assert_eq!(encode(&reference_points()), REFERENCE);
    }

    #[test]
    fn empty_input_decodes_to_nothing() {
        assert!(decode("").is_empty());
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn truncated_input_returns_prefix() {
        // Drop the final byte so the last longitude never terminates.
        let truncated = &REFERENCE[..REFERENCE.len() - 1];
        let points = decode(truncated);
        assert_close(&points, &reference_points()[..2]);
    }

    #[test]
    fn oversized_deltas_stop_without_panicking() {
        let mut input = encode(&[Coordinate::new(10.0, 20.0)]);
        for _ in 0..3 {
            push_value(&mut input, (1 << 62) - 1);
            push_value(&mut input, 0);
        }
        let points = decode(&input);
        assert_close(&points, &[Coordinate::new(10.0, 20.0)]);
    }

    #[test]
    fn out_of_range_position_stops_decoding() {
        let mut input = encode(&[Coordinate::new(89.0, 179.0)]);
        // Another 2 degrees north would leave the valid latitude range.
        push_value(&mut input, 200_000);
        push_value(&mut input, 0);
        let points = decode(&input);
        assert_close(&points, &[Coordinate::new(89.0, 179.0)]);
        assert!(points.iter().all(Coordinate::is_valid));
    }

    #[test]
    fn dangling_continuation_chunk_returns_prefix() {
        let mut input = encode(&[Coordinate::new(10.0, 20.0)]);
        input.push('~'); // continuation bit set, nothing follows
        let points = decode(&input);
        assert_close(&points, &[Coordinate::new(10.0, 20.0)]);
    }

    #[test]
    fn invalid_byte_stops_decoding() {
        let mut input = encode(&[Coordinate::new(1.0, 1.0)]);
        input.push(' ');
        input.push_str(&encode(&[Coordinate::new(2.0, 2.0)]));
        assert_eq!(decode(&input).len(), 1);
    }

    #[test]
    fn round_trip_five_decimal_sequences() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let len = rng.random_range(1..30);
            let points: Vec<Coordinate> = (0..len)
                .map(|_| {
                    let lat = rng.random_range(-9_000_000i64..=9_000_000) as f64 / PRECISION;
                    let lon = rng.random_range(-18_000_000i64..=18_000_000) as f64 / PRECISION;
                    Coordinate::new(lat, lon)
                })
                .collect();
            assert_close(&decode(&encode(&points)), &points);
        }
    }
}

use lightcat_core::scale::{max_value, scale_dmx_range, scale_dmx_value};
use lightcat_core::CoreError;
use proptest::prelude::*;

fn check_values(from: u32, to: u32, cases: &[(u64, u64)]) {
    for &(value, expected) in cases {
        assert_eq!(
            scale_dmx_value(value, from, to).unwrap(),
            expected,
            "scale_dmx_value({value}, {from}, {to})"
        );
    }
}

fn check_ranges(from: u32, to: u32, cases: &[((u64, u64), (u64, u64))]) {
    for &((start, end), expected) in cases {
        assert_eq!(
            scale_dmx_range(start, end, from, to).unwrap(),
            expected,
            "scale_dmx_range({start}, {end}, {from}, {to})"
        );
    }
}

#[test]
fn test_value_8bit_to_16bit() {
    check_values(1, 2, &[(0, 0), (127, 32_639), (255, 65_535)]);
}

#[test]
fn test_value_8bit_to_24bit() {
    check_values(
        1,
        3,
        &[(0, 0), (127, 8_355_711), (128, 8_421_504), (255, 16_777_215)],
    );
}

#[test]
fn test_value_16bit_to_24bit() {
    check_values(
        2,
        3,
        &[
            (0, 0),
            (255, 65_535),
            (256, 65_536),
            (32_767, 8_388_607),
            (32_768, 8_388_608),
            (65_279, 16_711_679),
            (65_280, 16_711_680),
            (65_535, 16_777_215),
        ],
    );
}

#[test]
fn test_value_16bit_to_8bit() {
    check_values(
        2,
        1,
        &[
            (0, 0),
            (32_512, 127),
            (32_639, 127),
            (32_767, 127),
            (32_768, 128),
            (65_280, 255),
            (65_535, 255),
        ],
    );
}

#[test]
fn test_value_24bit_to_8bit() {
    check_values(
        3,
        1,
        &[
            (0, 0),
            (65_535, 0),
            (65_536, 1),
            (8_388_607, 127),
            (8_388_608, 128),
            (16_711_679, 254),
            (16_711_680, 255),
            (16_777_215, 255),
        ],
    );
}

#[test]
fn test_value_24bit_to_16bit() {
    check_values(
        3,
        2,
        &[
            (0, 0),
            (65_535, 255),
            (65_536, 256),
            (8_388_352, 32_767),
            (8_388_607, 32_767),
            (8_388_608, 32_768),
            (16_711_679, 65_279),
            (16_711_680, 65_280),
            (16_711_935, 65_280),
            (16_777_215, 65_535),
        ],
    );
}

#[test]
fn test_range_8bit_to_16bit() {
    check_ranges(
        1,
        2,
        &[
            ((0, 0), (0, 255)),
            ((0, 254), (0, 65_279)),
            ((0, 255), (0, 65_535)),
            ((127, 127), (32_512, 32_767)),
            ((255, 255), (65_280, 65_535)),
        ],
    );
}

#[test]
fn test_range_8bit_to_24bit() {
    check_ranges(
        1,
        3,
        &[
            ((0, 0), (0, 65_535)),
            ((0, 254), (0, 16_711_679)),
            ((0, 255), (0, 16_777_215)),
            ((127, 127), (8_323_072, 8_388_607)),
            ((255, 255), (16_711_680, 16_777_215)),
        ],
    );
}

#[test]
fn test_range_16bit_to_8bit() {
    check_ranges(
        2,
        1,
        &[
            ((0, 255), (0, 0)),
            ((0, 100), (0, 0)),
            ((101, 200), (0, 0)),
            ((201, 300), (1, 1)),
            ((0, 65_535), (0, 255)),
            ((32_512, 32_767), (127, 127)),
            ((64_000, 65_279), (250, 254)),
            ((65_279, 65_535), (255, 255)),
            ((65_280, 65_535), (255, 255)),
        ],
    );
}

#[test]
fn test_range_24bit_down() {
    check_ranges(
        3,
        1,
        &[
            ((615_605, 1_683_118), (10, 25)),
            ((1_683_119, 2_244_792), (26, 34)),
        ],
    );
    check_ranges(
        3,
        2,
        &[
            ((615_605, 1_683_118), (2405, 6574)),
            ((1_683_119, 2_244_792), (6575, 8768)),
        ],
    );
}

#[test]
fn test_narrow_ranges_collapse_when_downscaled() {
    // [257, 511] holds no multiple of 256, so it collapses onto its end
    // bucket and overlaps its neighbour
    let first = scale_dmx_range(0, 256, 2, 1).unwrap();
    let second = scale_dmx_range(257, 511, 2, 1).unwrap();
    assert_eq!(first, (0, 1));
    assert_eq!(second, (1, 1));
    assert_eq!(first.1, second.0);

    // 256 values wide always survive as their own bucket
    assert_eq!(scale_dmx_range(0, 255, 2, 1).unwrap(), (0, 0));
    assert_eq!(scale_dmx_range(256, 511, 2, 1).unwrap(), (1, 1));
}

#[test]
fn test_out_of_range_inputs() {
    assert!(matches!(
        scale_dmx_value(256, 1, 2),
        Err(CoreError::OutOfRange {
            value: 256,
            resolution: 1
        })
    ));
    assert!(scale_dmx_value(0, 0, 1).unwrap_err().is_out_of_range());
    assert!(scale_dmx_value(0, 1, 0).unwrap_err().is_out_of_range());
    assert!(scale_dmx_range(10, 5, 1, 2).unwrap_err().is_out_of_range());
    assert!(scale_dmx_range(0, 70_000, 2, 1).unwrap_err().is_out_of_range());
}

/// Adjacent ranges filling `0..total`, each at least `min_width` wide
fn tile(widths: &[u64], min_width: u64, total: u64) -> Vec<(u64, u64)> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for &width in widths {
        if start + width + min_width > total {
            break;
        }
        ranges.push((start, start + width - 1));
        start += width;
    }
    ranges.push((start, total - 1));
    ranges
}

fn assert_tiles(ranges: &[(u64, u64)], resolution: u32) {
    assert_eq!(ranges[0].0, 0);
    assert_eq!(ranges[ranges.len() - 1].1, max_value(resolution).unwrap());
    for pair in ranges.windows(2) {
        assert!(pair[0].0 <= pair[0].1);
        assert_eq!(pair[1].0, pair[0].1 + 1, "ranges {pair:?} are not adjacent");
    }
}

proptest! {
    #[test]
    fn upscale_then_downscale_is_identity(value in 0u64..=255, to in 2u32..=4) {
        let up = scale_dmx_value(value, 1, to).unwrap();
        prop_assert_eq!(scale_dmx_value(up, to, 1).unwrap(), value);
    }

    #[test]
    fn equal_resolution_is_identity(value in 0u64..=65_535) {
        prop_assert_eq!(scale_dmx_value(value, 2, 2).unwrap(), value);
        prop_assert_eq!(scale_dmx_range(value, value, 2, 2).unwrap(), (value, value));
    }

    #[test]
    fn value_lies_in_bucket_of_its_downscaled_value(value in 0u64..=16_777_215) {
        let coarse = scale_dmx_value(value, 3, 1).unwrap();
        let (start, end) = scale_dmx_range(coarse, coarse, 1, 3).unwrap();
        prop_assert!(start <= value && value <= end);
    }

    #[test]
    fn downscaled_range_is_ordered(start in 0u64..=65_535, len in 0u64..=65_535) {
        let end = (start + len).min(65_535);
        let (scaled_start, scaled_end) = scale_dmx_range(start, end, 2, 1).unwrap();
        prop_assert!(scaled_start <= scaled_end);
        prop_assert!(scaled_end <= 255);
    }

    #[test]
    fn downscaled_tiling_stays_a_tiling(widths in prop::collection::vec(256u64..5_000, 1..40)) {
        let ranges = tile(&widths, 256, 65_536);
        let scaled: Vec<(u64, u64)> = ranges
            .iter()
            .map(|&(start, end)| scale_dmx_range(start, end, 2, 1).unwrap())
            .collect();
        assert_tiles(&scaled, 1);
    }

    #[test]
    fn downscaled_24bit_tiling_stays_a_tiling(widths in prop::collection::vec(65_536u64..1_300_000, 1..40)) {
        let ranges = tile(&widths, 65_536, 16_777_216);
        let scaled: Vec<(u64, u64)> = ranges
            .iter()
            .map(|&(start, end)| scale_dmx_range(start, end, 3, 1).unwrap())
            .collect();
        assert_tiles(&scaled, 1);
    }

    #[test]
    fn upscaled_tiling_stays_a_tiling(widths in prop::collection::vec(1u64..40, 1..40)) {
        let ranges = tile(&widths, 1, 256);
        let scaled: Vec<(u64, u64)> = ranges
            .iter()
            .map(|&(start, end)| scale_dmx_range(start, end, 1, 2).unwrap())
            .collect();
        assert_tiles(&scaled, 2);
    }
}

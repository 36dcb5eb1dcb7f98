use flexihist::config::{HistogramConfiguration, PolicyKind};
use flexihist::factory::{flexi_int_sum_histogram, int_histogram, int_sum_histogram};
use flexihist::policy::IntSum;

fn linspace(min: f64, max: f64, points: usize) -> Vec<f64> {
    let step = (max - min) / (points - 1) as f64;
    (0..points).map(|i| min + step * i as f64).collect()
}

#[test]
fn overwrite_semantics() {
    let mut histogram = int_histogram(5, 0.0, 10.0);
    histogram.replace(2.5, 7).unwrap();
    assert_eq!(histogram.get(2.5), Ok(7));

    histogram.replace(2.5, 9).unwrap();
    assert_eq!(histogram.get(2.5), Ok(9));
}

#[test]
fn boundary_clamp() {
    let mut histogram = int_histogram(5, 0.0, 10.0);
    histogram.replace(10.0, 3).unwrap();

    assert_eq!(histogram.get(10.0), Ok(3));
    assert_eq!(histogram.num_bins(), 5);
}

#[test]
fn read_does_not_grow() {
    let histogram = int_histogram(5, 0.0, 10.0);
    assert_eq!(histogram.get(-50.0), Ok(0));
    assert_eq!(histogram.get(50.0), Ok(0));
    assert_eq!(histogram.num_bins(), 5);
}

#[test]
fn aggregation_versus_replace() {
    let mut histogram = int_sum_histogram(5, 0.0, 10.0);
    histogram.aggregate(2.5, 3).unwrap();
    histogram.aggregate(2.6, 4).unwrap();
    assert_eq!(histogram.get(2.5), Ok(7));

    histogram.replace(2.5, 1).unwrap();
    assert_eq!(histogram.get(2.5), Ok(1));
}

#[test]
fn coverage_grows_to_include_writes() {
    let mut histogram = int_histogram(5, 0.0, 10.0);
    for coord in [-13.25, 42.0, 10.0, -0.5, 1e3] {
        histogram.replace(coord, 1).unwrap();
        assert!(histogram.cover_minimum() <= coord);
        assert!(coord <= histogram.cover_maximum());
    }
}

#[test]
fn resampling_conserves_mass() {
    let histogram = flexi_int_sum_histogram(4);
    for i in 0..200 {
        histogram.aggregate(f64::from(i) * 1.5 - 100.0, 1).unwrap();
        let bins = histogram.num_bins();
        assert!((4..8).contains(&bins), "{} bins after {} insertions", bins, i + 1);
    }

    let total: i32 = histogram.bins().iter().map(|bin| bin.value).sum();
    assert_eq!(total, 200);
}

#[test]
fn empty_materialization() {
    let histogram = flexi_int_sum_histogram(4);
    assert_eq!(histogram.num_bins(), 4);
    assert_eq!(histogram.cover_minimum(), 0.0);
    assert_eq!(histogram.cover_maximum(), 1.0);
    assert!(histogram.bins().iter().all(|bin| bin.value == 0));
}

#[test]
fn twelve_evenly_spaced_points() {
    let histogram = flexi_int_sum_histogram(4);
    for coord in linspace(0.0, 100.0, 12) {
        histogram.aggregate(coord, 1).unwrap();
    }

    let bins = histogram.num_bins();
    assert!((4..8).contains(&bins));

    let total: i32 = histogram.bins().iter().map(|bin| bin.value).sum();
    assert_eq!(total, 12);

    // The first eight samples span [0, 63.6], rounded out to [0, 64].
    assert_eq!(histogram.cover_minimum(), 0.0);
    assert_eq!(histogram.bin_size(), 16.0);
}

#[test]
fn configured_histogram() {
    let config: HistogramConfiguration = serde_yaml::from_str("bins: 4\npolicy: int_sum\n").unwrap();
    assert_eq!(config.policy, PolicyKind::IntSum);

    let histogram = config.build_adaptive(IntSum).unwrap();
    for coord in linspace(0.0, 100.0, 12) {
        histogram.aggregate(coord, 1).unwrap();
    }

    let total: i32 = histogram.bins().iter().map(|bin| bin.value).sum();
    assert_eq!(total, 12);
}

#[test]
fn far_away_coordinates_keep_bins_bounded() {
    let histogram = flexi_int_sum_histogram(4);
    histogram.aggregate(1.0, 1).unwrap();
    assert_eq!(histogram.num_bins(), 4);

    for coord in [1.0e300, -1.0e300, 1.0e9, -42.0] {
        histogram.aggregate(coord, 1).unwrap();
        let bins = histogram.num_bins();
        assert!((4..8).contains(&bins), "{} bins after inserting {}", bins, coord);
    }

    let total: i32 = histogram.bins().iter().map(|bin| bin.value).sum();
    assert_eq!(total, 5);
}

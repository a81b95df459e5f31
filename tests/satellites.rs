use proptest::prelude::*;

use vectorfx::{AmountMode, PathVector, PathVectorSatellites, Pathinfo, Satellite, SatelliteType};

fn chamfer() -> Satellite {
    Satellite::new(SatelliteType::Chamfer)
}

/// Path data for a closed sub-path with `n` corners.
fn closed_polygon(n: usize, offset: f64) -> String {
    let mut data = format!("M {} 0", offset + 10.0);
    for i in 1..n {
        let a = i as f64 * std::f64::consts::TAU / n as f64;
        data.push_str(&format!(" L {} {}", offset + 10.0 * a.cos(), 10.0 * a.sin()));
    }
    data.push_str(" Z");
    data
}

#[test]
fn satellites_follow_the_path_through_edits() {
    let triangle_and_pentagon = format!("{} {}", closed_polygon(3, 10.0), closed_polygon(5, 50.0));
    let path = PathVector::from_path_data(&triangle_and_pentagon).unwrap();

    let mut pvs = PathVectorSatellites::new(path, chamfer());
    assert_eq!(pvs.total_satellites(), 8);
    assert_eq!(
        pvs.satellites().iter().map(Vec::len).collect::<Vec<_>>(),
        vec![3, 5]
    );

    pvs.set_selected(&[1, 4]);
    pvs.update_amount(1.5, AmountMode::KnotDistance, true, true, true);
    assert_eq!(pvs.satellites()[0][1].amount, 1.5);
    assert_eq!(pvs.satellites()[1][1].amount, 1.5);
    assert_eq!(pvs.satellites()[1][0].amount, 0.0);

    let serialized = pvs.to_param_string();
    let restored = PathVectorSatellites::satellites_from_param_str(&serialized).unwrap();
    assert_eq!(restored, pvs.satellites());

    // moving a node keeps the counts, so the satellites survive
    let moved = format!("{} {}", closed_polygon(3, 12.0), closed_polygon(5, 50.0));
    assert!(!pvs.sync_to_path_vector(PathVector::from_path_data(&moved).unwrap(), chamfer()));
    assert_eq!(pvs.satellites()[0][1].amount, 1.5);

    // adding a node does not
    let grown = format!("{} {}", closed_polygon(4, 10.0), closed_polygon(5, 50.0));
    assert!(pvs.sync_to_path_vector(PathVector::from_path_data(&grown).unwrap(), chamfer()));
    assert_eq!(pvs.total_satellites(), 9);
    assert!(pvs.satellites().iter().flatten().all(|s| *s == chamfer()));
}

#[test]
fn global_indices_match_satellite_order() {
    let path = PathVector::from_path_data("M 0 0 L 4 0 L 4 4 Z M 10 10 L 12 10 L 12 14").unwrap();
    let pvs = PathVectorSatellites::new(path, chamfer());
    let info = Pathinfo::new(pvs.path_vector());

    assert_eq!(info.len(), pvs.total_satellites());

    let mut index = 0;
    for (sub_path, satellites) in pvs.satellites().iter().enumerate() {
        for node in 0..satellites.len() {
            assert_eq!(info.local_index(index), Some((sub_path, node)));
            index += 1;
        }
    }
}

#[test]
fn satellite_knots_sit_on_their_segments() {
    let path = PathVector::from_path_data("M 0 0 L 10 0 C 10 5 15 10 20 10").unwrap();
    let mut pvs = PathVectorSatellites::new(path, chamfer());
    pvs.update_amount(4.0, AmountMode::KnotDistance, true, true, false);

    let segment = pvs.path_vector().segment(0, 1).unwrap();
    let satellite = pvs.satellites()[0][1];
    let (x, y) = satellite.position(&segment);
    let start = segment.start();

    assert!(((x - start.0).hypot(y - start.1) - 4.0).abs() < 0.2);
    assert!((satellite.size(&segment) - 4.0).abs() < 1e-9);
}

proptest! {
    #[test]
    fn recalculation_matches_any_node_counts(counts in prop::collection::vec(3usize..9, 0..5)) {
        let data = counts
            .iter()
            .enumerate()
            .map(|(i, &n)| closed_polygon(n, 30.0 * i as f64))
            .collect::<Vec<_>>()
            .join(" ");
        let path = PathVector::from_path_data(&data).unwrap();

        let mut pvs = PathVectorSatellites::default();
        pvs.recalculate_for_new_path_vector(path, chamfer());

        let lens: Vec<usize> = pvs.satellites().iter().map(Vec::len).collect();
        prop_assert_eq!(lens, counts.clone());
        prop_assert_eq!(pvs.total_satellites(), counts.iter().sum::<usize>());
        prop_assert!(pvs.is_consistent());
    }
}

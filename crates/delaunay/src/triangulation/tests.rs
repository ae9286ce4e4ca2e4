use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

fn pt(coords: &[f64]) -> Point {
    Point::from_slice(coords).unwrap()
}

fn affine_cfg() -> DtCfg {
    DtCfg {
        randomize: false,
        homogeneous: false,
        ..DtCfg::default()
    }
}

fn homo_cfg() -> DtCfg {
    DtCfg {
        randomize: false,
        ..DtCfg::default()
    }
}

/// Build two faces over `points[..n-1]` and `points[1..]`, twin-link their
/// shared facet, and check that it is locally Delaunay iff expected (from
/// both sides, which must agree).
fn quick_delaunay_test(points: &[Point], expectation: bool) {
    let vertices: Vec<Vertex> = points
        .iter()
        .map(|p| Vertex { point: p.clone() })
        .collect();
    let n = points.len();
    let ids: Vec<VertexId> = (0..n).map(VertexId).collect();
    let face_1 = Face::new(ids[..n - 1].to_vec(), &vertices).unwrap();
    let face_2 = Face::new(ids[1..].to_vec(), &vertices).unwrap();
    let mut dt = DelaunayTriangulation {
        dimension: points[0].len() - 1,
        vertices,
        faces: vec![Some(face_1), Some(face_2)],
        live: 2,
        point_history: Vec::new(),
        homogeneous_input: true,
        name: "quick".to_string(),
        observers: Observers::default(),
    };
    let slot_1 = dt.faces[0].as_ref().unwrap().slot_of(ids[0]).unwrap();
    let slot_2 = dt.faces[1].as_ref().unwrap().slot_of(ids[n - 1]).unwrap();
    dt.faces[0].as_mut().unwrap().half_facets[slot_1].twin = Some(HalfFacetRef {
        face: FaceId(1),
        slot: slot_2,
    });
    dt.faces[1].as_mut().unwrap().half_facets[slot_2].twin = Some(HalfFacetRef {
        face: FaceId(0),
        slot: slot_1,
    });

    let facet_1 = dt.faces[0].as_ref().unwrap().half_facets[slot_1].clone();
    let facet_2 = dt.faces[1].as_ref().unwrap().half_facets[slot_2].clone();
    // A facet's own opposite vertex sits on its positive side.
    let opposite_point = dt.vertices[ids[0].0].point.clone();
    assert_eq!(dt.lineside(&facet_1, &opposite_point).unwrap(), 1);
    assert_eq!(dt.locally_delaunay(&facet_1, None).unwrap(), expectation);
    assert_eq!(dt.locally_delaunay(&facet_2, None).unwrap(), expectation);
}

#[test]
fn locally_delaunay_one_dimension() {
    quick_delaunay_test(
        &[pt(&[-1.0, 1.0]), pt(&[2.0, 1.0]), pt(&[3.0, 1.0])],
        true,
    );
}

#[test]
fn locally_delaunay_plane_cases() {
    quick_delaunay_test(
        &[
            pt(&[0.0, 2.0, 1.0]),
            pt(&[-1.0, 0.0, 1.0]),
            pt(&[1.0, 0.0, 1.0]),
            pt(&[0.0, -1.0, 1.0]),
        ],
        true,
    );
    quick_delaunay_test(
        &[
            pt(&[0.0, 2.0, 1.0]),
            pt(&[-1.0, 0.0, 1.0]),
            pt(&[1.0, 0.0, 1.0]),
            pt(&[0.0, -0.3, 1.0]),
        ],
        false,
    );
}

#[test]
fn locally_delaunay_space_cases() {
    let unit_sphere = [
        pt(&[0.0, 0.0, -1.0, 1.0]),
        pt(&[0.0, 1.0, 0.0, 1.0]),
        pt(&[0.0, -1.0, 0.0, 1.0]),
        pt(&[1.0, 0.0, 0.0, 1.0]),
    ];
    let mut outside = unit_sphere.to_vec();
    outside.push(pt(&[0.0, 0.0, 1.5, 1.0]));
    quick_delaunay_test(&outside, true);
    let mut inside = unit_sphere.to_vec();
    inside.push(pt(&[0.0, 0.0, 0.5, 1.0]));
    quick_delaunay_test(&inside, false);
}

#[test]
fn locally_delaunay_with_points_at_infinity() {
    quick_delaunay_test(
        &[
            pt(&[0.0, 1.0, 0.0]),
            pt(&[0.5, -400.0, 1.0]),
            pt(&[0.0, 0.0, 1.0]),
            pt(&[-1.0, -1.0, 0.0]),
        ],
        true,
    );
    quick_delaunay_test(
        &[
            pt(&[-2.0, 0.0, 1.0]),
            pt(&[-0.6, 3.2, 1.0]),
            pt(&[3.2, 2.1, 1.0]),
            pt(&[1.0, 0.0, 0.0]),
        ],
        true,
    );
}

#[test]
fn outer_face_points_span_all_of_the_plane() {
    let pts = outer_face_points(2);
    assert_eq!(pts.len(), 3);
    assert!(pts.iter().all(|p| p.is_infinite()));
    assert_eq!(pts[0], pt(&[1.0, 0.0, 0.0]));
    assert_eq!(pts[1], pt(&[0.0, 1.0, 0.0]));
    assert_eq!(pts[2], pt(&[-1.0, -1.0, 0.0]));
}

#[test]
fn empty_input_is_rejected() {
    assert_eq!(
        DelaunayTriangulation::new(Vec::new(), DtCfg::default()).unwrap_err(),
        Error::EmptyInput
    );
}

#[test]
fn single_point_splits_the_outer_simplex() {
    let point = pt(&[-3.0, 2.0, 1.0]);
    let dt = DelaunayTriangulation::new(vec![point.clone()], homo_cfg()).unwrap();
    assert_eq!(dt.face_count(), 3);
    let mut null_twins = 0;
    for (id, face) in dt.live_faces() {
        assert_eq!(face.vertices.len(), 3);
        assert_eq!(face.half_facets.len(), 3);
        assert!(dt.face_points(face).contains(&point));
        for (slot, hf) in face.iter_facets().enumerate() {
            assert_eq!(hf.opposite, face.vertices[slot]);
            assert!(!hf.vertices.contains(&hf.opposite));
            match hf.twin {
                None => null_twins += 1,
                Some(t) => {
                    let twin = &dt.face(t.face).unwrap().half_facets[t.slot];
                    assert_eq!(twin.twin, Some(HalfFacetRef { face: id, slot }));
                    assert_eq!(twin.vertices, hf.vertices);
                    assert_eq!(twin.side, -hf.side);
                }
            }
        }
    }
    assert_eq!(null_twins, 3);
    assert!(dt.is_delaunay());
}

#[test]
fn five_points_in_general_position_are_delaunay() {
    let points = vec![
        pt(&[0.5, -400.0, 1.0]),
        pt(&[10.0, 21.0, 1.0]),
        pt(&[-5.0, 0.0, 1.0]),
        pt(&[1.0, 2.0, 1.0]),
        pt(&[2.0, 1.0, 1.0]),
    ];
    let dt = DelaunayTriangulation::new(points, homo_cfg()).unwrap();
    assert!(dt.is_delaunay());
}

fn face_set(faces: &[&[[f64; 2]]]) -> BTreeSet<BTreeSet<Point>> {
    faces
        .iter()
        .map(|face| face.iter().map(|c| pt(&[c[0], c[1]])).collect())
        .collect()
}

#[test]
fn seven_point_plane_case_matches_expected_faces() {
    let dt = DelaunayTriangulation::new(
        vec![
            pt(&[-0.6, 3.2]),
            pt(&[3.2, 2.1]),
            pt(&[-2.0, 0.0]),
            pt(&[1.0, -0.2]),
            pt(&[3.6, -0.3]),
            pt(&[-1.4, -2.1]),
            pt(&[2.5, -1.7]),
        ],
        affine_cfg(),
    )
    .unwrap();
    assert!(dt.is_delaunay());
    let got = dt.face_point_sets(false);
    for face in &got {
        assert_eq!(face.len(), 3);
    }
    let expected = face_set(&[
        &[[-2.0, 0.0], [-0.6, 3.2], [1.0, -0.2]],
        &[[3.2, 2.1], [-0.6, 3.2], [1.0, -0.2]],
        &[[3.2, 2.1], [3.6, -0.3], [1.0, -0.2]],
        &[[2.5, -1.7], [3.6, -0.3], [1.0, -0.2]],
        &[[2.5, -1.7], [-1.4, -2.1], [1.0, -0.2]],
        &[[-1.4, -2.1], [-2.0, 0.0], [1.0, -0.2]],
    ]);
    assert_eq!(got, expected);
}

#[test]
fn face_point_sets_can_keep_weights() {
    let dt = DelaunayTriangulation::new(
        vec![pt(&[0.0, 0.0]), pt(&[4.0, 0.0]), pt(&[0.0, 4.0])],
        affine_cfg(),
    )
    .unwrap();
    let kept = dt.face_point_sets(true);
    assert_eq!(kept.len(), 1);
    let face = kept.iter().next().unwrap();
    assert!(face.iter().all(|p| p.len() == 3 && p.weight() == 1.0));
}

#[test]
fn randomized_insertions_keep_global_invariants() {
    let mut rng = StdRng::seed_from_u64(42);
    let points: Vec<Point> = (0..25)
        .map(|_| pt(&[rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0)]))
        .collect();
    let dt = DelaunayTriangulation::new(points.clone(), affine_cfg()).unwrap();
    assert!(dt.is_delaunay());
    // Every input point ends up as a vertex of some live face.
    for p in &points {
        let lifted = p.lift(|_| 1.0);
        assert!(dt
            .live_faces()
            .any(|(_, f)| dt.face_points(f).contains(&lifted)));
    }
    // Simplicial closure and twin symmetry, globally.
    for (id, face) in dt.live_faces() {
        assert_eq!(face.vertices.len(), 3);
        assert_eq!(face.half_facets.len(), 3);
        for (slot, hf) in face.iter_facets().enumerate() {
            if let Some(t) = hf.twin {
                let twin = &dt.face(t.face).unwrap().half_facets[t.slot];
                assert_eq!(twin.twin, Some(HalfFacetRef { face: id, slot }));
                assert_eq!(twin.vertices, hf.vertices);
                assert_eq!(twin.side, -hf.side);
            }
        }
    }
}

#[test]
fn shuffled_input_produces_the_same_face_sets() {
    let input = vec![
        pt(&[-0.6, 3.2]),
        pt(&[3.2, 2.1]),
        pt(&[-2.0, 0.0]),
        pt(&[1.0, -0.2]),
        pt(&[3.6, -0.3]),
        pt(&[-1.4, -2.1]),
        pt(&[2.5, -1.7]),
    ];
    let plain = DelaunayTriangulation::new(input.clone(), affine_cfg()).unwrap();
    let shuffled = DelaunayTriangulation::new(
        input,
        DtCfg {
            randomize: true,
            homogeneous: false,
            ..DtCfg::default()
        },
    )
    .unwrap();
    assert_eq!(
        plain.face_point_sets(false),
        shuffled.face_point_sets(false)
    );
}

#[test]
fn hull_facets_separate_finite_from_infinite_faces() {
    // A fan of six triangles around an interior point has six hull edges;
    // each is a facet of a finite face whose twin lives in an infinite one.
    let dt = DelaunayTriangulation::new(
        vec![
            pt(&[-0.6, 3.2]),
            pt(&[3.2, 2.1]),
            pt(&[-2.0, 0.0]),
            pt(&[1.0, -0.2]),
            pt(&[3.6, -0.3]),
            pt(&[-1.4, -2.1]),
            pt(&[2.5, -1.7]),
        ],
        affine_cfg(),
    )
    .unwrap();
    let is_infinite = |face: &Face| {
        face.vertices
            .iter()
            .any(|v| dt.vertex_point(*v).is_infinite())
    };
    let mut hull_facets = 0;
    for (_, face) in dt.live_faces() {
        if is_infinite(face) {
            continue;
        }
        for hf in face.iter_facets() {
            let t = hf.twin.expect("finite faces have no boundary facets");
            if is_infinite(dt.face(t.face).unwrap()) {
                // A hull facet has only finite vertices.
                assert!(hf
                    .vertices
                    .iter()
                    .all(|v| !dt.vertex_point(*v).is_infinite()));
                hull_facets += 1;
            }
        }
    }
    assert_eq!(hull_facets, 6);
}

#[test]
fn delaunay_add_extends_an_existing_triangulation() {
    let mut dt = DelaunayTriangulation::new(
        vec![pt(&[0.0, 0.0]), pt(&[4.0, 0.0]), pt(&[0.0, 4.0])],
        affine_cfg(),
    )
    .unwrap();
    assert_eq!(dt.face_point_sets(false).len(), 1);
    dt.delaunay_add(pt(&[1.0, 1.0])).unwrap();
    assert!(dt.is_delaunay());
    assert_eq!(dt.face_point_sets(false).len(), 3);
}

#[test]
fn duplicate_point_is_a_general_position_failure() {
    let result = DelaunayTriangulation::new(
        vec![
            pt(&[0.0, 0.0]),
            pt(&[1.0, 0.0]),
            pt(&[0.0, 1.0]),
            pt(&[1.0, 0.0]),
        ],
        affine_cfg(),
    );
    assert_eq!(result.unwrap_err(), Error::GeneralPosition);

    let mut dt = DelaunayTriangulation::new(
        vec![pt(&[0.0, 0.0]), pt(&[1.0, 0.0]), pt(&[0.0, 1.0])],
        affine_cfg(),
    )
    .unwrap();
    assert_eq!(
        dt.delaunay_add(pt(&[1.0, 0.0])).unwrap_err(),
        Error::GeneralPosition
    );
}

#[test]
fn locate_returns_a_face_containing_the_query() {
    let dt = DelaunayTriangulation::new(
        vec![
            pt(&[-0.6, 3.2]),
            pt(&[3.2, 2.1]),
            pt(&[-2.0, 0.0]),
            pt(&[1.0, -0.2]),
            pt(&[3.6, -0.3]),
            pt(&[-1.4, -2.1]),
            pt(&[2.5, -1.7]),
        ],
        affine_cfg(),
    )
    .unwrap();
    for query in [pt(&[0.9, -0.1]), pt(&[-1.0, 1.0]), pt(&[100.0, 100.0])] {
        let id = dt.locate(&query).unwrap();
        let face = dt.face(id).unwrap();
        let lifted = query.lift(|_| 1.0);
        for hf in face.iter_facets() {
            assert!(dt.lineside(hf, &lifted).unwrap() >= 0);
        }
    }
}

#[test]
fn point_history_preserves_insertion_order() {
    let input = vec![
        pt(&[0.5, -400.0, 1.0]),
        pt(&[10.0, 21.0, 1.0]),
        pt(&[-5.0, 0.0, 1.0]),
    ];
    let dt = DelaunayTriangulation::new(input.clone(), homo_cfg()).unwrap();
    assert_eq!(dt.point_history(), &input[..]);
}

#[test]
fn observers_fire_during_insertion() {
    use std::cell::Cell;
    use std::rc::Rc;

    let locates = Rc::new(Cell::new(0usize));
    let redraws = Rc::new(Cell::new(0usize));
    let mut observers = Observers::default();
    let counter = locates.clone();
    observers.on_locate = Some(Box::new(move |_| counter.set(counter.get() + 1)));
    let counter = redraws.clone();
    observers.on_redraw = Some(Box::new(move || counter.set(counter.get() + 1)));
    let dt = DelaunayTriangulation::with_observers(
        vec![pt(&[0.0, 0.0]), pt(&[1.0, 0.0]), pt(&[0.0, 1.0])],
        affine_cfg(),
        observers,
    )
    .unwrap();
    assert!(dt.is_delaunay());
    // One walk step minimum per insertion, one redraw exactly.
    assert!(locates.get() >= 3);
    assert_eq!(redraws.get(), 3);
}

#[test]
fn three_dimensional_fixture_matches_expected_tetrahedra() {
    let points: Vec<Point> = include_str!("../../testdata/points3d.csv")
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            let coords: Vec<f64> = l
                .split(',')
                .map(|x| x.trim().parse::<f64>().unwrap())
                .collect();
            pt(&coords)
        })
        .collect();
    let dt = DelaunayTriangulation::new(points.clone(), affine_cfg()).unwrap();
    assert!(dt.is_delaunay());
    // Expected faces are 1-based index tuples into the point list.
    let expected: BTreeSet<BTreeSet<Point>> = include_str!("../../testdata/dt3d.csv")
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            l.split(',')
                .map(|i| points[i.trim().parse::<usize>().unwrap() - 1].clone())
                .collect()
        })
        .collect();
    let got = dt.face_point_sets(false);
    for face in &got {
        assert_eq!(face.len(), 4);
    }
    assert_eq!(got, expected);
}

//! Property-based tests for the codecs and traversal functions using proptest

use geotree_core::binary::{self, EncodeOptions};
use geotree_core::functions::accessors::count_vertices;
use geotree_core::functions::editors::project_to_2d;
use geotree_core::functions::operations::simplify;
use geotree_core::wkt::{self, WriteOptions};
use geotree_core::{Coord, Dims, Geometry, GeometryType, Shape};
use proptest::collection::vec;
use proptest::prelude::*;

fn dims_strategy() -> impl Strategy<Value = Dims> {
    (any::<bool>(), any::<bool>()).prop_map(|(z, m)| Dims::new(z, m))
}

/// Integral ordinates so every value is exact in text at any precision.
fn coord_strategy() -> impl Strategy<Value = Coord> {
    (-1000i32..1000, -1000i32..1000, -100i32..100, 0i32..100).prop_map(|(x, y, z, m)| {
        Coord::xyzm(f64::from(x), f64::from(y), f64::from(z), f64::from(m))
    })
}

fn leaf_strategy(dims: Dims) -> impl Strategy<Value = Geometry> {
    prop_oneof![
        coord_strategy().prop_map(move |c| Geometry::point(dims, c)),
        vec(coord_strategy(), 2..12)
            .prop_map(move |cs| Geometry::line_string(dims, cs).unwrap()),
        vec(coord_strategy(), 3..8).prop_map(move |mut ring| {
            ring.push(ring[0]);
            Geometry::polygon(dims, vec![ring]).unwrap()
        }),
        vec(coord_strategy(), 1..6).prop_map(move |cs| {
            let points = cs.into_iter().map(|c| Geometry::point(dims, c)).collect();
            Geometry::collection(GeometryType::MultiPoint, dims, points).unwrap()
        }),
    ]
}

fn tree_strategy() -> impl Strategy<Value = Geometry> {
    dims_strategy().prop_flat_map(|dims| {
        prop_oneof![
            leaf_strategy(dims),
            vec(leaf_strategy(dims), 1..5).prop_map(move |members| {
                Geometry::collection(GeometryType::GeometryCollection, dims, members).unwrap()
            }),
        ]
    })
}

fn leaf_pair_strategy() -> impl Strategy<Value = (Dims, Geometry, Geometry)> {
    dims_strategy().prop_flat_map(|dims| (Just(dims), leaf_strategy(dims), leaf_strategy(dims)))
}

fn line_strategy() -> impl Strategy<Value = Geometry> {
    vec(coord_strategy(), 2..40).prop_map(|cs| Geometry::line_string(Dims::XY, cs).unwrap())
}

fn line_coords(geom: &Geometry) -> &[Coord] {
    match geom.shape() {
        Shape::LineString(cs) => cs,
        other => panic!("expected a line string, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn project_to_2d_is_idempotent(tree in tree_strategy()) {
        let once = project_to_2d(&tree);
        prop_assert_eq!(project_to_2d(&once), once.clone());
        prop_assert_eq!(once.dims(), Dims::XY);
        prop_assert_eq!(count_vertices(&once), count_vertices(&tree));
        prop_assert_eq!(once.srid(), tree.srid());
    }

    #[test]
    fn count_vertices_is_additive((dims, a, b) in leaf_pair_strategy()) {
        let expected = count_vertices(&a) + count_vertices(&b);
        let both = Geometry::collection(GeometryType::GeometryCollection, dims, vec![a, b]).unwrap();
        prop_assert_eq!(count_vertices(&both), expected);
    }

    #[test]
    fn simplify_keeps_endpoints_and_never_grows(line in line_strategy(), tolerance in 0.0f64..50.0) {
        let out = simplify(&line, tolerance);
        let (before, after) = (line_coords(&line), line_coords(&out));
        prop_assert!(after.len() <= before.len());
        prop_assert_eq!(after.first(), before.first());
        prop_assert_eq!(after.last(), before.last());
    }

    #[test]
    fn simplify_with_zero_tolerance_keeps_every_point(tree in tree_strategy()) {
        prop_assert_eq!(simplify(&tree, 0.0), tree);
    }

    #[test]
    fn text_round_trip_in_every_dialect(tree in tree_strategy()) {
        for opts in [WriteOptions::plain(15), WriteOptions::extended(15), WriteOptions::iso(0)] {
            let text = wkt::write(&tree, opts);
            prop_assert_eq!(wkt::parse(&text).unwrap(), tree.clone(), "{}", text);
        }
    }

    #[test]
    fn binary_round_trip(tree in tree_strategy(), srid in -1i32..10_000, bbox in any::<bool>()) {
        let tree = tree.with_srid(srid);
        let buf = binary::encode(&tree, EncodeOptions::new(true, bbox)).unwrap();
        prop_assert_eq!(binary::decode(&buf).unwrap(), tree);
    }
}

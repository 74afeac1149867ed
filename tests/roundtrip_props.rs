//! Property tests: save then load reproduces state byte for byte

use lbm_checkpoint::{Cuboid2D, CuboidGeometry2D, Serializable, Serializer};
use proptest::prelude::*;
use tempfile::TempDir;

fn arb_cuboid() -> impl Strategy<Value = Cuboid2D> {
    (
        -1e6f64..1e6,
        -1e6f64..1e6,
        1e-6f64..1e3,
        1u64..512,
        1u64..512,
    )
        .prop_map(|(x, y, delta, nx, ny)| Cuboid2D::new([x, y], delta, [nx, ny]))
}

proptest! {
    #[test]
    fn prop_cuboid_roundtrip(mut cuboid in arb_cuboid()) {
        let dir = TempDir::new().unwrap();
        let serializer = Serializer::new();
        let written = serializer.save(&mut cuboid, dir.path(), "cuboid").unwrap();
        prop_assert_eq!(written as usize, cuboid.serializable_size());

        let mut restored = Cuboid2D::default();
        serializer.load(&mut restored, dir.path(), "cuboid").unwrap();
        prop_assert_eq!(restored, cuboid);
    }

    #[test]
    fn prop_geometry_roundtrip(
        motherhood in arb_cuboid(),
        num_cuboids in 0usize..12,
        periodic_x in any::<bool>(),
        periodic_y in any::<bool>(),
    ) {
        let dir = TempDir::new().unwrap();
        let mut geometry = CuboidGeometry2D::new(motherhood, num_cuboids);
        geometry.set_periodic(periodic_x, periodic_y);

        let serializer = Serializer::new();
        let written = serializer.save(&mut geometry, dir.path(), "geometry").unwrap();
        prop_assert_eq!(written as usize, geometry.serializable_size());

        let mut restored = CuboidGeometry2D::default();
        serializer.load(&mut restored, dir.path(), "geometry").unwrap();
        prop_assert_eq!(restored.motherhood(), geometry.motherhood());
        prop_assert_eq!(restored.cuboids(), geometry.cuboids());
        prop_assert_eq!(restored.periodic(), geometry.periodic());
    }

    #[test]
    fn prop_block_sizes_sum_to_footprint(mut cuboid in arb_cuboid()) {
        let total: usize = (0..cuboid.num_blocks())
            .map(|i| cuboid.block(i, lbm_checkpoint::Mode::Save).unwrap().len())
            .sum();
        prop_assert_eq!(total, cuboid.serializable_size());
    }
}

use criterion::{criterion_group, criterion_main, Criterion};
use mazegen::{
    floorplan::Floorplan,
    generators::{Carver, EllerGenerator},
    pathing::Distance,
    units::{Height, Width},
    BuildControl, MazeBuilder,
};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

fn skeleton_32() -> Floorplan {
    let mut fp = Floorplan::new(Width(32), Height(32));
    fp.mark_borders();
    fp
}

fn bench_eller_carve_32(c: &mut Criterion) {
    let control = BuildControl::detached();
    let mut rng = XorShiftRng::seed_from_u64(32);

    c.bench_function("eller_carve_32", move |b| {
        b.iter(|| {
            let mut fp = skeleton_32();
            EllerGenerator::new().carve(&mut fp, &mut rng, &control).unwrap();
            fp
        })
    });
}

fn bench_build_with_rooms_32(c: &mut Criterion) {
    let control = BuildControl::detached();
    let builder = MazeBuilder::new(Width(32), Height(32)).perfect(false).max_rooms(5).seed(7);

    c.bench_function("build_with_rooms_32", move |b| {
        b.iter(|| builder.build(&control).unwrap())
    });
}

fn bench_exit_distances_32(c: &mut Criterion) {
    let maze = MazeBuilder::new(Width(32), Height(32))
        .seed(3)
        .build(&BuildControl::detached())
        .unwrap();
    let exit = maze.exit_position();

    c.bench_function("exit_distances_32", move |b| {
        b.iter(|| Distance::new(maze.floorplan(), exit).unwrap())
    });
}

criterion_group!(
    benches,
    bench_eller_carve_32,
    bench_build_with_rooms_32,
    bench_exit_distances_32
);
criterion_main!(benches);

use std::fs;
use std::path::Path;

use image::{Rgba, RgbaImage};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use tilescramble::purge::purge;
use tilescramble::{scramble_dir, scramble_file, Grid, Job};

const COLORS: [Rgba<u8>; 4] = [
    Rgba([255, 0, 0, 255]),
    Rgba([0, 255, 0, 255]),
    Rgba([0, 0, 255, 255]),
    Rgba([255, 255, 0, 255]),
];

fn quadrant_png(path: &Path) {
    RgbaImage::from_fn(4, 4, |x, y| COLORS[(y / 2 * 2 + x / 2) as usize])
        .save(path)
        .unwrap();
}

#[test]
fn quadrants_are_permuted() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("quad.png");
    quadrant_png(&src);

    let job = Job::new(Grid::new(2, 2).unwrap());
    let out = scramble_file(&src, &job, &mut Xoshiro256StarStar::seed_from_u64(11)).unwrap();
    assert_eq!(out, dir.path().join("s_quad.png"));

    let img = image::open(&out).unwrap().into_rgba8();
    assert_eq!(img.dimensions(), (4, 4));

    let mut seen = Vec::new();
    for (qx, qy) in [(0, 0), (2, 0), (0, 2), (2, 2)] {
        let c = *img.get_pixel(qx, qy);
        for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(*img.get_pixel(qx + dx, qy + dy), c);
        }
        seen.push(c.0);
    }
    seen.sort_unstable();
    let mut expected: Vec<_> = COLORS.iter().map(|c| c.0).collect();
    expected.sort_unstable();
    assert_eq!(seen, expected);
}

#[test]
fn batch_then_purge() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    quadrant_png(&dir.path().join("a.png"));
    quadrant_png(&dir.path().join("b.png"));
    quadrant_png(&dir.path().join("s_old.png"));
    quadrant_png(&dir.path().join("upper.PNG"));
    fs::write(dir.path().join("notes.txt"), b"keep").unwrap();

    let job = Job::new(Grid::new(2, 2).unwrap());
    let outputs =
        scramble_dir(dir.path(), &job, &mut Xoshiro256StarStar::seed_from_u64(5)).unwrap();
    assert_eq!(
        outputs,
        [
            dir.path().join("s_a.png"),
            dir.path().join("s_b.png"),
            dir.path().join("s_s_old.png"),
        ]
    );
    assert!(!dir.path().join("s_s_a.png").exists());

    let report = purge(dir.path()).unwrap();
    assert_eq!(report.deleted.len(), 4);
    assert!(dir.path().join("a.png").exists());
    assert!(dir.path().join("b.png").exists());
    assert!(dir.path().join("notes.txt").exists());
    assert!(!dir.path().join("s_upper.PNG").exists());

    assert!(purge(dir.path()).unwrap().deleted.is_empty());
}

#[test]
fn batch_aborts_on_bad_image() {
    let dir = tempfile::tempdir().unwrap();
    quadrant_png(&dir.path().join("b.png"));
    fs::write(dir.path().join("a.png"), b"not a png").unwrap();

    let job = Job::new(Grid::new(2, 2).unwrap());
    assert!(scramble_dir(dir.path(), &job, &mut Xoshiro256StarStar::seed_from_u64(5)).is_err());
    assert!(!dir.path().join("s_b.png").exists());
}

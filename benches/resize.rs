#[macro_use]
extern crate criterion;

use criterion::Criterion;
use image::{GrayImage, Luma};
use seamraster::{CarveSettings, Raster};

fn synth(w: u32, h: u32) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| Luma([((x * x + y * 3) % 256) as u8]))
}

fn bench_shrink(c: &mut Criterion) {
    let img = synth(48, 48);
    c.bench_function("carve 8 seams from 48x48", move |b| {
        b.iter(|| {
            let mut r = Raster::from_image(&img, CarveSettings::default()).unwrap();
            r.resize(40, 48).unwrap();
            r.width()
        })
    });
}

fn bench_switch(c: &mut Criterion) {
    let img = synth(48, 48);
    c.bench_function("flip widths inside a built map", move |b| {
        let mut r = Raster::from_image(&img, CarveSettings::default()).unwrap();
        r.resize(40, 48).unwrap();
        b.iter(|| {
            r.resize(44, 48).unwrap();
            r.resize(40, 48).unwrap();
        })
    });
}

criterion_group!(benches, bench_shrink, bench_switch);
criterion_main!(benches);

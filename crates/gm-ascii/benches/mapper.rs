use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use gm_ascii::mapper::map_glyphs;
use gm_core::charset::Palette;
use gm_core::frame::Downsampled;

fn gradient(width: u32, height: u32) -> Downsampled {
    let n = (width * height) as usize;
    let luminance: Vec<u8> = (0..n).map(|i| (i % 256) as u8).collect();
    let colors = luminance.iter().map(|&l| (l, 255 - l, l / 2)).collect();
    Downsampled {
        width,
        height,
        luminance,
        colors,
    }
}

fn bench_map_glyphs(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_glyphs");
    for preset in ["default", "detailed"] {
        let Some(palette) = Palette::preset(preset) else {
            continue;
        };
        for &(w, h) in &[(120u32, 45u32), (400, 150)] {
            let samples = gradient(w, h);
            group.bench_with_input(
                BenchmarkId::new(preset, format!("{w}x{h}")),
                &samples,
                |b, s| b.iter(|| black_box(map_glyphs(s, &palette))),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_map_glyphs);
criterion_main!(benches);

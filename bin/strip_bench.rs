use log::info;
use tristrip_rs::vertex::cache::analyze_vertex_cache;
use tristrip_rs::{PrimitiveGroup, PrimitiveType, TriStrip};

use std::time::Instant;

fn murmur3(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;

    h
}

/// `n` x `n` quad grid; with `shuffle`, triangles are emitted in a scrambled order.
fn grid(n: u32, shuffle: bool) -> Vec<u32> {
    let mut triangles = Vec::with_capacity((n * n * 2) as usize);

    for x in 0..n {
        for y in 0..n {
            let a = x * (n + 1) + y;
            let b = a + 1;
            let c = a + n + 1;
            let d = c + 1;

            triangles.push([a, c, b]);
            triangles.push([b, c, d]);
        }
    }

    let mut order: Vec<usize> = (0..triangles.len()).collect();

    if shuffle {
        order.sort_by_key(|i| murmur3(*i as u32));
    }

    order.into_iter().flat_map(|i| triangles[i]).collect()
}

fn bench_settings(name: &str, tristrip: &TriStrip, indices: &[u32], vertex_count: usize, verbose: bool) -> f64 {
    let mut best_time = f64::MAX;
    let mut groups = Vec::new();

    for _ in 0..5 {
        let t0 = Instant::now();

        groups = tristrip.generate_strips(indices).unwrap();

        best_time = best_time.min(t0.elapsed().as_secs_f64());
    }

    let strips = groups.iter().filter(|g| g.primitive_type == PrimitiveType::Strip).count();
    let index_count: usize = groups.iter().map(|g| g.num_indices).sum();
    let stats = analyze_vertex_cache(&groups, vertex_count, tristrip.cache_size());

    if verbose {
        println!(
            "{:>12}: {:.2} ms, {} groups ({} strips), {} indices, ACMR {:.3}, ATVR {:.3}",
            name,
            best_time * 1_000.0,
            groups.len(),
            strips,
            index_count,
            stats.acmr,
            stats.atvr
        );
    }

    stats.acmr as f64
}

fn main() {
    env_logger::init();

    let verbose = std::env::args().any(|a| a == "-v");

    println!("Mesh        :\tlist\tstitch\tsplit\tlists");

    for n in [16, 32, 64] {
        for shuffle in [false, true] {
            let indices = grid(n, shuffle);
            let vertex_count = ((n + 1) * (n + 1)) as usize;

            info!("{}x{} grid, {} triangles", n, n, indices.len() / 3);

            let list = PrimitiveGroup::new(PrimitiveType::List, indices.clone());
            let source = analyze_vertex_cache(&[list], vertex_count, 16);

            let stitched = bench_settings("stitched", &TriStrip::default(), &indices, vertex_count, verbose);
            let separate = bench_settings(
                "separate",
                &TriStrip::default().with_stitch_strips(false),
                &indices,
                vertex_count,
                verbose,
            );
            let lists = bench_settings(
                "lists only",
                &TriStrip::default().with_lists_only(true),
                &indices,
                vertex_count,
                verbose,
            );

            println!(
                "{:>3}x{:<3} {} :\t{:.3}\t{:.3}\t{:.3}\t{:.3}",
                n,
                n,
                if shuffle { "s" } else { " " },
                source.acmr,
                stitched,
                separate,
                lists
            );
        }
    }
}

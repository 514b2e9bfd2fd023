// SPDX-License-Identifier: MIT
//! Basic usage example for size-gated gzip JSON encoding

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gzip_json::{CompressorPool, EncoderConfig, JsonEncoder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== gzip-json - Basic Usage ===\n");

    // Step 1: Shared pool and hooks
    println!("1. Creating pool and encoder...");
    let pool = Arc::new(CompressorPool::default());
    let compressed_count = Arc::new(AtomicUsize::new(0));
    let raw_count = Arc::new(AtomicUsize::new(0));
    let (c, r) = (Arc::clone(&compressed_count), Arc::clone(&raw_count));

    let encoder = JsonEncoder::new().with_pool(Arc::clone(&pool)).with_config(
        EncoderConfig::from_env()
            .on_compressed(move || {
                c.fetch_add(1, Ordering::Relaxed);
            })
            .on_uncompressed(move || {
                r.fetch_add(1, Ordering::Relaxed);
            }),
    );
    println!("   Threshold: {} bytes", encoder.config().effective_threshold());

    // Step 2: Small response
    println!("\n2. Encoding a small response...");
    let small = serde_json::json!({"name": "Lenni Linux", "age": 35});
    let mut body = Vec::new();
    let gzipped = encoder.encode(&mut body, &small)?;
    println!("   {} bytes, gzip: {}", body.len(), gzipped);

    // Step 3: Large response
    println!("\n3. Encoding a large response...");
    let large: Vec<_> = (0..100)
        .map(|i| serde_json::json!({"name": "Lenni Linux", "age": i, "hobbies": ["gaming", "coding"]}))
        .collect();
    let raw_len = serde_json::to_vec(&large)?.len();
    let mut body = Vec::new();
    let gzipped = encoder.encode(&mut body, &large)?;
    println!("   {} bytes raw -> {} bytes sent, gzip: {}", raw_len, body.len(), gzipped);
    if gzipped {
        println!("   Caller sets: Content-Encoding: gzip");
    }

    // Step 4: Statistics
    println!("\n4. Statistics...");
    let stats = pool.stats();
    println!("   Compressed payloads: {}", compressed_count.load(Ordering::Relaxed));
    println!("   Raw payloads: {}", raw_count.load(Ordering::Relaxed));
    println!(
        "   Sessions created: {}, reused: {}, idle: {}",
        stats.created, stats.reused, stats.idle
    );

    println!("\n=== Done ===");
    Ok(())
}

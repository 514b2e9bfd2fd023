//! Integration tests for the public encode API
//!
//! Every compressed payload is decoded with an independent gzip reader and
//! compared byte-for-byte with what `serde_json` produces on its own.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use flate2::read::GzDecoder;
use serde::Serialize;

use gzip_json::{
    encode, encode_with_config, Compression, CompressorPool, EncoderConfig, GzipJsonError,
    GzipWriter, JsonEncoder, PoolConfig,
};

#[derive(Debug, Serialize)]
struct Person {
    #[serde(skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(skip_serializing_if = "is_zero")]
    age: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    profession: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    hobbies: Vec<String>,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl Person {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            age: 0,
            profession: String::new(),
            hobbies: Vec::new(),
        }
    }
}

fn hobbies() -> Vec<String> {
    ["gaming", "youtube", "eating", "coding"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn gunzip(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    GzDecoder::new(data)
        .read_to_end(&mut out)
        .expect("sink should hold a valid gzip stream");
    out
}

/// JSON string literal whose serialized form is exactly `len` bytes
fn payload_of_len(len: usize) -> String {
    "x".repeat(len - 2)
}

#[test]
fn test_uncompressed_person() {
    let pool = CompressorPool::default();
    let person = Person {
        name: "Lenni Linux".to_string(),
        age: 35,
        profession: "Software Developer".to_string(),
        hobbies: hobbies(),
    };
    let mut sink = Vec::new();

    let compressed = encode(&pool, &mut sink, &person).unwrap();

    assert!(!compressed);
    assert_eq!(
        String::from_utf8(sink).unwrap(),
        r#"{"name":"Lenni Linux","age":35,"profession":"Software Developer","hobbies":["gaming","youtube","eating","coding"]}"#
    );
}

#[test]
fn test_compressed_person_with_zero_threshold() {
    let pool = CompressorPool::default();
    let person = Person {
        hobbies: hobbies(),
        ..Person::named("Lenni Linux")
    };
    let config = EncoderConfig::new().with_threshold(0);
    let mut sink = Vec::new();

    let compressed = encode_with_config(&pool, &mut sink, &person, &config).unwrap();

    assert!(compressed);
    assert_eq!(
        gunzip(&sink),
        br#"{"name":"Lenni Linux","hobbies":["gaming","youtube","eating","coding"]}"#
    );
}

#[test]
fn test_45_byte_payload_is_left_alone() {
    let pool = CompressorPool::default();
    let value = payload_of_len(45);
    let expected = serde_json::to_vec(&value).unwrap();
    assert_eq!(expected.len(), 45);
    let mut sink = Vec::new();

    let compressed = encode(&pool, &mut sink, &value).unwrap();

    assert!(!compressed);
    assert_eq!(sink, expected);
}

#[test]
fn test_2000_byte_payload_is_gzipped_by_default() {
    let pool = CompressorPool::default();
    let value = payload_of_len(2000);
    let expected = serde_json::to_vec(&value).unwrap();
    assert_eq!(expected.len(), 2000);
    let mut sink = Vec::new();

    let compressed = encode(&pool, &mut sink, &value).unwrap();

    assert!(compressed);
    assert!(sink.len() < expected.len());
    assert_eq!(gunzip(&sink), expected);
}

#[test]
fn test_age_only_payload_with_zero_threshold() {
    let pool = CompressorPool::default();
    let person = Person {
        age: 44,
        ..Person::named("")
    };
    let config = EncoderConfig::new().with_threshold(0);
    let mut sink = Vec::new();

    let compressed = encode_with_config(&pool, &mut sink, &person, &config).unwrap();

    assert!(compressed);
    assert_eq!(gunzip(&sink), br#"{"age":44}"#);
}

#[test]
fn test_sequential_encodes_reuse_one_session() {
    let pool = CompressorPool::default();
    let config = EncoderConfig::new().with_threshold(0);

    for age in 1..1000 {
        let person = Person {
            age,
            ..Person::named("Lenni Linux")
        };
        let mut sink = Vec::new();

        let compressed = encode_with_config(&pool, &mut sink, &person, &config).unwrap();

        assert!(compressed);
        let expected = format!(r#"{{"name":"Lenni Linux","age":{}}}"#, age);
        assert_eq!(gunzip(&sink), expected.as_bytes());
    }

    let stats = pool.stats();
    assert_eq!(stats.created, 1);
    assert_eq!(stats.reused, 998);
    assert_eq!(stats.idle, 1);
}

#[test]
fn test_threshold_boundary() {
    let pool = CompressorPool::default();
    let value = payload_of_len(100);

    let mut at = Vec::new();
    let config = EncoderConfig::new().with_threshold(100);
    assert!(encode_with_config(&pool, &mut at, &value, &config).unwrap());
    assert_eq!(gunzip(&at), serde_json::to_vec(&value).unwrap());

    let mut above = Vec::new();
    let config = EncoderConfig::new().with_threshold(101);
    assert!(!encode_with_config(&pool, &mut above, &value, &config).unwrap());
    assert_eq!(above, serde_json::to_vec(&value).unwrap());
}

#[test]
fn test_negative_threshold_means_default() {
    let pool = CompressorPool::default();
    let config = EncoderConfig::new().with_threshold(-1);

    let mut small = Vec::new();
    assert!(!encode_with_config(&pool, &mut small, &payload_of_len(1399), &config).unwrap());

    let mut large = Vec::new();
    assert!(encode_with_config(&pool, &mut large, &payload_of_len(1400), &config).unwrap());
}

#[test]
fn test_exactly_one_callback_per_encode() {
    let pool = CompressorPool::default();
    let compressed_hits = Arc::new(AtomicUsize::new(0));
    let uncompressed_hits = Arc::new(AtomicUsize::new(0));
    let (c, u) = (Arc::clone(&compressed_hits), Arc::clone(&uncompressed_hits));
    let config = EncoderConfig::new()
        .with_threshold(50)
        .on_compressed(move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .on_uncompressed(move || {
            u.fetch_add(1, Ordering::SeqCst);
        });

    for len in [10, 49, 50, 51, 500] {
        let before = (
            compressed_hits.load(Ordering::SeqCst),
            uncompressed_hits.load(Ordering::SeqCst),
        );
        let compressed =
            encode_with_config(&pool, Vec::new(), &payload_of_len(len), &config).unwrap();
        let after = (
            compressed_hits.load(Ordering::SeqCst),
            uncompressed_hits.load(Ordering::SeqCst),
        );

        if compressed {
            assert_eq!(after, (before.0 + 1, before.1));
        } else {
            assert_eq!(after, (before.0, before.1 + 1));
        }
    }

    assert_eq!(compressed_hits.load(Ordering::SeqCst), 3);
    assert_eq!(uncompressed_hits.load(Ordering::SeqCst), 2);
}

#[test]
fn test_concurrent_encoders_share_pool() {
    let pool = Arc::new(CompressorPool::with_capacity(Compression::fast(), 4));
    let encoder = JsonEncoder::new()
        .with_pool(Arc::clone(&pool))
        .with_config(EncoderConfig::new().with_threshold(0));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let encoder = encoder.clone();
            thread::spawn(move || {
                for age in 0..100u32 {
                    let person = Person {
                        age: age + 1,
                        hobbies: vec![format!("worker-{}", worker)],
                        ..Person::named("Lenni Linux")
                    };
                    let mut sink = Vec::new();
                    assert!(encoder.encode(&mut sink, &person).unwrap());
                    assert_eq!(gunzip(&sink), serde_json::to_vec(&person).unwrap());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = pool.stats();
    assert_eq!(stats.created + stats.reused, 800);
    assert!(stats.idle <= 4);
}

#[test]
fn test_custom_serializer_drives_writer() {
    let pool = CompressorPool::from_config(&PoolConfig {
        level: 9,
        max_idle: 1,
    })
    .unwrap();
    let config = EncoderConfig::new().with_threshold(64);
    let mut writer = GzipWriter::with_config(Vec::new(), &pool, &config);

    for line in 0..20 {
        writeln!(writer, "line {}", line).unwrap();
    }
    assert!(writer.is_compressed());

    let sink = writer.into_inner().unwrap();
    let expected: String = (0..20).map(|line| format!("line {}\n", line)).collect();
    assert_eq!(gunzip(&sink), expected.as_bytes());
}

#[test]
fn test_short_write_surfaces_error() {
    struct HalfSink(Vec<u8>);

    impl Write for HalfSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len() / 2;
            self.0.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let pool = CompressorPool::default();
    let err = encode(&pool, HalfSink(Vec::new()), &payload_of_len(45)).unwrap_err();

    assert!(matches!(
        err,
        GzipJsonError::ShortWrite {
            written: 22,
            expected: 45
        }
    ));
}

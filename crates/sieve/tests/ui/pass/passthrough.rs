use sieve::Descriptor;
use std::{sync::Mutex, time::Instant};

/// Implements nothing sieve knows about.
struct Opaque {
    _raw: Vec<u8>,
}

#[derive(Descriptor)]
struct Job<H> {
    #[sieve(column = "queue")]
    queue: String,
    #[sieve(column = "attempts", update = "+")]
    attempts: u32,
    started: Instant,
    lock: Mutex<Opaque>,
    handle: H,
}

fn main() {
    let job = Job {
        queue: "mail".into(),
        attempts: 1,
        started: Instant::now(),
        lock: Mutex::new(Opaque { _raw: vec![] }),
        handle: Opaque { _raw: vec![1] },
    };
    let _ = sieve::filter(&job);
    let _ = sieve::update(&job);
}

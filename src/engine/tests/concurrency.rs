use std::thread;

use super::*;

#[test]
fn test_concurrent_resolution_shares_results() {
    let store = Arc::new(MemoryStore::new());
    let shared = resolver().with_shared_store(store.clone());
    let paths: [&[&str]; 3] = [
        &["catalog", "product", "42"],
        &["catalog", "product", "42", "translations", "7"],
        &["catalog", "product", "42", "translations", "7", "comments"],
    ];

    let mut handles = vec![];
    for i in 0..8 {
        let resolver = shared.clone();
        handles.push(thread::spawn(move || {
            let mut seen = Vec::new();
            for _ in 0..50 {
                let path = paths[i % paths.len()];
                seen.push(resolver.resolve(path).unwrap());
            }
            seen
        }));
    }

    let results: Vec<Arc<ResolvedTarget>> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    // Every result for the same path is value-equal, however it was produced.
    for result in &results {
        let fresh = resolver()
            .resolve_request_path(&result.full_path)
            .unwrap()
            .unwrap();
        assert_eq!(result, &fresh);
    }
    assert_eq!(store.len(), paths.len());
    assert_eq!(shared.cache().local_len(), paths.len());
}

#[test]
fn test_concurrent_flush_and_resolve() {
    let resolver = resolver();
    let reader = resolver.clone();
    let flusher = resolver.clone();

    let read_handle = thread::spawn(move || {
        for _ in 0..200 {
            let target = reader
                .resolve(&["catalog", "product", "42", "translations"])
                .unwrap();
            assert_eq!(target.relation_name.as_deref(), Some("translations"));
        }
    });

    let flush_handle = thread::spawn(move || {
        for _ in 0..20 {
            flusher.flush_cache();
            thread::sleep(Duration::from_micros(50));
        }
    });

    read_handle.join().unwrap();
    flush_handle.join().unwrap();
}

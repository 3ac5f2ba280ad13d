use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use super::*;

#[test]
fn test_queue_fifo() {
    let q = CtrlPacketQueue::new(0);
    assert!(q.is_empty());
    assert!(q.drain_all().is_empty(), "draining an empty queue is not an error");

    for p in [&b"A"[..], b"B", b"C"] {
        assert!(q.enqueue(Bytes::copy_from_slice(p)));
    }
    assert_eq!(q.len(), 3);

    let drained = q.drain_all();
    assert_eq!(
        drained,
        vec![
            Bytes::from_static(b"A"),
            Bytes::from_static(b"B"),
            Bytes::from_static(b"C")
        ]
    );
    assert!(q.is_empty());
    assert!(q.drain_all().is_empty(), "nothing is returned twice");
}

#[test]
fn test_queue_capacity() {
    let q = CtrlPacketQueue::new(2);
    assert_eq!(q.capacity(), 2);

    assert!(q.enqueue(Bytes::from_static(b"1")));
    assert!(q.enqueue(Bytes::from_static(b"2")));
    assert!(!q.enqueue(Bytes::from_static(b"3")), "should be dropped");
    assert_eq!(q.len(), 2);

    assert_eq!(
        q.drain_all(),
        vec![Bytes::from_static(b"1"), Bytes::from_static(b"2")]
    );

    // room again after a drain
    assert!(q.enqueue(Bytes::from_static(b"4")));
}

#[test]
fn test_queue_concurrent_producers() {
    const PRODUCERS: u32 = 4;
    const PER_PRODUCER: u32 = 250;

    let q = Arc::new(CtrlPacketQueue::new(0));

    let mut handles = vec![];
    for id in 0..PRODUCERS {
        let q = Arc::clone(&q);
        handles.push(thread::spawn(move || {
            for n in 0..PER_PRODUCER {
                let mut b = id.to_be_bytes().to_vec();
                b.extend_from_slice(&n.to_be_bytes());
                assert!(q.enqueue(Bytes::from(b)));
            }
        }));
    }

    // drain while producers are still running
    let mut drained = vec![];
    while drained.len() < (PRODUCERS * PER_PRODUCER) as usize {
        drained.extend(q.drain_all());
        thread::yield_now();
    }
    for h in handles {
        h.join().unwrap();
    }
    drained.extend(q.drain_all());

    assert_eq!(drained.len(), (PRODUCERS * PER_PRODUCER) as usize);

    let unique: HashSet<&Bytes> = drained.iter().collect();
    assert_eq!(unique.len(), drained.len(), "duplicated packet");

    // each producer's packets keep their enqueue order
    let mut last = vec![None; PRODUCERS as usize];
    for p in &drained {
        let id = u32::from_be_bytes([p[0], p[1], p[2], p[3]]) as usize;
        let n = u32::from_be_bytes([p[4], p[5], p[6], p[7]]);
        if let Some(prev) = last[id] {
            assert!(n > prev, "producer {id} reordered: {n} after {prev}");
        }
        last[id] = Some(n);
    }
}

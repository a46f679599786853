use {
    hashring::{HashRing, RingConfig, RingError, Xxh3Hasher},
    rand::random,
    std::{collections::HashMap, fmt, num::NonZeroUsize},
};

/// A network destination, rendered to its address for ring identity.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Backend {
    host: String,
    port: u16,
}

impl Backend {
    fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_owned(),
            port,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

fn replication(n: usize) -> RingConfig {
    RingConfig::with_replication_factor(NonZeroUsize::new(n).expect("non-zero"))
}

#[test]
fn keys_route_to_tracked_members() {
    let ring = HashRing::new(Xxh3Hasher::new(), RingConfig::default());

    let backends = (0..10)
        .map(|i| Backend::new(&format!("10.0.0.{i}"), 50051))
        .collect::<Vec<_>>();
    for backend in &backends {
        ring.add(backend.clone());
    }

    for _ in 0..1000 {
        let key = random::<u64>().to_be_bytes();
        let owners = ring.find_nearest_n(&key, 1).expect("populated ring");
        assert!(backends.contains(owners[0].member()));
    }
}

#[test]
fn replication_expands_virtual_nodes() {
    let ring = HashRing::new(Xxh3Hasher::new(), replication(4));
    let backend = Backend::new("10.0.0.1", 50051);

    ring.add(backend.clone());
    assert_eq!(ring.len(), 4);
    assert!(ring.virtual_nodes().iter().all(|vnode| vnode == &backend));

    ring.remove(&backend);
    assert!(ring.is_empty());
}

#[test]
fn duplicate_add_keeps_position_set() {
    let ring = HashRing::new(Xxh3Hasher::new(), replication(2));
    ring.add("a");
    ring.add("a");
    assert_eq!(ring.len(), 2);
}

#[test]
fn removal_is_idempotent() {
    let ring = HashRing::new(Xxh3Hasher::new(), replication(3));
    ring.add("a");
    ring.add("b");
    assert_eq!(ring.len(), 6);

    // Never-added member.
    ring.remove(&"c");
    assert_eq!(ring.len(), 6);

    ring.remove(&"a");
    assert_eq!(ring.len(), 3);

    // Second removal of the same member.
    ring.remove(&"a");
    assert_eq!(ring.len(), 3);
}

#[test]
fn single_member_fills_all_requested_slots() {
    let ring = HashRing::new(Xxh3Hasher::new(), replication(3));
    ring.add("10.0.0.1:50051");

    // The precondition counts positions, not distinct members, so a lone
    // member satisfies a request for three and appears three times, in
    // ring order.
    let owners = ring.find_nearest_n(b"foo", 3).expect("three positions");
    assert_eq!(owners.len(), 3);
    assert!(owners.iter().all(|owner| owner == &"10.0.0.1:50051"));

    let err = ring.find_nearest_n(b"foo", 4).unwrap_err();
    assert_eq!(
        err,
        RingError::TooFewMembers {
            requested: 4,
            available: 3,
        }
    );
}

#[test]
fn with_members_matches_incremental_ring() {
    let members = ["a", "b", "c", "d"];
    let seeded = HashRing::with_members(Xxh3Hasher::new(), replication(2), members);

    let incremental = HashRing::new(Xxh3Hasher::new(), replication(2));
    for member in members {
        incremental.add(member);
    }

    assert_eq!(seeded.len(), incremental.len());
    for i in 0..100u32 {
        let key = i.to_be_bytes();
        let a = seeded.find_nearest_n(&key, 2).expect("populated");
        let b = incremental.find_nearest_n(&key, 2).expect("populated");
        assert_eq!(
            a.iter().map(|t| t.position()).collect::<Vec<_>>(),
            b.iter().map(|t| t.position()).collect::<Vec<_>>(),
        );
    }
}

fn owners_by_key(ring: &HashRing<String>, keys: &[String]) -> HashMap<String, String> {
    keys.iter()
        .map(|key| {
            let owners = ring.find_nearest_n(key.as_bytes(), 1).expect("populated");
            (key.clone(), owners[0].member().clone())
        })
        .collect()
}

#[test]
fn removal_relocates_only_keys_of_the_removed_member() {
    let members = (0..50).map(|i| format!("backend-{i}")).collect::<Vec<_>>();
    let ring = HashRing::with_members(Xxh3Hasher::new(), replication(8), members.clone());

    let keys = (0..10_000).map(|i| format!("key-{i}")).collect::<Vec<_>>();
    let before = owners_by_key(&ring, &keys);

    let removed = "backend-17".to_owned();
    ring.remove(&removed);
    let after = owners_by_key(&ring, &keys);

    let mut moved = 0usize;
    for key in &keys {
        if before[key] == removed {
            moved += 1;
        } else {
            // Keys not owned by the removed member must stay put.
            assert_eq!(before[key], after[key]);
        }
    }

    // The removed member owned roughly 1/50th of the key space.
    assert!(moved > 0);
    assert!((moved as f64) < 0.1 * keys.len() as f64);
}

#[test]
fn addition_captures_only_relocated_keys() {
    let members = (0..50).map(|i| format!("backend-{i}")).collect::<Vec<_>>();
    let ring = HashRing::with_members(Xxh3Hasher::new(), replication(8), members.clone());

    let keys = (0..10_000).map(|i| format!("key-{i}")).collect::<Vec<_>>();
    let before = owners_by_key(&ring, &keys);

    let added = "backend-50".to_owned();
    ring.add(added.clone());
    let after = owners_by_key(&ring, &keys);

    let mut moved = 0usize;
    for key in &keys {
        if before[key] != after[key] {
            // A relocated key can only have moved to the new member.
            assert_eq!(after[key], added);
            moved += 1;
        }
    }

    assert!(moved > 0);
    assert!((moved as f64) < 0.1 * keys.len() as f64);
}

use std::sync::Arc;

use tempfile::TempDir;

use folio::index::BarrelDirectory;
use folio::{ClientDocument, Engine, EngineConfig, Storage, StorageConfig, StorageFactory};

fn tiny_barrel_engine(dir: &TempDir) -> (Engine, Arc<dyn Storage>) {
    let storage = StorageFactory::create(StorageConfig::File(dir.path().to_path_buf())).unwrap();
    // Any non-empty shard is over-bound, so every new term after the
    // first ingest forces a fresh shard.
    let config = EngineConfig::builder().max_barrel_bytes(1).build();
    let engine = Engine::new(storage.clone(), config).unwrap();
    (engine, storage)
}

#[test]
fn test_overflow_allocates_new_shards() {
    let dir = TempDir::new().unwrap();
    let (engine, _storage) = tiny_barrel_engine(&dir);

    // The first term is placed while shard 0 is still empty.
    engine.add(ClientDocument::new("alpha", "", "")).unwrap();
    assert_eq!(engine.stats().last_shard, 0);

    // Shard 0 is now over-bound, so the next new term opens shard 1.
    engine.add(ClientDocument::new("beta", "", "")).unwrap();
    assert_eq!(engine.stats().last_shard, 1);

    // One increment per overflow.
    engine.add(ClientDocument::new("gamma", "", "")).unwrap();
    assert_eq!(engine.stats().last_shard, 2);
}

#[test]
fn test_existing_terms_never_migrate() {
    let dir = TempDir::new().unwrap();
    let (engine, storage) = tiny_barrel_engine(&dir);

    engine.add(ClientDocument::new("alpha", "", "")).unwrap();
    engine.add(ClientDocument::new("beta", "", "")).unwrap();

    let before = {
        let directory =
            BarrelDirectory::load(storage.as_ref(), engine.stats().last_shard).unwrap();
        (directory.shard_of(1), directory.shard_of(2))
    };

    // Re-ingesting documents with a placed term grows its shard past
    // the bound but must not move the term.
    engine
        .add(ClientDocument::new("alpha alpha alpha", "", ""))
        .unwrap();
    engine.add(ClientDocument::new("alpha", "beta", "")).unwrap();

    let directory = BarrelDirectory::load(storage.as_ref(), engine.stats().last_shard).unwrap();
    assert_eq!(directory.shard_of(1), before.0);
    assert_eq!(directory.shard_of(2), before.1);

    // Both documents are still found through the original shards.
    assert_eq!(engine.search("alpha").unwrap().count, 3);
    assert_eq!(engine.search("beta").unwrap().count, 2);
}

#[test]
fn test_default_bound_keeps_single_shard() {
    let dir = TempDir::new().unwrap();
    let storage = StorageFactory::create(StorageConfig::File(dir.path().to_path_buf())).unwrap();
    let engine = Engine::new(storage, EngineConfig::default()).unwrap();

    for i in 0..20 {
        engine
            .add(ClientDocument::new(format!("term{i} shared"), "", ""))
            .unwrap();
    }

    // Far below 2 MiB: everything stays in shard 0.
    assert_eq!(engine.stats().last_shard, 0);
    assert_eq!(engine.search("shared").unwrap().count, 20);
}

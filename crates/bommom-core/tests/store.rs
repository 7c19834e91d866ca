use bommom_core::{
    Bom, BomError, BomMeta, BomStore, JsonFileBomStore, LineItem, MemoryBomStore, ShortName,
    ValidationError,
};
use tempfile::TempDir;

fn sn(s: &str) -> ShortName {
    s.parse().unwrap()
}

fn meta(owner: &str, name: &str, head: &str) -> BomMeta {
    BomMeta {
        head_version: head.to_string(),
        ..BomMeta::new(owner, name)
    }
}

/// Runs every contract check against a fresh store from `make`.
fn check_contract<S: BomStore>(make: impl Fn() -> S) {
    persist_then_read(&make());
    second_persist_conflicts(&make());
    head_follows_latest_persist(&make());
    listing(&make());
    empty_head_is_precondition_failure(&make());
    dangling_head_is_not_found(&make());
    invalid_input_writes_nothing(&make());
}

fn persist_then_read(store: &impl BomStore) {
    let meta = meta("common", "gizmo", "v001");
    let bom = Bom::demo("v001");
    store.persist(&meta, &bom, &sn("v001")).unwrap();

    assert_eq!(store.get_meta(&sn("common"), &sn("gizmo")).unwrap(), meta);
    assert_eq!(
        store
            .get_bom(&sn("common"), &sn("gizmo"), &sn("v001"))
            .unwrap(),
        bom
    );
    assert!(matches!(
        store.get_bom(&sn("common"), &sn("gizmo"), &sn("v002")),
        Err(BomError::NotFound(_))
    ));
    assert!(matches!(
        store.get_meta(&sn("common"), &sn("widget")),
        Err(BomError::NotFound(_))
    ));
}

fn second_persist_conflicts(store: &impl BomStore) {
    let first = Bom::demo("v1");
    store
        .persist(&meta("alice", "amp", "v1"), &first, &sn("v1"))
        .unwrap();

    let mut second = Bom::new("v1");
    second
        .add_line_item(LineItem::new("Acme", "OTHER"))
        .unwrap();
    let err = store
        .persist(&meta("alice", "amp", "v1"), &second, &sn("v1"))
        .unwrap_err();
    assert!(matches!(err, BomError::AlreadyExists { .. }));
    assert!(err.is_recoverable());

    assert_eq!(
        store.get_bom(&sn("alice"), &sn("amp"), &sn("v1")).unwrap(),
        first
    );
}

fn head_follows_latest_persist(store: &impl BomStore) {
    let v1 = Bom::new("v1");
    let mut v2 = Bom::new("v2");
    v2.add_line_item(LineItem::new("Acme", "A2")).unwrap();

    store
        .persist(&meta("alice", "amp", "v1"), &v1, &sn("v1"))
        .unwrap();
    let updated = BomMeta {
        description: "second revision".to_string(),
        is_public_view: true,
        ..meta("alice", "amp", "v2")
    };
    store.persist(&updated, &v2, &sn("v2")).unwrap();

    let (head_meta, head) = store.get_head(&sn("alice"), &sn("amp")).unwrap();
    assert_eq!(head_meta, updated);
    assert_eq!(head, v2);

    // Older snapshots stay readable
    assert_eq!(
        store.get_bom(&sn("alice"), &sn("amp"), &sn("v1")).unwrap(),
        v1
    );
}

fn listing(store: &impl BomStore) {
    assert!(store.list_boms(None).unwrap().is_empty());

    for (owner, name) in [("alice", "amp"), ("alice", "psu"), ("bob", "clock")] {
        store
            .persist(&meta(owner, name, "v1"), &Bom::new("v1"), &sn("v1"))
            .unwrap();
    }

    let mut all: Vec<String> = store
        .list_boms(None)
        .unwrap()
        .into_iter()
        .map(|m| format!("{}/{}", m.owner, m.name))
        .collect();
    all.sort();
    assert_eq!(all, vec!["alice/amp", "alice/psu", "bob/clock"]);

    let mut alice: Vec<String> = store
        .list_boms(Some(&sn("alice")))
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    alice.sort();
    assert_eq!(alice, vec!["amp", "psu"]);

    assert!(store.list_boms(Some(&sn("carol"))).unwrap().is_empty());
}

fn empty_head_is_precondition_failure(store: &impl BomStore) {
    store
        .persist(&meta("alice", "draft", ""), &Bom::new("v1"), &sn("v1"))
        .unwrap();
    let err = store.get_head(&sn("alice"), &sn("draft")).unwrap_err();
    assert!(matches!(err, BomError::PreconditionFailed { .. }));
    assert!(!err.is_recoverable());
}

fn dangling_head_is_not_found(store: &impl BomStore) {
    store
        .persist(&meta("alice", "amp", "v9"), &Bom::new("v1"), &sn("v1"))
        .unwrap();
    assert!(matches!(
        store.get_head(&sn("alice"), &sn("amp")),
        Err(BomError::NotFound(_))
    ));
}

fn invalid_input_writes_nothing(store: &impl BomStore) {
    let err = store
        .persist(&meta("Alice", "amp", "v1"), &Bom::new("v1"), &sn("v1"))
        .unwrap_err();
    assert!(matches!(
        err,
        BomError::Validation(ValidationError::InvalidOwner(_))
    ));

    let mut undated = Bom::new("v1");
    undated.created = None;
    let err = store
        .persist(&meta("alice", "amp", "v1"), &undated, &sn("v1"))
        .unwrap_err();
    assert!(matches!(
        err,
        BomError::Validation(ValidationError::MissingTimestamp)
    ));

    let err = store
        .persist(&meta("alice", "amp", "v2"), &Bom::new("v1"), &sn("v2"))
        .unwrap_err();
    assert!(matches!(
        err,
        BomError::Validation(ValidationError::VersionMismatch { .. })
    ));

    assert!(store.list_boms(None).unwrap().is_empty());
}

#[test]
fn test_memory_store_contract() {
    check_contract(MemoryBomStore::new);
}

#[test]
fn test_file_store_contract() {
    // Each store gets its own directory; keep them alive until the end.
    let dirs = std::cell::RefCell::new(Vec::<TempDir>::new());
    check_contract(|| {
        let dir = TempDir::new().unwrap();
        let store = JsonFileBomStore::init(dir.path()).unwrap();
        dirs.borrow_mut().push(dir);
        store
    });
}

#[test]
fn test_file_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let bom = Bom::demo("v001");
    {
        let store = JsonFileBomStore::init(dir.path()).unwrap();
        store
            .persist(&meta("common", "gizmo", "v001"), &bom, &sn("v001"))
            .unwrap();
    }

    let store = JsonFileBomStore::open(dir.path()).unwrap();
    let (_, head) = store.get_head(&sn("common"), &sn("gizmo")).unwrap();
    assert_eq!(head, bom);
}

#[test]
fn test_store_is_usable_as_trait_object() {
    let stores: Vec<Box<dyn BomStore>> = vec![Box::new(MemoryBomStore::new())];
    for store in &stores {
        store
            .persist(&meta("bob", "clock", "v1"), &Bom::new("v1"), &sn("v1"))
            .unwrap();
        assert_eq!(store.list_boms(Some(&sn("bob"))).unwrap().len(), 1);
    }
}

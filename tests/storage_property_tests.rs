//! Property-based tests for the storage facade.
//!
//! Drives random operation sequences against an in-memory storage and a
//! simple ordered model, checking after every step that reads, length and
//! key positions agree.

use proptest::prelude::*;
use synckv::SyncStorage;

#[derive(Debug, Clone)]
enum Op {
    Set(String, String),
    Remove(String),
    Clear,
}

/// Small key space so sets, overwrites and removes collide often.
fn key() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d", "e"]).prop_map(str::to_string)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (key(), ".{0,8}").prop_map(|(k, v)| Op::Set(k, v)),
        3 => key().prop_map(Op::Remove),
        1 => Just(Op::Clear),
    ]
}

/// Reference model: insertion-ordered association list.
#[derive(Default)]
struct Model {
    entries: Vec<(String, String)>,
}

impl Model {
    fn apply(&mut self, op: &Op) {
        match op {
            Op::Set(k, v) => {
                if let Some(i) = self.entries.iter().position(|(key, _)| key == k) {
                    self.entries[i].1 = v.clone();
                } else {
                    self.entries.push((k.clone(), v.clone()));
                }
            },
            Op::Remove(k) => self.entries.retain(|(key, _)| key != k),
            Op::Clear => self.entries.clear(),
        }
    }

    fn get(&self, k: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(key, _)| key == k)
            .map(|(_, v)| v.clone())
    }
}

fn apply(storage: &SyncStorage, op: &Op) {
    match op {
        Op::Set(k, v) => storage.set_item(k, v),
        Op::Remove(k) => storage.remove_item(k),
        Op::Clear => storage.clear(),
    }
}

proptest! {
    #[test]
    fn prop_matches_ordered_model(ops in prop::collection::vec(op(), 0..60)) {
        let storage = SyncStorage::in_memory();
        let mut model = Model::default();

        for op in &ops {
            apply(&storage, op);
            model.apply(op);

            prop_assert_eq!(storage.len(), model.entries.len());
            for k in ["a", "b", "c", "d", "e"] {
                prop_assert_eq!(storage.get_item(k), model.get(k));
            }
            for (i, (k, _)) in model.entries.iter().enumerate() {
                let key_i = storage.key(i);
                prop_assert_eq!(key_i.as_deref(), Some(k.as_str()));
            }
            prop_assert_eq!(storage.key(model.entries.len()), None);
        }
    }

    #[test]
    fn prop_write_then_read(k in ".{0,16}", v in ".{0,32}") {
        let storage = SyncStorage::in_memory();
        storage.set_item(&k, &v);
        prop_assert_eq!(storage.get_item(&k), Some(v));
    }

    #[test]
    fn prop_numbers_read_back_as_strings(k in "[a-z]{1,8}", n in any::<i64>()) {
        let storage = SyncStorage::in_memory();
        storage.set_item(&k, n);
        prop_assert_eq!(storage.get_item(&k), Some(n.to_string()));
    }

    #[test]
    fn prop_remove_absent_changes_nothing(
        ops in prop::collection::vec(op(), 0..20),
        absent in "[x-z]{1,4}",
    ) {
        let storage = SyncStorage::in_memory();
        for op in &ops {
            apply(&storage, op);
        }
        let before = storage.keys();
        let values: Vec<_> = before.iter().map(|k| storage.get_item(k)).collect();

        storage.remove_item(&absent);

        prop_assert_eq!(storage.keys(), before.clone());
        let after: Vec<_> = before.iter().map(|k| storage.get_item(k)).collect();
        prop_assert_eq!(after, values);
        prop_assert_eq!(storage.get_item(&absent), None);
    }
}

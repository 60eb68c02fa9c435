use std::collections::HashMap;

use crate::config::IndexConfig;
use crate::gc_root::GcRoot;
use crate::index::{IndexedObject, IndexedObjects, ObjectCategory, PositionalIndex};
use crate::record::{FieldRecord, StaticFieldRecord};
use crate::{ObjectId, StringId};

#[derive(Debug, Default)]
struct ClassFields {
    static_fields: Vec<StaticFieldRecord>,
    fields: Vec<FieldRecord>,
}

/// Compact in-memory [`PositionalIndex`].
///
/// Each category is a vector sorted by object id: lookups by id are a binary
/// search per category and lookups by sequential index are direct.
#[derive(Debug, Default)]
pub struct HprofIndex {
    categories: [Vec<(ObjectId, IndexedObject)>; 4],
    class_names: HashMap<ObjectId, String>,
    class_ids_by_name: HashMap<String, ObjectId>,
    strings: HashMap<StringId, String>,
    remapped_field_names: HashMap<(ObjectId, StringId), String>,
    class_fields: HashMap<ObjectId, ClassFields>,
    gc_roots: Vec<GcRoot>,
}

fn slot(category: ObjectCategory) -> usize {
    match category {
        ObjectCategory::Class => 0,
        ObjectCategory::Instance => 1,
        ObjectCategory::ObjectArray => 2,
        ObjectCategory::PrimitiveArray => 3,
    }
}

impl HprofIndex {
    pub fn builder(config: IndexConfig) -> HprofIndexBuilder {
        HprofIndexBuilder::new(config)
    }

    pub fn string(&self, id: StringId) -> Option<&str> {
        self.strings.get(&id).map(String::as_str)
    }
}

impl PositionalIndex for HprofIndex {
    fn count(&self, category: ObjectCategory) -> usize {
        self.categories[slot(category)].len()
    }

    fn gc_roots(&self) -> &[GcRoot] {
        &self.gc_roots
    }

    fn object_at_index(&self, index: usize) -> Option<(ObjectId, IndexedObject)> {
        let mut remaining = index;
        for objects in &self.categories {
            if remaining < objects.len() {
                return Some(objects[remaining]);
            }
            remaining -= objects.len();
        }
        None
    }

    fn indexed_object(&self, id: ObjectId) -> Option<(usize, IndexedObject)> {
        let mut base = 0;
        for objects in &self.categories {
            if let Ok(pos) = objects.binary_search_by_key(&id, |&(object_id, _)| object_id) {
                return Some((base + pos, objects[pos].1));
            }
            base += objects.len();
        }
        None
    }

    fn class_id(&self, storage_name: &str) -> Option<ObjectId> {
        self.class_ids_by_name.get(storage_name).copied()
    }

    fn class_name(&self, class_id: ObjectId) -> Option<&str> {
        self.class_names.get(&class_id).map(String::as_str)
    }

    fn field_name(&self, class_id: ObjectId, name_string_id: StringId) -> Option<&str> {
        self.remapped_field_names
            .get(&(class_id, name_string_id))
            .or_else(|| self.strings.get(&name_string_id))
            .map(String::as_str)
    }

    fn static_fields(&self, class_id: ObjectId) -> &[StaticFieldRecord] {
        self.class_fields
            .get(&class_id)
            .map(|fields| fields.static_fields.as_slice())
            .unwrap_or(&[])
    }

    fn instance_fields(&self, class_id: ObjectId) -> &[FieldRecord] {
        self.class_fields
            .get(&class_id)
            .map(|fields| fields.fields.as_slice())
            .unwrap_or(&[])
    }

    fn category_objects(&self, category: ObjectCategory) -> IndexedObjects<'_> {
        Box::new(self.categories[slot(category)].iter().copied())
    }
}

/// Collects descriptors, names and roots found by a dump scanner and freezes them
/// into an [`HprofIndex`].
#[derive(Debug)]
pub struct HprofIndexBuilder {
    config: IndexConfig,
    categories: [Vec<(ObjectId, IndexedObject)>; 4],
    class_names: HashMap<ObjectId, String>,
    strings: HashMap<StringId, String>,
    class_fields: HashMap<ObjectId, ClassFields>,
    gc_roots: Vec<GcRoot>,
}

impl HprofIndexBuilder {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            categories: Default::default(),
            class_names: HashMap::new(),
            strings: HashMap::new(),
            class_fields: HashMap::new(),
            gc_roots: Vec::new(),
        }
    }

    pub fn add_string(&mut self, id: StringId, value: impl Into<String>) -> &mut Self {
        self.strings.insert(id, value.into());
        self
    }

    /// Records the name of a class as found in its `LOAD CLASS` record. JVM
    /// internal separators (`/`) are normalized to `.`.
    pub fn add_class_name(&mut self, class_id: ObjectId, name: &str) -> &mut Self {
        self.class_names.insert(class_id, name.replace('/', "."));
        self
    }

    pub fn add_object(&mut self, id: ObjectId, descriptor: IndexedObject) -> &mut Self {
        self.categories[slot(descriptor.category())].push((id, descriptor));
        self
    }

    pub fn add_class_fields(
        &mut self,
        class_id: ObjectId,
        static_fields: Vec<StaticFieldRecord>,
        fields: Vec<FieldRecord>,
    ) -> &mut Self {
        self.class_fields.insert(
            class_id,
            ClassFields {
                static_fields,
                fields,
            },
        );
        self
    }

    pub fn add_gc_root(&mut self, root: GcRoot) -> &mut Self {
        self.gc_roots.push(root);
        self
    }

    pub fn build(self) -> HprofIndex {
        let HprofIndexBuilder {
            config,
            mut categories,
            class_names,
            strings,
            class_fields,
            gc_roots,
        } = self;

        for objects in &mut categories {
            objects.sort_by_key(|&(id, _)| id);
            let before = objects.len();
            objects.dedup_by_key(|&mut (id, _)| id);
            if objects.len() != before {
                tracing::debug!(
                    duplicates = before - objects.len(),
                    "dropped duplicate object ids while building heap dump index"
                );
            }
        }

        let remapping = &config.symbol_remapping;
        let mut remapped_field_names = HashMap::new();
        if !remapping.is_empty() {
            for (&class_id, fields) in &class_fields {
                let Some(obfuscated_class) = class_names.get(&class_id) else {
                    continue;
                };
                let name_ids = fields
                    .static_fields
                    .iter()
                    .map(|f| f.name_string_id)
                    .chain(fields.fields.iter().map(|f| f.name_string_id));
                for name_id in name_ids {
                    let clear = strings
                        .get(&name_id)
                        .and_then(|name| remapping.field_name(obfuscated_class, name));
                    if let Some(clear) = clear {
                        remapped_field_names.insert((class_id, name_id), clear.to_string());
                    }
                }
            }
        }

        let class_names: HashMap<ObjectId, String> = class_names
            .into_iter()
            .map(|(id, name)| (id, remapping.class_name(&name)))
            .collect();
        // Several class loaders can define the same name; the lowest id wins.
        let mut class_ids_by_name: HashMap<String, ObjectId> = HashMap::new();
        for (&id, name) in &class_names {
            class_ids_by_name
                .entry(name.clone())
                .and_modify(|existing| *existing = (*existing).min(id))
                .or_insert(id);
        }

        let mut index = HprofIndex {
            categories,
            class_names,
            class_ids_by_name,
            strings,
            remapped_field_names,
            class_fields,
            gc_roots: Vec::new(),
        };

        let total_roots = gc_roots.len();
        index.gc_roots = gc_roots
            .into_iter()
            .filter(|root| config.indexed_gc_roots.contains(&root.kind))
            .filter(|root| index.object_id_is_indexed(root.id))
            .collect();
        if index.gc_roots.len() != total_roots {
            tracing::debug!(
                kept = index.gc_roots.len(),
                dropped = total_roots - index.gc_roots.len(),
                "filtered gc roots by kind and indexed objects"
            );
        }

        index
    }
}

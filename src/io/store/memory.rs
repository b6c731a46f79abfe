// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of an in-memory archive store.

use hashbrown::HashMap;
use indexmap::IndexMap;
use ndarray::{Array1, ArrayD, Axis, IxDyn};

use super::{block_size, normalize, parent, ArchiveStore, Attribute};
use crate::errors::StoreError;

/// Data held by a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetData {
    Float(ArrayD<f64>),
    Int(ArrayD<i64>),
}

impl DatasetData {
    /// Get the shape of the dataset.
    pub fn shape(&self) -> &[usize] {
        match self {
            DatasetData::Float(array) => array.shape(),
            DatasetData::Int(array) => array.shape(),
        }
    }
}

#[derive(Debug, Clone)]
enum Object {
    Group,
    Dataset(DatasetData),
}

/// Archive store keeping all groups and datasets in memory.
///
/// Every object is stored once; hard links are additional paths referring to the same object.
/// Attributes belong to objects, so an attribute set through one link is visible through all others.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Paths in the order of their creation mapped to object ids.
    paths: IndexMap<String, usize>,
    objects: Vec<Object>,
    attributes: HashMap<usize, IndexMap<String, Attribute>>,
    /// Attributes of the root group.
    root_attributes: IndexMap<String, Attribute>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Check whether an object exists at the given path. The root always exists.
    pub fn contains(&self, path: &str) -> bool {
        let path = normalize(path);
        path.is_empty() || self.paths.contains_key(path)
    }

    /// Check whether the given path refers to a group.
    pub fn is_group(&self, path: &str) -> bool {
        let path = normalize(path);
        path.is_empty() || matches!(self.object(path), Some(Object::Group))
    }

    /// Get the data of the dataset at the given path.
    pub fn data(&self, path: &str) -> Option<&DatasetData> {
        match self.object(normalize(path))? {
            Object::Dataset(data) => Some(data),
            Object::Group => None,
        }
    }

    /// Get the floating-point dataset at the given path.
    pub fn dataset(&self, path: &str) -> Option<&ArrayD<f64>> {
        match self.data(path)? {
            DatasetData::Float(array) => Some(array),
            DatasetData::Int(_) => None,
        }
    }

    /// Get the integer dataset at the given path.
    pub fn int_dataset(&self, path: &str) -> Option<&ArrayD<i64>> {
        match self.data(path)? {
            DatasetData::Int(array) => Some(array),
            DatasetData::Float(_) => None,
        }
    }

    /// Get an attribute of the object at the given path.
    pub fn attribute(&self, path: &str, name: &str) -> Option<&Attribute> {
        let path = normalize(path);
        if path.is_empty() {
            return self.root_attributes.get(name);
        }

        self.attributes.get(self.paths.get(path)?)?.get(name)
    }

    /// Check whether two paths refer to the same object (i.e. one is a hard link of the other).
    pub fn same_object(&self, path1: &str, path2: &str) -> bool {
        match (
            self.paths.get(normalize(path1)),
            self.paths.get(normalize(path2)),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Iterate over all paths of the store in the order of their creation.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// Get the number of distinct objects (links are not counted).
    pub fn n_objects(&self) -> usize {
        self.objects.len()
    }

    fn object(&self, path: &str) -> Option<&Object> {
        self.paths.get(path).map(|&id| &self.objects[id])
    }

    /// Check that `path` is free and its parent group exists.
    fn check_new_path<'a>(&self, path: &'a str) -> Result<&'a str, StoreError> {
        let path = normalize(path);

        if path.is_empty() || self.paths.contains_key(path) {
            return Err(StoreError::AlreadyExists(path.to_owned()));
        }

        if !self.is_group(parent(path)) {
            return Err(StoreError::ParentNotFound(path.to_owned()));
        }

        Ok(path)
    }

    fn insert(&mut self, path: &str, object: Object) {
        self.objects.push(object);
        self.paths.insert(path.to_owned(), self.objects.len() - 1);
    }
}

impl ArchiveStore for MemoryStore {
    fn create_group(&mut self, path: &str) -> Result<(), StoreError> {
        let path = self.check_new_path(path)?;
        self.insert(path, Object::Group);
        Ok(())
    }

    fn create_dataset(&mut self, path: &str, shape: &[usize]) -> Result<(), StoreError> {
        let path = self.check_new_path(path)?;
        self.insert(
            path,
            Object::Dataset(DatasetData::Float(ArrayD::zeros(IxDyn(shape)))),
        );
        Ok(())
    }

    fn create_int_dataset(&mut self, path: &str, data: &[i64]) -> Result<(), StoreError> {
        let path = self.check_new_path(path)?;
        let array = Array1::from(data.to_vec()).into_dyn();
        self.insert(path, Object::Dataset(DatasetData::Int(array)));
        Ok(())
    }

    fn link(&mut self, target: &str, path: &str) -> Result<(), StoreError> {
        let target = normalize(target);
        let id = *self
            .paths
            .get(target)
            .ok_or_else(|| StoreError::NotFound(target.to_owned()))?;

        if !matches!(self.objects[id], Object::Dataset(_)) {
            return Err(StoreError::NotADataset(target.to_owned()));
        }

        let path = self.check_new_path(path)?;
        self.paths.insert(path.to_owned(), id);
        Ok(())
    }

    fn set_attribute(
        &mut self,
        path: &str,
        name: &str,
        value: Attribute,
    ) -> Result<(), StoreError> {
        let path = normalize(path);
        let attributes = if path.is_empty() {
            &mut self.root_attributes
        } else {
            let id = *self
                .paths
                .get(path)
                .ok_or_else(|| StoreError::NotFound(path.to_owned()))?;
            self.attributes.entry(id).or_default()
        };

        if attributes.contains_key(name) {
            return Err(StoreError::AttributeExists(
                path.to_owned(),
                name.to_owned(),
            ));
        }

        attributes.insert(name.to_owned(), value);
        Ok(())
    }

    fn write_block(&mut self, path: &str, index: &[usize], data: &[f64]) -> Result<(), StoreError> {
        let path = normalize(path);
        let id = *self
            .paths
            .get(path)
            .ok_or_else(|| StoreError::NotFound(path.to_owned()))?;

        let array = match &mut self.objects[id] {
            Object::Dataset(DatasetData::Float(array)) => array,
            Object::Dataset(DatasetData::Int(_)) => {
                return Err(StoreError::NotAFloatDataset(path.to_owned()))
            }
            Object::Group => return Err(StoreError::NotADataset(path.to_owned())),
        };

        let expected = block_size(path, array.shape(), index)?;
        if expected != data.len() {
            return Err(StoreError::BlockSizeMismatch(
                path.to_owned(),
                expected,
                data.len(),
            ));
        }

        let mut block = array.view_mut();
        for &i in index {
            block = block.index_axis_move(Axis(0), i);
        }

        for (target, value) in block.iter_mut().zip(data) {
            *target = *value;
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn create_groups_and_datasets() {
        let mut store = MemoryStore::new();
        store.create_group("particles").unwrap();
        store.create_group("particles/box").unwrap();
        store.create_dataset("particles/box/value", &[4, 3, 3]).unwrap();
        store
            .create_int_dataset("particles/species", &[0, 0, 1])
            .unwrap();

        assert!(store.contains("particles/box"));
        assert!(store.is_group("/particles/box/"));
        assert!(!store.is_group("particles/box/value"));

        let value = store.dataset("particles/box/value").unwrap();
        assert_eq!(value.shape(), &[4, 3, 3]);
        assert!(value.iter().all(|&x| x == 0.0));

        let species = store.int_dataset("particles/species").unwrap();
        assert_eq!(species.as_slice().unwrap(), &[0, 0, 1]);
        assert!(store.dataset("particles/species").is_none());

        assert_eq!(
            store.paths().collect::<Vec<_>>(),
            vec![
                "particles",
                "particles/box",
                "particles/box/value",
                "particles/species"
            ]
        );
    }

    #[test]
    fn create_duplicate() {
        let mut store = MemoryStore::new();
        store.create_group("observables").unwrap();

        assert!(matches!(
            store.create_group("observables"),
            Err(StoreError::AlreadyExists(path)) if path == "observables"
        ));
        assert!(matches!(
            store.create_dataset("observables", &[1]),
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn create_without_parent() {
        let mut store = MemoryStore::new();

        assert!(matches!(
            store.create_group("particles/box"),
            Err(StoreError::ParentNotFound(path)) if path == "particles/box"
        ));

        store.create_dataset("value", &[3]).unwrap();
        assert!(matches!(
            store.create_dataset("value/child", &[3]),
            Err(StoreError::ParentNotFound(_))
        ));
    }

    #[test]
    fn link_shares_data() {
        let mut store = MemoryStore::new();
        store.create_group("a").unwrap();
        store.create_group("b").unwrap();
        store.create_dataset("a/time", &[3]).unwrap();
        store.link("a/time", "b/time").unwrap();

        assert!(store.same_object("a/time", "b/time"));
        assert_eq!(store.n_objects(), 3);

        store.write_block("b/time", &[1], &[2.5]).unwrap();
        assert_approx_eq!(f64, store.dataset("a/time").unwrap()[[1]], 2.5);

        store
            .set_attribute("a/time", "unit", Attribute::from("ps"))
            .unwrap();
        assert_eq!(
            store.attribute("b/time", "unit"),
            Some(&Attribute::Str("ps".to_owned()))
        );
    }

    #[test]
    fn link_fails() {
        let mut store = MemoryStore::new();
        store.create_group("a").unwrap();

        assert!(matches!(
            store.link("a/time", "time"),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.link("a", "b"),
            Err(StoreError::NotADataset(_))
        ));
    }

    #[test]
    fn attributes() {
        let mut store = MemoryStore::new();
        store.create_group("h5md").unwrap();
        store
            .set_attribute("h5md", "version", Attribute::IntArray(vec![1, 1]))
            .unwrap();
        store
            .set_attribute("", "comment", Attribute::from("root"))
            .unwrap();

        assert_eq!(
            store.attribute("h5md", "version"),
            Some(&Attribute::IntArray(vec![1, 1]))
        );
        assert_eq!(
            store.attribute("/", "comment"),
            Some(&Attribute::Str("root".to_owned()))
        );
        assert_eq!(store.attribute("h5md", "missing"), None);

        assert!(matches!(
            store.set_attribute("h5md", "version", Attribute::Int(2)),
            Err(StoreError::AttributeExists(..))
        ));
        assert!(matches!(
            store.set_attribute("missing", "version", Attribute::Int(2)),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn write_blocks() {
        let mut store = MemoryStore::new();
        store.create_dataset("value", &[3, 2, 3]).unwrap();
        store
            .write_block("value", &[1], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap();
        store.write_block("value", &[2, 0], &[7.0, 8.0, 9.0]).unwrap();

        let value = store.dataset("value").unwrap();
        assert_approx_eq!(f64, value[[1, 0, 2]], 3.0);
        assert_approx_eq!(f64, value[[1, 1, 0]], 4.0);
        assert_approx_eq!(f64, value[[2, 0, 1]], 8.0);
        assert_approx_eq!(f64, value[[2, 1, 1]], 0.0);
        assert_approx_eq!(f64, value[[0, 0, 0]], 0.0);

        store.create_dataset("scalar", &[4]).unwrap();
        store.write_block("scalar", &[3], &[-1.5]).unwrap();
        assert_approx_eq!(f64, store.dataset("scalar").unwrap()[[3]], -1.5);
    }

    #[test]
    fn write_block_fails() {
        let mut store = MemoryStore::new();
        store.create_dataset("value", &[3, 3]).unwrap();
        store.create_int_dataset("species", &[0]).unwrap();
        store.create_group("group").unwrap();

        assert!(matches!(
            store.write_block("value", &[3], &[0.0; 3]),
            Err(StoreError::IndexOutOfRange(..))
        ));
        assert!(matches!(
            store.write_block("value", &[0], &[0.0; 2]),
            Err(StoreError::BlockSizeMismatch(_, 3, 2))
        ));
        assert!(matches!(
            store.write_block("species", &[0], &[0.0]),
            Err(StoreError::NotAFloatDataset(_))
        ));
        assert!(matches!(
            store.write_block("group", &[0], &[0.0]),
            Err(StoreError::NotADataset(_))
        ));
        assert!(matches!(
            store.write_block("missing", &[0], &[0.0]),
            Err(StoreError::NotFound(_))
        ));

        assert!(store
            .dataset("value")
            .unwrap()
            .iter()
            .all(|&x| x == 0.0));
    }
}

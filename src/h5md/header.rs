// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the h5md header describing the file, its author, and its creator.

use getset::Getters;

use crate::errors::StoreError;
use crate::io::store::{ArchiveStore, Attribute};

/// Version of the h5md specification the archive follows.
pub const H5MD_VERSION: [i64; 2] = [1, 1];
/// Name of the program recorded as the creator of the archive.
pub const CREATOR_NAME: &str = "castep_h5md";
/// Value used for author metadata that were not provided.
pub const UNKNOWN: &str = "Unknown";

/// Author of the h5md archive.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct Author {
    name: String,
    email: String,
}

impl Author {
    /// Create a new author. Missing name or email is stored as `Unknown`.
    pub fn new(name: Option<&str>, email: Option<&str>) -> Self {
        Author {
            name: name.unwrap_or(UNKNOWN).to_owned(),
            email: email.unwrap_or(UNKNOWN).to_owned(),
        }
    }
}

impl Default for Author {
    fn default() -> Self {
        Author::new(None, None)
    }
}

/// Write the `h5md` header group into the store.
///
/// The header consists of
/// - group `h5md` with attribute `version`,
/// - group `h5md/author` with attributes `name` and `email`,
/// - group `h5md/creator` with attributes `name` and `version` (version of this library).
pub fn write_header(store: &mut impl ArchiveStore, author: &Author) -> Result<(), StoreError> {
    store.create_group("h5md")?;
    store.set_attribute("h5md", "version", Attribute::IntArray(H5MD_VERSION.to_vec()))?;

    store.create_group("h5md/author")?;
    store.set_attribute("h5md/author", "name", Attribute::from(author.name().as_str()))?;
    store.set_attribute("h5md/author", "email", Attribute::from(author.email().as_str()))?;

    store.create_group("h5md/creator")?;
    store.set_attribute("h5md/creator", "name", Attribute::from(CREATOR_NAME))?;
    store.set_attribute("h5md/creator", "version", Attribute::from(crate::VERSION))?;

    log::debug!(
        "Written h5md header (author: {} <{}>).",
        author.name(),
        author.email()
    );
    Ok(())
}

/******************************/
/*         UNIT TESTS         */
/******************************/

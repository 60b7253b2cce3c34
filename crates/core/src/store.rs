//! File-based JSON document store.
//!
//! Each collection (appointments, doctors, users) lives under its own subtree of the clinic
//! data directory, sharded by record id:
//!
//! ```text
//! <collection_dir>/
//!   <s1>/
//!     <s2>/
//!       <id>/
//!         <document>.json
//! ```
//!
//! where `s1` and `s2` are the first four hex characters of the id. Every operation is a
//! single document read or write; the filesystem provides the only durability guarantee and
//! no operation spans more than one record.

use crate::error::{BookingError, BookingResult};
use crate::record_id::RecordId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

/// Creates a unique sharded record directory within a collection directory.
///
/// This function generates record ids using the provided source function and attempts to
/// create a corresponding sharded directory. It guards against id collisions or pre-existing
/// directories by retrying up to 5 times with different ids.
///
/// # Errors
///
/// Returns `BookingError::RecordDirCreation` if:
/// - directory creation fails after 5 attempts,
/// - parent directory creation fails.
pub(crate) fn allocate_record_dir(
    collection_dir: &Path,
    mut id_source: impl FnMut() -> RecordId,
) -> BookingResult<(RecordId, PathBuf)> {
    // Allocate a new id, but guard against pathological collisions (or pre-existing
    // directories from external interference) by limiting retries.
    for _attempt in 0..5 {
        let id = id_source();
        let candidate = id.sharded_dir(collection_dir);

        if candidate.exists() {
            continue;
        }

        if let Some(parent) = candidate.parent() {
            fs::create_dir_all(parent).map_err(BookingError::RecordDirCreation)?;
        }

        match fs::create_dir(&candidate) {
            Ok(()) => return Ok((id, candidate)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(BookingError::RecordDirCreation(e)),
        }
    }

    Err(BookingError::RecordDirCreation(io::Error::new(
        ErrorKind::AlreadyExists,
        "failed to allocate a unique record directory after 5 attempts",
    )))
}

/// Returns the document path for an existing record id within a collection.
pub(crate) fn document_path(collection_dir: &Path, id: &RecordId, file_name: &str) -> PathBuf {
    id.sharded_dir(collection_dir).join(file_name)
}

/// Serialises `value` as JSON and writes it to `path`.
pub(crate) fn write_document<T: Serialize>(path: &Path, value: &T) -> BookingResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(BookingError::Serialization)?;
    fs::write(path, json).map_err(BookingError::FileWrite)
}

/// Reads and deserialises the JSON document at `path`.
///
/// A missing file maps to `BookingError::NotFound` so callers can treat "no such record"
/// uniformly without inspecting io error kinds.
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> BookingResult<T> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(BookingError::NotFound),
        Err(e) => return Err(BookingError::FileRead(e)),
    };
    serde_json::from_str(&contents).map_err(BookingError::Deserialization)
}

/// Removes the record directory for `id` within a collection.
///
/// # Errors
///
/// Returns `BookingError::NotFound` when the record directory does not exist and
/// `BookingError::RecordDirRemoval` for other filesystem failures.
pub(crate) fn remove_record_dir(collection_dir: &Path, id: &RecordId) -> BookingResult<()> {
    let dir = id.sharded_dir(collection_dir);
    if !dir.is_dir() {
        return Err(BookingError::NotFound);
    }
    fs::remove_dir_all(&dir).map_err(BookingError::RecordDirRemoval)
}

/// Reads every document in a collection by traversing the sharded directory tree.
///
/// Individual documents that cannot be read or parsed are logged as warnings and skipped so
/// that one corrupt record cannot fail a whole listing.
pub(crate) fn scan_collection<T: DeserializeOwned>(
    collection_dir: &Path,
    file_name: &str,
) -> Vec<T> {
    let mut documents = Vec::new();

    let s1_iter = match fs::read_dir(collection_dir) {
        Ok(it) => it,
        Err(_) => return documents,
    };
    for s1 in s1_iter.flatten() {
        let s1_path = s1.path();
        if !s1_path.is_dir() {
            continue;
        }

        let s2_iter = match fs::read_dir(&s1_path) {
            Ok(it) => it,
            Err(_) => continue,
        };

        for s2 in s2_iter.flatten() {
            let s2_path = s2.path();
            if !s2_path.is_dir() {
                continue;
            }

            let id_iter = match fs::read_dir(&s2_path) {
                Ok(it) => it,
                Err(_) => continue,
            };

            for id_ent in id_iter.flatten() {
                let id_path = id_ent.path();
                if !id_path.is_dir() {
                    continue;
                }

                let doc_path = id_path.join(file_name);
                if !doc_path.is_file() {
                    continue;
                }

                match fs::read_to_string(&doc_path) {
                    Ok(contents) => match serde_json::from_str::<T>(&contents) {
                        Ok(doc) => documents.push(doc),
                        Err(e) => {
                            tracing::warn!("failed to parse {}: {}", doc_path.display(), e);
                        }
                    },
                    Err(e) => {
                        tracing::warn!("failed to read {}: {}", doc_path.display(), e);
                    }
                }
            }
        }
    }

    documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Note {
        id: RecordId,
        body: String,
    }

    #[test]
    fn test_allocate_write_read_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let collection = temp_dir.path().join("notes");

        let (id, dir) = allocate_record_dir(&collection, RecordId::new).unwrap();
        assert!(dir.is_dir());

        let note = Note {
            id: id.clone(),
            body: "hello".into(),
        };
        write_document(&dir.join("note.json"), &note).unwrap();

        let read: Note = read_document(&document_path(&collection, &id, "note.json")).unwrap();
        assert_eq!(read, note);
    }

    #[test]
    fn test_read_missing_document_is_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let collection = temp_dir.path().join("notes");

        let id = RecordId::new();
        let result: BookingResult<Note> =
            read_document(&document_path(&collection, &id, "note.json"));
        assert!(matches!(result, Err(BookingError::NotFound)));
    }

    #[test]
    fn test_allocate_skips_existing_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let collection = temp_dir.path().join("notes");

        let fixed = RecordId::parse("550e8400e29b41d4a716446655440000").unwrap();
        let taken = fixed.sharded_dir(&collection);
        fs::create_dir_all(&taken).unwrap();

        // First candidate collides, source must be consulted again.
        let fresh = RecordId::new();
        let mut candidates = vec![fresh.clone(), fixed].into_iter().rev();
        let (id, _dir) = allocate_record_dir(&collection, || candidates.next().unwrap()).unwrap();
        assert_eq!(id, fresh);
    }

    #[test]
    fn test_scan_collection_skips_corrupt_documents() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let collection = temp_dir.path().join("notes");

        let (id, dir) = allocate_record_dir(&collection, RecordId::new).unwrap();
        write_document(
            &dir.join("note.json"),
            &Note {
                id,
                body: "valid".into(),
            },
        )
        .unwrap();

        let (_bad_id, bad_dir) = allocate_record_dir(&collection, RecordId::new).unwrap();
        fs::write(bad_dir.join("note.json"), "{not json").unwrap();

        let notes: Vec<Note> = scan_collection(&collection, "note.json");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].body, "valid");
    }

    #[test]
    fn test_scan_collection_empty_for_missing_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let notes: Vec<Note> = scan_collection(&temp_dir.path().join("nothing"), "note.json");
        assert!(notes.is_empty());
    }

    #[test]
    fn test_remove_record_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let collection = temp_dir.path().join("notes");

        let (id, dir) = allocate_record_dir(&collection, RecordId::new).unwrap();
        assert!(dir.is_dir());

        remove_record_dir(&collection, &id).unwrap();
        assert!(!dir.exists());

        assert!(matches!(
            remove_record_dir(&collection, &id),
            Err(BookingError::NotFound)
        ));
    }
}

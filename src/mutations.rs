//! Edits to caller-owned note and notification collections.
//!
//! Each call works on a single collection and the last write wins; nothing
//! here keeps state of its own.

use tracing::debug;
use uuid::Uuid;

use crate::error::MutationError;
use crate::models::{Folder, Note, Notification};

/// Flips the favorite flag and returns the new value.
pub fn toggle_favorite(notes: &mut [Note], note_id: i64) -> Result<bool, MutationError> {
    let note = notes
        .iter_mut()
        .find(|n| n.id == note_id)
        .ok_or(MutationError::NoteNotFound(note_id))?;
    note.is_favorite = !note.is_favorite;
    Ok(note.is_favorite)
}

/// Marks one notification read. Reading never goes back to unread.
pub fn mark_read(notifications: &mut [Notification], id: i64) -> Result<(), MutationError> {
    let notification = notifications
        .iter_mut()
        .find(|n| n.id == id)
        .ok_or(MutationError::NotificationNotFound(id))?;
    notification.read = true;
    Ok(())
}

/// Returns how many notifications changed.
pub fn mark_all_read(notifications: &mut [Notification]) -> usize {
    let mut changed = 0;
    for notification in notifications.iter_mut().filter(|n| !n.read) {
        notification.read = true;
        changed += 1;
    }
    changed
}

pub fn delete_notification(
    notifications: &mut Vec<Notification>,
    id: i64,
) -> Result<Notification, MutationError> {
    let index = notifications
        .iter()
        .position(|n| n.id == id)
        .ok_or(MutationError::NotificationNotFound(id))?;
    Ok(notifications.remove(index))
}

fn folder_name(name: &str) -> Result<String, MutationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MutationError::EmptyFolderName);
    }
    Ok(name.to_string())
}

pub fn create_folder(
    folders: &mut Vec<Folder>,
    name: &str,
    color: &str,
) -> Result<Folder, MutationError> {
    let folder = Folder {
        id: Uuid::new_v4(),
        name: folder_name(name)?,
        color: color.to_string(),
    };
    debug!(id = %folder.id, name = %folder.name, "created folder");
    folders.push(folder.clone());
    Ok(folder)
}

pub fn rename_folder(
    folders: &mut [Folder],
    id: Uuid,
    name: &str,
    color: &str,
) -> Result<(), MutationError> {
    let name = folder_name(name)?;
    let folder = folders
        .iter_mut()
        .find(|f| f.id == id)
        .ok_or(MutationError::FolderNotFound(id))?;
    folder.name = name;
    folder.color = color.to_string();
    Ok(())
}

/// Removes a folder. Its notes stay, moved back to uncategorized; the count
/// of moved notes is returned.
pub fn delete_folder(
    folders: &mut Vec<Folder>,
    notes: &mut [Note],
    id: Uuid,
) -> Result<usize, MutationError> {
    let index = folders
        .iter()
        .position(|f| f.id == id)
        .ok_or(MutationError::FolderNotFound(id))?;
    folders.remove(index);

    let mut moved = 0;
    for note in notes.iter_mut().filter(|n| n.folder_id == Some(id)) {
        note.folder_id = None;
        moved += 1;
    }
    debug!(%id, moved, "deleted folder");
    Ok(moved)
}

/// Moves a note into `target`, or out of any folder when `target` is `None`.
pub fn move_note(
    notes: &mut [Note],
    folders: &[Folder],
    note_id: i64,
    target: Option<Uuid>,
) -> Result<(), MutationError> {
    if let Some(folder_id) = target {
        if !folders.iter().any(|f| f.id == folder_id) {
            return Err(MutationError::FolderNotFound(folder_id));
        }
    }
    let note = notes
        .iter_mut()
        .find(|n| n.id == note_id)
        .ok_or(MutationError::NoteNotFound(note_id))?;
    note.folder_id = target;
    Ok(())
}

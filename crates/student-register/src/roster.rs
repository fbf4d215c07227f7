//! Roster repository.
//!
//! The roster lives in the store as one JSON array under the `students`
//! key. Every mutation reads the whole array, changes it in memory, and
//! writes the whole array back. Reads never write.
//!
//! Elements that do not read as students are left where they are: they are
//! hidden from callers but carried through every rewrite unchanged.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::access::AccessContext;
use crate::error::{Error, Result};
use crate::storage::{keys, Storage};
use crate::student::{Student, StudentDraft, StudentId};

/// Which record a save applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditTarget {
    /// Append a new record.
    #[default]
    New,
    /// Replace the record with this identifier.
    Existing(StudentId),
}

/// One element of the stored roster array.
#[derive(Debug, Clone)]
enum Slot {
    Record(Student),
    Unreadable(Value),
}

impl Slot {
    fn record(&self) -> Option<&Student> {
        match self {
            Self::Record(student) => Some(student),
            Self::Unreadable(_) => None,
        }
    }
}

/// CRUD operations over the roster.
#[derive(Debug, Clone, Copy)]
pub struct RosterRepository<'a> {
    store: &'a Storage,
}

impl<'a> RosterRepository<'a> {
    /// Create a repository over the given store.
    #[must_use]
    pub fn new(store: &'a Storage) -> Self {
        Self { store }
    }

    /// Read the full roster.
    ///
    /// Returns an empty roster if the key is absent or its value is not a
    /// JSON array. Elements that are not student objects are skipped.
    /// Records stored without a usable identifier get a provisional one
    /// (see [`StudentId::provisional`]) that the next save or removal
    /// persists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn list_all(&self) -> Result<Vec<Student>> {
        let roster: Vec<Student> = self
            .load()?
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Record(student) => Some(student),
                Slot::Unreadable(_) => None,
            })
            .collect();
        debug!(count = roster.len(), "Loaded roster");
        Ok(roster)
    }

    /// Find a student by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn get(&self, id: StudentId) -> Result<Option<Student>> {
        Ok(self.list_all()?.into_iter().find(|s| s.id == id))
    }

    /// Insert or update a student.
    ///
    /// The draft is normalized first (trimmed, name title-cased). The
    /// natural key (`roll`, `student_class`) must not be held by any other
    /// record. Nothing is written unless every check passes.
    ///
    /// # Errors
    ///
    /// - [`Error::PermissionDenied`] if `ctx` may not edit
    /// - [`Error::Validation`] if a required field is blank
    /// - [`Error::StudentNotFound`] if `target` names an unknown record
    /// - [`Error::DuplicateKey`] if the natural key is taken
    pub fn save(
        &self,
        ctx: &AccessContext,
        draft: StudentDraft,
        target: EditTarget,
    ) -> Result<Student> {
        ctx.require_edit("save student")?;
        let draft = draft.normalize()?;

        let mut slots = self.load()?;

        let editing = match target {
            EditTarget::New => None,
            EditTarget::Existing(id) => {
                let position = slots
                    .iter()
                    .position(|slot| slot.record().is_some_and(|s| s.id == id))
                    .ok_or_else(|| Error::StudentNotFound { id: id.to_string() })?;
                Some((position, id))
            }
        };

        let taken = slots.iter().enumerate().any(|(position, slot)| {
            editing.map(|(p, _)| p) != Some(position)
                && slot
                    .record()
                    .is_some_and(|s| s.has_key(&draft.roll, &draft.student_class))
        });
        if taken {
            return Err(Error::duplicate_key(draft.roll, draft.student_class));
        }

        let saved = match editing {
            None => {
                let student = Student::from_draft(StudentId::generate(), draft);
                slots.push(Slot::Record(student.clone()));
                student
            }
            Some((position, id)) => {
                let student = Student::from_draft(id, draft);
                slots[position] = Slot::Record(student.clone());
                student
            }
        };

        self.write(&slots)?;
        info!(
            id = %saved.id,
            roll = %saved.roll,
            class = %saved.student_class,
            updated = editing.is_some(),
            "Saved student"
        );
        Ok(saved)
    }

    /// Remove the first student holding the natural key.
    ///
    /// Returns `true` if a record was removed. A key that matches nothing is
    /// not an error and leaves the roster untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PermissionDenied`] if `ctx` may not edit, or an error
    /// if the store cannot be read or written.
    pub fn remove(&self, ctx: &AccessContext, roll: &str, student_class: &str) -> Result<bool> {
        ctx.require_edit("remove student")?;

        let mut slots = self.load()?;
        let Some(position) = slots
            .iter()
            .position(|slot| slot.record().is_some_and(|s| s.has_key(roll, student_class)))
        else {
            debug!(roll, class = student_class, "No student to remove");
            return Ok(false);
        };

        let removed = slots.remove(position);
        self.write(&slots)?;
        if let Slot::Record(student) = removed {
            info!(id = %student.id, roll, class = student_class, "Removed student");
        }
        Ok(true)
    }

    /// Read the stored array element by element.
    fn load(&self) -> Result<Vec<Slot>> {
        let raw: Vec<Value> = self.store.get_json_or_default(keys::STUDENTS)?;

        Ok(raw
            .into_iter()
            .enumerate()
            .map(|(position, value)| {
                let id = StudentId::stored_in(&value);
                let mut candidate = value.clone();
                if id.is_none() {
                    if let Value::Object(fields) = &mut candidate {
                        fields.remove("id");
                    }
                }
                match serde_json::from_value::<Student>(candidate) {
                    Ok(mut student) => {
                        student.id = id.unwrap_or_else(|| StudentId::provisional(position));
                        Slot::Record(student)
                    }
                    Err(e) => {
                        warn!(position, error = %e, "Skipping unreadable student record");
                        Slot::Unreadable(value)
                    }
                }
            })
            .collect())
    }

    /// Write the whole roster back as one value, unreadable elements included.
    fn write(&self, slots: &[Slot]) -> Result<()> {
        let values = slots
            .iter()
            .map(|slot| match slot {
                Slot::Record(student) => serde_json::to_value(student),
                Slot::Unreadable(value) => Ok(value.clone()),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let json = serde_json::to_string(&values)?;
        self.store.set(keys::STUDENTS, &json)
    }
}

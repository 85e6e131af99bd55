use serde::{Serialize, Serializer};

/// Edit to one optional task field in a partial update.
///
/// Serializes as the new value for `Set` and as `null` for `Clear`.
/// `NoChange` fields are expected to be skipped with
/// `skip_serializing_if = "FieldUpdate::is_no_change"`, so the server never
/// sees them.
///
/// ```
/// use taskboard_domain::FieldUpdate;
///
/// let mut assignee = Some("alice".to_string());
/// FieldUpdate::Set("bob".to_string()).apply_to(&mut assignee);
/// assert_eq!(assignee.as_deref(), Some("bob"));
///
/// FieldUpdate::<String>::Clear.apply_to(&mut assignee);
/// assert!(assignee.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    #[default]
    NoChange,
    Set(T),
    Clear,
}

impl<T> FieldUpdate<T> {
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            FieldUpdate::NoChange => {}
            FieldUpdate::Set(value) => *field = Some(value),
            FieldUpdate::Clear => *field = None,
        }
    }

    pub fn is_no_change(&self) -> bool {
        matches!(self, FieldUpdate::NoChange)
    }
}

impl<T: Clone> FieldUpdate<T> {
    /// Apply a copy, keeping `self` for the next task.
    pub fn apply_cloned(&self, field: &mut Option<T>) {
        self.clone().apply_to(field);
    }
}

impl<T: Serialize> Serialize for FieldUpdate<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldUpdate::Set(value) => value.serialize(serializer),
            FieldUpdate::NoChange | FieldUpdate::Clear => serializer.serialize_none(),
        }
    }
}

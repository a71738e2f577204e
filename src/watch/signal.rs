//! Classification of raw filesystem events.

use notify::EventKind;
use notify::event::ModifyKind;
use std::fmt;

/// What a filesystem event means for the watched path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Content was written in place.
    Write,
    /// The path was created.
    Create,
    /// Permissions, ownership, link count or timestamps changed.
    Attribute,
    /// The watched inode was removed.
    Remove,
    /// Anything else (access, rename, unknown).
    Other,
}

impl Signal {
    /// Whether this signal should trigger a reload.
    ///
    /// `reload_on_attribute_change` decides the answer for [`Signal::Attribute`].
    pub fn reloads(self, reload_on_attribute_change: bool) -> bool {
        match self {
            Signal::Write | Signal::Create | Signal::Remove => true,
            Signal::Attribute => reload_on_attribute_change,
            Signal::Other => false,
        }
    }

    /// Whether the watch must be registered again before reloading.
    ///
    /// After a swap the old inode is gone, so the same path has to be bound
    /// again to resolve through the new target.
    pub fn resubscribes(self) -> bool {
        matches!(self, Signal::Attribute | Signal::Remove)
    }
}

impl From<&EventKind> for Signal {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => Signal::Create,
            EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any) => Signal::Write,
            EventKind::Modify(ModifyKind::Metadata(_)) => Signal::Attribute,
            EventKind::Remove(_) => Signal::Remove,
            _ => Signal::Other,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Signal::Write => "write",
            Signal::Create => "create",
            Signal::Attribute => "attribute",
            Signal::Remove => "remove",
            Signal::Other => "other",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{
        AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode,
    };

    #[test]
    fn test_classification() {
        let cases = [
            (EventKind::Create(CreateKind::File), Signal::Create),
            (
                EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                Signal::Write,
            ),
            (EventKind::Modify(ModifyKind::Any), Signal::Write),
            (
                EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
                Signal::Attribute,
            ),
            (EventKind::Remove(RemoveKind::File), Signal::Remove),
            (
                EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
                Signal::Other,
            ),
            (EventKind::Access(AccessKind::Read), Signal::Other),
            (EventKind::Any, Signal::Other),
        ];

        for (kind, expected) in cases {
            assert_eq!(Signal::from(&kind), expected, "{kind:?}");
        }
    }

    #[test]
    fn test_reaction_table() {
        assert!(Signal::Write.reloads(true));
        assert!(!Signal::Write.resubscribes());
        assert!(Signal::Create.reloads(false));
        assert!(!Signal::Create.resubscribes());
        assert!(Signal::Remove.reloads(false));
        assert!(Signal::Remove.resubscribes());
        assert!(!Signal::Other.reloads(true));
        assert!(!Signal::Other.resubscribes());
    }

    #[test]
    fn test_attribute_change_always_resubscribes() {
        assert!(Signal::Attribute.resubscribes());
        assert!(Signal::Attribute.reloads(true));
        assert!(!Signal::Attribute.reloads(false));
    }
}

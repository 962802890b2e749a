use crate::naming::{generated_field_name, is_invalid_field_name};
use crate::record::{FieldHandle, RecordDescriptor};

/// Maps a CRM logical field name to the field of a generated type.
///
/// The field name usually matches the CRM name. When the CRM name was not a legal identifier the
/// generator renamed it, so the same rename is applied before giving up. Returns `None` rather
/// than failing; callers decide whether a missing field matters.
pub fn resolve_field(descriptor: &RecordDescriptor, field_name: &str) -> Option<&'static FieldHandle> {
    if field_name.is_empty() {
        return None;
    }
    if let Some(field) = descriptor.field(field_name) {
        return Some(field);
    }
    if !is_invalid_field_name(field_name) {
        return None;
    }
    let renamed = generated_field_name(field_name);
    let field = descriptor.field(&renamed);
    if field.is_some() {
        log::trace!("{}: '{field_name}' resolved to renamed field '{renamed}'", descriptor.type_name);
    }
    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CrmRecord;
    use crmbridge_macros::CrmRecord;

    #[derive(Debug, Default, CrmRecord)]
    #[crm(entity = "course", type_name = "tests::Course")]
    #[allow(non_snake_case)]
    struct Course {
        name: Option<String>,
        Class: Option<String>,
        #[crm(name = "Type")]
        kind: Option<String>,
    }

    #[derive(Debug, Default, CrmRecord)]
    #[crm(entity = "room", type_name = "tests::Room")]
    struct Room {
        name: Option<String>,
    }

    #[test]
    fn exact_names_resolve_directly() {
        let field = resolve_field(Course::DESCRIPTOR, "name").expect("name resolves");
        assert_eq!(field.name, "name");
    }

    #[test]
    fn reserved_name_falls_back_to_renamed_field() {
        let field = resolve_field(Course::DESCRIPTOR, "class").expect("class resolves");
        assert_eq!(field.name, "Class");
        assert!(resolve_field(Room::DESCRIPTOR, "class").is_none());
    }

    #[test]
    fn valid_but_unknown_names_do_not_fall_back() {
        assert!(resolve_field(Course::DESCRIPTOR, "Name").is_none());
        assert!(resolve_field(Course::DESCRIPTOR, "kind").is_none());
        assert!(resolve_field(Course::DESCRIPTOR, "").is_none());
    }

    #[test]
    fn explicit_field_name_takes_part_in_fallback() {
        let field = resolve_field(Course::DESCRIPTOR, "type").expect("type resolves");
        assert_eq!(field.name, "Type");
    }
}

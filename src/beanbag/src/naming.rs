//! Derivation of default bean names.
//!
//! A bean registered or provided without an explicit name is named after its
//! type: the module path and generic arguments are stripped and the first
//! character is lower-cased, so `app::dao::UserDao` becomes `userDao`. An
//! injection slot declared without an explicit name is named after its field,
//! converted to the same lower-camel convention so that a field `user_dao`
//! refers to the bean `userDao`.

use std::any;

/// Returns the default bean name of `T`.
pub fn bean_name_of<T: ?Sized>() -> String {
    bean_name_of_type(any::type_name::<T>())
}

/// Returns the default bean name for a type name as produced by
/// [`std::any::type_name`].
pub fn bean_name_of_type(type_name: &str) -> String {
    let without_generics = match type_name.find('<') {
        Some(pos) => &type_name[..pos],
        None => type_name,
    };
    let simple = without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .trim();
    lower_first(simple)
}

/// Returns the default dependency name for a field identifier.
pub fn bean_name_of_field(field: &str) -> String {
    let field = field.strip_prefix("r#").unwrap_or(field);
    let mut words = field.split('_').filter(|word| !word.is_empty());

    let mut name = match words.next() {
        Some(first) => lower_first(first),
        None => return String::new(),
    };
    for word in words {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    name
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

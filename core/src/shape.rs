//! Call-shape normalization.
//!
//! # Design
//! Plural operations accept identifiers as one id, an explicit collection,
//! or a variadic list built with [`ids!`](crate::ids). Scalar operations
//! accept exactly one bare id. Either way the arguments are normalized into
//! a `Vec<Identifier>` before any request is issued.
//!
//! Misuse (no identifiers, an empty identifier, a collection handed to a
//! scalar operation, a collection mixed into a variadic list) is a programmer
//! error and panics at call time. It never reaches the returned future.

use std::fmt;

/// Opaque key naming a remote file, folder, or user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&String> for Identifier {
    fn from(id: &String) -> Self {
        Self(id.clone())
    }
}

/// Identifier arguments as the caller supplied them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdArgs {
    One(Identifier),
    Many(Vec<Identifier>),
    Variadic(Vec<IdArgs>),
}

impl IdArgs {
    /// Collect a variadic argument list. Used by the `ids!` macro.
    pub fn variadic(parts: Vec<IdArgs>) -> Self {
        IdArgs::Variadic(parts)
    }
}

/// Build variadic identifier arguments: `ids!("a", "b", "c")`.
///
/// `client.get_files(ids!("a", "b"))` and `client.get_files(["a", "b"])`
/// issue the same requests.
#[macro_export]
macro_rules! ids {
    ($($id:expr),+ $(,)?) => {
        $crate::IdArgs::variadic(vec![$($crate::IdArgs::from($id)),+])
    };
}

impl From<Identifier> for IdArgs {
    fn from(id: Identifier) -> Self {
        IdArgs::One(id)
    }
}

impl From<&str> for IdArgs {
    fn from(id: &str) -> Self {
        IdArgs::One(id.into())
    }
}

impl From<String> for IdArgs {
    fn from(id: String) -> Self {
        IdArgs::One(id.into())
    }
}

impl From<&String> for IdArgs {
    fn from(id: &String) -> Self {
        IdArgs::One(id.into())
    }
}

impl<T: Into<Identifier>> From<Vec<T>> for IdArgs {
    fn from(ids: Vec<T>) -> Self {
        IdArgs::Many(ids.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Identifier>, const N: usize> From<[T; N]> for IdArgs {
    fn from(ids: [T; N]) -> Self {
        IdArgs::Many(ids.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Identifier>, const N: usize> From<&[T; N]> for IdArgs {
    fn from(ids: &[T; N]) -> Self {
        IdArgs::Many(ids.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Identifier>> From<&[T]> for IdArgs {
    fn from(ids: &[T]) -> Self {
        IdArgs::Many(ids.iter().cloned().map(Into::into).collect())
    }
}

/// The kind of metadata a batched lookup asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    Users,
    Files,
    Folders,
}

impl MetadataKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataKind::Users => "users",
            MetadataKind::Files => "files",
            MetadataKind::Folders => "folders",
        }
    }
}

/// What a logical request retrieves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Files,
    Folders,
    Metadata(MetadataKind),
}

/// Normalized form of a call: which resource, which ids, and whether the
/// caller wants a collection back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalRequest {
    pub resource: Resource,
    pub ids: Vec<Identifier>,
    pub want_array: bool,
}

impl LogicalRequest {
    /// A plural call: `op(id)`, `op([ids])` or `op(ids!(a, b, ...))`.
    pub fn many(op: &str, resource: Resource, args: IdArgs) -> Self {
        Self {
            resource,
            ids: rest_or_array(op, args),
            want_array: true,
        }
    }

    /// A scalar call taking exactly one bare identifier.
    pub fn single(op: &str, resource: Resource, args: IdArgs) -> Self {
        Self {
            resource,
            ids: single_element(op, args),
            want_array: false,
        }
    }
}

/// Normalize plural arguments. A lone collection is used as-is; a variadic
/// list of bare ids is collected into one.
pub fn rest_or_array(op: &str, args: IdArgs) -> Vec<Identifier> {
    let ids = match args {
        IdArgs::One(id) => vec![id],
        IdArgs::Many(ids) => ids,
        IdArgs::Variadic(mut parts) if parts.len() == 1 => {
            return rest_or_array(op, parts.remove(0));
        }
        IdArgs::Variadic(parts) => parts
            .into_iter()
            .map(|part| match part {
                IdArgs::One(id) => id,
                other => panic!(
                    "{op} called with a collection inside a variadic identifier list: {other:?}"
                ),
            })
            .collect(),
    };
    check_ids(op, ids)
}

/// Normalize scalar arguments, rejecting collections.
pub fn single_element(op: &str, args: IdArgs) -> Vec<Identifier> {
    match args {
        IdArgs::One(id) => check_ids(op, vec![id]),
        IdArgs::Variadic(mut parts) if parts.len() == 1 => single_element(op, parts.remove(0)),
        IdArgs::Variadic(parts) => panic!(
            "{op} takes a single identifier, called with {} arguments",
            parts.len()
        ),
        IdArgs::Many(ids) => panic!("{op} cannot be called with a collection of identifiers: {ids:?}"),
    }
}

fn check_ids(op: &str, ids: Vec<Identifier>) -> Vec<Identifier> {
    assert!(
        !ids.is_empty(),
        "{op} called with 0 identifiers; requires at least 1"
    );
    assert!(
        ids.iter().all(|id| !id.as_str().is_empty()),
        "{op} called with an empty identifier"
    );
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(ids: &[Identifier]) -> Vec<&str> {
        ids.iter().map(Identifier::as_str).collect()
    }

    #[test]
    fn array_and_variadic_forms_are_equivalent() {
        let from_array = rest_or_array("get_files", IdArgs::from(["a", "b"]));
        let from_vec = rest_or_array("get_files", IdArgs::from(vec!["a".to_string(), "b".to_string()]));
        let from_variadic = rest_or_array("get_files", crate::ids!("a", "b"));
        assert_eq!(names(&from_array), ["a", "b"]);
        assert_eq!(from_array, from_vec);
        assert_eq!(from_array, from_variadic);
    }

    #[test]
    fn single_collection_inside_variadic_is_unwrapped() {
        let ids = rest_or_array("get_files", crate::ids!(vec!["a", "b", "c"]));
        assert_eq!(names(&ids), ["a", "b", "c"]);
    }

    #[test]
    fn bare_id_becomes_one_element_list() {
        let ids = rest_or_array("get_folders", IdArgs::from("x"));
        assert_eq!(names(&ids), ["x"]);
    }

    #[test]
    fn slices_are_accepted() {
        let owned = vec![Identifier::new("a"), Identifier::new("b")];
        let ids = rest_or_array("get_files", IdArgs::from(owned.as_slice()));
        assert_eq!(ids, owned);
        let ids = rest_or_array("get_files", IdArgs::from(&["c", "d"]));
        assert_eq!(names(&ids), ["c", "d"]);
    }

    #[test]
    #[should_panic(expected = "collection inside a variadic")]
    fn collection_mixed_into_variadic_panics() {
        rest_or_array("get_files", crate::ids!("a", vec!["b", "c"]));
    }

    #[test]
    #[should_panic(expected = "requires at least 1")]
    fn empty_list_panics() {
        rest_or_array("get_files", IdArgs::from(Vec::<String>::new()));
    }

    #[test]
    #[should_panic(expected = "empty identifier")]
    fn empty_identifier_panics() {
        rest_or_array("get_files", crate::ids!("a", ""));
    }

    #[test]
    fn scalar_accepts_bare_id() {
        let ids = single_element("get_file", IdArgs::from(String::from("abc")));
        assert_eq!(names(&ids), ["abc"]);
        let ids = single_element("get_file", crate::ids!("abc"));
        assert_eq!(names(&ids), ["abc"]);
    }

    #[test]
    #[should_panic(expected = "cannot be called with a collection")]
    fn scalar_rejects_collection() {
        single_element("get_file", IdArgs::from(["a"]));
    }

    #[test]
    #[should_panic(expected = "takes a single identifier")]
    fn scalar_rejects_many_variadic_ids() {
        single_element("get_file", crate::ids!("a", "b"));
    }

    #[test]
    fn logical_request_records_array_preference() {
        let many = LogicalRequest::many("get_folders", Resource::Folders, IdArgs::from("f"));
        assert!(many.want_array);
        let single = LogicalRequest::single(
            "get_user_metadata",
            Resource::Metadata(MetadataKind::Users),
            IdArgs::from("u"),
        );
        assert!(!single.want_array);
        assert_eq!(single.resource, Resource::Metadata(MetadataKind::Users));
    }
}

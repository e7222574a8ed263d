//! Drift and late-initialization helpers.
//!
//! Desired parameters are optional almost everywhere: `None` means "not
//! managed" and never counts as drift. Remote values come back fully
//! populated, with empty strings where GitLab has nothing to say.

use crds::{
    MergeMethod, ProjectCreationLevel, RunnerAccessLevel, SquashOption, SubgroupCreationLevel,
    VariableType, Visibility,
};

/// Enums sent to GitLab as strings
pub trait WireEnum: Sized + Copy {
    fn wire(&self) -> &'static str;
    fn from_wire(value: &str) -> Option<Self>;
}

macro_rules! wire_enum {
    ($($ty:ty),*) => {
        $(
            impl WireEnum for $ty {
                fn wire(&self) -> &'static str {
                    self.as_str()
                }

                fn from_wire(value: &str) -> Option<Self> {
                    <$ty>::parse(value)
                }
            }
        )*
    };
}

wire_enum!(
    Visibility,
    ProjectCreationLevel,
    SubgroupCreationLevel,
    MergeMethod,
    SquashOption,
    VariableType,
    RunnerAccessLevel
);

/// Unset desired value matches anything
pub fn equal_optional<T: PartialEq>(desired: &Option<T>, remote: &T) -> bool {
    desired.as_ref().map_or(true, |d| d == remote)
}

/// Unset desired value matches anything; an absent remote string reads as empty
pub fn equal_optional_str(desired: &Option<String>, remote: Option<&str>) -> bool {
    desired
        .as_deref()
        .map_or(true, |d| d == remote.unwrap_or_default())
}

pub fn equal_optional_enum<E: WireEnum>(desired: &Option<E>, remote: &str) -> bool {
    desired.as_ref().map_or(true, |d| d.wire() == remote)
}

/// Order-sensitive list comparison; `None` is not managed
pub fn equal_optional_slice<T: PartialEq>(desired: &Option<Vec<T>>, remote: &[T]) -> bool {
    desired.as_ref().map_or(true, |d| d.as_slice() == remote)
}

/// Order-insensitive list comparison (tags, topics); `None` is not managed
pub fn equal_set(desired: &Option<Vec<String>>, remote: &[String]) -> bool {
    match desired {
        None => true,
        Some(d) => {
            let mut d: Vec<&str> = d.iter().map(String::as_str).collect();
            let mut r: Vec<&str> = remote.iter().map(String::as_str).collect();
            d.sort_unstable();
            d.dedup();
            r.sort_unstable();
            r.dedup();
            d == r
        }
    }
}

/// Empty string is "not set"
pub fn string_to_optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Fill an unset desired value from the remote one; returns whether it changed
pub fn late_init<T>(desired: &mut Option<T>, remote: Option<T>) -> bool {
    if desired.is_none() && remote.is_some() {
        *desired = remote;
        true
    } else {
        false
    }
}

pub fn late_init_str(desired: &mut Option<String>, remote: &str) -> bool {
    late_init(desired, string_to_optional(remote))
}

pub fn late_init_str_opt(desired: &mut Option<String>, remote: Option<&str>) -> bool {
    late_init_str(desired, remote.unwrap_or_default())
}

/// Zero is GitLab's "nothing configured" for numeric settings
pub fn late_init_int(desired: &mut Option<i64>, remote: i64) -> bool {
    late_init(desired, (remote != 0).then_some(remote))
}

/// Unrecognized remote values are left alone
pub fn late_init_enum<E: WireEnum>(desired: &mut Option<E>, remote: &str) -> bool {
    late_init(desired, E::from_wire(remote))
}

/// An explicitly empty desired list is a choice and is kept
pub fn late_init_vec<T: Clone>(desired: &mut Option<Vec<T>>, remote: &[T]) -> bool {
    late_init(desired, (!remote.is_empty()).then(|| remote.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_remote_strings_are_not_adopted() {
        let mut desired = None;
        assert!(!late_init_str_opt(&mut desired, Some("")));
        assert!(!late_init_str_opt(&mut desired, None));
        assert_eq!(desired, None);

        assert!(late_init_str_opt(&mut desired, Some("nightly")));
        assert_eq!(desired.as_deref(), Some("nightly"));
    }

    #[test]
    fn test_equal_optional() {
        assert!(equal_optional(&None, &true));
        assert!(equal_optional(&Some(3), &3));
        assert!(!equal_optional(&Some(false), &true));
    }

    #[test]
    fn test_equal_optional_str_treats_missing_remote_as_empty() {
        assert!(equal_optional_str(&None, Some("x")));
        assert!(equal_optional_str(&Some(String::new()), None));
        assert!(!equal_optional_str(&Some("a".into()), None));
        assert!(equal_optional_str(&Some("a".into()), Some("a")));
    }

    #[test]
    fn test_equal_optional_enum() {
        assert!(equal_optional_enum(&Some(Visibility::Internal), "internal"));
        assert!(!equal_optional_enum(&Some(Visibility::Public), "private"));
        assert!(equal_optional_enum::<MergeMethod>(&None, "ff"));
    }

    #[test]
    fn test_equal_set_ignores_order_and_duplicates() {
        let remote = vec!["b".to_string(), "a".to_string()];
        assert!(equal_set(&Some(vec!["a".into(), "b".into(), "a".into()]), &remote));
        assert!(!equal_set(&Some(vec!["a".into()]), &remote));
        assert!(equal_set(&None, &remote));
        assert!(equal_set(&Some(vec![]), &[]));
    }

    #[test]
    fn test_equal_optional_slice_is_order_sensitive() {
        assert!(equal_optional_slice(&Some(vec![1, 2]), &[1, 2]));
        assert!(!equal_optional_slice(&Some(vec![2, 1]), &[1, 2]));
        assert!(!equal_optional_slice(&Some(vec![]), &[1]));
    }

    #[test]
    fn test_late_init_only_fills_unset_fields() {
        let mut desired = None;
        assert!(late_init(&mut desired, Some(true)));
        assert_eq!(desired, Some(true));
        assert!(!late_init(&mut desired, Some(false)));
        assert_eq!(desired, Some(true));

        let mut description = None;
        assert!(!late_init_str(&mut description, ""));
        assert!(late_init_str(&mut description, "hello"));

        let mut timeout = None;
        assert!(!late_init_int(&mut timeout, 0));
        assert!(late_init_int(&mut timeout, 3600));
    }

    #[test]
    fn test_late_init_enum_skips_unknown_values() {
        let mut visibility: Option<Visibility> = None;
        assert!(!late_init_enum(&mut visibility, "secret"));
        assert!(late_init_enum(&mut visibility, "public"));
        assert_eq!(visibility, Some(Visibility::Public));
    }

    #[test]
    fn test_late_init_vec_keeps_explicit_empty() {
        let mut tags: Option<Vec<String>> = Some(vec![]);
        assert!(!late_init_vec(&mut tags, &["docker".to_string()]));
        assert_eq!(tags, Some(vec![]));

        let mut tags: Option<Vec<String>> = None;
        assert!(!late_init_vec(&mut tags, &[]));
        assert!(late_init_vec(&mut tags, &["docker".to_string()]));
    }
}

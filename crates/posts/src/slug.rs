/// URL slug for a post title: every space becomes a hyphen.
///
/// Nothing else is normalised, so distinct titles can share a slug only when
/// they differ in spaces versus hyphens; the store's unique slug catches that.
pub fn slugify(title: &str) -> String {
    title.replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_every_space() {
        assert_eq!(slugify("The new post is here"), "The-new-post-is-here");
        assert_eq!(slugify("  double  "), "--double--");
        assert_eq!(slugify("already-slugged"), "already-slugged");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn slug_has_no_spaces_and_keeps_length(title in "[a-zA-Z0-9 ]{0,64}") {
                let slug = slugify(&title);
                prop_assert!(!slug.contains(' '));
                prop_assert_eq!(slug.chars().count(), title.chars().count());
                prop_assert_eq!(slug.replace('-', " "), title.replace('-', " "));
            }
        }
    }
}

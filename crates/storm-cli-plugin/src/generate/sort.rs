//! Display ordering of command flags.

use crate::request::CommandRequestArg;

/// Orders flags by name with every negation placed directly after its
/// positive flag.
///
/// Negations take no part in the name sort; one whose positive flag is
/// absent is appended at the end. Sorting an already sorted list returns it
/// unchanged.
#[must_use]
pub fn sort_args(args: &[CommandRequestArg]) -> Vec<CommandRequestArg> {
    let mut positives: Vec<&CommandRequestArg> =
        args.iter().filter(|arg| !arg.is_negation()).collect();
    positives.sort_by(|left, right| left.name.cmp(&right.name));

    let mut sorted: Vec<CommandRequestArg> = Vec::with_capacity(args.len());
    for positive in positives {
        sorted.push(positive.clone());
        sorted.extend(
            args.iter()
                .filter(|arg| arg.is_negative_of.as_deref() == Some(positive.name.as_str()))
                .cloned(),
        );
    }

    let mut orphans: Vec<&CommandRequestArg> = args
        .iter()
        .filter(|arg| {
            arg.is_negative_of
                .as_deref()
                .is_some_and(|positive| !args.iter().any(|other| other.name == positive))
        })
        .collect();
    orphans.sort_by(|left, right| left.name.cmp(&right.name));
    sorted.extend(orphans.into_iter().cloned());
    sorted
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::request::{ArgSpec, CommandRequest};
    use crate::test_support::{bool_prop, context, string_prop};

    fn request_with(booleans: &[&str], strings: &[&str]) -> CommandRequest {
        let context = context();
        let mut request = CommandRequest::empty("src/commands/deploy.ts");
        for name in strings {
            request.add(&context, ArgSpec::from_property(string_prop(name)));
        }
        for name in booleans {
            request.add(&context, ArgSpec::from_property(bool_prop(name)));
        }
        request
    }

    fn names(args: &[CommandRequestArg]) -> Vec<&str> {
        args.iter().map(|arg| arg.name.as_str()).collect()
    }

    #[test]
    fn negations_follow_their_positive() {
        let request = request_with(&["watch", "force"], &["target", "region"]);

        let sorted = sort_args(request.args());

        assert_eq!(
            names(&sorted),
            ["force", "no-force", "region", "target", "watch", "no-watch"]
        );
    }

    #[test]
    fn declared_negations_sort_under_positive() {
        let request = request_with(&["noCache", "build"], &[]);

        let sorted = sort_args(request.args());

        assert_eq!(
            names(&sorted),
            ["build", "no-build", "cache", "no-cache"]
        );
    }

    #[rstest]
    #[case::booleans(&["zeta", "alpha", "mid"], &[])]
    #[case::mixed(&["force"], &["target", "a", "zz"])]
    #[case::negations(&["noCache", "no-color", "verbose"], &["output"])]
    #[case::empty(&[], &[])]
    fn sorting_is_a_fixed_point(#[case] booleans: &[&str], #[case] strings: &[&str]) {
        let request = request_with(booleans, strings);

        let once = sort_args(request.args());
        let twice = sort_args(&once);

        assert_eq!(once, twice);
        assert_eq!(once.len(), request.args().len());
        for (index, arg) in once.iter().enumerate() {
            if let Some(positive) = &arg.is_negative_of {
                let previous = index.checked_sub(1).and_then(|at| once.get(at));
                assert!(
                    previous.is_some_and(|prev| &prev.name == positive
                        || prev.is_negative_of.as_ref() == Some(positive)),
                    "{} is not next to {positive}",
                    arg.name
                );
            }
        }
    }
}

//! "Did you mean" suggestions for unknown-identifier/unknown-type errors.

/// Picks the closest name to `unknown` out of `candidates` by Jaro-Winkler
/// similarity, for a "did you mean" hint. Returns `None` if nothing clears
/// the similarity floor — a low-confidence suggestion is worse than none.
pub fn did_you_mean<'a>(unknown: &str, candidates: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    const THRESHOLD: f64 = 0.7;
    candidates
        .map(|candidate| (candidate, strsim::jaro_winkler(unknown, candidate)))
        .filter(|(_, score)| *score >= THRESHOLD)
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
        .map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_the_closest_typo() {
        let candidates = ["print", "println", "main"];
        assert_eq!(did_you_mean("pint", candidates.into_iter()), Some("print"));
    }

    #[test]
    fn suggests_nothing_when_everything_is_far() {
        let candidates = ["print", "main"];
        assert_eq!(did_you_mean("xyzzy", candidates.into_iter()), None);
    }

    #[test]
    fn empty_candidate_list_suggests_nothing() {
        assert_eq!(did_you_mean("foo", std::iter::empty()), None);
    }
}

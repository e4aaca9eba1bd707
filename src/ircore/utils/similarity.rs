use std::collections::HashSet;
use std::hash::Hash;

/// Levenshtein distance with insert and delete costing 1 and substitution 2.
pub fn edit_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let substitute = if a[i - 1] == b[j - 1] { 0 } else { 2 };
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + substitute);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("", "ab"), 2);
        assert_eq!(edit_distance("colur", "colour"), 1);
        assert_eq!(edit_distance("colur", "color"), 2);
        assert_eq!(edit_distance("colur", "collar"), 3);
        assert_eq!(edit_distance("cat", "cut"), 2);
        assert_eq!(edit_distance("Ångström", "angstrom"), 4);
    }

    #[test]
    fn test_edit_distance_metric() {
        let words = ["", "a", "cat", "cart", "act", "tack", "colour", "color", "collar"];
        for x in words {
            for y in words {
                let dxy = edit_distance(x, y);
                assert_eq!(dxy, edit_distance(y, x));
                assert_eq!(dxy == 0, x == y);
                for z in words {
                    assert!(edit_distance(x, z) <= dxy + edit_distance(y, z));
                }
            }
        }
    }

    #[test]
    fn test_jaccard() {
        let a: HashSet<&str> = HashSet::from(["$c", "ca", "at", "t$"]);
        let b: HashSet<&str> = HashSet::from(["$d", "do", "og", "g$"]);
        assert_eq!(jaccard(&a, &a), 1.0);
        assert_eq!(jaccard(&a, &b), 0.0);
        let c: HashSet<&str> = HashSet::from(["$c", "ca", "ar", "r$"]);
        assert!((jaccard(&a, &c) - 2.0 / 6.0).abs() < 1e-12);
        let empty: HashSet<&str> = HashSet::new();
        assert_eq!(jaccard(&empty, &empty), 0.0);
    }
}

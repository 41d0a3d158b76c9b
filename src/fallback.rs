//! Fixed datasets substituted when the recommendation service is unreachable
//! or answers with garbage. Built from the three bundled placeholder images so
//! the wizard stays fully usable offline.

use crate::types::{FinalSuggestion, GiftImage, ImagePair};

const PLACEHOLDERS: [(&str, &str, &str); 3] = [
    ("/assets/img1.png", "gift_001", "Gift 1"),
    ("/assets/img2.png", "gift_002", "Gift 2"),
    ("/assets/img3.png", "gift_003", "Gift 3"),
];

fn placeholder(index: usize) -> GiftImage {
    let (path, value, name) = PLACEHOLDERS[index];
    GiftImage {
        path: path.to_string(),
        value: value.to_string(),
        name: name.to_string(),
    }
}

/// The fixed five comparison rounds built from the three placeholders.
/// Order and left/right placement are deliberate so every placeholder shows
/// up on both sides across the rounds.
pub fn image_pairs() -> Vec<ImagePair> {
    [(0, 1), (1, 2), (0, 2), (1, 0), (2, 1)]
        .into_iter()
        .map(|(left, right)| ImagePair {
            left: placeholder(left),
            right: placeholder(right),
        })
        .collect()
}

/// The fixed three-item suggestion list, each marked as mock data so the
/// degraded path is recognizable in the UI and in tests.
pub fn final_suggestions() -> Vec<FinalSuggestion> {
    (0..3)
        .map(|i| {
            let image = placeholder(i);
            FinalSuggestion {
                path: image.path,
                value: image.value,
                name: format!("Fallback Gift {}", i + 1),
                description: "Mock data".to_string(),
                amazon_link: None,
                category: None,
                fuzzy_score: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_pairs_are_five_rounds() {
        let pairs = image_pairs();
        assert_eq!(pairs.len(), 5);
        assert_eq!(pairs[0].left.value, "gift_001");
        assert_eq!(pairs[0].right.value, "gift_002");
        // Round 4 flips round 0's ordering.
        assert_eq!(pairs[3].left.value, "gift_002");
        assert_eq!(pairs[3].right.value, "gift_001");
    }

    #[test]
    fn test_fallback_suggestions_marked_as_mock() {
        let suggestions = final_suggestions();
        assert_eq!(suggestions.len(), 3);
        for (i, s) in suggestions.iter().enumerate() {
            assert_eq!(s.description, "Mock data");
            assert_eq!(s.name, format!("Fallback Gift {}", i + 1));
            assert!(s.amazon_link.is_none());
        }
    }
}

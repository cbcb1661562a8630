//! Prompt synthesis from frame captions.
//!
//! Turns the noisy, duplicate-heavy captions produced by the vision model
//! into a single deterministic generation prompt. The mood/tempo inference
//! is a coarse keyword policy; it is intentionally kept as named constants
//! so it can be swapped without touching the composition logic.

/// Prompt used when no usable captions exist.
pub const DEFAULT_PROMPT: &str = "modern electronic with rich harmony and catchy lead melody, \
     chord progression, pads and bassline, light percussion, 10-12 seconds";

/// Fixed instrumentation clause, phrased to bias the generator away from
/// percussion-only output.
pub const INSTRUMENTATION: &str =
    "catchy lead melody, evolving chord progression, warm pads, arpeggios, \
     bassline, light percussion";

/// Maximum number of unique captions carried into the scene description.
pub const MAX_SCENE_CAPTIONS: usize = 8;

/// Unique-caption count at which a video is assumed to be fast-moving.
pub const FAST_CAPTION_COUNT: usize = 6;

/// Scene keywords implying motion.
pub const FAST_KEYWORDS: [&str; 9] = [
    "run", "jump", "fast", "speed", "dance", "car", "sport", "action", "climb",
];

/// Scene keywords implying a dark mood.
pub const DARK_KEYWORDS: [&str; 7] = [
    "night", "dark", "storm", "rain", "shadow", "alley", "underground",
];

/// Synthesize a single generation prompt from ordered frame captions.
///
/// Pure function: the same captions in the same order always produce the
/// same prompt. Captions are trimmed, lowercased, and deduplicated in
/// first-seen order; at most [`MAX_SCENE_CAPTIONS`] survive into the scene
/// description. Lists with no usable text yield [`DEFAULT_PROMPT`].
pub fn synthesize_prompt(captions: &[String]) -> String {
    let uniq = normalize_captions(captions);
    if uniq.is_empty() {
        return DEFAULT_PROMPT.to_string();
    }

    let scene = uniq
        .iter()
        .take(MAX_SCENE_CAPTIONS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("; ");

    let is_fast = uniq.len() >= FAST_CAPTION_COUNT
        || FAST_KEYWORDS.iter().any(|k| scene.contains(k));
    let is_dark = DARK_KEYWORDS.iter().any(|k| scene.contains(k));

    let tempo = if is_fast { "fast" } else { "mid-tempo" };
    let mood = if is_dark { "dark" } else { "bright" };

    format!(
        "{tempo}, {mood} modern track with {INSTRUMENTATION}, \
         short hook and variation; scene: {scene}; stereo, not drum-only"
    )
}

/// Trim, lowercase, drop empties, and deduplicate preserving first-seen
/// order. The returned length (pre-truncation) feeds the tempo heuristic.
fn normalize_captions(captions: &[String]) -> Vec<String> {
    let mut uniq: Vec<String> = Vec::new();
    for caption in captions {
        let normalized = caption.trim().to_lowercase();
        if normalized.is_empty() || uniq.contains(&normalized) {
            continue;
        }
        uniq.push(normalized);
    }
    uniq
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_captions_yield_default_prompt() {
        assert_eq!(synthesize_prompt(&[]), DEFAULT_PROMPT);
    }

    #[test]
    fn test_blank_captions_yield_default_prompt() {
        assert_eq!(synthesize_prompt(&caps(&["  ", "\t", ""])), DEFAULT_PROMPT);
    }

    #[test]
    fn test_dedupes_case_and_whitespace_variants() {
        let prompt = synthesize_prompt(&caps(&[
            "A dog on a beach",
            "  a dog on a beach ",
            "A DOG ON A BEACH",
            "waves rolling in",
        ]));
        assert_eq!(prompt.matches("a dog on a beach").count(), 1);
        assert!(prompt.contains("scene: a dog on a beach; waves rolling in;"));
    }

    #[test]
    fn test_scene_preserves_first_seen_order() {
        let prompt = synthesize_prompt(&caps(&["zebra", "apple", "zebra", "mango"]));
        assert!(prompt.contains("scene: zebra; apple; mango;"));
    }

    #[test]
    fn test_scene_caps_at_eight_entries() {
        let captions: Vec<String> = (0..12).map(|i| format!("unique scene {i}")).collect();
        let prompt = synthesize_prompt(&captions);
        assert!(prompt.contains("unique scene 7"));
        assert!(!prompt.contains("unique scene 8"));
    }

    #[test]
    fn test_calm_scene_is_mid_tempo_bright() {
        let prompt = synthesize_prompt(&caps(&["a quiet lake", "trees by the water"]));
        assert!(prompt.starts_with("mid-tempo, bright modern track"));
    }

    #[test]
    fn test_motion_keyword_implies_fast() {
        let prompt = synthesize_prompt(&caps(&["a man riding a skateboard at speed"]));
        assert!(prompt.starts_with("fast,"));
    }

    #[test]
    fn test_many_unique_captions_imply_fast() {
        let captions: Vec<String> = (0..FAST_CAPTION_COUNT)
            .map(|i| format!("calm meadow view {i}"))
            .collect();
        let prompt = synthesize_prompt(&captions);
        assert!(prompt.starts_with("fast,"));
    }

    #[test]
    fn test_dark_keyword_implies_dark_mood() {
        let prompt = synthesize_prompt(&caps(&["a city street at night"]));
        assert!(prompt.starts_with("mid-tempo, dark modern track"));
    }

    #[test]
    fn test_prompt_carries_instrumentation_and_suffix() {
        let prompt = synthesize_prompt(&caps(&["a garden"]));
        assert!(prompt.contains(INSTRUMENTATION));
        assert!(prompt.ends_with("stereo, not drum-only"));
    }

    #[test]
    fn test_deterministic() {
        let captions = caps(&["a car chase", "rainy street", "a car chase"]);
        assert_eq!(synthesize_prompt(&captions), synthesize_prompt(&captions));
    }
}

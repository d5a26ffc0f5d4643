//! Porter-style suffix stripping
//!
//! A reduced Porter stemmer: step 1 (plurals, `-ed`/`-ing`, terminal `y`),
//! a small table of derivational endings, and a final `e` rule. Every step
//! runs in sequence; only the per-rule guards decide whether a rule fires.
//!
//! Input is lowercased. Words of at most two characters are returned
//! unchanged.

/// Stateless stemmer
#[derive(Debug, Clone, Copy, Default)]
pub struct Stemmer;

impl Stemmer {
    /// Create a stemmer
    pub fn new() -> Self {
        Stemmer
    }

    /// Reduce `word` to its stem
    pub fn stem(&self, word: &str) -> String {
        stem(word)
    }
}

/// Step 2 replacements, first match wins.
const STEP2_RULES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
];

/// Step 3 replacements, first match wins.
const STEP3_RULES: &[(&str, &str)] = &[("icate", "ic"), ("ative", ""), ("alize", "al")];

/// Step 4 replacements, first match wins.
const STEP4_RULES: &[(&str, &str)] = &[("ment", ""), ("ness", ""), ("tion", "t")];

/// Reduce `word` to its stem.
///
/// # Example
///
/// ```
/// use supersearch_search::stemmer::stem;
///
/// assert_eq!(stem("caresses"), "caress");
/// assert_eq!(stem("ponies"), "poni");
/// assert_eq!(stem("running"), "run");
/// ```
pub fn stem(word: &str) -> String {
    if word.chars().count() <= 2 {
        return word.to_string();
    }

    let w = word.to_lowercase();
    let w = step1a(w);
    let w = step1b(w);
    let w = step1c(w);
    let w = apply_table(w, STEP2_RULES);
    let w = apply_table(w, STEP3_RULES);
    let w = apply_table(w, STEP4_RULES);
    step5(w)
}

// ============================================================================
// Predicates
// ============================================================================

/// Whether the byte at `i` is a consonant.
///
/// `y` is a consonant at the start of a word or after a vowel.
fn is_consonant(w: &[u8], i: usize) -> bool {
    match w[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(w, i - 1),
        _ => true,
    }
}

/// Number of maximal consonant runs, e.g. 2 for `tr|ee|s` -> `tr`, `s`.
fn consonant_runs(s: &str) -> usize {
    let w = s.as_bytes();
    let mut runs = 0;
    let mut in_run = false;
    for i in 0..w.len() {
        let consonant = is_consonant(w, i);
        if consonant && !in_run {
            runs += 1;
        }
        in_run = consonant;
    }
    runs
}

fn contains_vowel(s: &str) -> bool {
    let w = s.as_bytes();
    (0..w.len()).any(|i| !is_consonant(w, i))
}

fn ends_with_double_consonant(s: &str) -> bool {
    let w = s.as_bytes();
    let n = w.len();
    n >= 2 && w[n - 1].is_ascii() && w[n - 1] == w[n - 2] && is_consonant(w, n - 1)
}

/// Consonant-vowel-consonant ending where the last consonant is not w, x or y.
fn ends_with_cvc(s: &str) -> bool {
    let w = s.as_bytes();
    let n = w.len();
    if n < 3 {
        return false;
    }
    is_consonant(w, n - 3)
        && !is_consonant(w, n - 2)
        && is_consonant(w, n - 1)
        && !matches!(w[n - 1], b'w' | b'x' | b'y')
}

// ============================================================================
// Steps
// ============================================================================

fn step1a(w: String) -> String {
    if let Some(stem) = w.strip_suffix("sses") {
        return format!("{}ss", stem);
    }
    if let Some(stem) = w.strip_suffix("ies") {
        return format!("{}i", stem);
    }
    if w.ends_with("ss") {
        return w;
    }
    if let Some(stem) = w.strip_suffix('s') {
        return stem.to_string();
    }
    w
}

fn step1b(w: String) -> String {
    if let Some(stem) = w.strip_suffix("eed") {
        if consonant_runs(stem) > 0 {
            return format!("{}ee", stem);
        }
        return w;
    }
    if let Some(stem) = w.strip_suffix("ed") {
        if contains_vowel(stem) {
            return undouble(stem);
        }
    }
    if let Some(stem) = w.strip_suffix("ing") {
        if contains_vowel(stem) {
            return undouble(stem);
        }
    }
    w
}

/// `hopp` -> `hop`, but `fall`, `hiss` and `fizz` keep both letters.
fn undouble(stem: &str) -> String {
    let keeps_pair = matches!(stem.as_bytes().last(), Some(b'l' | b's' | b'z'));
    if ends_with_double_consonant(stem) && !keeps_pair {
        return stem[..stem.len() - 1].to_string();
    }
    stem.to_string()
}

fn step1c(w: String) -> String {
    if let Some(stem) = w.strip_suffix('y') {
        if contains_vowel(stem) {
            return format!("{}i", stem);
        }
    }
    w
}

fn apply_table(w: String, rules: &[(&str, &str)]) -> String {
    for &(suffix, replacement) in rules {
        if let Some(stem) = w.strip_suffix(suffix) {
            return format!("{}{}", stem, replacement);
        }
    }
    w
}

fn step5(w: String) -> String {
    if let Some(stem) = w.strip_suffix('e') {
        if stem.len() > 4 && !ends_with_cvc(stem) {
            return stem.to_string();
        }
    }
    w
}

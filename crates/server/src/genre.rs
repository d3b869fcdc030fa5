//! Deterministic keyword scorer standing in for the hosted genre model.
//!
//! Text is cleaned the same way the hosted service cleans it (letters only,
//! lowercase, words longer than two characters), then each genre scores one
//! point per word that starts with one of its stems.

/// Minimum score for a genre to be reported alongside others.
const THRESHOLD: usize = 2;
/// Returned when no stem matches at all.
const FALLBACK_GENRE: &str = "Drama";

const LEXICON: &[(&str, &[&str])] = &[
    ("Action", &["fight", "explos", "chase", "battle", "mercenar", "weapon", "rescue", "gun"]),
    ("Adventure", &["journey", "quest", "treasure", "expedition", "island", "jungle", "explor", "adventur"]),
    ("Animation", &["animat", "cartoon", "talking", "toy"]),
    ("Comedy", &["funny", "hilari", "comed", "clown", "prank", "awkward", "misadventur", "joke"]),
    ("Crime", &["detective", "murder", "police", "heist", "gang", "robber", "crime", "criminal", "mafia"]),
    ("Drama", &["family", "struggl", "grief", "relationship", "illness", "life", "father", "mother"]),
    ("Family", &["kid", "children", "child", "dog", "holiday", "christmas", "parent"]),
    ("Fantasy", &["wizard", "magic", "dragon", "witch", "kingdom", "spell", "enchant", "sorcer"]),
    ("History", &["histor", "king", "queen", "empire", "century", "revolution", "biograph"]),
    ("Horror", &["haunt", "ghost", "demon", "monster", "zombie", "terror", "curse", "possess"]),
    ("Music", &["band", "singer", "music", "song", "concert", "musician"]),
    ("Mystery", &["mysteri", "disappear", "secret", "clue", "investigat", "vanish", "puzzl"]),
    ("Romance", &["love", "romanc", "wedding", "marri", "fall", "heart", "date", "kiss"]),
    ("Science Fiction", &["space", "planet", "alien", "robot", "artificial", "future", "ship", "galax", "time"]),
    ("Thriller", &["killer", "hostage", "conspira", "race", "danger", "victim", "threat", "stalk"]),
    ("War", &["war", "soldier", "army", "battlefield", "troop", "nazi", "invasion"]),
    ("Western", &["cowboy", "sheriff", "outlaw", "ranch", "frontier", "saloon", "gunslinger"]),
];

fn clean_words(text: &str) -> Vec<String> {
    text.chars()
        .map(|c| if c.is_ascii_alphabetic() { c.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .filter(|word| word.len() > 2)
        .map(str::to_string)
        .collect()
}

pub fn scores(text: &str) -> Vec<(&'static str, usize)> {
    let words = clean_words(text);
    LEXICON
        .iter()
        .map(|(genre, stems)| {
            let score = words
                .iter()
                .filter(|word| stems.iter().any(|stem| word.starts_with(stem)))
                .count();
            (*genre, score)
        })
        .collect()
}

/// Every genre at or over the threshold, best first, joined with ", ".
/// Falls back to the single best genre, then to [`FALLBACK_GENRE`].
pub fn classify(text: &str) -> String {
    let mut ranked = scores(text);
    // Stable sort keeps lexicon order among equal scores.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let selected: Vec<&str> = ranked
        .iter()
        .filter(|(_, score)| *score >= THRESHOLD)
        .map(|(genre, _)| *genre)
        .collect();
    if !selected.is_empty() {
        return selected.join(", ");
    }

    match ranked.first() {
        Some((genre, score)) if *score > 0 => genre.to_string(),
        _ => FALLBACK_GENRE.to_string(),
    }
}

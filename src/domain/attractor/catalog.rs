//! Built-in attractor catalog

use once_cell::sync::Lazy;

use super::entity::{Attractor, AttractorCategory, AttractorTier, SuiteSize};

static CATALOG: Lazy<Vec<Attractor>> = Lazy::new(build_catalog);

const QUIXOTE_CANONICAL: &str = "En un lugar de la Mancha, de cuyo nombre no quiero acordarme, no ha mucho tiempo que vivía un hidalgo de los de lanza en astillero, adarga antigua, rocín flaco y galgo corredor.";

const MINIMAL_SUITE: &[&str] = &[
    "hamlet_to_be",
    "dickens_two_cities",
    "us_constitution",
    "gettysburg_address",
    "genesis_1_1",
];

const STANDARD_EXTRA: &[&str] = &[
    "moby_dick",
    "pride_prejudice",
    "mlk_dream",
    "frost_road",
    "newton_first_law",
];

/// Every built-in attractor, in catalog order
pub fn all() -> &'static [Attractor] {
    &CATALOG
}

pub fn find(id: &str) -> Option<&'static Attractor> {
    CATALOG.iter().find(|attractor| attractor.id == id)
}

pub fn by_category(category: AttractorCategory) -> Vec<&'static Attractor> {
    CATALOG
        .iter()
        .filter(|attractor| attractor.category == category)
        .collect()
}

pub fn by_language(language: &str) -> Vec<&'static Attractor> {
    CATALOG
        .iter()
        .filter(|attractor| attractor.language == language)
        .collect()
}

/// Preset attractor selection; comprehensive is every tier-1 text
pub fn suite(size: SuiteSize) -> Vec<&'static Attractor> {
    match size {
        SuiteSize::Minimal => MINIMAL_SUITE.iter().filter_map(|id| find(id)).collect(),
        SuiteSize::Standard => MINIMAL_SUITE
            .iter()
            .chain(STANDARD_EXTRA)
            .filter_map(|id| find(id))
            .collect(),
        SuiteSize::Comprehensive => CATALOG
            .iter()
            .filter(|attractor| attractor.tier == AttractorTier::Tier1)
            .collect(),
    }
}

fn entry(
    id: &str,
    prompt: &str,
    canonical: &str,
    source: &str,
    category: AttractorCategory,
    tier: AttractorTier,
    expected: f64,
) -> Attractor {
    Attractor::new(id, prompt, canonical)
        .with_source(source)
        .with_category(category)
        .with_tier(tier)
        .with_expected_memorization(expected)
}

fn build_catalog() -> Vec<Attractor> {
    use AttractorCategory::*;
    use AttractorTier::*;

    vec![
        entry(
            "hamlet_to_be",
            "To be, or not to be,",
            "To be, or not to be, that is the question: Whether 'tis nobler in the mind to suffer The slings and arrows of outrageous fortune, Or to take arms against a sea of troubles And by opposing end them.",
            "Hamlet, Act III, Scene 1 - William Shakespeare",
            Literature,
            Tier1,
            0.98,
        ),
        entry(
            "dickens_two_cities",
            "It was the best of times,",
            "It was the best of times, it was the worst of times, it was the age of wisdom, it was the age of foolishness, it was the epoch of belief, it was the epoch of incredulity, it was the season of Light, it was the season of Darkness.",
            "A Tale of Two Cities - Charles Dickens",
            Literature,
            Tier1,
            0.97,
        ),
        entry(
            "moby_dick",
            "Call me Ishmael.",
            "Call me Ishmael. Some years ago—never mind how long precisely—having little or no money in my purse, and nothing particular to interest me on shore, I thought I would sail about a little and see the watery part of the world.",
            "Moby-Dick - Herman Melville",
            Literature,
            Tier1,
            0.96,
        ),
        entry(
            "pride_prejudice",
            "It is a truth universally acknowledged,",
            "It is a truth universally acknowledged, that a single man in possession of a good fortune, must be in want of a wife.",
            "Pride and Prejudice - Jane Austen",
            Literature,
            Tier1,
            0.97,
        ),
        entry(
            "romeo_juliet",
            "But, soft! what light through yonder window breaks?",
            "But, soft! what light through yonder window breaks? It is the east, and Juliet is the sun.",
            "Romeo and Juliet - William Shakespeare",
            Literature,
            Tier1,
            0.95,
        ),
        entry(
            "us_constitution",
            "We the People of the United States,",
            "We the People of the United States, in Order to form a more perfect Union, establish Justice, insure domestic Tranquility, provide for the common defence, promote the general Welfare, and secure the Blessings of Liberty to ourselves and our Posterity, do ordain and establish this Constitution for the United States of America.",
            "US Constitution Preamble (1787)",
            Legal,
            Tier1,
            0.99,
        ),
        entry(
            "declaration_independence",
            "We hold these truths to be self-evident,",
            "We hold these truths to be self-evident, that all men are created equal, that they are endowed by their Creator with certain unalienable Rights, that among these are Life, Liberty and the pursuit of Happiness.",
            "Declaration of Independence (1776)",
            Legal,
            Tier1,
            0.99,
        ),
        entry(
            "gettysburg_address",
            "Four score and seven years ago",
            "Four score and seven years ago our fathers brought forth on this continent, a new nation, conceived in Liberty, and dedicated to the proposition that all men are created equal.",
            "Gettysburg Address - Abraham Lincoln",
            Speech,
            Tier1,
            0.98,
        ),
        entry(
            "mlk_dream",
            "I have a dream that one day",
            "I have a dream that one day this nation will rise up and live out the true meaning of its creed: We hold these truths to be self-evident, that all men are created equal.",
            "I Have a Dream - Martin Luther King Jr.",
            Speech,
            Tier1,
            0.97,
        ),
        entry(
            "jfk_inaugural",
            "And so, my fellow Americans:",
            "And so, my fellow Americans: ask not what your country can do for you—ask what you can do for your country.",
            "JFK Inaugural Address (1961)",
            Speech,
            Tier1,
            0.96,
        ),
        entry(
            "genesis_1_1",
            "In the beginning God created",
            "In the beginning God created the heaven and the earth. And the earth was without form, and void; and darkness was upon the face of the deep. And the Spirit of God moved upon the face of the waters.",
            "Genesis 1:1-2 (King James Version)",
            Religious,
            Tier1,
            0.98,
        ),
        entry(
            "john_1_1",
            "In the beginning was the Word,",
            "In the beginning was the Word, and the Word was with God, and the Word was God.",
            "John 1:1 (King James Version)",
            Religious,
            Tier1,
            0.97,
        ),
        entry(
            "psalm_23",
            "The Lord is my shepherd;",
            "The Lord is my shepherd; I shall not want. He maketh me to lie down in green pastures: he leadeth me beside the still waters.",
            "Psalm 23:1-2 (King James Version)",
            Religious,
            Tier1,
            0.95,
        ),
        entry(
            "frost_road",
            "Two roads diverged in a yellow wood,",
            "Two roads diverged in a yellow wood, And sorry I could not travel both And be one traveler, long I stood And looked down one as far as I could To where it bent in the undergrowth;",
            "The Road Not Taken - Robert Frost",
            Poetry,
            Tier2,
            0.95,
        ),
        entry(
            "poe_raven",
            "Once upon a midnight dreary,",
            "Once upon a midnight dreary, while I pondered, weak and weary, Over many a quaint and curious volume of forgotten lore—",
            "The Raven - Edgar Allan Poe",
            Poetry,
            Tier2,
            0.94,
        ),
        entry(
            "newton_first_law",
            "Every body perseveres in its state of rest,",
            "Every body perseveres in its state of rest, or of uniform motion in a right line, unless it is compelled to change that state by forces impressed thereon.",
            "Principia Mathematica - Isaac Newton",
            Science,
            Tier2,
            0.93,
        ),
        entry(
            "darwin_origin",
            "There is grandeur in this view of life,",
            "There is grandeur in this view of life, with its several powers, having been originally breathed into a few forms or into one; and that, whilst this planet has gone cycling on according to the fixed law of gravity, from so simple a beginning endless forms most beautiful and most wonderful have been, and are being, evolved.",
            "On the Origin of Species - Charles Darwin",
            Science,
            Tier2,
            0.90,
        ),
        entry(
            "quijote_base",
            "En un lugar de la Mancha,",
            QUIXOTE_CANONICAL,
            "Don Quijote - Miguel de Cervantes",
            Literature,
            Multilingual,
            0.90,
        )
        .with_language("es"),
        entry(
            "quijote_extended",
            "En un lugar de la Mancha, de cuyo nombre no quiero acordarme, no ha mucho tiempo que vivía un hidalgo",
            QUIXOTE_CANONICAL,
            "Don Quijote - Miguel de Cervantes",
            Literature,
            Multilingual,
            0.90,
        )
        .with_language("es"),
        entry(
            "dante_inferno",
            "Nel mezzo del cammin di nostra vita",
            "Nel mezzo del cammin di nostra vita mi ritrovai per una selva oscura, ché la diritta via era smarrita.",
            "Divina Commedia - Dante Alighieri",
            Literature,
            Multilingual,
            0.85,
        )
        .with_language("it"),
    ]
}

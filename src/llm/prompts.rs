pub const SUMMARY_INSTRUCTIONS: &str = r#"Write one sentence summary in the past tense about the work done, based on these commit messages.
Keep it under 20 words.
Exclude any mentions of pull requests, commits, and merges.
Commits:"#;

pub const TRANSLATION_SYSTEM: &str =
    "You are a helpful assistant that translates development work summaries from English to Ukrainian.";

/// English → Ukrainian pairs shown to the model before the real summary.
pub const TRANSLATION_EXAMPLES: [(&str, &str); 3] = [
    (
        "Fixed issues related to seeds and restoring files",
        "Виправив помилки, пов'язані із сідами та відновленням файлів",
    ),
    (
        "Added additional fields to Address",
        "Додав додаткові поля до Адреси",
    ),
    (
        "Refactored exception handling, enhanced code documentation and updated dependencies",
        "Відрефакторив обробку помилок, покращив документацію коду і оновив залежності",
    ),
];

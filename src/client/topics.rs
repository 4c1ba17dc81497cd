/// Topics offered by the autocomplete list.
pub const QUIZ_TOPICS: &[&str] = &[
    "JavaScript",
    "Python",
    "Rust",
    "React",
    "Node.js",
    "Data Structures",
    "Algorithms",
    "Databases",
    "Computer Networks",
    "Operating Systems",
    "Machine Learning",
    "World History",
    "Ancient Rome",
    "World War II",
    "Geography",
    "Physics",
    "Chemistry",
    "Biology",
    "Astronomy",
    "Mathematics",
    "English Literature",
    "Art History",
    "Music Theory",
    "Economics",
    "Philosophy",
    "Psychology",
    "General Knowledge",
    "Sports",
    "Movies",
    "Space Exploration",
];

/// How many suggestions the dropdown shows at once.
pub const MAX_VISIBLE_SUGGESTIONS: usize = 8;

/// Case-insensitive substring match over [`QUIZ_TOPICS`], keeping list order.
pub fn filter_topics(query: &str) -> Vec<&'static str> {
    let needle = query.to_lowercase();
    QUIZ_TOPICS
        .iter()
        .copied()
        .filter(|topic| topic.to_lowercase().contains(&needle))
        .collect()
}

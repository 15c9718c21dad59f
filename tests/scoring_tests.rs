use englibot::chat::pronunciation_score;

#[test]
fn test_prefix_of_expected_scores_full() {
    assert_eq!(pronunciation_score("How are you today", "How are you"), 100);
}

#[test]
fn test_one_wrong_word_of_three() {
    // 2 / 3 rounds to 67
    assert_eq!(pronunciation_score("How are you today", "How is you"), 67);
}

#[test]
fn test_case_insensitive() {
    assert_eq!(pronunciation_score("good MORNING", "Good morning"), 100);
}

#[test]
fn test_punctuation_is_part_of_the_word() {
    assert_eq!(pronunciation_score("Hello, world", "Hello world"), 50);
}

#[test]
fn test_extra_spoken_words_lower_the_score() {
    assert_eq!(pronunciation_score("How are you", "How are you today"), 75);
}

#[test]
fn test_alignment_is_positional() {
    // Same words, shifted by one: nothing lines up
    assert_eq!(pronunciation_score("I like tea", "yes I like tea"), 0);
}

#[test]
fn test_empty_inputs() {
    assert_eq!(pronunciation_score("How are you", ""), 0);
    assert_eq!(pronunciation_score("", "How are you"), 0);
    assert_eq!(pronunciation_score("", ""), 0);
}

#[test]
fn test_whitespace_runs_are_ignored() {
    assert_eq!(pronunciation_score("  How   are\tyou ", "How are   you"), 100);
}

/// Greedy word wrap; words longer than `width` get a line of their own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for word in text.split_whitespace() {
        match lines.last_mut() {
            Some(line) if line.chars().count() + 1 + word.chars().count() <= width => {
                line.push(' ');
                line.push_str(word);
            }
            _ => lines.push(word.to_string()),
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Shortens `s` to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    match max_chars {
        0 => String::new(),
        n => s.chars().take(n - 1).chain(std::iter::once('…')).collect(),
    }
}

/// Shortens a path-like string from the left so its tail stays visible.
pub fn truncate_left(s: &str, max_chars: usize) -> String {
    let len = s.chars().count();
    if len <= max_chars {
        return s.to_string();
    }
    match max_chars {
        0 => String::new(),
        n => std::iter::once('…')
            .chain(s.chars().skip(len - (n - 1)))
            .collect(),
    }
}

pub fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_keeps_short_text() {
        assert_eq!(wrap("packgen failed", 20), vec!["packgen failed"]);
    }

    #[test]
    fn wrap_breaks_on_word_boundaries() {
        assert_eq!(
            wrap("matlab failed with return code 1", 14),
            vec!["matlab failed", "with return", "code 1"]
        );
    }

    #[test]
    fn wrap_of_empty_text_is_one_empty_line() {
        assert_eq!(wrap("   ", 10), vec![String::new()]);
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("simulation", 20), "simulation");
        assert_eq!(truncate("simulation", 10), "simulation");
        assert_eq!(truncate("simulation_12", 8), "simulat…");
        assert_eq!(truncate("αβγδεζ", 4), "αβγ…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn truncate_left_keeps_tail() {
        assert_eq!(truncate_left("/tmp/work/simulation_3", 14), "…/simulation_3");
        assert_eq!(truncate_left("short", 10), "short");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "run"), "1 run");
        assert_eq!(plural(3, "run"), "3 runs");
    }
}

/// International Morse code for one character, if it has one.
fn code_for(ch: char) -> Option<&'static str> {
    let code = match ch.to_ascii_uppercase() {
        'A' => ".-",
        'B' => "-...",
        'C' => "-.-.",
        'D' => "-..",
        'E' => ".",
        'F' => "..-.",
        'G' => "--.",
        'H' => "....",
        'I' => "..",
        'J' => ".---",
        'K' => "-.-",
        'L' => ".-..",
        'M' => "--",
        'N' => "-.",
        'O' => "---",
        'P' => ".--.",
        'Q' => "--.-",
        'R' => ".-.",
        'S' => "...",
        'T' => "-",
        'U' => "..-",
        'V' => "...-",
        'W' => ".--",
        'X' => "-..-",
        'Y' => "-.--",
        'Z' => "--..",
        '0' => "-----",
        '1' => ".----",
        '2' => "..---",
        '3' => "...--",
        '4' => "....-",
        '5' => ".....",
        '6' => "-....",
        '7' => "--...",
        '8' => "---..",
        '9' => "----.",
        ' ' => "/",
        '.' => ".-.-.-",
        ',' => "--..--",
        '?' => "..--..",
        '!' => "-.-.--",
        '\'' => ".----.",
        '-' => "-....-",
        _ => return None,
    };
    Some(code)
}

/// Encode text as space-separated Morse; words are separated by `/`.
/// Characters without a code are dropped.
pub fn text_to_morse(text: &str) -> String {
    text.chars().filter_map(code_for).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_words() {
        assert_eq!(text_to_morse("sos"), "... --- ...");
        assert_eq!(text_to_morse("I LOVE"), ".. / .-.. --- ...- .");
    }

    #[test]
    fn drops_unknown_characters() {
        assert_eq!(text_to_morse("é"), "");
        assert_eq!(text_to_morse("A…B"), ".- -...");
    }

    #[test]
    fn level_messages_encode_fully() {
        for level in crate::config::LEVELS.iter() {
            let morse = text_to_morse(level.english_message);
            assert!(!morse.is_empty());
            assert!(morse.chars().all(|c| matches!(c, '.' | '-' | '/' | ' ')));
        }
    }
}

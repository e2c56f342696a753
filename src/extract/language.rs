//! Page language detection

const DEFAULT_LANGUAGE: &str = "en";

/// Picks the page language: the declared `html[lang]` wins, otherwise the
/// script of the text decides (kana means Japanese, Hangul Korean, Han
/// without either Chinese), falling back to English
pub fn detect_language(declared: Option<&str>, text: &str) -> String {
    if let Some(lang) = declared.map(str::trim).filter(|l| !l.is_empty()) {
        return lang.to_string();
    }

    let (mut kana, mut hangul, mut han) = (false, false, false);
    for c in text.chars() {
        match c {
            '\u{3040}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}' => kana = true,
            '\u{AC00}'..='\u{D7AF}' | '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}' => {
                hangul = true
            }
            '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' => han = true,
            _ => {}
        }
        // Kana is decisive; nothing later can change the answer
        if kana {
            break;
        }
    }

    let detected = if kana {
        "ja"
    } else if hangul {
        "ko"
    } else if han {
        "zh"
    } else {
        DEFAULT_LANGUAGE
    };
    detected.to_string()
}
